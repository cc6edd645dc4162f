// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The core application logic that drives one export run.
//!
//! ```text
//! Idle -> Connecting -> Opening -> Enumerating -> (Fetching -> Writing)* -> Done
//!            \___________\__________\______________\__________\______-> Aborted
//! ```
//!
//! Tables are processed strictly one after another. The first error of any
//! kind ends the run: nothing is retried or skipped. Records already written
//! stay on disk, and every resource opened so far is released on the way out.

use crate::application::definition_fetcher::fetch_definition;
use crate::application::session_manager::SessionManager;
use crate::application::table_enumerator::list_tables;
use crate::domain::deadline::Deadline;
use crate::domain::entities::{
    ConnectionConfig, IdentifierQuote, RunStage, RunSummary, TableNaming,
};
use crate::domain::errors::{ExportError, RunFailure};
use crate::domain::statements;
use crate::infrastructure::local_storage::sql_script_writer::{script_path, SqlScriptWriter};
use crate::ports::progress_reporter::ProgressReporter;
use crate::ports::query_engine::QueryEngine;
use chrono::NaiveDate;
use std::cell::Cell;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Knobs of a run that are not about the connection itself.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub output_dir: PathBuf,
    /// Wall-clock budget for the whole run.
    pub timeout: Duration,
    pub qualify_table_names: bool,
    /// `None` uses whatever the engine's dialect expects.
    pub identifier_quote: Option<IdentifierQuote>,
}

impl ExportSettings {
    pub fn naming(&self, engine: &dyn QueryEngine) -> TableNaming {
        TableNaming {
            qualify: self.qualify_table_names,
            quote: self
                .identifier_quote
                .unwrap_or_else(|| engine.identifier_quote()),
        }
    }
}

/// An error plus the table that was in flight when it happened.
struct StageError {
    table: Option<String>,
    source: ExportError,
}

impl StageError {
    fn at(table: &str, source: ExportError) -> Self {
        Self {
            table: Some(table.to_string()),
            source,
        }
    }
}

impl From<ExportError> for StageError {
    fn from(source: ExportError) -> Self {
        Self {
            table: None,
            source,
        }
    }
}

pub struct Orchestrator {
    engine: Arc<dyn QueryEngine>,
    reporter: Arc<dyn ProgressReporter>,
    connection: ConnectionConfig,
    settings: ExportSettings,
    stage: Cell<RunStage>,
}

impl Orchestrator {
    pub fn new(
        engine: Arc<dyn QueryEngine>,
        reporter: Arc<dyn ProgressReporter>,
        connection: ConnectionConfig,
        settings: ExportSettings,
    ) -> Self {
        Self {
            engine,
            reporter,
            connection,
            settings,
            stage: Cell::new(RunStage::Idle),
        }
    }

    pub fn stage(&self) -> RunStage {
        self.stage.get()
    }

    /// Exports today's snapshot.
    pub fn run(&self) -> Result<RunSummary, RunFailure> {
        self.run_for_date(chrono::Local::now().date_naive())
    }

    /// Exports a snapshot named after `date`, with a fresh deadline.
    pub fn run_for_date(&self, date: NaiveDate) -> Result<RunSummary, RunFailure> {
        let deadline = Deadline::after(self.settings.timeout);
        self.run_until(date, &deadline)
    }

    pub fn run_until(&self, date: NaiveDate, deadline: &Deadline) -> Result<RunSummary, RunFailure> {
        self.enter(RunStage::Idle);
        match self.export(date, deadline) {
            Ok(summary) => {
                self.enter(RunStage::Done);
                self.reporter.finished(&summary);
                Ok(summary)
            }
            Err(e) => {
                let failure = RunFailure {
                    stage: self.stage.get(),
                    table: e.table,
                    source: e.source,
                };
                self.enter(RunStage::Aborted);
                self.reporter.aborted(&failure);
                Err(failure)
            }
        }
    }

    fn enter(&self, stage: RunStage) {
        self.stage.set(stage);
        self.reporter.stage_changed(stage);
    }

    fn export(&self, date: NaiveDate, deadline: &Deadline) -> Result<RunSummary, StageError> {
        let schema = self.connection.schema.as_str();
        let naming = self.settings.naming(self.engine.as_ref());
        let output_path = script_path(&self.settings.output_dir, schema, date);

        self.enter(RunStage::Connecting);
        let mut session = SessionManager::connect(
            self.engine.as_ref(),
            &self.connection,
            deadline,
            self.reporter.as_ref(),
        )?;

        self.enter(RunStage::Opening);
        let mut writer = SqlScriptWriter::open(&output_path)?;

        self.enter(RunStage::Enumerating);
        let tables = list_tables(&mut session, schema, naming.quote, deadline)?;

        let mut processed = 0;
        for table in tables {
            let table = table?;
            let qualified = statements::qualified_name(schema, &table);

            self.enter(RunStage::Fetching);
            let definition =
                fetch_definition(&mut session, schema, &table, naming, deadline)
                    .map_err(|e| StageError::at(&qualified, e))?;

            self.enter(RunStage::Writing);
            writer
                .append(&qualified, &definition)
                .map_err(|e| StageError::at(&qualified, e))?;
            processed += 1;
            self.reporter.table_exported(processed, &qualified);

            self.enter(RunStage::Enumerating);
        }
        debug_assert_eq!(processed, writer.records());

        session.close()?;
        writer.close()?;

        Ok(RunSummary {
            processed,
            output_path: writer.path().to_path_buf(),
        })
    }
}
