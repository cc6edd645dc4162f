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

//! Core error definitions for the Hive DDL Exporter.
//!
//! `ExportError` covers every failure a single stage can hit. The orchestrator
//! wraps whatever reaches it in a `RunFailure`, which adds the stage and the
//! table being processed so the terminal log line says where the run died.

use crate::domain::entities::RunStage;
use thiserror::Error;

/// Error types encountered during the export process.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection failed: {0}")]
    ConnectionError(String),

    #[error("Query `{statement}` failed: {reason}")]
    QueryError { statement: String, reason: String },

    #[error("Fetch failed: {0}")]
    FetchError(String),

    #[error("Deadline exceeded during {0}")]
    DeadlineExceeded(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ExportError {
    /// Helper for the common "statement rejected" case.
    pub fn query(statement: &str, reason: impl Into<String>) -> Self {
        ExportError::QueryError {
            statement: statement.to_string(),
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for the Hive DDL Exporter.
pub type Result<T> = std::result::Result<T, ExportError>;

/// The error a whole run terminates with.
#[derive(Error, Debug)]
#[error("export aborted while {stage}{}: {source}", table_suffix(.table))]
pub struct RunFailure {
    /// Stage that was active when the error surfaced.
    pub stage: RunStage,
    /// Fully qualified name of the table in flight, if any.
    pub table: Option<String>,
    #[source]
    pub source: ExportError,
}

fn table_suffix(table: &Option<String>) -> String {
    table
        .as_ref()
        .map(|t| format!(" {}", t))
        .unwrap_or_default()
}
