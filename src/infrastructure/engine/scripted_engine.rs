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

//! In-memory `QueryEngine` driven by a script of statement -> response.
//!
//! Used by the unit tests of every application module. It also keeps a log of
//! issued statements and counts open cursors so tests can assert ordering and
//! scoping.

use crate::domain::deadline::Deadline;
use crate::domain::entities::{ConnectionConfig, IdentifierQuote, TableNaming};
use crate::domain::errors::{ExportError, Result};
use crate::domain::statements;
use crate::ports::query_engine::{Cursor, QueryEngine, Session};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub enum Response {
    Rows(Vec<String>),
    /// The engine rejects the statement.
    Reject(String),
    /// Rows are delivered, then the next fetch fails to decode.
    FailAfter(Vec<String>, String),
    /// The call blocks until the deadline passes.
    Stall,
}

#[derive(Default)]
struct Script {
    responses: HashMap<String, Response>,
    refuse_connect: Option<String>,
    issued: Vec<String>,
    open_cursors: usize,
    max_open_cursors: usize,
    sessions_opened: usize,
    sessions_closed: usize,
}

#[derive(Clone)]
pub struct ScriptedEngine {
    schema: String,
    script: Arc<Mutex<Script>>,
}

impl ScriptedEngine {
    pub fn for_schema(schema: &str) -> Self {
        Self {
            schema: schema.to_string(),
            script: Arc::new(Mutex::new(Script::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }

    pub fn respond(self, statement: &str, response: Response) -> Self {
        self.lock()
            .responses
            .insert(statement.to_string(), response);
        self
    }

    pub fn with_tables(self, tables: &[&str]) -> Self {
        let stmt = statements::show_tables(&self.schema, IdentifierQuote::Backtick);
        let rows = tables.iter().map(|t| t.to_string()).collect();
        self.respond(&stmt, Response::Rows(rows))
    }

    pub fn with_definition(self, table: &str, lines: &[&str]) -> Self {
        let rows = lines.iter().map(|l| l.to_string()).collect();
        self.with_definition_response(table, Response::Rows(rows))
    }

    pub fn with_definition_response(self, table: &str, response: Response) -> Self {
        let stmt = statements::show_create_table(&self.schema, table, TableNaming::default());
        self.respond(&stmt, response)
    }

    pub fn refuse_connections(self, reason: &str) -> Self {
        self.lock().refuse_connect = Some(reason.to_string());
        self
    }

    pub fn issued(&self) -> Vec<String> {
        self.lock().issued.clone()
    }

    pub fn open_cursors(&self) -> usize {
        self.lock().open_cursors
    }

    pub fn max_open_cursors(&self) -> usize {
        self.lock().max_open_cursors
    }

    pub fn sessions_opened(&self) -> usize {
        self.lock().sessions_opened
    }

    pub fn sessions_closed(&self) -> usize {
        self.lock().sessions_closed
    }
}

impl QueryEngine for ScriptedEngine {
    fn connect(&self, config: &ConnectionConfig, deadline: &Deadline) -> Result<Box<dyn Session>> {
        deadline.check("connect")?;
        let mut script = self.lock();
        if let Some(reason) = &script.refuse_connect {
            return Err(ExportError::ConnectionError(format!(
                "{}: {}",
                config.address(),
                reason
            )));
        }
        script.sessions_opened += 1;
        Ok(Box::new(ScriptedSession {
            script: self.script.clone(),
            closed: false,
        }))
    }
}

struct ScriptedSession {
    script: Arc<Mutex<Script>>,
    closed: bool,
}

impl Session for ScriptedSession {
    fn cursor(&mut self) -> Result<Box<dyn Cursor>> {
        if self.closed {
            return Err(ExportError::ConnectionError("session closed".to_string()));
        }
        let mut script = self.script.lock().unwrap();
        script.open_cursors += 1;
        script.max_open_cursors = script.max_open_cursors.max(script.open_cursors);
        Ok(Box::new(ScriptedCursor {
            script: self.script.clone(),
            rows: VecDeque::new(),
            failure: None,
            closed: false,
        }))
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.script.lock().unwrap().sessions_closed += 1;
        }
        Ok(())
    }
}

struct ScriptedCursor {
    script: Arc<Mutex<Script>>,
    rows: VecDeque<String>,
    failure: Option<String>,
    closed: bool,
}

impl Cursor for ScriptedCursor {
    fn execute(&mut self, statement: &str, deadline: &Deadline) -> Result<()> {
        let response = {
            let mut script = self.script.lock().unwrap();
            script.issued.push(statement.to_string());
            script.responses.get(statement).cloned()
        };
        match response {
            None => Err(ExportError::query(statement, "no such table")),
            Some(Response::Reject(reason)) => Err(ExportError::query(statement, reason)),
            Some(Response::Rows(rows)) => {
                self.rows = rows.into();
                Ok(())
            }
            Some(Response::FailAfter(rows, reason)) => {
                self.rows = rows.into();
                self.failure = Some(reason);
                Ok(())
            }
            Some(Response::Stall) => {
                if let Ok(left) = deadline.remaining("execute") {
                    std::thread::sleep(left);
                }
                Err(deadline.exceeded("execute"))
            }
        }
    }

    fn has_more(&mut self, _deadline: &Deadline) -> Result<bool> {
        Ok(!self.rows.is_empty() || self.failure.is_some())
    }

    fn fetch_one(&mut self, _deadline: &Deadline) -> Result<String> {
        if let Some(row) = self.rows.pop_front() {
            return Ok(row);
        }
        match self.failure.take() {
            Some(reason) => Err(ExportError::FetchError(reason)),
            None => Err(ExportError::FetchError("result stream exhausted".to_string())),
        }
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.script.lock().unwrap().open_cursors -= 1;
        }
        Ok(())
    }
}

/// Connection settings matching what the scripted engine expects.
pub fn test_connection(schema: &str) -> ConnectionConfig {
    ConnectionConfig {
        host: "localhost".to_string(),
        port: 10000,
        auth: crate::domain::entities::AuthMode::Plain,
        username: "etl".to_string(),
        password: String::new(),
        schema: schema.to_string(),
        catalog: "hive".to_string(),
        use_tls: false,
    }
}
