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

//! # Session Manager
//!
//! Owns the one authenticated session of a run and hands out cursors bound to
//! it. Closing the manager flips a shared flag every outstanding
//! `CursorIterator` checks, so no cursor can be read once its session is gone.

use crate::application::cursor_iterator::CursorIterator;
use crate::domain::deadline::Deadline;
use crate::domain::entities::ConnectionConfig;
use crate::domain::errors::{ExportError, Result};
use crate::ports::progress_reporter::ProgressReporter;
use crate::ports::query_engine::{QueryEngine, Session};
use log::warn;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub struct SessionManager {
    session: Option<Box<dyn Session>>,
    open: Arc<AtomicBool>,
    address: String,
}

impl SessionManager {
    /// Opens the session exactly as configured. No retries.
    ///
    /// The auth mode is surfaced to the reporter first but never validated:
    /// the engine negotiates authentication itself.
    pub fn connect(
        engine: &dyn QueryEngine,
        config: &ConnectionConfig,
        deadline: &Deadline,
        reporter: &dyn ProgressReporter,
    ) -> Result<Self> {
        reporter.connecting(config);
        reporter.auth_mode(&config.auth);
        deadline.check("connect")?;

        let started = Instant::now();
        let session = engine.connect(config, deadline)?;
        reporter.connected(started.elapsed());

        Ok(Self {
            session: Some(session),
            open: Arc::new(AtomicBool::new(true)),
            address: config.address(),
        })
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// A fresh cursor. Cursors are never pooled or reused.
    pub fn new_cursor(&mut self) -> Result<CursorIterator> {
        let session = self.session.as_mut().ok_or_else(|| {
            ExportError::ConnectionError(format!("session to {} is closed", self.address))
        })?;
        let cursor = session.cursor()?;
        Ok(CursorIterator::new(cursor, self.open.clone()))
    }

    /// Releases the session and invalidates every cursor still open. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        self.open.store(false, Ordering::Release);
        match self.session.take() {
            Some(mut session) => session.close(),
            None => Ok(()),
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close session to {}: {}", self.address, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AuthMode, RunStage, RunSummary};
    use crate::domain::errors::RunFailure;
    use crate::infrastructure::engine::scripted_engine::{test_connection, ScriptedEngine};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ProgressReporter for Recorder {
        fn stage_changed(&self, _stage: RunStage) {}
        fn connecting(&self, config: &ConnectionConfig) {
            self.events
                .lock()
                .unwrap()
                .push(format!("connecting {}", config.address()));
        }
        fn auth_mode(&self, mode: &AuthMode) {
            let label = mode.describe().unwrap_or("unknown");
            self.events.lock().unwrap().push(format!("auth {}", label));
        }
        fn connected(&self, _elapsed: Duration) {
            self.events.lock().unwrap().push("connected".to_string());
        }
        fn table_exported(&self, _index: usize, _name: &str) {}
        fn finished(&self, _summary: &RunSummary) {}
        fn aborted(&self, _failure: &RunFailure) {}
    }

    #[test]
    fn test_connect_reports_then_connects() {
        let engine = ScriptedEngine::for_schema("salesdb");
        let recorder = Recorder::default();
        let deadline = Deadline::after(Duration::from_secs(30));

        let manager =
            SessionManager::connect(&engine, &test_connection("salesdb"), &deadline, &recorder)
                .unwrap();
        assert!(manager.is_open());
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec!["connecting localhost:10000", "auth Plain SASL", "connected"]
        );
    }

    #[test]
    fn test_unknown_auth_mode_does_not_block() {
        let engine = ScriptedEngine::for_schema("salesdb");
        let recorder = Recorder::default();
        let deadline = Deadline::after(Duration::from_secs(30));
        let mut config = test_connection("salesdb");
        config.auth = AuthMode::parse("LDAP");

        let manager = SessionManager::connect(&engine, &config, &deadline, &recorder);
        assert!(manager.is_ok());
        assert!(recorder
            .events
            .lock()
            .unwrap()
            .contains(&"auth unknown".to_string()));
    }

    #[test]
    fn test_refused_connection_is_connection_error() {
        let engine = ScriptedEngine::for_schema("salesdb").refuse_connections("auth failed");
        let deadline = Deadline::after(Duration::from_secs(30));
        let result = SessionManager::connect(
            &engine,
            &test_connection("salesdb"),
            &deadline,
            &Recorder::default(),
        );
        assert!(matches!(result, Err(ExportError::ConnectionError(_))));
        assert_eq!(engine.sessions_opened(), 0);
    }

    #[test]
    fn test_close_is_idempotent_and_stops_cursors() {
        let engine = ScriptedEngine::for_schema("salesdb").with_tables(&["users"]);
        let deadline = Deadline::after(Duration::from_secs(30));
        let mut manager = SessionManager::connect(
            &engine,
            &test_connection("salesdb"),
            &deadline,
            &Recorder::default(),
        )
        .unwrap();

        let mut cursor = manager.new_cursor().unwrap();
        cursor.execute("SHOW TABLES IN `salesdb`", &deadline).unwrap();

        manager.close().unwrap();
        manager.close().unwrap();
        assert_eq!(engine.sessions_closed(), 1);
        assert!(cursor.has_more(&deadline).is_err());
        assert!(matches!(
            manager.new_cursor(),
            Err(ExportError::ConnectionError(_))
        ));
    }
}
