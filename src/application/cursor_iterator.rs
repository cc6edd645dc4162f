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

//! # Cursor Iterator
//!
//! Wraps one adapter cursor and enforces its lifecycle:
//!
//! `Pending --execute--> Streaming --close--> Closed`
//!
//! Adapters only have to move bytes. Ordering mistakes (fetching before
//! executing, reading after close, executing twice) and deadline checks are
//! handled here, once, for every engine.

use crate::domain::deadline::Deadline;
use crate::domain::errors::{ExportError, Result};
use crate::ports::query_engine::Cursor;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Allocated, no statement submitted yet.
    Pending,
    /// Statement accepted; rows may or may not remain.
    Streaming,
    Closed,
}

pub struct CursorIterator {
    inner: Box<dyn Cursor>,
    state: CursorState,
    /// Cleared by the session manager when the session goes away.
    session_open: Arc<AtomicBool>,
    statement: Option<String>,
}

impl CursorIterator {
    pub(crate) fn new(inner: Box<dyn Cursor>, session_open: Arc<AtomicBool>) -> Self {
        Self {
            inner,
            state: CursorState::Pending,
            session_open,
            statement: None,
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    fn is_readable(&self) -> bool {
        self.state != CursorState::Closed && self.session_open.load(Ordering::Acquire)
    }

    /// Submits one statement. A cursor runs exactly one statement in its life.
    pub fn execute(&mut self, statement: &str, deadline: &Deadline) -> Result<()> {
        if !self.is_readable() {
            return Err(ExportError::query(statement, "cursor is closed"));
        }
        if self.state == CursorState::Streaming {
            return Err(ExportError::query(
                statement,
                "cursor already executed another statement",
            ));
        }
        deadline.check("execute")?;
        debug!("Executing: {}", statement);
        self.inner.execute(statement, deadline)?;
        self.state = CursorState::Streaming;
        self.statement = Some(statement.to_string());
        Ok(())
    }

    pub fn has_more(&mut self, deadline: &Deadline) -> Result<bool> {
        self.ensure_streaming("has_more")?;
        deadline.check("has_more")?;
        self.inner.has_more(deadline)
    }

    /// Next row's single string column.
    pub fn fetch_one(&mut self, deadline: &Deadline) -> Result<String> {
        self.ensure_streaming("fetch_one")?;
        deadline.check("fetch_one")?;
        self.inner.fetch_one(deadline)
    }

    pub fn close(&mut self) -> Result<()> {
        if self.state == CursorState::Closed {
            return Ok(());
        }
        self.state = CursorState::Closed;
        self.inner.close()
    }

    fn ensure_streaming(&self, operation: &str) -> Result<()> {
        if !self.is_readable() {
            return Err(ExportError::FetchError(format!(
                "{} on a closed cursor",
                operation
            )));
        }
        if self.state == CursorState::Pending {
            return Err(ExportError::FetchError(format!(
                "{} before any statement was executed",
                operation
            )));
        }
        Ok(())
    }
}

impl Drop for CursorIterator {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(
                "Failed to close cursor for {:?}: {}",
                self.statement.as_deref().unwrap_or("<not executed>"),
                e
            );
        }
    }
}
