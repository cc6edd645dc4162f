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

//! # Query Engine Port
//!
//! The exporter treats the query engine as a black box offering sessions and
//! cursors. Whether the bytes travel over HTTP, Thrift or come from a test
//! script is the adapter's business. The application layer only decides
//! *which* statements run and in what order.
//!
//! Every blocking call receives the run-wide `Deadline`. Adapters must not
//! block past it and report expiry as `ExportError::DeadlineExceeded`.

use crate::domain::deadline::Deadline;
use crate::domain::entities::{ConnectionConfig, IdentifierQuote};
use crate::domain::errors::Result;

/// Something we can open authenticated sessions against.
pub trait QueryEngine: Send + Sync {
    /// Opens a session with exactly the given host, port and credentials.
    /// No retries: a failure here is a `ConnectionError`.
    fn connect(&self, config: &ConnectionConfig, deadline: &Deadline) -> Result<Box<dyn Session>>;

    /// Identifier quoting the engine's SQL dialect accepts. HiveQL backticks
    /// unless the adapter says otherwise.
    fn identifier_quote(&self) -> IdentifierQuote {
        IdentifierQuote::Backtick
    }
}

/// A live channel to the engine.
pub trait Session: Send {
    /// Allocates a new, not yet executed cursor.
    fn cursor(&mut self) -> Result<Box<dyn Cursor>>;

    /// Releases the channel. Must be idempotent.
    fn close(&mut self) -> Result<()>;
}

/// One statement and the position in its paginated result stream.
pub trait Cursor: Send {
    /// Submits `statement`. Rejection by the engine is a `QueryError`.
    fn execute(&mut self, statement: &str, deadline: &Deadline) -> Result<()>;

    /// `true` while unread rows remain. May fetch the next page.
    fn has_more(&mut self, deadline: &Deadline) -> Result<bool>;

    /// Decodes the next row's single string column.
    fn fetch_one(&mut self, deadline: &Deadline) -> Result<String>;

    /// Releases server-side resources. Must be idempotent.
    fn close(&mut self) -> Result<()>;
}
