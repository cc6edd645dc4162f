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

//! Lazily lists the tables of a schema.

use crate::application::cursor_iterator::CursorIterator;
use crate::application::session_manager::SessionManager;
use crate::domain::deadline::Deadline;
use crate::domain::entities::{IdentifierQuote, TableName};
use crate::domain::errors::Result;
use crate::domain::statements;

/// Runs the enumeration statement and returns a single-pass iterator over
/// its rows, in the order the server sent them.
///
/// Calling this again issues a brand new statement.
pub fn list_tables<'d>(
    session: &mut SessionManager,
    schema: &str,
    quote: IdentifierQuote,
    deadline: &'d Deadline,
) -> Result<TableNames<'d>> {
    let statement = statements::show_tables(schema, quote);
    let mut cursor = session.new_cursor()?;
    cursor.execute(&statement, deadline)?;
    Ok(TableNames {
        cursor: Some(cursor),
        deadline,
    })
}

/// Yields table names until the stream is exhausted or the first error.
pub struct TableNames<'d> {
    cursor: Option<CursorIterator>,
    deadline: &'d Deadline,
}

impl TableNames<'_> {
    fn next_name(cursor: &mut CursorIterator, deadline: &Deadline) -> Result<Option<TableName>> {
        if !cursor.has_more(deadline)? {
            cursor.close()?;
            return Ok(None);
        }
        cursor.fetch_one(deadline).map(Some)
    }
}

impl Iterator for TableNames<'_> {
    type Item = Result<TableName>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.as_mut()?;
        match Self::next_name(cursor, self.deadline) {
            Ok(Some(name)) => Some(Ok(name)),
            Ok(None) => {
                self.cursor = None;
                None
            }
            Err(e) => {
                self.cursor = None;
                Some(Err(e))
            }
        }
    }
}
