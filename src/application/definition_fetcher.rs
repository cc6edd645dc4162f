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

//! Fetches the generated DDL of a single table.

use crate::application::session_manager::SessionManager;
use crate::domain::deadline::Deadline;
use crate::domain::entities::{DefinitionText, TableNaming};
use crate::domain::errors::Result;
use crate::domain::statements;
use log::debug;

/// Runs `SHOW CREATE TABLE` on a cursor dedicated to `table` and joins every
/// returned line, untouched, in server order.
///
/// The cursor is closed before returning on success and dropped (closed) on
/// any error, so it never outlives this table.
pub fn fetch_definition(
    session: &mut SessionManager,
    schema: &str,
    table: &str,
    naming: TableNaming,
    deadline: &Deadline,
) -> Result<DefinitionText> {
    let statement = statements::show_create_table(schema, table, naming);
    let mut cursor = session.new_cursor()?;
    cursor.execute(&statement, deadline)?;

    let mut lines = Vec::new();
    while cursor.has_more(deadline)? {
        lines.push(cursor.fetch_one(deadline)?);
    }
    cursor.close()?;

    debug!("Fetched {} definition lines for {}.{}", lines.len(), schema, table);
    Ok(DefinitionText::from_lines(lines))
}
