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

//! Builders for the only two statements the exporter ever issues.

use crate::domain::entities::{IdentifierQuote, TableNaming};

/// Quotes an identifier, doubling any embedded quote character.
pub fn quote_identifier(name: &str, quote: IdentifierQuote) -> String {
    let q = match quote {
        IdentifierQuote::Backtick => '`',
        IdentifierQuote::Double => '"',
    };
    let mut out = String::with_capacity(name.len() + 2);
    out.push(q);
    for c in name.chars() {
        if c == q {
            out.push(q);
        }
        out.push(c);
    }
    out.push(q);
    out
}

/// Enumeration statement for every table of `schema`.
pub fn show_tables(schema: &str, quote: IdentifierQuote) -> String {
    format!("SHOW TABLES IN {}", quote_identifier(schema, quote))
}

/// Definition statement for one table.
pub fn show_create_table(schema: &str, table: &str, naming: TableNaming) -> String {
    let target = if naming.qualify {
        format!(
            "{}.{}",
            quote_identifier(schema, naming.quote),
            quote_identifier(table, naming.quote)
        )
    } else {
        quote_identifier(table, naming.quote)
    };
    format!("SHOW CREATE TABLE {}", target)
}

/// `schema.table` as written in the artifact header. Never quoted.
pub fn qualified_name(schema: &str, table: &str) -> String {
    format!("{}.{}", schema, table)
}
