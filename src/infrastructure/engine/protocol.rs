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

//! Wire models of the paginated HTTP statement protocol.
//!
//! A statement is POSTed once; every response page may carry rows in `data`
//! and a `nextUri` to poll for the rest. The stream ends when a page has no
//! `nextUri`. Failures arrive as an `error` object on any page.

use crate::domain::errors::{ExportError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// One page of a statement's results.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResults {
    pub id: String,
    #[serde(default)]
    pub next_uri: Option<String>,
    #[serde(default)]
    pub columns: Option<Vec<Column>>,
    #[serde(default)]
    pub data: Option<Vec<Vec<Value>>>,
    #[serde(default)]
    pub stats: Option<StatementStats>,
    #[serde(default)]
    pub error: Option<QueryFailure>,
}

impl QueryResults {
    pub fn state(&self) -> &str {
        self.stats.as_ref().map(|s| s.state.as_str()).unwrap_or("UNKNOWN")
    }
}

#[derive(Debug, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Deserialize)]
pub struct StatementStats {
    pub state: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFailure {
    pub message: String,
    #[serde(default)]
    pub error_name: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

impl fmt::Display for QueryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.error_name, self.error_code) {
            (Some(name), Some(code)) => write!(f, "{} ({} {})", self.message, name, code),
            (Some(name), None) => write!(f, "{} ({})", self.message, name),
            _ => f.write_str(&self.message),
        }
    }
}

/// Response of `GET /v1/info`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    #[serde(default)]
    pub node_version: Option<NodeVersion>,
    #[serde(default)]
    pub starting: bool,
}

#[derive(Debug, Deserialize)]
pub struct NodeVersion {
    pub version: String,
}

/// Decodes the first column of a row as a string.
pub fn decode_string_column(row: &[Value]) -> Result<String> {
    match row.first() {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) => Err(ExportError::FetchError(
            "NULL value in string column".to_string(),
        )),
        Some(other) => Err(ExportError::FetchError(format!(
            "expected a string column, got {}",
            other
        ))),
        None => Err(ExportError::FetchError("row has no columns".to_string())),
    }
}
