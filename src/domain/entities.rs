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

//! # Domain Entities
//!
//! The "Nouns" of the exporter: how we connect, which stage the run is in,
//! what a table definition looks like once fetched, and what we report at the
//! end.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Table names travel through the pipeline exactly as the server returned them.
pub type TableName = String;

/// How the operator says the engine authenticates.
///
/// This is descriptive only. The session negotiates on its own, so an
/// unrecognised value is reported but never blocks the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// SASL with Kerberos.
    Kerberos,
    /// Plain SASL, configured as `none`.
    Plain,
    /// No SASL layer at all, configured as `nosasl` or `no-sasl`.
    NoSasl,
    /// Anything else, kept verbatim for the warning.
    Unknown(String),
}

impl AuthMode {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "kerberos" => AuthMode::Kerberos,
            "none" => AuthMode::Plain,
            "nosasl" | "no-sasl" => AuthMode::NoSasl,
            _ => AuthMode::Unknown(raw.to_string()),
        }
    }

    /// Human readable label, `None` when the mode was not recognised.
    pub fn describe(&self) -> Option<&'static str> {
        match self {
            AuthMode::Kerberos => Some("SASL Kerberos"),
            AuthMode::Plain => Some("Plain SASL"),
            AuthMode::NoSasl => Some("No SASL"),
            AuthMode::Unknown(_) => None,
        }
    }
}

/// Everything needed to open a session. Immutable once built from the config.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub auth: AuthMode,
    pub username: String,
    pub password: String,
    /// The schema (Hive database) being exported.
    pub schema: String,
    /// Catalog the gateway resolves the schema in.
    pub catalog: String,
    pub use_tls: bool,
}

impl ConnectionConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// How identifiers are quoted in generated statements.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierQuote {
    /// HiveQL style: `` `name` ``
    #[default]
    Backtick,
    /// ANSI style: `"name"`
    Double,
}

/// Controls how the definition statement names its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableNaming {
    /// Prefix the table with the schema instead of relying on the session default.
    pub qualify: bool,
    pub quote: IdentifierQuote,
}

/// Where the pipeline currently is. `Aborted` is reachable from every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Idle,
    Connecting,
    /// Creating the dated script on disk.
    Opening,
    Enumerating,
    Fetching,
    Writing,
    Done,
    Aborted,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStage::Idle => write!(f, "idle"),
            RunStage::Connecting => write!(f, "connecting"),
            RunStage::Opening => write!(f, "opening output file"),
            RunStage::Enumerating => write!(f, "enumerating tables"),
            RunStage::Fetching => write!(f, "fetching definition"),
            RunStage::Writing => write!(f, "writing record"),
            RunStage::Done => write!(f, "done"),
            RunStage::Aborted => write!(f, "aborted"),
        }
    }
}

/// One table's DDL, lines joined with `\n` in the order the server sent them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DefinitionText {
    text: String,
    lines: usize,
}

impl DefinitionText {
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut text = String::new();
        let mut count = 0;
        for line in lines {
            if count > 0 {
                text.push('\n');
            }
            text.push_str(&line);
            count += 1;
        }
        Self { text, lines: count }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.lines
    }
}

impl fmt::Display for DefinitionText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Reported once the run reaches `Done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub output_path: PathBuf,
}
