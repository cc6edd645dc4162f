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

//! Writes the exported definitions to a local `.sql` script.
//!
//! Every record goes to disk in a single write followed by a sync, so a crash
//! mid-run leaves only complete records behind.

use crate::domain::entities::DefinitionText;
use crate::domain::errors::Result;
use chrono::NaiveDate;
use log::warn;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// `<schema>_<YYYYMMDD>.sql` inside `output_dir`.
pub fn script_path(output_dir: &Path, schema: &str, date: NaiveDate) -> PathBuf {
    output_dir.join(format!("{}_{}.sql", schema, date.format("%Y%m%d")))
}

/// Blank line, comment header, body, terminator, blank separator.
pub fn format_record(qualified_name: &str, definition: &DefinitionText) -> String {
    format!("\n-- {}\n{};\n\n", qualified_name, definition)
}

pub struct SqlScriptWriter {
    path: PathBuf,
    file: Option<File>,
    records: usize,
}

impl SqlScriptWriter {
    /// Creates (or truncates) the script. Called once per run.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            records: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended so far.
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn append(&mut self, qualified_name: &str, definition: &DefinitionText) -> Result<()> {
        let file = self.file.as_mut().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("{} is already closed", self.path.display()),
            )
        })?;
        let record = format_record(qualified_name, definition);
        file.write_all(record.as_bytes())?;
        file.sync_data()?;
        self.records += 1;
        Ok(())
    }

    /// Flushes and releases the file. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            file.sync_all()?;
        }
        Ok(())
    }
}

impl Drop for SqlScriptWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close {}: {}", self.path.display(), e);
        }
    }
}
