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

//! `ProgressReporter` that renders pipeline events through the `log` facade.

use crate::domain::entities::{AuthMode, ConnectionConfig, RunStage, RunSummary};
use crate::domain::errors::RunFailure;
use crate::ports::progress_reporter::ProgressReporter;
use log::{debug, error, info, warn};
use std::time::Duration;

#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn stage_changed(&self, stage: RunStage) {
        debug!("Stage: {}", stage);
    }

    fn connecting(&self, config: &ConnectionConfig) {
        info!("Connecting to {} ...", config.address());
        info!("Schema: {} (catalog {})", config.schema, config.catalog);
    }

    fn auth_mode(&self, mode: &AuthMode) {
        match mode {
            AuthMode::Unknown(raw) => warn!(
                "Unrecognised auth mode {:?} (expected kerberos, none or nosasl); connecting anyway",
                raw
            ),
            known => info!("Authentication: {}", known.describe().unwrap_or_default()),
        }
    }

    fn connected(&self, elapsed: Duration) {
        info!("Connected in {:.2?}", elapsed);
    }

    fn table_exported(&self, index: usize, qualified_name: &str) {
        info!("Exported table #{}: {}", index, qualified_name);
    }

    fn finished(&self, summary: &RunSummary) {
        info!("Exported {} table definitions", summary.processed);
        info!("DDL written to {}", summary.output_path.display());
    }

    fn aborted(&self, failure: &RunFailure) {
        error!("{}", failure);
    }
}
