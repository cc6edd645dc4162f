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

//! # Progress Reporter Port
//!
//! The pipeline never logs on its own. It tells a `ProgressReporter` what is
//! happening and the reporter decides how (or whether) to show it.

use crate::domain::entities::{AuthMode, ConnectionConfig, RunStage, RunSummary};
use crate::domain::errors::RunFailure;
use std::time::Duration;

pub trait ProgressReporter: Send + Sync {
    /// Called on every state machine transition.
    fn stage_changed(&self, stage: RunStage);

    /// Called once, before the session is opened.
    fn connecting(&self, config: &ConnectionConfig);

    /// Auth mode as configured. `AuthMode::Unknown` should be surfaced as a warning.
    fn auth_mode(&self, mode: &AuthMode);

    fn connected(&self, elapsed: Duration);

    /// `index` is 1-based.
    fn table_exported(&self, index: usize, qualified_name: &str);

    fn finished(&self, summary: &RunSummary);

    fn aborted(&self, failure: &RunFailure);
}
