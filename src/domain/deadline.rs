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

//! Run-wide deadline.
//!
//! One `Deadline` is created when the pipeline starts and passed by reference
//! into every blocking call. There is no finer per-call timeout: each call gets
//! whatever budget is left.

use crate::domain::errors::{ExportError, Result};
use std::time::{Duration, Instant};

/// Budgets beyond this are clamped so the cutoff stays representable.
const MAX_BUDGET: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// A single wall-clock cutoff shared by every operation of one run.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    /// Starts the clock now.
    pub fn after(budget: Duration) -> Self {
        Self {
            expires_at: Instant::now() + budget.min(MAX_BUDGET),
        }
    }

    pub fn at(expires_at: Instant) -> Self {
        Self { expires_at }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Budget left for `operation`, or `DeadlineExceeded` if none is.
    pub fn remaining(&self, operation: &str) -> Result<Duration> {
        let left = self.expires_at.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(self.exceeded(operation));
        }
        Ok(left)
    }

    /// Fails once the deadline has passed.
    pub fn check(&self, operation: &str) -> Result<()> {
        self.remaining(operation).map(|_| ())
    }

    pub fn exceeded(&self, operation: &str) -> ExportError {
        ExportError::DeadlineExceeded(operation.to_string())
    }
}
