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

//! # Hive DDL Exporter
//!
//! Connects to a Hive-compatible SQL gateway, lists every table of one
//! schema, and writes each table's `SHOW CREATE TABLE` output into a single
//! dated script, `<schema>_<YYYYMMDD>.sql`.
//!
//! This application follows the **Hexagonal Architecture** (Ports and Adapters)
//! to keep the extraction pipeline independent of the engine transport.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;

use crate::application::orchestrator::Orchestrator;
use crate::config::{AppConfig, CliArgs};
use crate::infrastructure::engine::http_engine::HttpQueryEngine;
use crate::infrastructure::reporting::log_reporter::LogReporter;
use clap::Parser;
use log::{error, info};
use std::process;
use std::sync::Arc;

const BANNER: &str = r"
  _     _                  _     _ _
 | |__ (_)_   _____    __| | __| | |
 | '_ \| \ \ / / _ \  / _` |/ _` | |
 | | | | |\ V /  __/ | (_| | (_| | |
 |_| |_|_| \_/ \___|  \__,_|\__,_|_|
";

fn main() {
    // 1. Initialize Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Parse Arguments
    let args = CliArgs::parse();
    if !args.no_banner {
        println!("{}  v{}\n", BANNER, env!("CARGO_PKG_VERSION"));
    }

    // 3. Load Config
    let config_path = std::path::absolute(&args.config).unwrap_or_else(|_| args.config.clone());
    info!("Loading configuration from {}", config_path.display());
    let mut config = match AppConfig::from_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {}", e);
            process::exit(1);
        }
    };

    // Merge CLI overrides
    config.merge_cli(&args);

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        process::exit(1);
    }

    // 4. Wire ports to adapters
    let orchestrator = Orchestrator::new(
        Arc::new(HttpQueryEngine),
        Arc::new(LogReporter),
        config.connection(),
        config.export_settings(),
    );

    // 5. Run
    info!("Starting DDL export of schema {}", config.database);
    if orchestrator.run().is_err() {
        // The reporter already logged the failure with its stage and table.
        process::exit(1);
    }
}
