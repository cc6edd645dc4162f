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

//! Configuration loading: a flat YAML (or JSON) file plus CLI overrides.

use crate::application::orchestrator::ExportSettings;
use crate::domain::entities::{AuthMode, ConnectionConfig, IdentifierQuote};
use crate::domain::errors::{ExportError, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable consulted when the config carries no password.
pub const PASSWORD_ENV: &str = "HIVE_PASSWORD";

/// Longest run budget accepted: one week.
pub const MAX_TIMEOUT_MINUTES: u64 = 7 * 24 * 60;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `kerberos`, `none` or `nosasl`. Anything else is warned about, not rejected.
    #[serde(default = "default_auth")]
    pub auth: String,
    #[serde(default)]
    pub username: String,
    pub password: Option<String>,
    /// The schema to export.
    pub database: String,

    #[serde(default = "default_catalog")]
    pub catalog: String,
    #[serde(default)]
    pub use_tls: bool,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_timeout_minutes")]
    pub timeout_minutes: u64,
    #[serde(default)]
    pub qualify_table_names: bool,
    /// Unset means the engine adapter's own dialect.
    #[serde(default)]
    pub identifier_quote: Option<IdentifierQuote>,
}

fn default_auth() -> String {
    "none".to_string()
}

fn default_catalog() -> String {
    "hive".to_string()
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_timeout_minutes() -> u64 {
    30
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file (YAML or JSON)
    #[arg(short, long, default_value = "config.yaml")]
    pub config: PathBuf,

    // Overrides for ad-hoc runs
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub database: Option<String>,
    #[arg(short, long)]
    pub output_dir: Option<String>,
    #[arg(long)]
    pub timeout_minutes: Option<u64>,

    /// Skip the startup banner
    #[arg(long)]
    pub no_banner: bool,
}

impl AppConfig {
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| {
            ExportError::ConfigError(format!("cannot open {}: {}", path.display(), e))
        })?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let config: AppConfig = if is_json {
            serde_json::from_str(&contents)
                .map_err(|e| ExportError::ConfigError(format!("{}: {}", path.display(), e)))?
        } else {
            serde_yaml::from_str(&contents)
                .map_err(|e| ExportError::ConfigError(format!("{}: {}", path.display(), e)))?
        };

        Ok(config)
    }

    pub fn merge_cli(&mut self, args: &CliArgs) {
        if let Some(h) = &args.host { self.host = h.clone(); }
        if let Some(p) = args.port { self.port = p; }
        if let Some(u) = &args.username { self.username = u.clone(); }
        if let Some(p) = &args.password { self.password = Some(p.clone()); }
        if let Some(d) = &args.database { self.database = d.clone(); }
        if let Some(o) = &args.output_dir { self.output_dir = o.clone(); }
        if let Some(t) = args.timeout_minutes { self.timeout_minutes = t; }
    }

    /// Structural checks only. The auth mode is deliberately not validated.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ExportError::ConfigError("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(ExportError::ConfigError("port must not be 0".into()));
        }
        if self.database.trim().is_empty() {
            return Err(ExportError::ConfigError("database must not be empty".into()));
        }
        if self.timeout_minutes == 0 {
            return Err(ExportError::ConfigError(
                "timeout_minutes must be at least 1".into(),
            ));
        }
        if self.timeout_minutes > MAX_TIMEOUT_MINUTES {
            return Err(ExportError::ConfigError(format!(
                "timeout_minutes must be at most {}",
                MAX_TIMEOUT_MINUTES
            )));
        }
        Ok(())
    }

    /// Password from the config, else from `HIVE_PASSWORD`, else empty.
    pub fn resolve_password(&self) -> String {
        self.password
            .clone()
            .filter(|p| !p.is_empty())
            .or_else(|| std::env::var(PASSWORD_ENV).ok())
            .unwrap_or_default()
    }

    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig {
            host: self.host.clone(),
            port: self.port,
            auth: AuthMode::parse(&self.auth),
            username: self.username.clone(),
            password: self.resolve_password(),
            schema: self.database.clone(),
            catalog: self.catalog.clone(),
            use_tls: self.use_tls,
        }
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            output_dir: PathBuf::from(&self.output_dir),
            timeout: Duration::from_secs(self.timeout_minutes.saturating_mul(60)),
            qualify_table_names: self.qualify_table_names,
            identifier_quote: self.identifier_quote,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::engine::http_engine::HttpQueryEngine;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_load_yaml_config() {
        let yaml = r#"
host: "hive.internal"
port: 10000
auth: "NONE"
username: "etl"
password: "secret"
database: "salesdb"
"#;
        let file = write_temp(".yaml", yaml);
        let config = AppConfig::from_file(file.path()).expect("Failed to parse config");

        assert_eq!(config.host, "hive.internal");
        assert_eq!(config.port, 10000);
        assert_eq!(config.database, "salesdb");
        assert_eq!(config.catalog, "hive");
        assert_eq!(config.timeout_minutes, 30);
        assert_eq!(config.identifier_quote, None);
        assert!(config.validate().is_ok());

        let conn = config.connection();
        assert_eq!(conn.auth, AuthMode::Plain);
        assert_eq!(conn.password, "secret");
        assert_eq!(conn.schema, "salesdb");
    }

    #[test]
    fn test_load_json_config_with_options() {
        let json = r#"{
            "host": "gw", "port": 8443, "auth": "kerberos", "database": "ods",
            "use_tls": true, "qualify_table_names": true, "identifier_quote": "double",
            "timeout_minutes": 5, "output_dir": "/tmp/ddl"
        }"#;
        let file = write_temp(".json", json);
        let config = AppConfig::from_file(file.path()).unwrap();

        let settings = config.export_settings();
        assert_eq!(settings.timeout, Duration::from_secs(300));
        assert_eq!(settings.output_dir, PathBuf::from("/tmp/ddl"));
        assert!(settings.qualify_table_names);
        assert_eq!(settings.identifier_quote, Some(IdentifierQuote::Double));
        assert!(config.connection().use_tls);
        assert_eq!(config.connection().auth, AuthMode::Kerberos);
    }

    #[test]
    fn test_unknown_auth_is_accepted() {
        let file = write_temp(
            ".yaml",
            "host: h\nport: 1\nauth: LDAP\ndatabase: d\n",
        );
        let config = AppConfig::from_file(file.path()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.connection().auth,
            AuthMode::Unknown("LDAP".to_string())
        );
    }

    #[test]
    fn test_missing_field_is_config_error() {
        let file = write_temp(".yaml", "host: h\nport: 1\n");
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ExportError::ConfigError(_))
        ));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = AppConfig::from_file(std::path::Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(ExportError::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_empty_database() {
        let file = write_temp(".yaml", "host: h\nport: 1\ndatabase: \"\"\n");
        let config = AppConfig::from_file(file.path()).unwrap();
        assert!(matches!(config.validate(), Err(ExportError::ConfigError(_))));
    }

    #[test]
    fn test_default_quoting_follows_the_engine() {
        let file = write_temp(".yaml", "host: h\nport: 1\ndatabase: d\n");
        let settings = AppConfig::from_file(file.path()).unwrap().export_settings();

        assert_eq!(settings.naming(&HttpQueryEngine).quote, IdentifierQuote::Double);
        assert!(!settings.naming(&HttpQueryEngine).qualify);
    }

    #[test]
    fn test_explicit_quoting_overrides_the_engine() {
        let file = write_temp(
            ".yaml",
            "host: h\nport: 1\ndatabase: d\nidentifier_quote: backtick\n",
        );
        let settings = AppConfig::from_file(file.path()).unwrap().export_settings();
        assert_eq!(settings.naming(&HttpQueryEngine).quote, IdentifierQuote::Backtick);
    }

    #[test]
    fn test_validate_bounds_timeout() {
        let file = write_temp(
            ".yaml",
            "host: h\nport: 1\ndatabase: d\ntimeout_minutes: 18446744073709551615\n",
        );
        let config = AppConfig::from_file(file.path()).unwrap();
        assert!(matches!(config.validate(), Err(ExportError::ConfigError(_))));
        // Still no overflow for callers that skip validation.
        assert_eq!(config.export_settings().timeout, Duration::from_secs(u64::MAX));

        let file = write_temp(".yaml", "host: h\nport: 1\ndatabase: d\ntimeout_minutes: 10080\n");
        assert!(AppConfig::from_file(file.path()).unwrap().validate().is_ok());
    }

    #[test]
    fn test_cli_overrides() {
        let file = write_temp(".yaml", "host: h\nport: 1\ndatabase: d\n");
        let mut config = AppConfig::from_file(file.path()).unwrap();
        let args = CliArgs::parse_from([
            "hive_ddl_exporter",
            "--host",
            "other",
            "--port",
            "10001",
            "--database",
            "salesdb",
            "--timeout-minutes",
            "10",
        ]);
        config.merge_cli(&args);

        assert_eq!(config.host, "other");
        assert_eq!(config.port, 10001);
        assert_eq!(config.database, "salesdb");
        assert_eq!(config.timeout_minutes, 10);
        assert_eq!(args.config, PathBuf::from("config.yaml"));
    }
}
