//! Configuration management for Brandsheet services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - The legacy GOOGLE_* variables for the service account
//! - Default values

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

use crate::errors::{AppError, Result};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Backing spreadsheet configuration
    #[serde(default)]
    #[validate(nested)]
    pub sheets: SheetsConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Which backing store implementation the gateway talks to
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SheetsBackend {
    /// Google Sheets API v4
    Google,
    /// In-process store, contents lost on restart
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SheetsConfig {
    /// Backend implementation
    #[serde(default = "default_backend")]
    pub backend: SheetsBackend,

    /// Spreadsheet document id
    pub spreadsheet_id: Option<String>,

    /// Service account email
    pub client_email: Option<String>,

    /// Service account PEM private key (escaped `\n` allowed)
    pub private_key: Option<String>,

    /// 1-based row holding the column headers
    #[serde(default = "default_header_row")]
    #[validate(range(min = 1))]
    pub header_row: u32,

    /// Sheet written to when a write names none
    #[serde(default = "default_sheet")]
    #[validate(length(min = 1))]
    pub default_sheet: String,

    /// Sheets API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// OAuth token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri: String,

    /// Per-request timeout against the spreadsheet service, in seconds
    #[serde(default = "default_sheets_timeout")]
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_backend() -> SheetsBackend { SheetsBackend::Google }
fn default_header_row() -> u32 { crate::DEFAULT_HEADER_ROW }
fn default_sheet() -> String { crate::DEFAULT_SHEET.to_string() }
fn default_api_base() -> String { "https://sheets.googleapis.com/v4".to_string() }
fn default_token_uri() -> String { "https://oauth2.googleapis.com/token".to_string() }
fn default_sheets_timeout() -> u64 { 30 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "brandsheet".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            spreadsheet_id: None,
            client_email: None,
            private_key: None,
            header_row: default_header_row(),
            default_sheet: default_sheet(),
            api_base: default_api_base(),
            token_uri: default_token_uri(),
            timeout_secs: default_sheets_timeout(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            sheets: SheetsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__SHEETS__HEADER_ROW=2
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(config)
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(config)
    }

    fn finish(config: Config) -> Result<Self> {
        let mut loaded: AppConfig = config.try_deserialize()?;
        loaded.sheets.apply_legacy_env(|key| std::env::var(key).ok());
        loaded.validate().map_err(|e| AppError::Configuration {
            message: e.to_string(),
        })?;
        Ok(loaded)
    }
}

impl SheetsConfig {
    /// Fill unset credentials from GOOGLE_CLIENT_EMAIL, GOOGLE_PRIVATE_KEY
    /// and GOOGLE_SHEET_ID.
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.client_email.is_none() {
            self.client_email = lookup("GOOGLE_CLIENT_EMAIL");
        }
        if self.private_key.is_none() {
            self.private_key = lookup("GOOGLE_PRIVATE_KEY");
        }
        if self.spreadsheet_id.is_none() {
            self.spreadsheet_id = lookup("GOOGLE_SHEET_ID");
        }
    }

    /// Private key with escaped newlines turned into real ones
    pub fn normalized_private_key(&self) -> Option<String> {
        self.private_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .map(|key| key.replace("\\n", "\n"))
    }

    /// Get spreadsheet request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
