use crate::error::Result;
use crate::models::SourceKind;
use crate::search::{SearchConfig, SearchMessages};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Environment variable naming an optional configuration file
pub const CONFIG_PATH_ENV: &str = "TYPEAHEAD_CONFIG";

/// Prefix of environment overrides (`TYPEAHEAD__SECTION__KEY`)
pub const ENV_PREFIX: &str = "TYPEAHEAD";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Config {
    /// Engine behavior
    #[serde(default)]
    #[validate(nested)]
    pub search: SearchConfig,

    /// Backend collections
    #[serde(default)]
    #[validate(nested)]
    pub sources: SourcesConfig,

    /// Localized user-facing strings
    #[serde(default)]
    pub messages: SearchMessages,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from embedded defaults, the file named by
    /// `TYPEAHEAD_CONFIG` (if any) and the environment
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load_from(Some(Path::new(&path))),
            Err(_) => Self::load_from(None),
        }
    }

    /// Load configuration, layering an explicit file over the embedded defaults
    ///
    /// Environment overrides are applied last. The result is validated.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ));

        // Override with config file if given
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config: Config = builder
            // Override with environment variables (prefix: TYPEAHEAD__)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }
}

/// Backend collection endpoints
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SourcesConfig {
    /// Base URL shared by every collection
    #[serde(default = "default_base_url")]
    #[validate(url)]
    pub base_url: String,

    /// Path of the reports query
    #[serde(default = "default_reports_path")]
    pub reports_path: String,

    /// Path of the individuals query
    #[serde(default = "default_individuals_path")]
    pub individuals_path: String,

    /// Path of the organizations query
    #[serde(default = "default_organizations_path")]
    pub organizations_path: String,

    /// HTTP client timeout (seconds)
    #[serde(default = "default_timeout")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,
}

impl SourcesConfig {
    /// Query path for a collection
    pub fn path_for(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::Report => &self.reports_path,
            SourceKind::Individual => &self.individuals_path,
            SourceKind::Organization => &self.organizations_path,
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            reports_path: default_reports_path(),
            individuals_path: default_individuals_path(),
            organizations_path: default_organizations_path(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            json_logs: false,
            prometheus_enabled: true,
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_reports_path() -> String {
    "/reports".to_string()
}

fn default_individuals_path() -> String {
    "/individuals".to_string()
}

fn default_organizations_path() -> String {
    "/organizations".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_log_filter() -> String {
    "incident_typeahead=info".to_string()
}

fn default_true() -> bool {
    true
}
