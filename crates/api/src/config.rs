use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use domain::services::UptimeSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub catalog: CatalogConfig,
    pub uptime: UptimeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Where the plan/region/gateway catalog lives.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Path to the catalog JSON document
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

/// Gateway uptime tracking settings.
#[derive(Debug, Clone, Deserialize)]
pub struct UptimeConfig {
    /// Hard bound on a single gateway probe
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// How long a probe result stays fresh
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Whether the background refresh job runs
    #[serde(default = "default_refresh_enabled")]
    pub refresh_enabled: bool,

    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl UptimeConfig {
    pub fn settings(&self) -> UptimeSettings {
        UptimeSettings {
            probe_timeout: Duration::from_millis(self.probe_timeout_ms),
            ttl: Duration::from_secs(self.ttl_secs),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_catalog_path() -> String {
    "config/catalog.json".to_string()
}
fn default_probe_timeout_ms() -> u64 {
    1500
}
fn default_ttl_secs() -> u64 {
    600
}
fn default_refresh_enabled() -> bool {
    true
}
fn default_refresh_interval_secs() -> u64 {
    300
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with EC__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("EC").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds from embedded defaults so tests never touch config files.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            request_timeout_secs = 30

            [logging]
            level = "debug"
            format = "pretty"

            [catalog]
            path = "config/catalog.json"

            [uptime]
            probe_timeout_ms = 1500
            ttl_secs = 600
            refresh_enabled = false
            refresh_interval_secs = 300
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation so tests can build partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.catalog.path.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "EC__CATALOG__PATH must point to the catalog file".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.uptime.probe_timeout_ms == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "uptime.probe_timeout_ms must be positive".to_string(),
            ));
        }

        if self.uptime.ttl_secs == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "uptime.ttl_secs must be positive".to_string(),
            ));
        }

        if self.uptime.refresh_enabled && self.uptime.refresh_interval_secs == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "uptime.refresh_interval_secs must be positive when refresh is enabled"
                    .to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| {
                ConfigValidationError::InvalidValue(format!("Invalid socket address: {}", e))
            })
    }
}
