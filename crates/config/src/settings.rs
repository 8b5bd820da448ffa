//! Main settings module

use std::collections::HashMap;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Runtime environment enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Representative / admin credential roster
    #[serde(default)]
    pub auth: AuthConfig,

    /// Backing sheet configuration
    #[serde(default)]
    pub sheet: SheetConfig,

    /// Optional path to a scoring rule file (YAML). When unset, the built-in
    /// defaults in `ScoringConfig` apply.
    #[serde(default)]
    pub scoring_rules_path: Option<String>,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Idle session lifetime in seconds; expired sessions are rejected
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_session_ttl() -> u64 {
    8 * 60 * 60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: default_true(),
            cors_origins: Vec::new(),
            session_ttl_seconds: default_session_ttl(),
        }
    }
}

/// Credential roster for representatives and the admin unlock.
///
/// This is a fixed, out-of-band identity mapping; the portal only consumes
/// an already-authenticated identity string once a session exists.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Admin unlock password. Empty disables the admin panel.
    #[serde(default)]
    pub admin_password: String,

    /// Representative name -> password
    #[serde(default)]
    pub reps: HashMap<String, String>,
}

impl AuthConfig {
    /// Check a representative credential pair.
    pub fn rep_password_matches(&self, name: &str, password: &str) -> bool {
        self.reps.get(name).map(String::as_str) == Some(password)
    }

    pub fn admin_password_matches(&self, password: &str) -> bool {
        !self.admin_password.is_empty() && self.admin_password == password
    }
}

/// Backing sheet configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Worksheet name inside the shared spreadsheet
    #[serde(default = "default_worksheet")]
    pub worksheet: String,
}

fn default_worksheet() -> String {
    "leads_master".to_string()
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            worksheet: default_worksheet(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level for the env filter default (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.server.session_ttl_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.session_ttl_seconds".to_string(),
                message: "Session TTL must be at least 1 second".to_string(),
            });
        }

        if self.sheet.worksheet.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "sheet.worksheet".to_string(),
                message: "Worksheet name cannot be empty".to_string(),
            });
        }

        // Credentials must be supplied in production; defaults ship empty.
        if self.environment.is_production() {
            if self.auth.reps.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "auth.reps".to_string(),
                    message: "At least one representative must be configured in production"
                        .to_string(),
                });
            }
            if self.auth.admin_password.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "auth.admin_password".to_string(),
                    message: "Admin password must be set in production".to_string(),
                });
            }
        }

        if self.server.cors_enabled
            && self.environment.is_production()
            && self.server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 This may block legitimate requests."
            );
        }

        Ok(())
    }
}

/// Load settings from files and environment.
/// Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("LEAD_PORTAL")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
