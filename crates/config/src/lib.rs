//! Configuration for the lead portal
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default`, then `config/{env}`)
//! - Environment variables (`LEAD_PORTAL__` prefix, `__` separator)
//!
//! Scoring weights live in their own rule table ([`ScoringConfig`]) so that
//! scoring changes are configuration edits, not code forks. The table ships
//! with defaults and can be overridden from a YAML file.

pub mod scoring;
pub mod settings;

pub use scoring::{
    BandThresholds, ConversationScores, KeywordRule, ScoringConfig, TimelineRule,
};
pub use settings::{
    load_settings, AuthConfig, RuntimeEnvironment, ServerConfig, Settings, SheetConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
