//! Application state
//!
//! Shared state across all handlers.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use lead_portal_config::{load_settings, ScoringConfig, Settings};
use lead_portal_store::{InMemorySheet, LeadStore, SheetClient};

use crate::session::SessionManager;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration wrapped in RwLock for hot-reload support
    pub config: Arc<RwLock<Settings>>,
    /// Scoring rule table, hot-reloadable alongside the settings
    pub scoring: Arc<RwLock<ScoringConfig>>,
    /// Lead store over the backing sheet
    pub store: LeadStore,
    /// Session manager
    pub sessions: Arc<SessionManager>,
    /// Environment name for config reload
    env: Option<String>,
}

impl AppState {
    /// Create state with the in-process sheet backend.
    pub fn new(config: Settings) -> Self {
        Self::with_sheet(config, Arc::new(InMemorySheet::new()))
    }

    /// Create state over an explicit backing sheet.
    pub fn with_sheet(config: Settings, sheet: Arc<dyn SheetClient>) -> Self {
        let scoring = load_scoring(&config);
        let ttl = Duration::from_secs(config.server.session_ttl_seconds);
        Self {
            config: Arc::new(RwLock::new(config)),
            scoring: Arc::new(RwLock::new(scoring)),
            store: LeadStore::new(sheet),
            sessions: Arc::new(SessionManager::new(ttl)),
            env: None,
        }
    }

    /// Attach the environment name so reloads re-read the same files.
    pub fn with_env(mut self, env: Option<String>) -> Self {
        self.env = env;
        self
    }

    /// Reload settings and scoring rules from disk.
    pub fn reload_config(&self) -> Result<(), String> {
        let new_config = load_settings(self.env.as_deref())
            .map_err(|e| format!("Failed to reload config: {}", e))?;

        let new_scoring = load_scoring(&new_config);
        *self.scoring.write() = new_scoring;
        *self.config.write() = new_config;

        tracing::info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Get a read guard to the current configuration
    pub fn get_config(&self) -> parking_lot::RwLockReadGuard<'_, Settings> {
        self.config.read()
    }

    /// Snapshot of the current scoring rules.
    pub fn scoring_rules(&self) -> ScoringConfig {
        self.scoring.read().clone()
    }
}

/// Load the scoring rule table named in the settings, or fall back to the
/// built-in defaults.
fn load_scoring(config: &Settings) -> ScoringConfig {
    match &config.scoring_rules_path {
        Some(path) => match ScoringConfig::load(path) {
            Ok(rules) => {
                tracing::info!(path = %path, "Loaded scoring rules");
                rules
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Falling back to default scoring rules");
                ScoringConfig::default()
            }
        },
        None => ScoringConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_defaults() {
        let state = AppState::new(Settings::default());
        assert_eq!(state.sessions.count(), 0);
        assert_eq!(state.scoring_rules().bands.high, 70);
    }
}
