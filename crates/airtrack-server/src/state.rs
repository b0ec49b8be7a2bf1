//! Application state shared across handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use airtrack_core::{Config, PresenceTracker, TrackerError};
use tokio::sync::RwLock;

/// State handle cloned into every handler.
pub type SharedState = Arc<RwLock<AppState>>;

/// Configuration plus the tracker built from it.
#[derive(Debug)]
pub struct AppState {
    /// Active configuration.
    pub config: Config,

    /// Where configuration changes are saved.
    pub config_path: PathBuf,

    /// Tracker owning the last roster.
    pub tracker: Arc<PresenceTracker>,
}

impl AppState {
    /// Build state from an already loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker cannot be built from `config`.
    pub fn new(config: Config, config_path: PathBuf) -> Result<Self, TrackerError> {
        let tracker = Arc::new(PresenceTracker::from_config(&config)?);
        Ok(Self {
            config,
            config_path,
            tracker,
        })
    }

    /// Load configuration from `config_path` (defaults if missing) and build state.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn load(config_path: &Path) -> Result<Self, TrackerError> {
        let config = Config::load_or_default(config_path)?;
        Self::new(config, config_path.to_path_buf())
    }

    /// Wrap in the shared handle.
    #[must_use]
    pub fn into_shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }

    /// Validate `config`, save it, then make it active with a fresh tracker.
    ///
    /// The new tracker starts with an empty roster. Nothing changes in memory
    /// unless the file was written.
    ///
    /// # Errors
    ///
    /// Returns an error if validation, tracker construction or the write
    /// fails; the previous configuration and tracker stay active.
    pub fn commit_config(&mut self, config: Config) -> Result<(), TrackerError> {
        config.validate()?;
        let tracker = PresenceTracker::from_config(&config)?;
        config.save(&self.config_path)?;

        self.config = config;
        self.tracker = Arc::new(tracker);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let state = AppState::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(state.config, Config::default());
    }

    #[test]
    fn test_commit_config_rebuilds_tracker_and_saves() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut state = AppState::load(&path).unwrap();
        let before = Arc::clone(&state.tracker);

        let mut config = state.config.clone();
        config.presence.recency_window_secs = 45;
        state.commit_config(config).unwrap();

        assert!(!Arc::ptr_eq(&before, &state.tracker));
        assert_eq!(
            state.tracker.correlator().recency_window(),
            chrono::TimeDelta::seconds(45)
        );
        assert_eq!(Config::load(&path).unwrap().presence.recency_window_secs, 45);
    }

    #[test]
    fn test_commit_invalid_config_keeps_previous() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut state = AppState::load(&path).unwrap();

        let mut config = state.config.clone();
        config.distance.path_loss_exponent = -1.0;

        assert!(state.commit_config(config).is_err());
        assert_eq!(state.config, Config::default());
        assert!(!path.exists());
    }

    #[test]
    fn test_commit_unwritable_config_keeps_previous() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let mut state = AppState::new(Config::default(), blocker.join("config.toml")).unwrap();
        let before = Arc::clone(&state.tracker);

        let mut config = state.config.clone();
        config.presence.recency_window_secs = 99;
        let err = state.commit_config(config).unwrap_err();

        assert!(matches!(err, TrackerError::PersistenceError(_)));
        assert_eq!(state.config.presence.recency_window_secs, 15);
        assert!(Arc::ptr_eq(&before, &state.tracker));
    }
}
