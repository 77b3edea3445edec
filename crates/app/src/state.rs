//! Application state management

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use sortpot_core::{Database, SessionController};
use thiserror::Error;

use crate::config::{AppConfig, ConfigError};

const DB_FILE: &str = "sortpot.db";

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Could not determine the platform directories")]
    NoProjectDirs,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] sortpot_core::Error),
}

/// Platform directories for config and data
pub fn project_dirs() -> Result<ProjectDirs, StartupError> {
    ProjectDirs::from("dev", "sortpot", "sortpot").ok_or(StartupError::NoProjectDirs)
}

/// Main application state
pub struct AppState {
    pub config: AppConfig,
    pub controller: SessionController<Database>,
    data_dir: PathBuf,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, StartupError> {
        let data_dir = match &config.data_dir {
            Some(dir) => dir.clone(),
            None => project_dirs()?.data_dir().to_path_buf(),
        };
        Self::open(config, data_dir)
    }

    /// Open the database under `data_dir`, creating the directory if needed
    pub fn open(config: AppConfig, data_dir: PathBuf) -> Result<Self, StartupError> {
        std::fs::create_dir_all(&data_dir)?;
        let db = Database::open(data_dir.join(DB_FILE))?;
        tracing::info!(path = %data_dir.display(), "Data directory ready");

        let mut controller = SessionController::new(db);
        controller.seed_group_size(config.default_group_size);

        Ok(Self {
            config,
            controller,
            data_dir,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested").join("data");
        let mut state = AppState::open(AppConfig::default(), data_dir.clone()).unwrap();
        assert!(data_dir.join(DB_FILE).exists());

        state
            .controller
            .save_classroom(None, "1r", "Nora")
            .unwrap();
        drop(state);

        let state = AppState::open(AppConfig::default(), data_dir).unwrap();
        assert_eq!(state.controller.document().classrooms.len(), 1);
    }

    #[test]
    fn test_config_seeds_group_size_of_new_install() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            default_group_size: 5,
            ..AppConfig::default()
        };
        let state = AppState::open(config, dir.path().to_path_buf()).unwrap();
        assert_eq!(state.controller.default_group_size(), 5);
    }
}
