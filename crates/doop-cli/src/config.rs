//! Configuration file discovery for the CLI
//!
//! Search order:
//! 1. Explicit `--config` path
//! 2. Local project file `doop/config.toml`
//! 3. Platform-specific config directory
//! 4. Built-in defaults

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use doop::{DoopError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for DoopError {
    fn from(err: ConfigError) -> Self {
        DoopError::Config(err.to_string())
    }
}

/// Find and load the configuration.
///
/// # Errors
///
/// Fails if an explicit path does not exist, or if the selected file
/// cannot be read or parsed. A missing implicit file is not an error.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, DoopError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("doop/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    match ProjectDirs::from("com", "doop", "doop") {
        Some(proj_dirs) => {
            let system_config = proj_dirs.config_dir().join("config.toml");
            if system_config.exists() {
                info!(path = system_config.display().to_string(); "Loading configuration from system path");
                return load_config_file(system_config);
            }
            debug!(path = system_config.display().to_string(); "System configuration file not found");
        }
        None => debug!("Could not determine platform-specific config directory"),
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, DoopError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    debug!(config:?; "Loaded configuration");
    Ok(config)
}
