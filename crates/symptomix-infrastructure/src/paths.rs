//! Path management for symptomix configuration files.
//!
//! Paths follow the platform conventions reported by the `dirs` crate
//! (XDG on Linux, `Application Support` on macOS, `AppData` on Windows).

use std::path::PathBuf;

const APP_DIR: &str = "symptomix";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Path management for symptomix.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/symptomix/         # Config directory
/// ├── config.toml              # Client configuration
/// └── logs/                    # REPL logs
///     └── symptomix.log.YYYY-MM-DD
/// ```
pub struct SymptomixPaths;

impl SymptomixPaths {
    /// Returns the symptomix configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/symptomix/`)
    /// - `Err(PathError::ConfigDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the logs directory.
    pub fn logs_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file() {
        let Ok(config_dir) = SymptomixPaths::config_dir() else {
            // No home directory in this environment
            return;
        };
        assert!(config_dir.ends_with(APP_DIR));

        let config_file = SymptomixPaths::config_file().unwrap();
        assert!(config_file.ends_with("config.toml"));
        assert!(config_file.starts_with(&config_dir));
    }

    #[test]
    fn test_logs_dir() {
        let Ok(config_dir) = SymptomixPaths::config_dir() else {
            return;
        };
        let logs_dir = SymptomixPaths::logs_dir().unwrap();
        assert!(logs_dir.ends_with("logs"));
        assert!(logs_dir.starts_with(&config_dir));
    }
}
