//! Configuration service implementation.
//!
//! Resolves the client configuration from, in increasing priority:
//! built-in defaults, `config.toml`, and `SYMPTOMIX_*` environment variables.
//! Command-line flags are layered on top by the binary.

use std::path::{Path, PathBuf};

use symptomix_core::{ClientConfig, InFlightPolicy, Result, SymptomixError};

use crate::paths::SymptomixPaths;

pub const ENV_ENDPOINT: &str = "SYMPTOMIX_ENDPOINT";
pub const ENV_SESSION_ID: &str = "SYMPTOMIX_SESSION_ID";
pub const ENV_TIMEOUT_SECS: &str = "SYMPTOMIX_TIMEOUT_SECS";
pub const ENV_IN_FLIGHT_POLICY: &str = "SYMPTOMIX_IN_FLIGHT_POLICY";

/// Loads [`ClientConfig`] from disk and the environment.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    /// Whether the path was given explicitly (a missing explicit file is an error).
    explicit: bool,
}

impl ConfigService {
    /// Uses the default `config.toml` location, if one can be determined.
    pub fn new() -> Self {
        let path = match SymptomixPaths::config_file() {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::warn!(error = %err, "no config directory, using defaults");
                None
            }
        };
        Self {
            path,
            explicit: false,
        }
    }

    /// Uses an explicit config file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            explicit: true,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads the file and applies overrides from the process environment.
    pub fn load(&self) -> Result<ClientConfig> {
        self.load_with(|key| std::env::var(key).ok())
    }

    /// Loads the file and applies overrides read through `lookup`.
    pub fn load_with<F>(&self, lookup: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.load_file()?;
        apply_env_overrides(&mut config, lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn load_file(&self) -> Result<ClientConfig> {
        let Some(path) = &self.path else {
            return Ok(ClientConfig::default());
        };

        if !path.exists() {
            if self.explicit {
                return Err(SymptomixError::config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(ClientConfig::default());
        }

        let content = std::fs::read_to_string(path)?;
        ClientConfig::from_toml_str(&content).map_err(|err| {
            SymptomixError::config(format!("invalid config file {}: {err}", path.display()))
        })
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies `SYMPTOMIX_*` overrides found through `lookup`.
///
/// Empty values are treated as unset.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(endpoint) = get(ENV_ENDPOINT) {
        config.endpoint = endpoint.trim().to_string();
    }
    if let Some(session_id) = get(ENV_SESSION_ID) {
        config.session_id = Some(session_id.trim().to_string());
    }
    if let Some(timeout) = get(ENV_TIMEOUT_SECS) {
        let seconds = timeout.trim().parse::<u64>().map_err(|_| {
            SymptomixError::config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{timeout}'"))
        })?;
        config.request_timeout_secs = Some(seconds);
    }
    if let Some(policy) = get(ENV_IN_FLIGHT_POLICY) {
        config.in_flight_policy = InFlightPolicy::parse(&policy)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_default_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService {
            path: Some(temp_dir.path().join("config.toml")),
            explicit: false,
        };

        let config = service.load_with(no_env).expect("Should fall back to defaults");
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("nope.toml"));

        let err = service.load_with(no_env).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_loads_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "endpoint = \"https://symptomix.example.org\"\nin_flight_policy = \"reject\"\n",
        )
        .unwrap();

        let config = ConfigService::with_path(&config_path)
            .load_with(no_env)
            .unwrap();
        assert_eq!(config.endpoint, "https://symptomix.example.org");
        assert_eq!(config.in_flight_policy, InFlightPolicy::Reject);
        assert_eq!(config.session_id, None);
    }

    #[test]
    fn test_invalid_file_is_a_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "endpoint = [").unwrap();

        let err = ConfigService::with_path(&config_path)
            .load_with(no_env)
            .unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "endpoint = \"http://file-host:8080\"\n").unwrap();

        let config = ConfigService::with_path(&config_path)
            .load_with(env_from(&[
                (ENV_ENDPOINT, "http://env-host:9000"),
                (ENV_SESSION_ID, "user123"),
                (ENV_TIMEOUT_SECS, "15"),
                (ENV_IN_FLIGHT_POLICY, "REJECT"),
            ]))
            .unwrap();

        assert_eq!(config.endpoint, "http://env-host:9000");
        assert_eq!(config.session_id.as_deref(), Some("user123"));
        assert_eq!(config.request_timeout_secs, Some(15));
        assert_eq!(config.in_flight_policy, InFlightPolicy::Reject);
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut config = ClientConfig::default();
        apply_env_overrides(&mut config, env_from(&[(ENV_ENDPOINT, "  ")])).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_bad_env_values_are_rejected() {
        let mut config = ClientConfig::default();
        let err =
            apply_env_overrides(&mut config, env_from(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(err.is_config());

        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService {
            path: Some(temp_dir.path().join("config.toml")),
            explicit: false,
        };
        let err = service
            .load_with(env_from(&[(ENV_ENDPOINT, "not-a-url")]))
            .unwrap_err();
        assert!(err.is_config());
    }
}
