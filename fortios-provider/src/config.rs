//! Provider configuration
//!
//! Loaded from a JSON file and overridden by environment variables:
//!
//! | variable                  | field      |
//! |---------------------------|------------|
//! | `FORTIOS_ACCESS_HOSTNAME` | `hostname` |
//! | `FORTIOS_ACCESS_TOKEN`    | `token`    |
//! | `FORTIOS_INSECURE`        | `insecure` |
//! | `FORTIOS_VDOM`            | `vdom`     |
//! | `FORTIOS_RETRIES`         | `retries`  |

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Missing required setting '{0}'")]
    Missing(&'static str),

    #[error("Invalid value '{value}' for {name}")]
    InvalidValue { name: &'static str, value: String },
}

/// Connection settings for a FortiGate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Host (and optional port) of the FortiGate management interface.
    /// HTTPS unless a scheme is given (`http://10.0.0.1:8080`).
    pub hostname: String,
    /// REST API administrator token
    pub token: String,
    /// Skip TLS certificate verification
    pub insecure: bool,
    /// Default virtual domain for every call
    pub vdom: Option<String>,
    /// Retry count for transport failures
    pub retries: u32,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            token: String::new(),
            insecure: false,
            vdom: None,
            retries: 1,
            timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    /// Load from a JSON file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply overrides from a variable lookup (the process environment in `load`)
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(hostname) = lookup("FORTIOS_ACCESS_HOSTNAME") {
            self.hostname = hostname;
        }
        if let Some(token) = lookup("FORTIOS_ACCESS_TOKEN") {
            self.token = token;
        }
        if let Some(insecure) = lookup("FORTIOS_INSECURE") {
            self.insecure = match insecure.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "FORTIOS_INSECURE",
                        value: insecure,
                    });
                }
            };
        }
        if let Some(vdom) = lookup("FORTIOS_VDOM") {
            self.vdom = Some(vdom).filter(|v| !v.is_empty());
        }
        if let Some(retries) = lookup("FORTIOS_RETRIES") {
            self.retries = retries.parse().map_err(|_| ConfigError::InvalidValue {
                name: "FORTIOS_RETRIES",
                value: retries,
            })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hostname.is_empty() {
            return Err(ConfigError::Missing("hostname"));
        }
        if self.token.is_empty() {
            return Err(ConfigError::Missing("token"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn file_values_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"hostname": "192.168.1.99", "token": "abc"}}"#).unwrap();

        let config = ProviderConfig::from_file(file.path()).unwrap();
        assert_eq!(config.hostname, "192.168.1.99");
        assert_eq!(config.retries, 1);
        assert!(!config.insecure);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn environment_overrides_file() {
        let config = ProviderConfig {
            hostname: "fgt.local".to_string(),
            ..Default::default()
        }
        .with_overrides(env(&[
            ("FORTIOS_ACCESS_TOKEN", "t0k3n"),
            ("FORTIOS_INSECURE", "true"),
            ("FORTIOS_VDOM", "customer1"),
            ("FORTIOS_RETRIES", "3"),
        ]))
        .unwrap();

        assert_eq!(config.hostname, "fgt.local");
        assert_eq!(config.token, "t0k3n");
        assert!(config.insecure);
        assert_eq!(config.vdom.as_deref(), Some("customer1"));
        assert_eq!(config.retries, 3);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let result =
            ProviderConfig::default().with_overrides(env(&[("FORTIOS_RETRIES", "many")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: "FORTIOS_RETRIES",
                ..
            })
        ));
    }

    #[test]
    fn hostname_and_token_are_required() {
        let config = ProviderConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("hostname"))
        ));

        let config = ProviderConfig {
            hostname: "fgt".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Missing("token"))));
    }

    #[test]
    fn malformed_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        match ProviderConfig::from_file(file.path()) {
            Err(ConfigError::Parse { path, .. }) => {
                assert_eq!(path, file.path().display().to_string())
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }
}
