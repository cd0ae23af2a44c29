//! Configuration schema types
//!
//! This module defines the configuration structure of the registry.

use crate::adapters::store::PACIENTES_COLLECTION;
use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendTarget {
    /// In-process store and local session
    #[default]
    Memory,
    /// Firebase Identity Toolkit and Cloud Firestore
    Firebase,
}

impl fmt::Display for BackendTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendTarget::Memory => write!(f, "memory"),
            BackendTarget::Firebase => write!(f, "firebase"),
        }
    }
}

impl FromStr for BackendTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(BackendTarget::Memory),
            "firebase" => Ok(BackendTarget::Firebase),
            other => Err(format!(
                "Invalid backend target '{other}'. Must be one of: memory, firebase"
            )),
        }
    }
}

/// Main registry configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegistryConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Backend selection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Firebase project settings (required if backend.target = firebase)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firebase: Option<FirebaseConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RegistryConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;

        // A [firebase] section may be present while the memory backend is
        // selected; it is only validated when active.
        if self.backend.target == BackendTarget::Firebase {
            match self.firebase {
                Some(ref config) => config.validate()?,
                None => {
                    return Err(
                        "firebase configuration is required when backend.target = 'firebase'"
                            .to_string(),
                    )
                }
            }
        }

        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BackendConfig {
    /// Which identity gateway and record store to use
    #[serde(default)]
    pub target: BackendTarget,
}

/// Firebase project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    /// Firebase project id
    pub project_id: String,

    /// Web API key
    pub api_key: SecretString,

    /// Firestore database id
    #[serde(default = "default_database_id")]
    pub database_id: String,

    /// Patient collection
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Interval between list queries
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Identity Toolkit endpoint
    #[serde(default = "default_identity_base_url")]
    pub identity_base_url: String,

    /// Firestore endpoint
    #[serde(default = "default_firestore_base_url")]
    pub firestore_base_url: String,

    /// `requestUri` sent with the Google credential exchange
    #[serde(default = "default_request_uri")]
    pub request_uri: String,
}

impl FirebaseConfig {
    /// Configuration with default endpoints for `project_id`
    pub fn new(project_id: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            project_id: project_id.into(),
            api_key,
            database_id: default_database_id(),
            collection: default_collection(),
            poll_interval_ms: default_poll_interval_ms(),
            timeout_seconds: default_timeout_seconds(),
            identity_base_url: default_identity_base_url(),
            firestore_base_url: default_firestore_base_url(),
            request_uri: default_request_uri(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.project_id.trim().is_empty() {
            return Err("firebase.project_id cannot be empty".to_string());
        }

        if self.api_key.expose_secret().is_empty() {
            return Err("firebase.api_key cannot be empty".to_string());
        }

        if self.collection.trim().is_empty() || self.collection.contains('/') {
            return Err(format!(
                "firebase.collection must be a single collection id, got '{}'",
                self.collection
            ));
        }

        if self.poll_interval_ms < 100 {
            return Err(format!(
                "firebase.poll_interval_ms must be >= 100, got {}",
                self.poll_interval_ms
            ));
        }

        if self.timeout_seconds == 0 {
            return Err("firebase.timeout_seconds must be > 0".to_string());
        }

        for (key, value) in [
            ("identity_base_url", &self.identity_base_url),
            ("firestore_base_url", &self.firestore_base_url),
        ] {
            let parsed = url::Url::parse(value)
                .map_err(|e| format!("firebase.{key} is not a valid URL: {e}"))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(format!("firebase.{key} must use http or https"));
            }
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_database_id() -> String {
    "(default)".to_string()
}

fn default_collection() -> String {
    PACIENTES_COLLECTION.to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_identity_base_url() -> String {
    "https://identitytoolkit.googleapis.com".to_string()
}

fn default_firestore_base_url() -> String {
    "https://firestore.googleapis.com".to_string()
}

fn default_request_uri() -> String {
    "http://localhost".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn firebase() -> FirebaseConfig {
        FirebaseConfig::new("clinic-demo", secret_string("api-key".to_string()))
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_config_is_memory_and_valid() {
        let config = RegistryConfig::default();
        assert_eq!(config.backend.target, BackendTarget::Memory);
        assert!(config.firebase.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_firebase_target_requires_section() {
        let mut config = RegistryConfig::default();
        config.backend.target = BackendTarget::Firebase;

        let err = config.validate().unwrap_err();
        assert!(err.contains("firebase configuration is required"));

        config.firebase = Some(firebase());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inactive_firebase_section_is_not_validated() {
        let mut broken = firebase();
        broken.project_id = String::new();

        let config = RegistryConfig {
            firebase: Some(broken),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_firebase_config_validation() {
        let mut config = firebase();
        assert!(config.validate().is_ok());

        config.api_key = secret_string("   ".to_string());
        assert!(config.validate().is_err());

        config = firebase();
        config.collection = "a/b".to_string();
        assert!(config.validate().is_err());

        config = firebase();
        config.poll_interval_ms = 10;
        assert!(config.validate().is_err());

        config = firebase();
        config.firestore_base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config = firebase();
        config.identity_base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(!config.local_enabled);
        assert!(config.validate().is_ok());

        config.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());

        config.local_rotation = "hourly".to_string();
        config.local_enabled = true;
        config.local_path = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_values() {
        let config = firebase();
        assert_eq!(config.database_id, "(default)");
        assert_eq!(config.collection, "pacientes");
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.request_uri, "http://localhost");
    }
}
