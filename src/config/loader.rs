//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{BackendTarget, FirebaseConfig, RegistryConfig};
use super::secret_string;
use crate::domain::errors::RegistryError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into RegistryConfig
/// 4. Applies environment variable overrides (REGISTRY_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use patient_registry::config::loader::load_config;
///
/// let config = load_config("registry.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<RegistryConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(RegistryError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        RegistryError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses and validates configuration text
///
/// Same pipeline as [`load_config`] minus the file read.
///
/// # Errors
///
/// Returns an error if substitution, parsing or validation fails.
pub fn parse_config(contents: &str) -> Result<RegistryConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: RegistryConfig = toml::from_str(&contents)
        .map_err(|e| RegistryError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        RegistryError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is valid"))
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied through untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = placeholder_regex();
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(RegistryError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_number<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val.trim().parse().map(Some).map_err(|_| {
            RegistryError::Configuration(format!("{name} must be a number, got '{val}'"))
        }),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using the REGISTRY_* prefix
///
/// Environment variables follow the pattern: REGISTRY_<SECTION>_<KEY>,
/// for example REGISTRY_BACKEND_TARGET or REGISTRY_FIREBASE_API_KEY.
/// Setting REGISTRY_FIREBASE_PROJECT_ID and REGISTRY_FIREBASE_API_KEY
/// creates the `[firebase]` section when the file has none.
fn apply_env_overrides(config: &mut RegistryConfig) -> Result<()> {
    if let Ok(val) = std::env::var("REGISTRY_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("REGISTRY_BACKEND_TARGET") {
        config.backend.target = val
            .parse::<BackendTarget>()
            .map_err(|e| RegistryError::Configuration(format!("REGISTRY_BACKEND_TARGET: {e}")))?;
    }

    if config.firebase.is_none() {
        if let (Ok(project_id), Ok(api_key)) = (
            std::env::var("REGISTRY_FIREBASE_PROJECT_ID"),
            std::env::var("REGISTRY_FIREBASE_API_KEY"),
        ) {
            config.firebase = Some(FirebaseConfig::new(project_id, secret_string(api_key)));
        }
    }

    if let Some(ref mut firebase) = config.firebase {
        if let Ok(val) = std::env::var("REGISTRY_FIREBASE_PROJECT_ID") {
            firebase.project_id = val;
        }
        if let Ok(val) = std::env::var("REGISTRY_FIREBASE_API_KEY") {
            firebase.api_key = secret_string(val);
        }
        if let Ok(val) = std::env::var("REGISTRY_FIREBASE_DATABASE_ID") {
            firebase.database_id = val;
        }
        if let Ok(val) = std::env::var("REGISTRY_FIREBASE_COLLECTION") {
            firebase.collection = val;
        }
        if let Some(interval) = env_number("REGISTRY_FIREBASE_POLL_INTERVAL_MS")? {
            firebase.poll_interval_ms = interval;
        }
        if let Some(timeout) = env_number("REGISTRY_FIREBASE_TIMEOUT_SECONDS")? {
            firebase.timeout_seconds = timeout;
        }
        if let Ok(val) = std::env::var("REGISTRY_FIREBASE_IDENTITY_BASE_URL") {
            firebase.identity_base_url = val;
        }
        if let Ok(val) = std::env::var("REGISTRY_FIREBASE_FIRESTORE_BASE_URL") {
            firebase.firestore_base_url = val;
        }
    }

    if let Ok(val) = std::env::var("REGISTRY_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("REGISTRY_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("REGISTRY_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
