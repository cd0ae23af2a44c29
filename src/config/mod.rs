//! Configuration management for the patient registry.
//!
//! TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! The registry reads a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `REGISTRY_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use patient_registry::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("registry.toml")?;
//! println!("Backend: {:?}", config.backend.target);
//! if let Some(firebase) = &config.firebase {
//!     println!("Firebase project: {}", firebase.project_id);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level
//! - [`BackendConfig`] - memory or firebase backend
//! - [`FirebaseConfig`] - Firebase project, endpoints and polling
//! - [`LoggingConfig`] - local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [backend]
//! target = "firebase"
//!
//! [firebase]
//! project_id = "clinic-registry"
//! api_key = "${REGISTRY_FIREBASE_API_KEY}"
//! collection = "pacientes"
//! poll_interval_ms = 2000
//!
//! [logging]
//! local_enabled = true
//! local_path = "./logs"
//! local_rotation = "daily"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, BackendConfig, BackendTarget, FirebaseConfig, LoggingConfig,
    RegistryConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
