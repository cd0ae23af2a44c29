//! Logging and observability
//!
//! Structured logging with:
//! - Configurable log levels, overridable through `RUST_LOG`
//! - Console output on stderr
//! - Optional JSON file logging with daily, hourly or no rotation
//!
//! # Example
//!
//! ```no_run
//! use patient_registry::logging::init_logging;
//! use patient_registry::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use patient_registry::log_error_with_context;
/// use patient_registry::domain::RegistryError;
///
/// let error = RegistryError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
