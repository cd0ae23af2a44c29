//! Result type alias for the registry

use super::errors::RegistryError;

/// Result type alias for registry operations
///
/// # Examples
///
/// ```
/// use patient_registry::domain::result::Result;
/// use patient_registry::domain::errors::RegistryError;
///
/// fn failing_function() -> Result<()> {
///     Err(RegistryError::Validation("nombre is required".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, RegistryError>;
