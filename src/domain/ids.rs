//! Domain identifier types with validation
//!
//! Newtype wrappers keep store-assigned document keys and identity-provider
//! user ids from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Patient identifier newtype wrapper
///
/// The opaque document key the record store assigns on creation.
///
/// # Examples
///
/// ```
/// use patient_registry::domain::ids::PatientId;
/// use std::str::FromStr;
///
/// let id = PatientId::from_str("Xk3pQ9aL1").unwrap();
/// assert_eq!(id.as_str(), "Xk3pQ9aL1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct PatientId(String);

impl PatientId {
    /// Creates a new PatientId
    ///
    /// Document keys are path segments at the store, so `/` is rejected.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Patient ID cannot be empty".to_string());
        }
        if id.contains('/') {
            return Err(format!("Patient ID cannot contain '/': {id}"));
        }
        Ok(Self(id))
    }

    /// Returns the patient ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PatientId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Authenticated user identifier (the provider's `uid` / `localId`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("User ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the user ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for UserId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_id_valid() {
        let id = PatientId::new("abc123").unwrap();
        assert_eq!(id.as_str(), "abc123");
        assert_eq!(id.to_string(), "abc123");
        assert_eq!(id.into_inner(), "abc123");
    }

    #[test]
    fn test_patient_id_rejects_empty_and_paths() {
        assert!(PatientId::new("").is_err());
        assert!(PatientId::new("   ").is_err());
        assert!(PatientId::new("pacientes/abc").is_err());
    }

    #[test]
    fn test_user_id_from_str() {
        let uid = UserId::from_str("google-uid-1").unwrap();
        assert_eq!(uid.as_str(), "google-uid-1");
        assert!(UserId::from_str("").is_err());
    }

    #[test]
    fn test_patient_id_serde_is_transparent_string() {
        let id = PatientId::new("doc-1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"doc-1\"");
    }

    #[test]
    fn test_deserialize_applies_id_rules() {
        let id: PatientId = serde_json::from_str("\"doc-1\"").unwrap();
        assert_eq!(id.as_str(), "doc-1");
        assert!(serde_json::from_str::<PatientId>("\"\"").is_err());
        assert!(serde_json::from_str::<PatientId>("\"pacientes/doc-1\"").is_err());
        assert!(serde_json::from_str::<UserId>("\"  \"").is_err());
    }
}
