//! Domain models and types for the patient registry.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PatientId`], [`UserId`])
//! - **The patient entity** ([`Patient`], [`PatientUpdate`])
//! - **Birth date shapes** ([`BirthDate`], [`BackendTimestamp`])
//! - **Error types** ([`RegistryError`], [`StoreError`], [`IdentityError`])
//! - **Result type alias** ([`Result`])
//!
//! # Example
//!
//! ```rust
//! use patient_registry::domain::{BirthDate, Patient};
//!
//! let patient = Patient {
//!     id: None,
//!     nombre: "Lucía".to_string(),
//!     apellidos: "Fernández Ruiz".to_string(),
//!     fecha_nacimiento: BirthDate::parse_input("1992-03-04").unwrap(),
//!     domicilio: "Calle Luna 12".to_string(),
//!     correo_electronico: " Lucia@Example.com".to_string(),
//!     owner_id: None,
//! };
//!
//! assert_eq!(patient.normalized().correo_electronico, "lucia@example.com");
//! ```

pub mod birth_date;
pub mod errors;
pub mod ids;
pub mod patient;
pub mod result;

pub use birth_date::{BackendTimestamp, BirthDate};
pub use errors::{IdentityError, RegistryError, StoreError};
pub use ids::{PatientId, UserId};
pub use patient::{normalize_email, Patient, PatientUpdate};
pub use result::Result;
