//! External system integrations for the patient registry.
//!
//! - [`identity`] - identity gateway (local session, Firebase Identity Toolkit)
//! - [`store`] - record store (in-memory, Cloud Firestore)
//! - [`factory`] - builds the pair selected by configuration
//!
//! # Design Pattern
//!
//! Adapters isolate external services behind traits so the controller can be
//! driven by in-process implementations in tests.
//!
//! ```rust,no_run
//! use patient_registry::adapters::factory::create_backend;
//! use patient_registry::adapters::identity::ScriptedCredentials;
//! use patient_registry::config::RegistryConfig;
//! use std::sync::Arc;
//!
//! # fn example() -> patient_registry::domain::Result<()> {
//! let backend = create_backend(
//!     &RegistryConfig::default(),
//!     Arc::new(ScriptedCredentials::local("ana@example.com")),
//! )?;
//! println!("Collection: {}", backend.store.collection_name());
//! # Ok(())
//! # }
//! ```

pub mod factory;
pub mod identity;
pub mod store;

pub use factory::{create_backend, Backend};
