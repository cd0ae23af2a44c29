// Patient Registry - Patient records with Google sign-in
// Copyright (c) 2025 Patient Registry Contributors
// Licensed under the MIT License

//! # Patient Registry
//!
//! A patient registry for a small practice: clinicians sign in with Google,
//! then list, add, edit and delete patient records kept in Cloud Firestore
//! or in an in-process store.
//!
//! ## Architecture
//!
//! The registry follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`shell`] - Navigation shell: routes, terminal view, interactive session
//! - [`core`] - Screens: patient form controller, form validation, email display
//! - [`adapters`] - Identity gateways and record stores (Firebase, in-memory)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use patient_registry::adapters::identity::{IdentityGateway, LocalSession, ScriptedCredentials};
//! use patient_registry::adapters::store::MemoryStore;
//! use patient_registry::core::controller::PatientFormController;
//! use patient_registry::core::form::Field;
//! use patient_registry::core::view::RecordingView;
//! use patient_registry::shell::ShellNavigator;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let identity = Arc::new(LocalSession::new(Arc::new(ScriptedCredentials::local(
//!     "doctor@example.com",
//! ))));
//! identity.sign_in_interactive().await.unwrap();
//!
//! let controller = PatientFormController::new(
//!     Arc::new(MemoryStore::new()),
//!     identity,
//!     Arc::new(RecordingView::new(true)),
//!     Arc::new(ShellNavigator::default()),
//! );
//! controller.load_pacientes();
//!
//! controller.set_field(Field::Nombre, "Ana");
//! controller.set_field(Field::Apellidos, "López Ruiz");
//! controller.set_field(Field::FechaNacimiento, "1990-05-01");
//! controller.set_field(Field::Domicilio, "Calle 1");
//! controller.set_field(Field::CorreoElectronico, "ana@example.com");
//! controller.on_submit().await;
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Adapters and configuration return [`domain::RegistryError`]. Screens never
//! surface errors to their caller; failures become notifications on the view.
//!
//! ## Logging
//!
//! Structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! tracing::info!(patient_id = "abc123", "Patient updated");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod shell;
