//! Core screen logic for the patient registry.
//!
//! # Modules
//!
//! - [`form`] - patient form model and field validators
//! - [`controller`] - patient form controller (list, create, edit, delete)
//! - [`login`] - login screen
//! - [`display`] - presentation helpers
//! - [`view`] - UI side-effect port and notifications
//!
//! # Example
//!
//! ```rust,no_run
//! use patient_registry::adapters::identity::{LocalSession, ScriptedCredentials};
//! use patient_registry::adapters::store::MemoryStore;
//! use patient_registry::core::controller::PatientFormController;
//! use patient_registry::core::view::RecordingView;
//! use patient_registry::shell::router::ShellNavigator;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let identity = Arc::new(LocalSession::new(Arc::new(ScriptedCredentials::default())));
//! let controller = PatientFormController::new(
//!     Arc::new(MemoryStore::new()),
//!     identity,
//!     Arc::new(RecordingView::new(true)),
//!     Arc::new(ShellNavigator::default()),
//! );
//!
//! controller.load_pacientes();
//! controller.on_submit().await;
//! # }
//! ```

pub mod controller;
pub mod display;
pub mod form;
pub mod login;
pub mod view;

pub use controller::PatientFormController;
pub use display::format_email;
pub use login::LoginScreen;
pub use view::{Notification, Operation, View};
