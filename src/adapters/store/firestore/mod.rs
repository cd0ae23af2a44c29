//! Cloud Firestore record store
//!
//! - [`client`] - REST client for one collection
//! - [`models`] - typed document mapping
//! - [`adapter`] - [`crate::adapters::store::PatientStore`] implementation

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::FirestoreStore;
pub use client::FirestoreClient;
