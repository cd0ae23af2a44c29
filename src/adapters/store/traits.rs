//! Record store abstraction
//!
//! This module defines the trait record store adapters implement for the
//! `pacientes` collection.

use crate::domain::{Patient, PatientId, PatientUpdate, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Collection holding patient documents
pub const PACIENTES_COLLECTION: &str = "pacientes";

/// Live list query: each item is the full, ordered collection snapshot
///
/// The stream ends after yielding an error.
pub type PatientStream = BoxStream<'static, Result<Vec<Patient>>>;

/// Record store trait for patient documents
///
/// Writes apply [`Patient::normalized`] / [`PatientUpdate::normalized`]
/// before anything leaves the process.
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Subscribe to the collection ordered by `nombre` ascending
    ///
    /// Every patient in a snapshot carries its document key.
    fn list(&self) -> PatientStream;

    /// Create a document and return the key the store assigned
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected.
    async fn create(&self, patient: &Patient) -> Result<PatientId>;

    /// Write the present fields of `changes` onto document `id`
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not exist or the write is rejected.
    async fn update(&self, id: &PatientId, changes: &PatientUpdate) -> Result<()>;

    /// Delete document `id`
    ///
    /// # Errors
    ///
    /// Returns an error if the delete is rejected.
    async fn delete(&self, id: &PatientId) -> Result<()>;

    /// Name of the backing collection
    fn collection_name(&self) -> &str;
}

/// Sorts a snapshot by `nombre` the way the document store orders strings
/// (UTF-8 byte order), keeping the relative order of equal names.
pub fn sort_by_nombre(patients: &mut [Patient]) {
    patients.sort_by(|a, b| a.nombre.as_bytes().cmp(b.nombre.as_bytes()));
}
