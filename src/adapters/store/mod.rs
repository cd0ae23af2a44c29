//! Record store adapters
//!
//! - [`MemoryStore`] - in-process store with live snapshots
//! - [`FirestoreStore`] - Cloud Firestore over REST

pub mod firestore;
pub mod memory;
pub mod traits;

pub use firestore::{FirestoreClient, FirestoreStore};
pub use memory::{MemoryStore, StoreCalls, StoreOperation};
pub use traits::{sort_by_nombre, PatientStore, PatientStream, PACIENTES_COLLECTION};
