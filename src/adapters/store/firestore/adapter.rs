//! Firestore record store adapter
//!
//! Implements [`PatientStore`] on top of [`FirestoreClient`]. The REST API has
//! no push channel, so the live list polls `runQuery` and emits a snapshot
//! only when it differs from the previous one.

use super::client::FirestoreClient;
use crate::adapters::store::traits::{PatientStore, PatientStream};
use crate::domain::{Patient, PatientId, PatientUpdate, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;

/// Firestore implementation of [`PatientStore`]
pub struct FirestoreStore {
    client: Arc<FirestoreClient>,
    poll_interval: Duration,
}

struct PollState {
    client: Arc<FirestoreClient>,
    poll_interval: Duration,
    last: Option<Vec<Patient>>,
    first: bool,
    finished: bool,
}

impl FirestoreStore {
    /// Create a store polling every `poll_interval`
    pub fn new(client: FirestoreClient, poll_interval: Duration) -> Self {
        Self {
            client: Arc::new(client),
            poll_interval,
        }
    }
}

#[async_trait]
impl PatientStore for FirestoreStore {
    fn list(&self) -> PatientStream {
        let state = PollState {
            client: Arc::clone(&self.client),
            poll_interval: self.poll_interval,
            last: None,
            first: true,
            finished: false,
        };

        stream::unfold(state, |mut state| async move {
            if state.finished {
                return None;
            }

            loop {
                if !state.first {
                    tokio::time::sleep(state.poll_interval).await;
                }
                state.first = false;

                match state.client.run_query().await {
                    Ok(snapshot) => {
                        if state.last.as_ref() == Some(&snapshot) {
                            continue;
                        }
                        tracing::debug!(count = snapshot.len(), "Patient list changed");
                        state.last = Some(snapshot.clone());
                        return Some((Ok(snapshot), state));
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Patient list query failed");
                        state.finished = true;
                        return Some((Err(e), state));
                    }
                }
            }
        })
        .boxed()
    }

    async fn create(&self, patient: &Patient) -> Result<PatientId> {
        let id = self.client.create_document(&patient.normalized()).await?;
        tracing::info!(patient_id = %id, "Patient document created");
        Ok(id)
    }

    async fn update(&self, id: &PatientId, changes: &PatientUpdate) -> Result<()> {
        if changes.is_empty() {
            tracing::debug!(patient_id = %id, "Empty update skipped");
            return Ok(());
        }
        self.client.patch_document(id, &changes.normalized()).await?;
        tracing::info!(patient_id = %id, fields = ?changes.field_paths(), "Patient document updated");
        Ok(())
    }

    async fn delete(&self, id: &PatientId) -> Result<()> {
        self.client.delete_document(id).await?;
        tracing::info!(patient_id = %id, "Patient document deleted");
        Ok(())
    }

    fn collection_name(&self) -> &str {
        self.client.collection()
    }
}
