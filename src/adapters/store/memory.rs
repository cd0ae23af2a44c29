//! In-memory record store
//!
//! Keeps documents in a `BTreeMap` and publishes a version counter on a
//! `watch` channel; open list streams re-emit the full ordered snapshot after
//! every write, the way a live query would. Birth dates are kept as
//! timestamps at rest. Supports one-shot failure injection and call counting
//! for tests.

use super::traits::{sort_by_nombre, PatientStore, PatientStream, PACIENTES_COLLECTION};
use crate::domain::{Patient, PatientId, PatientUpdate, Result, StoreError};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::watch;

/// Store operation, for failure injection and call counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    List,
    Create,
    Update,
    Delete,
}

/// Number of calls received per operation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StoreCalls {
    pub list: usize,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
}

impl StoreCalls {
    /// Total number of write calls
    pub fn writes(&self) -> usize {
        self.create + self.update + self.delete
    }
}

#[derive(Debug, Default)]
struct CallCounters {
    list: AtomicUsize,
    create: AtomicUsize,
    update: AtomicUsize,
    delete: AtomicUsize,
}

struct Inner {
    records: RwLock<BTreeMap<PatientId, Patient>>,
    version: watch::Sender<u64>,
    failures: Mutex<HashSet<StoreOperation>>,
    calls: CallCounters,
}

impl Inner {
    fn snapshot(&self) -> Vec<Patient> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let mut patients: Vec<Patient> = records.values().cloned().collect();
        sort_by_nombre(&mut patients);
        patients
    }
}

/// In-memory implementation of [`PatientStore`]
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                records: RwLock::new(BTreeMap::new()),
                version,
                failures: Mutex::new(HashSet::new()),
                calls: CallCounters::default(),
            }),
        }
    }

    /// Makes the next call of `operation` fail
    pub fn fail_next(&self, operation: StoreOperation) {
        self.inner
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(operation);
    }

    /// Calls received so far
    pub fn calls(&self) -> StoreCalls {
        let c = &self.inner.calls;
        StoreCalls {
            list: c.list.load(Ordering::SeqCst),
            create: c.create.load(Ordering::SeqCst),
            update: c.update.load(Ordering::SeqCst),
            delete: c.delete.load(Ordering::SeqCst),
        }
    }

    /// Current ordered contents
    pub fn snapshot(&self) -> Vec<Patient> {
        self.inner.snapshot()
    }

    fn record_call(&self, operation: StoreOperation) -> bool {
        let counter = match operation {
            StoreOperation::List => &self.inner.calls.list,
            StoreOperation::Create => &self.inner.calls.create,
            StoreOperation::Update => &self.inner.calls.update,
            StoreOperation::Delete => &self.inner.calls.delete,
        };
        counter.fetch_add(1, Ordering::SeqCst);

        self.inner
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&operation)
    }

    fn publish(&self) {
        self.inner.version.send_modify(|v| *v += 1);
    }

    fn at_rest(mut patient: Patient) -> Patient {
        if let Some(ts) = patient.fecha_nacimiento.to_timestamp() {
            patient.fecha_nacimiento = ts.into();
        }
        patient
    }
}

#[async_trait]
impl PatientStore for MemoryStore {
    fn list(&self) -> PatientStream {
        if self.record_call(StoreOperation::List) {
            return stream::once(async {
                Err(StoreError::QueryFailed("injected list failure".to_string()).into())
            })
            .boxed();
        }

        let inner = Arc::clone(&self.inner);
        let receiver = inner.version.subscribe();

        stream::unfold(
            (inner, receiver, true),
            |(inner, mut receiver, first)| async move {
                if !first && receiver.changed().await.is_err() {
                    return None;
                }
                let snapshot = inner.snapshot();
                Some((Ok(snapshot), (inner, receiver, false)))
            },
        )
        .boxed()
    }

    async fn create(&self, patient: &Patient) -> Result<PatientId> {
        if self.record_call(StoreOperation::Create) {
            return Err(StoreError::InsertFailed("injected create failure".to_string()).into());
        }

        let id = PatientId::new(uuid::Uuid::new_v4().simple().to_string())
            .map_err(StoreError::InsertFailed)?;
        let record = Self::at_rest(patient.normalized().with_id(id.clone()));

        self.inner
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), record);
        self.publish();

        tracing::debug!(patient_id = %id, "Created patient document");
        Ok(id)
    }

    async fn update(&self, id: &PatientId, changes: &PatientUpdate) -> Result<()> {
        if self.record_call(StoreOperation::Update) {
            return Err(StoreError::UpdateFailed("injected update failure".to_string()).into());
        }

        {
            let mut records = self
                .inner
                .records
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let record = records
                .get_mut(id)
                .ok_or_else(|| StoreError::DocumentNotFound(id.to_string()))?;

            changes.normalized().apply_to(record);
            *record = Self::at_rest(record.clone());
        }
        self.publish();

        tracing::debug!(patient_id = %id, "Updated patient document");
        Ok(())
    }

    async fn delete(&self, id: &PatientId) -> Result<()> {
        if self.record_call(StoreOperation::Delete) {
            return Err(StoreError::DeleteFailed("injected delete failure".to_string()).into());
        }

        let removed = self
            .inner
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        if removed.is_some() {
            self.publish();
        }

        tracing::debug!(patient_id = %id, existed = removed.is_some(), "Deleted patient document");
        Ok(())
    }

    fn collection_name(&self) -> &str {
        PACIENTES_COLLECTION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BackendTimestamp, BirthDate, RegistryError};
    use chrono::NaiveDate;

    fn patient(nombre: &str, email: &str) -> Patient {
        Patient {
            id: None,
            nombre: nombre.to_string(),
            apellidos: "Pérez".to_string(),
            fecha_nacimiento: BirthDate::Native(NaiveDate::from_ymd_opt(1980, 1, 2).unwrap()),
            domicilio: "Calle Sol 3".to_string(),
            correo_electronico: email.to_string(),
            owner_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_and_lists_ordered() {
        let store = MemoryStore::new();
        store.create(&patient("Zoe", " Z@X.COM ")).await.unwrap();
        store.create(&patient(" Ana", "a@x.com")).await.unwrap();

        let mut list = store.list();
        let snapshot = list.next().await.unwrap().unwrap();
        let names: Vec<_> = snapshot.iter().map(|p| p.nombre.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Zoe"]);
        assert_eq!(snapshot[1].correo_electronico, "z@x.com");
        assert!(snapshot.iter().all(|p| p.id.is_some()));
        assert_eq!(
            snapshot[0].fecha_nacimiento,
            BirthDate::Timestamp(BackendTimestamp::from_date(
                NaiveDate::from_ymd_opt(1980, 1, 2).unwrap()
            ))
        );
    }

    #[tokio::test]
    async fn test_list_reemits_after_write() {
        let store = MemoryStore::new();
        let mut list = store.list();
        assert!(list.next().await.unwrap().unwrap().is_empty());

        store.create(&patient("Ana", "a@x.com")).await.unwrap();
        assert_eq!(list.next().await.unwrap().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let store = MemoryStore::new();
        let id = PatientId::new("missing").unwrap();
        let result = store.update(&id, &PatientUpdate::default()).await;
        assert!(matches!(
            result,
            Err(RegistryError::Store(StoreError::DocumentNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = MemoryStore::new();
        let id = store.create(&patient("Ana", "a@x.com")).await.unwrap();

        let changes = PatientUpdate {
            domicilio: Some("  Plaza Nueva 5 ".to_string()),
            ..Default::default()
        };
        store.update(&id, &changes).await.unwrap();
        assert_eq!(store.snapshot()[0].domicilio, "Plaza Nueva 5");

        store.delete(&id).await.unwrap();
        assert!(store.snapshot().is_empty());
        assert_eq!(store.calls().writes(), 3);
    }

    #[tokio::test]
    async fn test_injected_failures_are_one_shot() {
        let store = MemoryStore::new();
        store.fail_next(StoreOperation::Create);
        assert!(store.create(&patient("Ana", "a@x.com")).await.is_err());
        assert!(store.create(&patient("Ana", "a@x.com")).await.is_ok());

        store.fail_next(StoreOperation::List);
        let mut failing = store.list();
        assert!(failing.next().await.unwrap().is_err());
        assert!(failing.next().await.is_none());
        assert_eq!(store.calls().list, 1);
    }
}
