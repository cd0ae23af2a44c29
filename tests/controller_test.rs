//! Integration tests for the patient form controller
//!
//! These tests drive the controller against the in-memory store and a local
//! identity session, checking:
//! - Create, edit and delete flows and the list reload after each
//! - Validation and authentication gates in front of the store
//! - Birth date conversion when entering edit mode
//! - Subscription teardown

use async_trait::async_trait;
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use futures::channel::mpsc;
use futures::StreamExt;
use patient_registry::adapters::identity::{LocalSession, ScriptedCredentials, User};
use patient_registry::adapters::store::{MemoryStore, PatientStore, PatientStream, StoreOperation};
use patient_registry::core::controller::PatientFormController;
use patient_registry::core::form::Field;
use patient_registry::core::view::{Notification, Operation, RecordingView, DELETE_CONFIRMATION};
use patient_registry::domain::{
    BackendTimestamp, BirthDate, Patient, PatientId, PatientUpdate, Result, UserId,
};
use patient_registry::shell::{Route, ShellNavigator};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Harness {
    store: MemoryStore,
    view: Arc<RecordingView>,
    navigator: Arc<ShellNavigator>,
    controller: PatientFormController,
}

fn doctor() -> User {
    User {
        uid: UserId::new("doctor-1").unwrap(),
        email: Some("doctor@example.com".to_string()),
        display_name: Some("Dra. Pérez".to_string()),
    }
}

fn harness(signed_in: bool, confirm: bool) -> Harness {
    let store = MemoryStore::new();
    let credentials = Arc::new(ScriptedCredentials::default());
    let identity = if signed_in {
        LocalSession::signed_in(credentials, doctor())
    } else {
        LocalSession::new(credentials)
    };
    let view = Arc::new(RecordingView::new(confirm));
    let navigator = Arc::new(ShellNavigator::new(Route::Pacientes));
    let controller = PatientFormController::new(
        Arc::new(store.clone()),
        Arc::new(identity),
        view.clone(),
        navigator.clone(),
    );

    Harness {
        store,
        view,
        navigator,
        controller,
    }
}

fn fill(controller: &PatientFormController, nombre: &str, email: &str) {
    controller.set_field(Field::Nombre, nombre);
    controller.set_field(Field::Apellidos, "Hernández Gómez");
    controller.set_field(Field::FechaNacimiento, "1975-11-30");
    controller.set_field(Field::Domicilio, "Avenida Juárez 120");
    controller.set_field(Field::CorreoElectronico, email);
}

fn patient(nombre: &str) -> Patient {
    Patient {
        id: None,
        nombre: nombre.to_string(),
        apellidos: "Castro Díaz".to_string(),
        fecha_nacimiento: BirthDate::parse_input("2001-02-03").unwrap(),
        domicilio: "Calle Luna 7".to_string(),
        correo_electronico: "paciente@example.com".to_string(),
        owner_id: None,
    }
}

/// Polls `check` until it holds, for at most one second
async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

#[tokio::test]
async fn test_create_then_list_contains_patient_once_with_normalized_email() {
    let h = harness(true, true);
    h.controller.load_pacientes();

    let email: String = SafeEmail().fake();
    let typed = email.to_uppercase();
    fill(&h.controller, "Lucía", &typed);
    h.controller.on_submit().await;

    assert!(eventually(|| h.controller.pacientes().len() == 1).await);
    let listed = h.controller.pacientes();
    assert_eq!(listed[0].correo_electronico, email.to_lowercase());
    assert_eq!(listed[0].owner_id, Some(doctor().uid));
    assert!(listed[0].id.is_some());
    assert!(!h.controller.is_loading());

    assert_eq!(
        h.view.notifications(),
        vec![Notification::Succeeded(Operation::Create)]
    );
    assert!(h.controller.form().is_pristine());
    assert_eq!(h.store.calls().create, 1);
}

#[tokio::test]
async fn test_submit_without_user_is_rejected_before_the_store() {
    let h = harness(false, true);
    fill(&h.controller, "Mario", "mario@example.com");

    h.controller.on_submit().await;

    assert_eq!(h.store.calls().writes(), 0);
    assert_eq!(
        h.view.notifications(),
        vec![Notification::AuthenticationRequired]
    );
    assert_eq!(h.controller.form().value(Field::Nombre), "Mario");
}

#[tokio::test]
async fn test_invalid_name_never_reaches_the_store() {
    let h = harness(true, true);
    fill(&h.controller, "R2D2", "robot@example.com");

    h.controller.on_submit().await;

    assert_eq!(h.store.calls().writes(), 0);
    assert_eq!(h.view.notifications(), vec![Notification::ValidationFailed]);
    assert!(h.controller.form().shows_errors(Field::Nombre));
    assert!(!h.controller.form().shows_errors(Field::Apellidos));
}

#[tokio::test]
async fn test_whitespace_padded_fields_never_reach_the_store() {
    let h = harness(true, true);
    fill(&h.controller, "     ", "relleno@example.com");
    h.controller.set_field(Field::Apellidos, "  a  ");
    h.controller.set_field(Field::Domicilio, "     ");

    h.controller.on_submit().await;

    assert_eq!(h.store.calls().create, 0);
    assert!(h.store.snapshot().is_empty());
    assert_eq!(h.view.notifications(), vec![Notification::ValidationFailed]);
    assert!(!h.controller.is_loading());
}

#[tokio::test]
async fn test_padded_short_name_is_rejected_on_update() {
    let h = harness(true, true);
    h.controller.add_paciente(patient("Inés")).await;
    assert!(eventually(|| h.controller.pacientes().len() == 1).await);

    let stored = h.controller.pacientes()[0].clone();
    h.controller.edit_paciente(&stored);
    h.controller.set_field(Field::Nombre, " Al ");
    h.controller.on_submit().await;

    assert_eq!(h.store.calls().update, 0);
    assert_eq!(h.controller.editing_id(), stored.id);
    assert_eq!(h.store.snapshot()[0].nombre, "Inés");
    assert_eq!(
        h.view.notifications().last(),
        Some(&Notification::ValidationFailed)
    );
}

#[tokio::test]
async fn test_edit_with_unconvertible_timestamp_leaves_date_empty() {
    let h = harness(true, true);
    let mut stored = patient("Sofía").with_id(PatientId::new("doc-9").unwrap());
    stored.fecha_nacimiento = BirthDate::Timestamp(BackendTimestamp::new(i64::MAX, 0));

    h.controller.edit_paciente(&stored);

    let form = h.controller.form();
    assert_eq!(form.value(Field::FechaNacimiento), "");
    assert_eq!(form.value(Field::Nombre), "Sofía");
    assert_eq!(h.controller.editing_id(), stored.id);
    assert_eq!(h.view.scroll_count(), 1);
}

#[tokio::test]
async fn test_edit_with_timestamp_formats_date() {
    let h = harness(true, true);
    let mut stored = patient("Elena").with_id(PatientId::new("doc-3").unwrap());
    // 1990-05-17T00:00:00Z
    stored.fecha_nacimiento = BirthDate::Timestamp(BackendTimestamp::new(642_902_400, 0));

    h.controller.edit_paciente(&stored);

    assert_eq!(
        h.controller.form().value(Field::FechaNacimiento),
        "1990-05-17"
    );
}

#[tokio::test]
async fn test_edit_then_submit_updates_and_leaves_edit_mode() {
    let h = harness(true, true);
    let id = h.store.create(&patient("Andrés")).await.unwrap();
    h.controller.load_pacientes();
    assert!(eventually(|| h.controller.pacientes().len() == 1).await);

    let listed = h.controller.pacientes()[0].clone();
    h.controller.edit_paciente(&listed);
    assert_eq!(
        h.controller.form().value(Field::FechaNacimiento),
        "2001-02-03"
    );
    h.controller.set_field(Field::Domicilio, "  Calle Sol 22  ");
    h.controller.on_submit().await;

    assert_eq!(h.store.calls().update, 1);
    assert_eq!(h.store.calls().create, 1);
    assert_eq!(h.controller.editing_id(), None);
    assert!(
        eventually(|| h
            .controller
            .pacientes()
            .first()
            .is_some_and(|p| p.domicilio == "Calle Sol 22"))
        .await
    );
    assert_eq!(h.controller.pacientes()[0].id, Some(id));
    assert_eq!(
        h.view.notifications(),
        vec![Notification::Succeeded(Operation::Update)]
    );
}

#[tokio::test]
async fn test_failed_update_keeps_edit_session() {
    let h = harness(true, true);
    let id = h.store.create(&patient("Irene")).await.unwrap();
    let stored = patient("Irene").with_id(id.clone());

    h.controller.edit_paciente(&stored);
    h.store.fail_next(StoreOperation::Update);
    h.controller.on_submit().await;

    assert_eq!(h.controller.editing_id(), Some(id));
    assert!(!h.controller.is_loading());
    assert_eq!(
        h.view.notifications(),
        vec![Notification::Failed(Operation::Update)]
    );
}

#[tokio::test]
async fn test_delete_without_id_does_nothing() {
    let h = harness(true, true);

    h.controller.delete_paciente(None).await;

    assert_eq!(h.store.calls().delete, 0);
    assert!(h.view.notifications().is_empty());
    assert!(h.view.prompts().is_empty());
}

#[tokio::test]
async fn test_declined_delete_is_silent() {
    let h = harness(true, false);
    let id = h.store.create(&patient("Pablo")).await.unwrap();

    h.controller.delete_paciente(Some(id)).await;

    assert_eq!(h.view.prompts(), vec![DELETE_CONFIRMATION.to_string()]);
    assert_eq!(h.store.calls().delete, 0);
    assert!(h.view.notifications().is_empty());
    assert_eq!(h.store.snapshot().len(), 1);
}

#[tokio::test]
async fn test_confirmed_delete_reloads_list() {
    let h = harness(true, true);
    let first = h.store.create(&patient("Beatriz")).await.unwrap();
    h.store.create(&patient("Carlos")).await.unwrap();
    h.controller.load_pacientes();
    assert!(eventually(|| h.controller.pacientes().len() == 2).await);

    h.controller.delete_paciente(Some(first)).await;

    assert!(eventually(|| h.controller.pacientes().len() == 1).await);
    assert_eq!(h.controller.pacientes()[0].nombre, "Carlos");
    assert_eq!(
        h.view.notifications(),
        vec![Notification::Succeeded(Operation::Delete)]
    );
}

#[tokio::test]
async fn test_failed_delete_notifies_and_clears_loading() {
    let h = harness(true, true);
    let id = h.store.create(&patient("Diego")).await.unwrap();
    h.store.fail_next(StoreOperation::Delete);

    h.controller.delete_paciente(Some(id)).await;

    assert!(!h.controller.is_loading());
    assert_eq!(
        h.view.notifications(),
        vec![Notification::Failed(Operation::Delete)]
    );
    assert_eq!(h.store.snapshot().len(), 1);
}

#[tokio::test]
async fn test_list_failure_notifies_and_clears_loading() {
    let h = harness(true, true);
    h.store.fail_next(StoreOperation::List);

    h.controller.load_pacientes();

    assert!(eventually(|| !h.controller.is_loading()).await);
    assert!(
        eventually(|| h.view.notifications() == vec![Notification::Failed(Operation::LoadList)])
            .await
    );
}

#[tokio::test]
async fn test_list_is_ordered_by_nombre() {
    let h = harness(true, true);
    for nombre in ["Zoe", "Ana", "Marta"] {
        h.store.create(&patient(nombre)).await.unwrap();
    }

    h.controller.load_pacientes();

    assert!(eventually(|| h.controller.pacientes().len() == 3).await);
    let names: Vec<String> = h
        .controller
        .pacientes()
        .into_iter()
        .map(|p| p.nombre)
        .collect();
    assert_eq!(names, ["Ana", "Marta", "Zoe"]);
}

#[tokio::test]
async fn test_reset_form_twice_matches_once() {
    let h = harness(true, true);
    fill(&h.controller, "Tomás", "tomas@example.com");
    h.controller
        .edit_paciente(&patient("Tomás").with_id(PatientId::new("doc-1").unwrap()));

    h.controller.reset_form();
    let once = h.controller.form();
    h.controller.reset_form();

    assert_eq!(h.controller.form(), once);
    assert!(once.is_pristine());
    assert_eq!(h.controller.editing_id(), None);
}

#[tokio::test]
async fn test_logout_returns_to_login() {
    let h = harness(true, true);

    h.controller.logout().await;

    assert_eq!(h.navigator.current(), Route::Login);
    assert_eq!(h.controller.current_user_id(), None);
}

/// Store whose list emissions are pushed by the test
struct ManualStore {
    receiver: Mutex<Option<mpsc::UnboundedReceiver<Result<Vec<Patient>>>>>,
}

#[async_trait]
impl PatientStore for ManualStore {
    fn list(&self) -> PatientStream {
        match self.receiver.lock().unwrap().take() {
            Some(receiver) => receiver.boxed(),
            None => futures::stream::empty().boxed(),
        }
    }

    async fn create(&self, _patient: &Patient) -> Result<PatientId> {
        unimplemented!("not used")
    }

    async fn update(&self, _id: &PatientId, _changes: &PatientUpdate) -> Result<()> {
        unimplemented!("not used")
    }

    async fn delete(&self, _id: &PatientId) -> Result<()> {
        unimplemented!("not used")
    }

    fn collection_name(&self) -> &str {
        "pacientes"
    }
}

#[tokio::test]
async fn test_emission_after_destroy_changes_nothing() {
    let (sender, receiver) = mpsc::unbounded();
    let store = Arc::new(ManualStore {
        receiver: Mutex::new(Some(receiver)),
    });
    let identity = Arc::new(LocalSession::signed_in(
        Arc::new(ScriptedCredentials::default()),
        doctor(),
    ));
    let controller = PatientFormController::new(
        store,
        identity,
        Arc::new(RecordingView::new(true)),
        Arc::new(ShellNavigator::new(Route::Pacientes)),
    );

    controller.load_pacientes();
    assert!(controller.is_loading());

    let first = patient("Inés").with_id(PatientId::new("doc-1").unwrap());
    sender.unbounded_send(Ok(vec![first.clone()])).unwrap();
    assert!(eventually(|| controller.pacientes().len() == 1).await);

    controller.destroy();
    let late = patient("Óscar").with_id(PatientId::new("doc-2").unwrap());
    // The receiver may already be gone with the aborted task.
    let _ = sender.unbounded_send(Ok(vec![first.clone(), late]));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(controller.pacientes(), vec![first]);
    assert!(!controller.is_loading());
}
