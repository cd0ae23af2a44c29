//! Patient form controller
//!
//! Owns the patient form, the live patient list and the edit session, and
//! routes submissions to create or update. Every failure is logged, turned
//! into a [`Notification`] and leaves `is_loading` cleared; nothing here
//! returns an error to the caller.
//!
//! The list subscription runs as a spawned task. State changes from that task
//! are applied under the controller's state lock and only while the
//! controller is alive and the subscription is still the current one, so an
//! emission that races with [`PatientFormController::destroy`] or with a newer
//! [`PatientFormController::load_pacientes`] is dropped.

use super::form::{invalid_when_stored, Field, PatientForm, PatientFormValues};
use super::view::{Notification, Operation, View, DELETE_CONFIRMATION};
use crate::adapters::identity::{IdentityGateway, User};
use crate::adapters::store::PatientStore;
use crate::domain::{Patient, PatientId, PatientUpdate, UserId};
use crate::shell::router::{Navigator, Route};
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct ControllerState {
    form: PatientForm,
    pacientes: Vec<Patient>,
    editing_id: Option<PatientId>,
    is_loading: bool,
    destroyed: bool,
    // Bumped by every load; only the latest subscription may write.
    generation: u64,
}

fn lock(state: &Mutex<ControllerState>) -> MutexGuard<'_, ControllerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the in-flight flag when the mutation ends
struct MutationGuard<'a>(&'a AtomicBool);

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Patient form controller
pub struct PatientFormController {
    store: Arc<dyn PatientStore>,
    identity: Arc<dyn IdentityGateway>,
    view: Arc<dyn View>,
    navigator: Arc<dyn Navigator>,
    state: Arc<Mutex<ControllerState>>,
    user: watch::Receiver<Option<User>>,
    cancel: watch::Sender<bool>,
    subscription: Mutex<Option<JoinHandle<()>>>,
    in_flight: AtomicBool,
}

impl PatientFormController {
    /// Controller over the given collaborators with an empty form and list
    pub fn new(
        store: Arc<dyn PatientStore>,
        identity: Arc<dyn IdentityGateway>,
        view: Arc<dyn View>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let user = identity.current_user_stream();
        let (cancel, _) = watch::channel(false);

        Self {
            store,
            identity,
            view,
            navigator,
            state: Arc::new(Mutex::new(ControllerState::default())),
            user,
            cancel,
            subscription: Mutex::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Subscribes to the patient list
    ///
    /// Replaces any previous subscription. Must be called from within a
    /// tokio runtime.
    pub fn load_pacientes(&self) {
        let generation = {
            let mut state = lock(&self.state);
            if state.destroyed {
                tracing::debug!("load_pacientes ignored after destroy");
                return;
            }
            state.generation += 1;
            state.is_loading = true;
            state.generation
        };

        let mut snapshots = self.store.list();
        let state = Arc::clone(&self.state);
        let view = Arc::clone(&self.view);
        let mut cancel = self.cancel.subscribe();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.changed() => break,
                    next = snapshots.next() => match next {
                        None => break,
                        Some(Ok(pacientes)) => {
                            let mut state = lock(&state);
                            if state.destroyed || state.generation != generation {
                                break;
                            }
                            tracing::debug!(count = pacientes.len(), "Patient list received");
                            state.pacientes = pacientes;
                            state.is_loading = false;
                        }
                        Some(Err(e)) => {
                            {
                                let mut state = lock(&state);
                                if state.destroyed || state.generation != generation {
                                    break;
                                }
                                state.is_loading = false;
                            }
                            tracing::error!(error = %e, "Failed to load patient list");
                            view.notify(Notification::Failed(Operation::LoadList));
                            break;
                        }
                    }
                }
            }
        });

        let previous = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Handles a form submission
    ///
    /// Invalid form: every field is marked touched and nothing is written.
    /// No signed-in user: nothing is written. Otherwise the form is saved as
    /// an update while an edit session is open, or as a new patient.
    pub async fn on_submit(&self) {
        let (values, editing) = {
            let mut state = lock(&self.state);
            if !state.form.is_valid() {
                state.form.mark_all_touched();
                let invalid: Vec<&str> =
                    state.form.invalid_fields().iter().map(Field::name).collect();
                drop(state);
                tracing::warn!(fields = ?invalid, "Form submitted with invalid fields");
                self.view.notify(Notification::ValidationFailed);
                return;
            }
            (state.form.values(), state.editing_id.is_some())
        };

        let Some(owner) = self.identity.current_user_id() else {
            tracing::warn!("Submit without a signed-in user");
            self.view.notify(Notification::AuthenticationRequired);
            return;
        };

        let patient = match values.to_patient(owner) {
            Ok(patient) => patient,
            Err(e) => {
                tracing::warn!(error = %e, "Form values could not be converted");
                self.view.notify(Notification::ValidationFailed);
                return;
            }
        };

        if editing {
            self.update_paciente(patient).await;
        } else {
            self.add_paciente(patient).await;
        }
    }

    /// Creates a patient stamped with the current user
    pub async fn add_paciente(&self, patient: Patient) {
        if !self.accepts_for_storage(&patient) {
            return;
        }
        let Some(_guard) = self.begin_mutation() else {
            return;
        };

        self.set_loading(true);
        let patient = patient.with_owner(self.identity.current_user_id());

        match self.store.create(&patient).await {
            Ok(id) => {
                tracing::info!(patient_id = %id, "Patient added");
                self.view.notify(Notification::Succeeded(Operation::Create));
                self.reset_form();
                self.load_pacientes();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to add patient");
                self.set_loading(false);
                self.view.notify(Notification::Failed(Operation::Create));
            }
        }
    }

    /// Writes `patient` over the record being edited
    ///
    /// Does nothing without an open edit session.
    pub async fn update_paciente(&self, patient: Patient) {
        let Some(id) = self.editing_id() else {
            tracing::debug!("update_paciente without an edit session");
            return;
        };
        if !self.accepts_for_storage(&patient) {
            return;
        }
        let Some(_guard) = self.begin_mutation() else {
            return;
        };

        self.set_loading(true);
        let changes = PatientUpdate::from(patient.with_owner(self.identity.current_user_id()));

        match self.store.update(&id, &changes).await {
            Ok(()) => {
                tracing::info!(patient_id = %id, "Patient updated");
                self.view.notify(Notification::Succeeded(Operation::Update));
                self.reset_form();
                self.load_pacientes();
            }
            Err(e) => {
                tracing::error!(patient_id = %id, error = %e, "Failed to update patient");
                self.set_loading(false);
                self.view.notify(Notification::Failed(Operation::Update));
            }
        }
    }

    /// Opens an edit session for `patient` and fills the form with it
    pub fn edit_paciente(&self, patient: &Patient) {
        {
            let mut state = lock(&self.state);
            state.editing_id = patient.id.clone();
            state
                .form
                .patch_value(&PatientFormValues::from_patient(patient));
        }
        self.view.scroll_to_top();
    }

    /// Deletes a patient after the user confirms
    ///
    /// `None` and a declined confirmation are silent no-ops.
    pub async fn delete_paciente(&self, id: Option<PatientId>) {
        let Some(id) = id else {
            return;
        };
        if !self.view.confirm(DELETE_CONFIRMATION) {
            tracing::debug!(patient_id = %id, "Delete not confirmed");
            return;
        }
        let Some(_guard) = self.begin_mutation() else {
            return;
        };

        self.set_loading(true);

        match self.store.delete(&id).await {
            Ok(()) => {
                tracing::info!(patient_id = %id, "Patient deleted");
                self.view.notify(Notification::Succeeded(Operation::Delete));
                self.load_pacientes();
            }
            Err(e) => {
                tracing::error!(patient_id = %id, error = %e, "Failed to delete patient");
                self.set_loading(false);
                self.view.notify(Notification::Failed(Operation::Delete));
            }
        }
    }

    /// Empties the form and closes the edit session
    pub fn reset_form(&self) {
        let mut state = lock(&self.state);
        state.form.reset();
        state.editing_id = None;
    }

    /// Signs out and returns to the login screen
    pub async fn logout(&self) {
        match self.identity.sign_out().await {
            Ok(()) => self.navigator.navigate(Route::Login),
            Err(e) => {
                tracing::error!(error = %e, "Failed to sign out");
                self.view.notify(Notification::Failed(Operation::SignOut));
            }
        }
    }

    /// Tears down the list subscription
    ///
    /// Afterwards no store emission changes the controller. Idempotent; also
    /// runs on drop.
    pub fn destroy(&self) {
        {
            let mut state = lock(&self.state);
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            state.is_loading = false;
        }

        self.cancel.send_replace(true);
        if let Some(handle) = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
        tracing::debug!("Patient form controller destroyed");
    }

    /// Sets a field value as if typed by the user
    pub fn set_field(&self, field: Field, value: impl Into<String>) {
        let mut state = lock(&self.state);
        state.form.set_value(field, value);
        state.form.touch(field);
    }

    /// Latest patient list
    pub fn pacientes(&self) -> Vec<Patient> {
        lock(&self.state).pacientes.clone()
    }

    /// Key of the record being edited, if any
    pub fn editing_id(&self) -> Option<PatientId> {
        lock(&self.state).editing_id.clone()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.state).is_loading
    }

    /// Snapshot of the form
    pub fn form(&self) -> PatientForm {
        lock(&self.state).form.clone()
    }

    /// Latest value of the current-user stream
    pub fn current_user(&self) -> Option<User> {
        self.user.borrow().clone()
    }

    /// Id of the signed-in user, straight from the identity session
    pub fn current_user_id(&self) -> Option<UserId> {
        self.identity.current_user_id()
    }

    // Writes are normalized, so the rules must hold for the stored shape too.
    fn accepts_for_storage(&self, patient: &Patient) -> bool {
        let invalid = invalid_when_stored(patient);
        if invalid.is_empty() {
            return true;
        }
        let fields: Vec<&str> = invalid.iter().map(Field::name).collect();
        tracing::warn!(fields = ?fields, "Patient would be stored with invalid fields");
        lock(&self.state).form.mark_all_touched();
        self.view.notify(Notification::ValidationFailed);
        false
    }

    fn set_loading(&self, loading: bool) {
        let mut state = lock(&self.state);
        if !state.destroyed {
            state.is_loading = loading;
        }
    }

    fn begin_mutation(&self) -> Option<MutationGuard<'_>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("Mutation rejected while another one is in flight");
            self.view.notify(Notification::Busy);
            return None;
        }
        Some(MutationGuard(&self.in_flight))
    }
}

impl Drop for PatientFormController {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::identity::{LocalSession, ScriptedCredentials};
    use crate::adapters::store::{MemoryStore, StoreOperation};
    use crate::core::view::RecordingView;
    use crate::shell::router::ShellNavigator;

    struct Fixture {
        store: MemoryStore,
        view: Arc<RecordingView>,
        navigator: Arc<ShellNavigator>,
        controller: PatientFormController,
    }

    fn fixture(signed_in: bool) -> Fixture {
        let store = MemoryStore::new();
        let credentials = Arc::new(ScriptedCredentials::default());
        let identity = if signed_in {
            let user = User {
                uid: UserId::new("uid-1").unwrap(),
                email: Some("doctor@example.com".to_string()),
                display_name: None,
            };
            LocalSession::signed_in(credentials, user)
        } else {
            LocalSession::new(credentials)
        };
        let view = Arc::new(RecordingView::new(true));
        let navigator = Arc::new(ShellNavigator::new(Route::Pacientes));
        let controller = PatientFormController::new(
            Arc::new(store.clone()),
            Arc::new(identity),
            view.clone(),
            navigator.clone(),
        );
        Fixture {
            store,
            view,
            navigator,
            controller,
        }
    }

    fn fill(controller: &PatientFormController) {
        controller.set_field(Field::Nombre, "Ana");
        controller.set_field(Field::Apellidos, "Ruiz Soto");
        controller.set_field(Field::FechaNacimiento, "1988-07-21");
        controller.set_field(Field::Domicilio, "Calle Real 4");
        controller.set_field(Field::CorreoElectronico, "Ana@Example.com");
    }

    #[tokio::test]
    async fn test_invalid_submit_touches_all_fields() {
        let f = fixture(true);
        f.controller.on_submit().await;

        let form = f.controller.form();
        assert!(Field::ALL.iter().all(|field| form.field(*field).touched));
        assert_eq!(f.view.notifications(), vec![Notification::ValidationFailed]);
        assert_eq!(f.store.calls().writes(), 0);
    }

    #[tokio::test]
    async fn test_update_without_edit_session_is_noop() {
        let f = fixture(true);
        fill(&f.controller);
        let patient = f
            .controller
            .form()
            .values()
            .to_patient(UserId::new("uid-1").unwrap())
            .unwrap();
        f.controller.update_paciente(patient).await;
        assert_eq!(f.store.calls().update, 0);
        assert!(f.view.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_mutation_is_rejected() {
        let f = fixture(true);
        let _held = f.controller.begin_mutation().unwrap();

        f.controller
            .delete_paciente(Some(PatientId::new("doc-1").unwrap()))
            .await;
        assert_eq!(f.view.notifications(), vec![Notification::Busy]);
        assert_eq!(f.store.calls().delete, 0);
    }

    #[tokio::test]
    async fn test_failed_create_clears_loading() {
        let f = fixture(true);
        fill(&f.controller);
        f.store.fail_next(StoreOperation::Create);

        f.controller.on_submit().await;
        assert!(!f.controller.is_loading());
        assert_eq!(
            f.view.notifications(),
            vec![Notification::Failed(Operation::Create)]
        );
        assert_eq!(f.controller.form().value(Field::Nombre), "Ana");
    }

    #[tokio::test]
    async fn test_logout_navigates_to_login() {
        let f = fixture(true);
        f.controller.logout().await;
        assert_eq!(f.navigator.current(), Route::Login);
        assert!(f.controller.current_user().is_none());
        assert!(f.view.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        let f = fixture(true);
        f.controller.load_pacientes();
        f.controller.destroy();
        f.controller.destroy();
        assert!(!f.controller.is_loading());

        f.controller.load_pacientes();
        assert!(!f.controller.is_loading());
    }
}
