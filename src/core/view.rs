//! UI side-effect port
//!
//! The controller and the login screen never print or prompt directly; they
//! report through a [`View`]. The terminal session implements it for the
//! binary and tests record what was reported.

use std::fmt;
use std::sync::Mutex;

/// Operation a notification refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    LoadList,
    Create,
    Update,
    Delete,
    SignIn,
    SignOut,
}

/// User-visible message produced by a component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The form failed validation on submit
    ValidationFailed,
    /// A write was attempted without a signed-in user
    AuthenticationRequired,
    /// A mutation is already in flight
    Busy,
    /// An operation completed
    Succeeded(Operation),
    /// An operation failed; the component stays usable
    Failed(Operation),
}

impl Notification {
    /// True for notifications that report a problem
    pub fn is_error(&self) -> bool {
        !matches!(self, Notification::Succeeded(_))
    }

    /// Message shown to the user
    pub fn message(&self) -> &'static str {
        match self {
            Notification::ValidationFailed => "Por favor, completa todos los campos correctamente",
            Notification::AuthenticationRequired => {
                "Debes estar autenticado para agregar pacientes"
            }
            Notification::Busy => "Hay una operación en curso, espera a que termine",
            Notification::Succeeded(Operation::Create) => "Paciente agregado exitosamente",
            Notification::Succeeded(Operation::Update) => "Paciente actualizado exitosamente",
            Notification::Succeeded(Operation::Delete) => "Paciente eliminado exitosamente",
            Notification::Succeeded(Operation::LoadList) => "Lista de pacientes actualizada",
            Notification::Succeeded(Operation::SignIn) => "Sesión iniciada",
            Notification::Succeeded(Operation::SignOut) => "Sesión cerrada",
            Notification::Failed(Operation::LoadList) => "Error al cargar la lista de pacientes",
            Notification::Failed(Operation::Create) => "Error al agregar el paciente",
            Notification::Failed(Operation::Update) => "Error al actualizar el paciente",
            Notification::Failed(Operation::Delete) => "Error al eliminar el paciente",
            Notification::Failed(Operation::SignIn) => "Error al iniciar sesión con Google",
            Notification::Failed(Operation::SignOut) => "Error al cerrar sesión",
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Confirmation prompt shown before deleting a patient
pub const DELETE_CONFIRMATION: &str = "¿Estás seguro de eliminar este paciente?";

/// UI side effects available to components
pub trait View: Send + Sync {
    /// Shows an alert-style message
    fn notify(&self, notification: Notification);

    /// Asks the user a yes/no question
    fn confirm(&self, prompt: &str) -> bool;

    /// Brings the form back into view
    fn scroll_to_top(&self);
}

/// View that records everything it is asked to do
///
/// Confirmation answers are fixed at construction.
#[derive(Debug, Default)]
pub struct RecordingView {
    confirm_answer: bool,
    notifications: Mutex<Vec<Notification>>,
    prompts: Mutex<Vec<String>>,
    scrolls: Mutex<usize>,
}

impl RecordingView {
    /// Recording view that answers every confirmation with `confirm_answer`
    pub fn new(confirm_answer: bool) -> Self {
        Self {
            confirm_answer,
            ..Default::default()
        }
    }

    /// Notifications received so far
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    /// Confirmation prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Number of scroll-to-top requests
    pub fn scroll_count(&self) -> usize {
        self.scrolls.lock().map(|s| *s).unwrap_or_default()
    }
}

impl View for RecordingView {
    fn notify(&self, notification: Notification) {
        if let Ok(mut n) = self.notifications.lock() {
            n.push(notification);
        }
    }

    fn confirm(&self, prompt: &str) -> bool {
        if let Ok(mut p) = self.prompts.lock() {
            p.push(prompt.to_string());
        }
        self.confirm_answer
    }

    fn scroll_to_top(&self) {
        if let Ok(mut s) = self.scrolls.lock() {
            *s += 1;
        }
    }
}
