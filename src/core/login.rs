//! Login screen

use super::view::{Notification, Operation, View};
use crate::adapters::identity::IdentityGateway;
use crate::shell::router::{Navigator, Route};
use std::sync::Arc;

/// Login screen: a single "sign in with Google" action
pub struct LoginScreen {
    identity: Arc<dyn IdentityGateway>,
    view: Arc<dyn View>,
    navigator: Arc<dyn Navigator>,
}

impl LoginScreen {
    pub fn new(
        identity: Arc<dyn IdentityGateway>,
        view: Arc<dyn View>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            identity,
            view,
            navigator,
        }
    }

    /// Runs the interactive sign-in and opens the patient list on success
    ///
    /// Returns whether the user is now signed in.
    pub async fn login_with_google(&self) -> bool {
        match self.identity.sign_in_interactive().await {
            Ok(user) => {
                tracing::info!(uid = %user.uid, "Login succeeded");
                self.navigator.navigate(Route::Pacientes);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Login failed");
                self.view.notify(Notification::Failed(Operation::SignIn));
                false
            }
        }
    }
}
