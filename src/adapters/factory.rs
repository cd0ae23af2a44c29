//! Backend factory
//!
//! Builds the identity gateway and record store selected by configuration.

use crate::adapters::identity::{
    CredentialSource, IdentityGateway, IdentityToolkitGateway, LocalSession,
};
use crate::adapters::store::{FirestoreClient, FirestoreStore, MemoryStore, PatientStore};
use crate::config::schema::{BackendTarget, RegistryConfig};
use crate::domain::{RegistryError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Identity gateway and record store for one session
#[derive(Clone)]
pub struct Backend {
    pub identity: Arc<dyn IdentityGateway>,
    pub store: Arc<dyn PatientStore>,
}

/// Create the backend selected by `config.backend.target`
///
/// `credentials` drives the interactive part of sign-in.
///
/// # Errors
///
/// Returns an error if the selected backend is not configured or its HTTP
/// clients cannot be built.
pub fn create_backend(
    config: &RegistryConfig,
    credentials: Arc<dyn CredentialSource>,
) -> Result<Backend> {
    match config.backend.target {
        BackendTarget::Memory => {
            tracing::info!("Creating in-memory backend");
            Ok(Backend {
                identity: Arc::new(LocalSession::new(credentials)),
                store: Arc::new(MemoryStore::new()),
            })
        }
        BackendTarget::Firebase => {
            let firebase = config.firebase.as_ref().ok_or_else(|| {
                RegistryError::Configuration(
                    "firebase configuration is required when backend.target = 'firebase'"
                        .to_string(),
                )
            })?;

            tracing::info!(
                project_id = %firebase.project_id,
                collection = %firebase.collection,
                "Creating Firebase backend"
            );

            let gateway = Arc::new(IdentityToolkitGateway::new(firebase, credentials)?);
            let client = FirestoreClient::new(firebase, gateway.clone())?;
            let store =
                FirestoreStore::new(client, Duration::from_millis(firebase.poll_interval_ms));

            Ok(Backend {
                identity: gateway,
                store: Arc::new(store),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::identity::ScriptedCredentials;
    use crate::config::{secret_string, FirebaseConfig};

    #[test]
    fn test_memory_backend() {
        let backend = create_backend(
            &RegistryConfig::default(),
            Arc::new(ScriptedCredentials::default()),
        )
        .unwrap();
        assert_eq!(backend.store.collection_name(), "pacientes");
        assert!(backend.identity.current_user_id().is_none());
    }

    #[test]
    fn test_firebase_backend_requires_section() {
        let mut config = RegistryConfig::default();
        config.backend.target = BackendTarget::Firebase;
        let result = create_backend(&config, Arc::new(ScriptedCredentials::default()));
        assert!(matches!(result, Err(RegistryError::Configuration(_))));
    }

    #[test]
    fn test_firebase_backend_uses_configured_collection() {
        let mut firebase = FirebaseConfig::new("demo", secret_string("key".to_string()));
        firebase.collection = "pacientes_test".to_string();

        let mut config = RegistryConfig::default();
        config.backend.target = BackendTarget::Firebase;
        config.firebase = Some(firebase);

        let backend = create_backend(&config, Arc::new(ScriptedCredentials::default())).unwrap();
        assert_eq!(backend.store.collection_name(), "pacientes_test");
    }
}
