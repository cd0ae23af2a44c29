//! Firebase Identity Toolkit gateway
//!
//! Signs in with Google by exchanging a Google ID token for a Firebase
//! session through the Identity Toolkit REST API (`accounts:signInWithIdp`).
//! The resulting Firebase ID token is handed to the record store as its
//! bearer token.

use super::traits::{CredentialSource, IdentityGateway, ProviderCredential, TokenProvider, User};
use crate::config::{secret_string, FirebaseConfig, SecretString};
use crate::domain::{IdentityError, Result, UserId};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;

/// Successful `accounts:signInWithIdp` payload (fields we use)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInWithIdpResponse {
    local_id: String,
    id_token: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

/// Google API error envelope
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Identity Toolkit implementation of [`IdentityGateway`]
pub struct IdentityToolkitGateway {
    client: Client,
    base_url: String,
    api_key: SecretString,
    request_uri: String,
    credentials: Arc<dyn CredentialSource>,
    user: watch::Sender<Option<User>>,
    id_token: RwLock<Option<SecretString>>,
}

impl IdentityToolkitGateway {
    /// Create a gateway for the configured Firebase project
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &FirebaseConfig, credentials: Arc<dyn CredentialSource>) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| IdentityError::ConnectionFailed(format!("HTTP client: {e}")))?;

        let (user, _) = watch::channel(None);

        Ok(Self {
            client,
            base_url: config.identity_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            request_uri: config.request_uri.clone(),
            credentials,
            user,
            id_token: RwLock::new(None),
        })
    }

    async fn exchange_google_token(&self, google_id_token: &SecretString) -> Result<User> {
        let url = format!("{}/v1/accounts:signInWithIdp", self.base_url);
        let body = serde_json::json!({
            "postBody": format!(
                "id_token={}&providerId=google.com",
                google_id_token.expose_secret().as_str()
            ),
            "requestUri": self.request_uri,
            "returnIdpCredential": true,
            "returnSecureToken": true,
        });

        tracing::debug!(url = %url, "Exchanging Google ID token");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.expose_secret().as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(IdentityError::Rejected(format!("{status}: {message}")).into());
        }

        let payload: SignInWithIdpResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;

        let uid = UserId::new(payload.local_id).map_err(IdentityError::InvalidResponse)?;
        *self
            .id_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(secret_string(payload.id_token));

        Ok(User {
            uid,
            email: payload.email,
            display_name: payload.display_name,
        })
    }
}

#[async_trait]
impl IdentityGateway for IdentityToolkitGateway {
    fn current_user_id(&self) -> Option<UserId> {
        self.user.borrow().as_ref().map(|u| u.uid.clone())
    }

    fn current_user_stream(&self) -> watch::Receiver<Option<User>> {
        self.user.subscribe()
    }

    async fn sign_in_interactive(&self) -> Result<User> {
        let token = match self.credentials.request_credential().await? {
            ProviderCredential::GoogleIdToken(token) => token,
            ProviderCredential::Local { .. } => {
                return Err(IdentityError::UnsupportedCredential(
                    "Identity Toolkit requires a Google ID token".to_string(),
                )
                .into())
            }
        };

        let user = self.exchange_google_token(&token).await?;
        tracing::info!(
            uid = %user.uid,
            email = user.email.as_deref().unwrap_or(""),
            "Signed in with Google"
        );
        self.user.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        self.id_token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(previous) = self.user.send_replace(None) {
            tracing::info!(uid = %previous.uid, "Signed out");
        }
        Ok(())
    }
}

impl TokenProvider for IdentityToolkitGateway {
    fn bearer_token(&self) -> Option<SecretString> {
        self.id_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
