//! In-process identity session
//!
//! Keeps the signed-in user in a `watch` channel. The interactive step still
//! goes through a [`CredentialSource`], but the account name it returns is
//! accepted without a provider round trip. Used with the in-memory store.

use super::traits::{CredentialSource, IdentityGateway, ProviderCredential, TokenProvider, User};
use crate::config::SecretString;
use crate::domain::{IdentityError, Result, UserId};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Local identity session
pub struct LocalSession {
    credentials: Arc<dyn CredentialSource>,
    user: watch::Sender<Option<User>>,
}

impl LocalSession {
    /// Signed-out session that signs in through `credentials`
    pub fn new(credentials: Arc<dyn CredentialSource>) -> Self {
        let (user, _) = watch::channel(None);
        Self { credentials, user }
    }

    /// Session that starts signed in as `user`
    pub fn signed_in(credentials: Arc<dyn CredentialSource>, user: User) -> Self {
        let (user, _) = watch::channel(Some(user));
        Self { credentials, user }
    }

    fn user_from_account(account: &str) -> Result<User> {
        let account = account.trim();
        if account.is_empty() {
            return Err(IdentityError::Cancelled.into());
        }

        let uid = UserId::new(account).map_err(IdentityError::Rejected)?;
        let email = account.contains('@').then(|| account.to_lowercase());
        Ok(User {
            uid,
            email,
            display_name: Some(account.to_string()),
        })
    }
}

#[async_trait]
impl IdentityGateway for LocalSession {
    fn current_user_id(&self) -> Option<UserId> {
        self.user.borrow().as_ref().map(|u| u.uid.clone())
    }

    fn current_user_stream(&self) -> watch::Receiver<Option<User>> {
        self.user.subscribe()
    }

    async fn sign_in_interactive(&self) -> Result<User> {
        let user = match self.credentials.request_credential().await? {
            ProviderCredential::Local { account } => Self::user_from_account(&account)?,
            ProviderCredential::GoogleIdToken(_) => {
                return Err(IdentityError::UnsupportedCredential(
                    "local sessions cannot exchange Google ID tokens".to_string(),
                )
                .into())
            }
        };

        tracing::info!(uid = %user.uid, "Local session started");
        self.user.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(previous) = self.user.send_replace(None) {
            tracing::info!(uid = %previous.uid, "Local session ended");
        }
        Ok(())
    }
}

impl TokenProvider for LocalSession {
    fn bearer_token(&self) -> Option<SecretString> {
        None
    }
}

/// Credential source that replays a fixed sequence of answers
///
/// Once the sequence is exhausted every request is treated as cancelled.
#[derive(Debug, Default)]
pub struct ScriptedCredentials {
    answers: Mutex<Vec<ProviderCredential>>,
}

impl ScriptedCredentials {
    /// Answers are handed out in order
    pub fn new(answers: Vec<ProviderCredential>) -> Self {
        let mut answers = answers;
        answers.reverse();
        Self {
            answers: Mutex::new(answers),
        }
    }

    /// Source that always answers with the local `account`
    pub fn local(account: &str) -> Self {
        Self::new(vec![ProviderCredential::Local {
            account: account.to_string(),
        }])
    }
}

#[async_trait]
impl CredentialSource for ScriptedCredentials {
    async fn request_credential(&self) -> Result<ProviderCredential> {
        let next = self.answers.lock().ok().and_then(|mut a| a.pop());
        next.ok_or_else(|| IdentityError::Cancelled.into())
    }
}
