//! Identity gateway abstraction
//!
//! The registry only needs four things from an identity provider: who is
//! signed in right now, a live feed of that, an interactive sign-in, and
//! sign-out. The session is passed explicitly to whoever needs it.

use crate::config::SecretString;
use crate::domain::{Result, UserId};
use async_trait::async_trait;
use tokio::sync::watch;

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Provider user id, used as the patient `ownerId`
    pub uid: UserId,

    /// Account email, if the provider shares it
    pub email: Option<String>,

    /// Display name, if the provider shares it
    pub display_name: Option<String>,
}

/// Credential produced by the interactive sign-in step
#[derive(Debug, Clone)]
pub enum ProviderCredential {
    /// Account name accepted as-is by a local session
    Local { account: String },

    /// Google OAuth ID token to exchange with the identity provider
    GoogleIdToken(SecretString),
}

/// Interactive step of a sign-in (the provider popup)
///
/// Implementations return [`crate::domain::IdentityError::Cancelled`] when the
/// user dismisses the prompt.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Asks the user for a credential
    async fn request_credential(&self) -> Result<ProviderCredential>;
}

/// Identity gateway trait
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Id of the signed-in user, reflecting the current session
    fn current_user_id(&self) -> Option<UserId>;

    /// Live view of the signed-in user
    ///
    /// The receiver starts at the current value and changes on every
    /// sign-in and sign-out.
    fn current_user_stream(&self) -> watch::Receiver<Option<User>>;

    /// Runs the interactive sign-in
    ///
    /// # Errors
    ///
    /// Fails if the user cancels or the provider rejects the credential.
    async fn sign_in_interactive(&self) -> Result<User>;

    /// Ends the current session
    async fn sign_out(&self) -> Result<()>;
}

/// Source of the bearer token presented to the record store
pub trait TokenProvider: Send + Sync {
    /// Current session token, if signed in
    fn bearer_token(&self) -> Option<SecretString>;
}
