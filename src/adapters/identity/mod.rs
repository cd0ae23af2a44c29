//! Identity gateway adapters
//!
//! - [`LocalSession`] - in-process session for the in-memory backend and tests
//! - [`IdentityToolkitGateway`] - Google sign-in through Firebase Identity Toolkit

pub mod identity_toolkit;
pub mod local;
pub mod traits;

pub use identity_toolkit::IdentityToolkitGateway;
pub use local::{LocalSession, ScriptedCredentials};
pub use traits::{CredentialSource, IdentityGateway, ProviderCredential, TokenProvider, User};
