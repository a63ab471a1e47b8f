//! Seams to the external identity provider, document store and router.

use async_trait::async_trait;
use mentorhub_core::profile::{ProfileWrite, UserProfile};
use mentorhub_core::types::Uid;
use serde::{Deserialize, Serialize};

use crate::subscription::Subscription;

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// The signed-in account as the identity provider reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: Uid,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(AuthUser),
    SignedOut,
    /// The auth-state listener itself failed.
    Error(AuthError),
}

/// Provider failure. `message` is the provider's own text, shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    pub code: String,
    pub message: String,
}

impl AuthError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Token from a federated sign-in (Google) handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedCredential {
    pub provider_id: String,
    pub id_token: String,
}

impl FederatedCredential {
    pub fn google(id_token: impl Into<String>) -> Self {
        Self {
            provider_id: "google.com".to_string(),
            id_token: id_token.into(),
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Observe auth state. The current state is delivered immediately.
    fn subscribe(&self) -> Subscription<AuthEvent>;

    fn current_user(&self) -> Option<AuthUser>;

    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<AuthUser, AuthError>;

    /// Create an account and sign it in.
    async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    async fn sign_in_with_google(
        &self,
        credential: &FederatedCredential,
    ) -> Result<AuthUser, AuthError>;

    /// Update the signed-in user's display name.
    async fn update_display_name(&self, display_name: &str) -> Result<AuthUser, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

// ---------------------------------------------------------------------------
// Profile store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreErrorCode {
    /// Temporary loss of connectivity. The only transient code.
    Unavailable,
    PermissionDenied,
    NotFound,
    InvalidArgument,
    Internal,
}

impl StoreErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::PermissionDenied => "permission-denied",
            Self::NotFound => "not-found",
            Self::InvalidArgument => "invalid-argument",
            Self::Internal => "internal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({})", .code.as_str())]
pub struct StoreError {
    pub code: StoreErrorCode,
    pub message: String,
}

impl StoreError {
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::Unavailable, message)
    }

    /// Whether waiting for reconnection is the right response.
    pub fn is_transient(&self) -> bool {
        self.code == StoreErrorCode::Unavailable
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the whole document.
    Create,
    /// Overwrite only the fields present in the write.
    Merge,
}

/// One reading of a profile document: `Ok(None)` when it does not exist.
pub type ProfileSnapshot = Result<Option<UserProfile>, StoreError>;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, StoreError>;

    async fn write_profile(
        &self,
        uid: &str,
        write: ProfileWrite,
        mode: WriteMode,
    ) -> Result<(), StoreError>;

    /// Observe one document. The current snapshot is delivered first, then
    /// one snapshot per change.
    fn watch_profile(&self, uid: &str) -> Subscription<ProfileSnapshot>;
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Client-side router the resolver steers.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;

    fn navigate(&self, path: &str);
}
