//! Identity Toolkit REST client implementing [`AuthProvider`].
//!
//! The signed-in account is held locally; auth-state listeners are fed
//! from it the same way the browser SDK feeds `onAuthStateChanged`.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::FirebaseConfig;
use crate::provider::{AuthError, AuthEvent, AuthProvider, AuthUser, FederatedCredential};
use crate::subscription::{Listeners, Subscription};

/// Redirect URI sent with IdP sign-ins; only its presence is checked.
const IDP_REQUEST_URI: &str = "http://localhost";

/// ID tokens are exchanged this long before they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(5 * 60);

/// Lifetime assumed when a response omits `expiresIn`.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
struct Session {
    user: AuthUser,
    id_token: String,
    refresh_token: Option<String>,
    expires_at: Instant,
}

/// Account payload shared by the `accounts:*` responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Seconds, as a decimal string.
    #[serde(default)]
    expires_in: Option<String>,
}

/// Secure Token API response. Unlike Identity Toolkit it uses snake_case.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

/// Parse an `expiresIn` value, falling back to an hour.
fn token_lifetime(expires_in: Option<&str>) -> Duration {
    expires_in
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TOKEN_LIFETIME)
}

/// True once `now` is within [`REFRESH_MARGIN`] of `expires_at`.
fn needs_refresh(expires_at: Instant, now: Instant) -> bool {
    now + REFRESH_MARGIN >= expires_at
}

impl AccountResponse {
    fn user(&self) -> AuthUser {
        AuthUser {
            uid: self.local_id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone().filter(|n| !n.is_empty()),
            photo_url: self.photo_url.clone(),
        }
    }
}

pub struct FirebaseAuthProvider {
    client: reqwest::Client,
    config: FirebaseConfig,
    session: Mutex<Option<Session>>,
    listeners: Listeners<AuthEvent>,
}

impl FirebaseAuthProvider {
    pub fn new(config: FirebaseConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: FirebaseConfig) -> Self {
        Self {
            client,
            config,
            session: Mutex::new(None),
            listeners: Listeners::new(),
        }
    }

    /// ID token of the signed-in account, for authenticated Firestore calls.
    ///
    /// A token close to expiry is exchanged for a new one first, so
    /// long-lived sessions keep their Firestore access. `Ok(None)` when
    /// signed out.
    pub async fn fresh_id_token(&self) -> Result<Option<String>, AuthError> {
        let Some(session) = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        else {
            return Ok(None);
        };

        if !needs_refresh(session.expires_at, Instant::now()) {
            return Ok(Some(session.id_token));
        }
        let Some(refresh_token) = session.refresh_token else {
            return Ok(Some(session.id_token));
        };

        let response = self
            .client
            .post(self.config.token_url())
            .json(&json!({ "grant_type": "refresh_token", "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| AuthError::new("auth/network-request-failed", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(uid = %session.user.uid, status = status.as_u16(), "ID token refresh failed");
            return Err(auth_error_from_body(&body));
        }
        let refreshed = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::new("auth/internal-error", e.to_string()))?;

        let expires_at = Instant::now() + token_lifetime(refreshed.expires_in.as_deref());
        let mut current = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        // Signed out or switched accounts meanwhile: keep the new token out.
        if let Some(current) = current.as_mut().filter(|s| s.user.uid == session.user.uid) {
            current.id_token = refreshed.id_token.clone();
            current.refresh_token = Some(refreshed.refresh_token);
            current.expires_at = expires_at;
        }
        tracing::debug!(uid = %session.user.uid, "ID token refreshed");
        Ok(Some(refreshed.id_token))
    }

    fn set_session(&self, session: Option<Session>) {
        let event = match &session {
            Some(s) => AuthEvent::SignedIn(s.user.clone()),
            None => AuthEvent::SignedOut,
        };
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = session;
        self.listeners.emit(event);
    }

    async fn call(&self, method: &str, body: Value) -> Result<AccountResponse, AuthError> {
        let response = self
            .client
            .post(self.config.auth_url(method))
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::new("auth/network-request-failed", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(method, status = status.as_u16(), "Identity Toolkit call failed");
            return Err(auth_error_from_body(&body));
        }
        response
            .json::<AccountResponse>()
            .await
            .map_err(|e| AuthError::new("auth/internal-error", e.to_string()))
    }

    async fn sign_in_with(&self, method: &str, body: Value) -> Result<AuthUser, AuthError> {
        let account = self.call(method, body).await?;
        let id_token = account
            .id_token
            .clone()
            .ok_or_else(|| AuthError::new("auth/internal-error", "Response carried no ID token."))?;
        let user = account.user();
        self.set_session(Some(Session {
            user: user.clone(),
            id_token,
            refresh_token: account.refresh_token,
            expires_at: Instant::now() + token_lifetime(account.expires_in.as_deref()),
        }));
        Ok(user)
    }
}

/// Map an Identity Toolkit error body onto an SDK-style code, keeping the
/// server's message text.
fn auth_error_from_body(body: &str) -> AuthError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string());

    let reason = message.split(':').next().unwrap_or_default().trim();
    let code = match reason {
        "EMAIL_EXISTS" => "auth/email-already-in-use",
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            "auth/invalid-credential"
        }
        "INVALID_EMAIL" => "auth/invalid-email",
        "WEAK_PASSWORD" => "auth/weak-password",
        "USER_DISABLED" => "auth/user-disabled",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "auth/too-many-requests",
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" => {
            "auth/user-token-expired"
        }
        "INVALID_IDP_RESPONSE" => "auth/invalid-credential",
        _ => "auth/internal-error",
    };
    AuthError::new(code, message)
}

#[async_trait]
impl AuthProvider for FirebaseAuthProvider {
    fn subscribe(&self) -> Subscription<AuthEvent> {
        let current = match self.current_user() {
            Some(user) => AuthEvent::SignedIn(user),
            None => AuthEvent::SignedOut,
        };
        self.listeners.add(Some(current))
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.user.clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        self.sign_in_with(
            "accounts:signInWithPassword",
            json!({ "email": email, "password": password, "returnSecureToken": true }),
        )
        .await
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.sign_in_with(
            "accounts:signUp",
            json!({ "email": email, "password": password, "returnSecureToken": true }),
        )
        .await
    }

    async fn sign_in_with_google(
        &self,
        credential: &FederatedCredential,
    ) -> Result<AuthUser, AuthError> {
        let post_body = format!(
            "id_token={}&providerId={}",
            credential.id_token, credential.provider_id
        );
        self.sign_in_with(
            "accounts:signInWithIdp",
            json!({
                "postBody": post_body,
                "requestUri": IDP_REQUEST_URI,
                "returnIdpCredential": true,
                "returnSecureToken": true,
            }),
        )
        .await
    }

    async fn update_display_name(&self, display_name: &str) -> Result<AuthUser, AuthError> {
        let session = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| AuthError::new("auth/no-current-user", "No user is signed in."))?;

        let account = self
            .call(
                "accounts:update",
                json!({
                    "idToken": session.id_token,
                    "displayName": display_name,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        let user = account.user();
        let expires_at = match account.expires_in.as_deref() {
            Some(secs) => Instant::now() + token_lifetime(Some(secs)),
            None => session.expires_at,
        };
        self.set_session(Some(Session {
            user: user.clone(),
            id_token: account.id_token.unwrap_or(session.id_token),
            refresh_token: account.refresh_token.or(session.refresh_token),
            expires_at,
        }));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.set_session(None);
        Ok(())
    }
}
