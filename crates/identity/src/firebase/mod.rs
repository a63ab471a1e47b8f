//! Firebase backend: Identity Toolkit for auth, Firestore for profiles.
//!
//! Both services are reached over their public REST APIs with
//! [`reqwest`]. The Firestore store authenticates with the ID token of the
//! account signed in through [`FirebaseAuthProvider`].

pub mod auth;
pub mod firestore;

use std::time::Duration;

pub use auth::FirebaseAuthProvider;
pub use firestore::FirestoreProfileStore;

const DEFAULT_AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_TOKEN_BASE_URL: &str = "https://securetoken.googleapis.com/v1";

/// Connection settings for one Firebase project.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Web API key of the project.
    pub api_key: String,
    pub project_id: String,
    /// How often a profile watch re-reads its document.
    pub poll_interval: Duration,
    pub auth_base_url: String,
    pub firestore_base_url: String,
    /// Secure Token API, used to exchange refresh tokens.
    pub token_base_url: String,
}

impl FirebaseConfig {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            poll_interval: Duration::from_millis(2000),
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            firestore_base_url: DEFAULT_FIRESTORE_BASE_URL.to_string(),
            token_base_url: DEFAULT_TOKEN_BASE_URL.to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                      | Default  |
    /// |------------------------------|----------|
    /// | `FIREBASE_API_KEY`           | required |
    /// | `FIREBASE_PROJECT_ID`        | required |
    /// | `FIRESTORE_POLL_INTERVAL_MS` | `2000`   |
    pub fn from_env() -> Self {
        let api_key = std::env::var("FIREBASE_API_KEY").expect("FIREBASE_API_KEY must be set");
        let project_id =
            std::env::var("FIREBASE_PROJECT_ID").expect("FIREBASE_PROJECT_ID must be set");

        let poll_interval_ms: u64 = std::env::var("FIRESTORE_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "2000".into())
            .parse()
            .expect("FIRESTORE_POLL_INTERVAL_MS must be a valid u64");

        Self {
            poll_interval: Duration::from_millis(poll_interval_ms),
            ..Self::new(api_key, project_id)
        }
    }

    /// Root of the project's default database documents.
    pub fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.firestore_base_url, self.project_id
        )
    }

    /// Identity Toolkit endpoint such as `accounts:signUp`.
    pub fn auth_url(&self, method: &str) -> String {
        format!("{}/{}?key={}", self.auth_base_url, method, self.api_key)
    }

    /// Refresh-token exchange endpoint.
    pub fn token_url(&self) -> String {
        format!("{}/token?key={}", self.token_base_url, self.api_key)
    }
}
