//! In-process identity backend for tests and local development.
//!
//! Accounts live in a map keyed by lower-cased email with Argon2id password
//! hashes. Profiles live in a map keyed by uid. Both sides expose failure
//! injection so the resolver's error paths can be driven deterministically.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use mentorhub_core::profile::{ProfileWrite, UserProfile};
use mentorhub_core::types::Uid;

use crate::provider::{
    AuthError, AuthEvent, AuthProvider, AuthUser, FederatedCredential, Navigator, ProfileSnapshot,
    ProfileStore, StoreError, WriteMode,
};
use crate::subscription::{Listeners, Subscription};

/// Shortest password the provider accepts.
const MIN_PASSWORD_CHARS: usize = 6;

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

fn internal(err: argon2::password_hash::Error) -> AuthError {
    AuthError::new("auth/internal-error", err.to_string())
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

struct Account {
    user: AuthUser,
    password_hash: Option<String>,
}

struct GoogleIdentity {
    email: String,
    display_name: Option<String>,
    photo_url: Option<String>,
}

#[derive(Default)]
struct AuthState {
    accounts: HashMap<String, Account>,
    google: HashMap<String, GoogleIdentity>,
    current: Option<AuthUser>,
}

/// Identity provider held entirely in memory.
#[derive(Default)]
pub struct MemoryAuthProvider {
    state: Mutex<AuthState>,
    listeners: Listeners<AuthEvent>,
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, AuthState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make a Google account available to [`sign_in_with_google`]. Returns
    /// the credential a popup sign-in would produce.
    ///
    /// [`sign_in_with_google`]: AuthProvider::sign_in_with_google
    pub fn register_google_identity(
        &self,
        email: &str,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> FederatedCredential {
        let token = format!("google-token-{}", uuid::Uuid::new_v4().simple());
        self.state().google.insert(
            token.clone(),
            GoogleIdentity {
                email: email.to_lowercase(),
                display_name: display_name.map(str::to_string),
                photo_url: photo_url.map(str::to_string),
            },
        );
        FederatedCredential::google(token)
    }

    /// Deliver a listener failure to every auth subscriber.
    pub fn fail_listeners(&self, error: AuthError) {
        self.listeners.emit(AuthEvent::Error(error));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn set_current(&self, user: Option<AuthUser>) {
        self.state().current = user.clone();
        let event = match user {
            Some(user) => AuthEvent::SignedIn(user),
            None => AuthEvent::SignedOut,
        };
        self.listeners.emit(event);
    }
}

fn new_uid() -> Uid {
    uuid::Uuid::new_v4().simple().to_string()
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    fn subscribe(&self) -> Subscription<AuthEvent> {
        let current = match self.state().current.clone() {
            Some(user) => AuthEvent::SignedIn(user),
            None => AuthEvent::SignedOut,
        };
        self.listeners.add(Some(current))
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.state().current.clone()
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        let invalid = || AuthError::new("auth/invalid-credential", "Invalid email or password.");
        let (user, hash) = {
            let state = self.state();
            let account = state.accounts.get(&email.to_lowercase()).ok_or_else(invalid)?;
            let hash = account.password_hash.clone().ok_or_else(invalid)?;
            (account.user.clone(), hash)
        };
        if !verify_password(password, &hash).map_err(internal)? {
            return Err(invalid());
        }
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::new(
                "auth/weak-password",
                "Password should be at least 6 characters.",
            ));
        }
        let key = email.to_lowercase();
        if self.state().accounts.contains_key(&key) {
            return Err(AuthError::new(
                "auth/email-already-in-use",
                "The email address is already in use by another account.",
            ));
        }

        let hash = hash_password(password).map_err(internal)?;
        let user = AuthUser {
            uid: new_uid(),
            email: Some(key.clone()),
            display_name: None,
            photo_url: None,
        };
        self.state().accounts.insert(
            key,
            Account {
                user: user.clone(),
                password_hash: Some(hash),
            },
        );
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in_with_google(
        &self,
        credential: &FederatedCredential,
    ) -> Result<AuthUser, AuthError> {
        let user = {
            let mut state = self.state();
            let identity = state.google.get(&credential.id_token).ok_or_else(|| {
                AuthError::new("auth/invalid-credential", "The supplied credential is invalid.")
            })?;
            let email = identity.email.clone();
            let fresh = AuthUser {
                uid: new_uid(),
                email: Some(email.clone()),
                display_name: identity.display_name.clone(),
                photo_url: identity.photo_url.clone(),
            };
            state
                .accounts
                .entry(email)
                .or_insert(Account {
                    user: fresh,
                    password_hash: None,
                })
                .user
                .clone()
        };
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    async fn update_display_name(&self, display_name: &str) -> Result<AuthUser, AuthError> {
        let updated = {
            let mut state = self.state();
            let mut user = state
                .current
                .clone()
                .ok_or_else(|| AuthError::new("auth/no-current-user", "No user is signed in."))?;
            user.display_name = Some(display_name.to_string());
            if let Some(account) = user
                .email
                .as_ref()
                .and_then(|email| state.accounts.get_mut(email))
            {
                account.user = user.clone();
            }
            user
        };
        self.set_current(Some(updated.clone()));
        Ok(updated)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.set_current(None);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Profile store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
    documents: HashMap<Uid, UserProfile>,
    watchers: HashMap<Uid, Listeners<ProfileSnapshot>>,
    read_failure: Option<StoreError>,
}

/// Document store held entirely in memory.
#[derive(Default)]
pub struct MemoryProfileStore {
    state: Mutex<StoreState>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a document without notifying watchers.
    pub fn insert(&self, profile: UserProfile) {
        self.state().documents.insert(profile.uid.clone(), profile);
    }

    /// Make every read fail with `error` until cleared with `None`.
    pub fn set_read_failure(&self, error: Option<StoreError>) {
        self.state().read_failure = error;
    }

    /// Deliver `error` to the watchers of `uid`.
    pub fn push_error(&self, uid: &str, error: StoreError) {
        if let Some(watchers) = self.state().watchers.get(uid).cloned() {
            watchers.emit(Err(error));
        }
    }

    /// Active watchers across all documents.
    pub fn watcher_count(&self) -> usize {
        self.state().watchers.values().map(Listeners::len).sum()
    }

    fn snapshot(state: &StoreState, uid: &str) -> ProfileSnapshot {
        match &state.read_failure {
            Some(error) => Err(error.clone()),
            None => Ok(state.documents.get(uid).cloned()),
        }
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        Self::snapshot(&self.state(), uid)
    }

    async fn write_profile(
        &self,
        uid: &str,
        write: ProfileWrite,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        let (snapshot, watchers) = {
            let mut state = self.state();
            let profile = match (mode, state.documents.remove(uid)) {
                (WriteMode::Merge, Some(existing)) => existing.merged(write),
                _ => UserProfile::from_write(uid, write),
            };
            state.documents.insert(uid.to_string(), profile.clone());
            (Ok(Some(profile)), state.watchers.get(uid).cloned())
        };
        if let Some(watchers) = watchers {
            watchers.emit(snapshot);
        }
        Ok(())
    }

    fn watch_profile(&self, uid: &str) -> Subscription<ProfileSnapshot> {
        let mut state = self.state();
        let initial = Self::snapshot(&state, uid);
        state
            .watchers
            .entry(uid.to_string())
            .or_default()
            .add(Some(initial))
    }
}

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

/// Router stand-in that records every navigation.
pub struct MemoryNavigator {
    history: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(start: &str) -> Self {
        Self {
            history: Mutex::new(vec![start.to_string()]),
        }
    }

    /// Paths navigated to, excluding the starting path.
    pub fn navigations(&self) -> Vec<String> {
        let history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        history[1..].to_vec()
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        let history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        history.last().cloned().unwrap_or_default()
    }

    fn navigate(&self, path: &str) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
