//! Account actions: signup, login, Google sign-in, onboarding and settings.
//!
//! Each action returns the route the presentation layer should show next
//! or a typed error; surfacing the error is left to the caller.

use std::sync::Arc;

use chrono::Utc;
use mentorhub_core::account::{LoginForm, SettingsForm, SignupForm};
use mentorhub_core::error::{FieldError, FieldErrors};
use mentorhub_core::navigation::{DASHBOARD, LOGIN, ONBOARDING, SETTINGS};
use mentorhub_core::profile::{validate_tech_career, ProfileWrite};

use crate::provider::{
    AuthError, AuthProvider, AuthUser, FederatedCredential, ProfileStore, StoreError, WriteMode,
};

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Invalid fields: {0}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No user is signed in")]
    NotSignedIn,
}

impl From<FieldErrors> for AccountError {
    fn from(errors: FieldErrors) -> Self {
        Self::Invalid(errors)
    }
}

impl From<FieldError> for AccountError {
    fn from(error: FieldError) -> Self {
        Self::Invalid(error.into())
    }
}

/// Account actions over the injected backends.
#[derive(Clone)]
pub struct AccountService {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn ProfileStore>,
}

impl AccountService {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn ProfileStore>) -> Self {
        Self { auth, store }
    }

    fn signed_in(&self) -> Result<AuthUser, AccountError> {
        self.auth.current_user().ok_or(AccountError::NotSignedIn)
    }

    /// Create an email/password account and its student profile.
    pub async fn sign_up(&self, form: SignupForm) -> Result<&'static str, AccountError> {
        form.check()?;
        let user = self.auth.create_account(&form.email, &form.password).await?;
        self.auth.update_display_name(&form.full_name).await?;

        let write = ProfileWrite::new_student(
            form.full_name,
            form.email,
            None,
            form.phone_number.filter(|p| !p.trim().is_empty()),
        );
        self.store
            .write_profile(&user.uid, write, WriteMode::Create)
            .await?;

        tracing::info!(uid = %user.uid, "Account created");
        Ok(ONBOARDING)
    }

    pub async fn sign_in(&self, form: LoginForm) -> Result<&'static str, AccountError> {
        form.check()?;
        let user = self
            .auth
            .sign_in_with_password(&form.email, &form.password)
            .await?;
        tracing::info!(uid = %user.uid, "Signed in with password");
        Ok(DASHBOARD)
    }

    /// Federated sign-in. A first sign-in creates the student profile; an
    /// existing profile without a career still needs onboarding.
    pub async fn sign_in_with_google(
        &self,
        credential: &FederatedCredential,
    ) -> Result<&'static str, AccountError> {
        let user = self.auth.sign_in_with_google(credential).await?;

        match self.store.get_profile(&user.uid).await? {
            Some(profile) if profile.is_complete() => Ok(DASHBOARD),
            Some(_) => Ok(ONBOARDING),
            None => {
                let write = ProfileWrite::new_student(
                    user.display_name.clone().unwrap_or_default(),
                    user.email.clone().unwrap_or_default(),
                    user.photo_url.clone(),
                    None,
                );
                self.store
                    .write_profile(&user.uid, write, WriteMode::Create)
                    .await?;
                tracing::info!(uid = %user.uid, "Profile created for federated account");
                Ok(ONBOARDING)
            }
        }
    }

    /// Record the chosen career.
    pub async fn complete_onboarding(&self, tech_career: &str) -> Result<&'static str, AccountError> {
        let user = self.signed_in()?;
        if tech_career.trim().is_empty() {
            return Err(FieldError::new("techCareer", "Please select your tech career.").into());
        }
        validate_tech_career(tech_career)?;

        let write = ProfileWrite {
            tech_career: Some(tech_career.to_string()),
            updated_at: Some(Utc::now()),
            ..Default::default()
        };
        self.store
            .write_profile(&user.uid, write, WriteMode::Merge)
            .await?;
        tracing::info!(uid = %user.uid, tech_career, "Onboarding completed");
        Ok(DASHBOARD)
    }

    /// Current values for the settings form.
    pub async fn load_settings(&self) -> Result<SettingsForm, AccountError> {
        let user = self.signed_in()?;
        let profile = self.store.get_profile(&user.uid).await?;
        let display_name = user.display_name.clone().unwrap_or_default();

        Ok(match profile {
            Some(profile) => SettingsForm {
                display_name: if profile.display_name.is_empty() {
                    display_name
                } else {
                    profile.display_name
                },
                bio: profile.bio,
                tech_career: profile.tech_career,
            },
            None => SettingsForm {
                display_name,
                bio: None,
                tech_career: None,
            },
        })
    }

    /// Save settings. The provider's display name is updated only when it
    /// changed.
    pub async fn save_settings(&self, form: SettingsForm) -> Result<&'static str, AccountError> {
        form.check()?;
        let user = self.signed_in()?;

        if user.display_name.as_deref() != Some(form.display_name.as_str()) {
            self.auth.update_display_name(&form.display_name).await?;
        }

        let write = ProfileWrite {
            display_name: Some(form.display_name),
            bio: form.bio,
            tech_career: form.tech_career,
            updated_at: Some(Utc::now()),
            ..Default::default()
        };
        self.store
            .write_profile(&user.uid, write, WriteMode::Merge)
            .await?;
        tracing::info!(uid = %user.uid, "Settings saved");
        Ok(SETTINGS)
    }

    pub async fn sign_out(&self) -> Result<&'static str, AccountError> {
        self.auth.sign_out().await?;
        Ok(LOGIN)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryAuthProvider, MemoryProfileStore};
    use assert_matches::assert_matches;
    use mentorhub_core::profile::Role;

    fn service() -> (AccountService, Arc<MemoryAuthProvider>, Arc<MemoryProfileStore>) {
        let auth = Arc::new(MemoryAuthProvider::new());
        let store = Arc::new(MemoryProfileStore::new());
        (AccountService::new(auth.clone(), store.clone()), auth, store)
    }

    fn signup_form() -> SignupForm {
        SignupForm {
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            password: "secret1".into(),
            phone_number: Some("+237 600 000 000".into()),
        }
    }

    // -- signup / login --

    #[tokio::test]
    async fn sign_up_creates_student_profile() {
        let (svc, auth, store) = service();
        assert_eq!(svc.sign_up(signup_form()).await.unwrap(), ONBOARDING);

        let user = auth.current_user().unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Ada Lovelace"));
        let profile = store.get_profile(&user.uid).await.unwrap().unwrap();
        assert_eq!(profile.role, Role::Student);
        assert_eq!(profile.phone_number.as_deref(), Some("+237 600 000 000"));
        assert!(!profile.is_complete());
    }

    #[tokio::test]
    async fn invalid_signup_never_reaches_provider() {
        let (svc, auth, _) = service();
        let mut form = signup_form();
        form.password = "123".into();
        assert_matches!(svc.sign_up(form).await, Err(AccountError::Invalid(e)) if e.contains("password"));
        assert!(auth.current_user().is_none());
    }

    #[tokio::test]
    async fn provider_error_text_is_kept() {
        let (svc, _, _) = service();
        svc.sign_up(signup_form()).await.unwrap();
        let err = svc.sign_up(signup_form()).await.unwrap_err();
        assert_matches!(err, AccountError::Auth(ref e) if e.code == "auth/email-already-in-use");
        assert_eq!(
            err.to_string(),
            "The email address is already in use by another account."
        );
    }

    #[tokio::test]
    async fn sign_in_goes_to_dashboard() {
        let (svc, _, _) = service();
        svc.sign_up(signup_form()).await.unwrap();
        svc.sign_out().await.unwrap();
        let form = LoginForm {
            email: "ada@example.com".into(),
            password: "secret1".into(),
        };
        assert_eq!(svc.sign_in(form).await.unwrap(), DASHBOARD);
    }

    // -- google --

    #[tokio::test]
    async fn first_google_sign_in_creates_profile() {
        let (svc, auth, store) = service();
        let cred = auth.register_google_identity("g@example.com", Some("Grace"), Some("https://img"));
        assert_eq!(svc.sign_in_with_google(&cred).await.unwrap(), ONBOARDING);

        let uid = auth.current_user().unwrap().uid;
        let profile = store.get_profile(&uid).await.unwrap().unwrap();
        assert_eq!(profile.display_name, "Grace");
        assert_eq!(profile.photo_url.as_deref(), Some("https://img"));
    }

    #[tokio::test]
    async fn returning_google_user_with_career_goes_to_dashboard() {
        let (svc, auth, _) = service();
        let cred = auth.register_google_identity("g@example.com", Some("Grace"), None);
        svc.sign_in_with_google(&cred).await.unwrap();
        svc.complete_onboarding("Mobile Developer").await.unwrap();
        svc.sign_out().await.unwrap();
        assert_eq!(svc.sign_in_with_google(&cred).await.unwrap(), DASHBOARD);
    }

    // -- onboarding / settings --

    #[tokio::test]
    async fn onboarding_requires_known_career() {
        let (svc, _, _) = service();
        assert_matches!(
            svc.complete_onboarding("Data Scientist").await,
            Err(AccountError::NotSignedIn)
        );
        svc.sign_up(signup_form()).await.unwrap();
        assert_matches!(
            svc.complete_onboarding("").await,
            Err(AccountError::Invalid(e)) if e.message_for("techCareer") == Some("Please select your tech career.")
        );
        assert_matches!(svc.complete_onboarding("Chef").await, Err(AccountError::Invalid(_)));
        assert_eq!(svc.complete_onboarding("Data Scientist").await.unwrap(), DASHBOARD);
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let (svc, auth, _) = service();
        svc.sign_up(signup_form()).await.unwrap();

        let mut form = svc.load_settings().await.unwrap();
        assert_eq!(form.display_name, "Ada Lovelace");
        form.display_name = "Ada L.".into();
        form.bio = Some("Mathematician".into());
        form.tech_career = Some("Backend Developer".into());
        assert_eq!(svc.save_settings(form.clone()).await.unwrap(), SETTINGS);

        assert_eq!(svc.load_settings().await.unwrap(), form);
        assert_eq!(
            auth.current_user().unwrap().display_name.as_deref(),
            Some("Ada L.")
        );
    }

    #[tokio::test]
    async fn sign_out_goes_to_login() {
        let (svc, auth, _) = service();
        svc.sign_up(signup_form()).await.unwrap();
        assert_eq!(svc.sign_out().await.unwrap(), LOGIN);
        assert!(auth.current_user().is_none());
    }
}
