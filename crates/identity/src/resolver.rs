//! Unified `{user, profile, loading}` view over the auth provider and the
//! profile store.
//!
//! ```text
//!  AuthProvider::subscribe ──► SignedIn(user) ──► ProfileStore::watch_profile(uid)
//!                                  │                        │
//!                                  ▼                        ▼
//!                             SessionView ◄──────── snapshot / error
//!                                  │
//!                                  └─► redirect_for(view, path) ─► Navigator
//! ```
//!
//! One background task per attachment owns the auth subscription and at
//! most one nested profile subscription. Detaching (re-attach, shutdown or
//! drop) cancels the task, which drops both subscriptions.

use std::future;
use std::sync::{Arc, Mutex, PoisonError};

use mentorhub_core::navigation::{redirect_for, GuardState};
use mentorhub_core::profile::UserProfile;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::provider::{AuthEvent, AuthProvider, AuthUser, Navigator, ProfileSnapshot, ProfileStore};
use crate::subscription::Subscription;

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// What every page sees about the current session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    /// Present exactly when the provider reports an active session.
    pub user: Option<AuthUser>,
    /// `None` until the first snapshot, or when no document exists.
    pub profile: Option<UserProfile>,
    pub loading: bool,
}

impl SessionView {
    fn loading() -> Self {
        Self {
            user: None,
            profile: None,
            loading: true,
        }
    }

    fn signed_out() -> Self {
        Self {
            user: None,
            profile: None,
            loading: false,
        }
    }

    pub fn guard_state(&self) -> GuardState<'_> {
        match (&self.user, self.loading) {
            (_, true) => GuardState::Loading,
            (None, false) => GuardState::SignedOut,
            (Some(_), false) => GuardState::SignedIn {
                profile: self.profile.as_ref(),
            },
        }
    }
}

impl Default for SessionView {
    fn default() -> Self {
        Self::loading()
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Backends the resolver subscribes to.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthProvider>,
    pub store: Arc<dyn ProfileStore>,
}

struct Attachment {
    cancel: CancellationToken,
    revalidate: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

pub struct SessionResolver {
    navigator: Arc<dyn Navigator>,
    view: Arc<watch::Sender<SessionView>>,
    attachment: Mutex<Option<Attachment>>,
}

impl SessionResolver {
    /// A resolver with no backends yet. The view stays loading until
    /// [`attach`](Self::attach) is called.
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        let (view, _) = watch::channel(SessionView::loading());
        Self {
            navigator,
            view: Arc::new(view),
            attachment: Mutex::new(None),
        }
    }

    /// Subscribe to `services`, tearing down any previous attachment first.
    pub async fn attach(&self, services: Services) {
        self.detach().await;
        self.view.send_replace(SessionView::loading());

        let auth_events = services.auth.subscribe();
        let cancel = CancellationToken::new();
        let (revalidate, revalidate_rx) = mpsc::unbounded_channel();

        let worker = Worker {
            services,
            navigator: Arc::clone(&self.navigator),
            view: Arc::clone(&self.view),
            profile_events: None,
        };
        let task = tokio::spawn(worker.run(auth_events, revalidate_rx, cancel.clone()));

        let previous = self
            .attachment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Attachment {
                cancel,
                revalidate,
                task,
            });
        if let Some(previous) = previous {
            previous.cancel.cancel();
        }
    }

    /// Drop every listener. The last view is kept.
    pub async fn shutdown(&self) {
        self.detach().await;
    }

    /// Re-run the redirect guard, e.g. after the presentation layer moved.
    pub fn revalidate(&self) {
        if let Some(attachment) = self
            .attachment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            let _ = attachment.revalidate.send(());
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attachment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.subscribe()
    }

    /// Wait until the view satisfies `predicate` and return it.
    pub async fn wait_until(&self, predicate: impl FnMut(&SessionView) -> bool) -> SessionView {
        let mut rx = self.view.subscribe();
        let view = match rx.wait_for(predicate).await {
            Ok(view) => view.clone(),
            // The sender lives as long as `self`.
            Err(_) => self.view(),
        };
        view
    }

    async fn detach(&self) {
        let previous = self
            .attachment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(previous) = previous {
            previous.cancel.cancel();
            if let Err(e) = previous.task.await {
                tracing::error!(error = %e, "Session resolver task failed");
            }
        }
    }
}

impl Drop for SessionResolver {
    fn drop(&mut self) {
        if let Some(attachment) = self
            .attachment
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            attachment.cancel.cancel();
        }
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

enum Step {
    Stop,
    Auth(AuthEvent),
    Profile(Option<ProfileSnapshot>),
    Revalidate,
}

struct Worker {
    services: Services,
    navigator: Arc<dyn Navigator>,
    view: Arc<watch::Sender<SessionView>>,
    profile_events: Option<Subscription<ProfileSnapshot>>,
}

async fn next_snapshot(
    events: &mut Option<Subscription<ProfileSnapshot>>,
) -> Option<ProfileSnapshot> {
    match events {
        Some(events) => events.recv().await,
        None => future::pending().await,
    }
}

impl Worker {
    async fn run(
        mut self,
        mut auth_events: Subscription<AuthEvent>,
        mut revalidate: mpsc::UnboundedReceiver<()>,
        cancel: CancellationToken,
    ) {
        tracing::debug!("Session resolver attached");
        loop {
            let step = tokio::select! {
                _ = cancel.cancelled() => Step::Stop,
                event = auth_events.recv() => event.map_or(Step::Stop, Step::Auth),
                snapshot = next_snapshot(&mut self.profile_events) => Step::Profile(snapshot),
                Some(()) = revalidate.recv() => Step::Revalidate,
            };
            match step {
                Step::Stop => break,
                Step::Auth(event) => self.on_auth(event),
                Step::Profile(Some(snapshot)) => self.on_profile(snapshot),
                Step::Profile(None) => {
                    tracing::warn!("Profile stream closed by the store");
                    self.profile_events = None;
                }
                Step::Revalidate => self.evaluate_guard(),
            }
        }
        // Both subscriptions drop here.
        tracing::debug!("Session resolver detached");
    }

    fn on_auth(&mut self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(user) => {
                let same_user = self.view.borrow().user.as_ref().map(|u| &u.uid) == Some(&user.uid);
                if same_user && self.profile_events.is_some() {
                    self.view.send_modify(|v| v.user = Some(user));
                    return;
                }
                tracing::info!(uid = %user.uid, "User signed in");
                self.profile_events = None;
                self.profile_events = Some(self.services.store.watch_profile(&user.uid));
                self.view.send_replace(SessionView {
                    user: Some(user),
                    profile: None,
                    loading: true,
                });
            }
            AuthEvent::SignedOut => {
                tracing::info!("User signed out");
                self.clear_session();
                self.evaluate_guard();
            }
            AuthEvent::Error(e) => {
                tracing::error!(code = %e.code, error = %e.message, "Auth state listener failed");
                self.view.send_modify(|v| v.loading = false);
                self.evaluate_guard();
            }
        }
    }

    fn on_profile(&mut self, snapshot: ProfileSnapshot) {
        match snapshot {
            Ok(profile) => {
                self.view.send_modify(|v| {
                    v.profile = profile;
                    v.loading = false;
                });
                self.evaluate_guard();
            }
            Err(e) if e.is_transient() => {
                tracing::warn!(error = %e, "Profile store unavailable; waiting for reconnection");
            }
            Err(e) => {
                tracing::error!(error = %e, "Profile read failed; treating as signed out");
                self.clear_session();
                self.evaluate_guard();
            }
        }
    }

    fn clear_session(&mut self) {
        self.profile_events = None;
        self.view.send_replace(SessionView::signed_out());
    }

    /// Navigate at most once for the current view.
    fn evaluate_guard(&self) {
        let path = self.navigator.current_path();
        let target = redirect_for(self.view.borrow().guard_state(), &path);
        if let Some(target) = target {
            if target != path {
                tracing::debug!(from = %path, to = target, "Redirecting");
                self.navigator.navigate(target);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::memory::{MemoryAuthProvider, MemoryNavigator, MemoryProfileStore};
    use crate::provider::{StoreError, StoreErrorCode, WriteMode};
    use mentorhub_core::profile::ProfileWrite;

    struct Harness {
        auth: Arc<MemoryAuthProvider>,
        store: Arc<MemoryProfileStore>,
        nav: Arc<MemoryNavigator>,
        resolver: SessionResolver,
    }

    impl Harness {
        fn new(path: &str) -> Self {
            let nav = Arc::new(MemoryNavigator::new(path));
            Self {
                auth: Arc::new(MemoryAuthProvider::new()),
                store: Arc::new(MemoryProfileStore::new()),
                resolver: SessionResolver::new(nav.clone()),
                nav,
            }
        }

        fn services(&self) -> Services {
            Services {
                auth: self.auth.clone(),
                store: self.store.clone(),
            }
        }

        async fn sign_up(&self, career: Option<&str>) -> String {
            let user = self.auth.create_account("ada@example.com", "secret1").await.unwrap();
            let mut write = ProfileWrite::new_student("Ada", "ada@example.com", None, None);
            write.tech_career = career.map(str::to_string);
            self.store
                .write_profile(&user.uid, write, WriteMode::Create)
                .await
                .unwrap();
            user.uid
        }

        /// Let the worker drain everything already queued.
        async fn settle(&self) {
            for _ in 0..20 {
                tokio::task::yield_now().await;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    // -- loading --

    #[tokio::test]
    async fn loading_until_attached() {
        let h = Harness::new("/dashboard");
        assert!(h.resolver.view().loading);
        h.settle().await;
        assert!(h.nav.navigations().is_empty());
    }

    #[tokio::test]
    async fn signed_out_on_private_page_goes_to_login() {
        let h = Harness::new("/dashboard");
        h.resolver.attach(h.services()).await;
        let view = h.resolver.wait_until(|v| !v.loading).await;
        assert!(view.user.is_none());
        h.settle().await;
        assert_eq!(h.nav.navigations(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn signed_out_on_public_page_stays() {
        let h = Harness::new("/experts/2");
        h.resolver.attach(h.services()).await;
        h.resolver.wait_until(|v| !v.loading).await;
        h.settle().await;
        assert!(h.nav.navigations().is_empty());
    }

    // -- onboarding redirect --

    #[tokio::test]
    async fn incomplete_profile_redirects_exactly_once() {
        let h = Harness::new("/dashboard");
        let uid = h.sign_up(None).await;
        h.resolver.attach(h.services()).await;

        let view = h.resolver.wait_until(|v| !v.loading).await;
        assert_eq!(view.user.as_ref().map(|u| u.uid.as_str()), Some(uid.as_str()));
        assert!(view.profile.is_some());
        h.settle().await;

        // A second snapshot with the same incomplete state.
        h.store
            .write_profile(
                &uid,
                ProfileWrite {
                    bio: Some("hello".into()),
                    ..Default::default()
                },
                WriteMode::Merge,
            )
            .await
            .unwrap();
        h.settle().await;

        assert_eq!(h.nav.navigations(), vec!["/onboarding".to_string()]);
    }

    #[tokio::test]
    async fn no_redirect_when_already_onboarding() {
        let h = Harness::new("/onboarding");
        h.sign_up(None).await;
        h.resolver.attach(h.services()).await;
        h.resolver.wait_until(|v| !v.loading).await;
        h.settle().await;
        assert!(h.nav.navigations().is_empty());
    }

    #[tokio::test]
    async fn complete_profile_stays_on_dashboard() {
        let h = Harness::new("/dashboard");
        h.sign_up(Some("Backend Developer")).await;
        h.resolver.attach(h.services()).await;
        let view = h.resolver.wait_until(|v| !v.loading).await;
        assert!(view.profile.unwrap().is_complete());
        h.settle().await;
        assert!(h.nav.navigations().is_empty());
    }

    // -- store failures --

    #[tokio::test]
    async fn unavailable_store_keeps_loading_and_user() {
        let h = Harness::new("/dashboard");
        h.sign_up(None).await;
        h.store
            .set_read_failure(Some(StoreError::unavailable("Client is offline")));
        h.resolver.attach(h.services()).await;
        h.resolver.wait_until(|v| v.user.is_some()).await;
        h.settle().await;

        let view = h.resolver.view();
        assert!(view.loading);
        assert!(view.user.is_some());
        assert!(h.nav.navigations().is_empty());
    }

    #[tokio::test]
    async fn transient_error_after_load_leaves_state_untouched() {
        let h = Harness::new("/dashboard");
        let uid = h.sign_up(Some("Data Scientist")).await;
        h.resolver.attach(h.services()).await;
        let before = h.resolver.wait_until(|v| !v.loading).await;

        h.store.push_error(&uid, StoreError::unavailable("offline"));
        h.settle().await;
        assert_eq!(h.resolver.view(), before);
    }

    #[tokio::test]
    async fn fatal_store_error_is_treated_as_sign_out() {
        let h = Harness::new("/dashboard");
        let uid = h.sign_up(Some("Data Scientist")).await;
        h.resolver.attach(h.services()).await;
        h.resolver.wait_until(|v| !v.loading).await;

        h.store.push_error(
            &uid,
            StoreError::new(StoreErrorCode::PermissionDenied, "Missing permissions"),
        );
        let view = h.resolver.wait_until(|v| v.user.is_none()).await;
        assert!(!view.loading);
        assert!(view.profile.is_none());
        h.settle().await;
        assert_eq!(h.nav.navigations(), vec!["/login".to_string()]);
        assert_eq!(h.store.watcher_count(), 0);
    }

    #[tokio::test]
    async fn auth_listener_error_resolves_loading() {
        let h = Harness::new("/");
        h.resolver.attach(h.services()).await;
        h.resolver.wait_until(|v| !v.loading).await;
        h.auth
            .fail_listeners(crate::provider::AuthError::new("auth/network", "Network error"));
        h.settle().await;
        assert!(!h.resolver.view().loading);
    }

    // -- sign out --

    #[tokio::test]
    async fn sign_out_clears_view_and_profile_listener() {
        let h = Harness::new("/dashboard");
        h.sign_up(Some("Data Scientist")).await;
        h.resolver.attach(h.services()).await;
        h.resolver.wait_until(|v| v.profile.is_some()).await;
        assert_eq!(h.store.watcher_count(), 1);

        h.auth.sign_out().await.unwrap();
        let view = h.resolver.wait_until(|v| v.user.is_none()).await;
        assert!(!view.loading);
        h.settle().await;
        assert_eq!(h.store.watcher_count(), 0);
        assert_eq!(h.nav.navigations(), vec!["/login".to_string()]);
    }

    // -- teardown --

    #[tokio::test]
    async fn shutdown_releases_every_listener() {
        let h = Harness::new("/dashboard");
        h.sign_up(Some("Data Scientist")).await;
        h.resolver.attach(h.services()).await;
        h.resolver.wait_until(|v| v.profile.is_some()).await;
        assert_eq!(h.auth.listener_count(), 1);
        assert_eq!(h.store.watcher_count(), 1);

        h.resolver.shutdown().await;
        assert!(!h.resolver.is_attached());
        assert_eq!(h.auth.listener_count(), 0);
        assert_eq!(h.store.watcher_count(), 0);
    }

    #[tokio::test]
    async fn reattach_keeps_a_single_listener() {
        let h = Harness::new("/dashboard");
        h.sign_up(Some("Data Scientist")).await;
        h.resolver.attach(h.services()).await;
        h.resolver.wait_until(|v| v.profile.is_some()).await;

        h.resolver.attach(h.services()).await;
        h.resolver.wait_until(|v| v.profile.is_some()).await;
        assert_eq!(h.auth.listener_count(), 1);
        assert_eq!(h.store.watcher_count(), 1);
    }

    #[tokio::test]
    async fn revalidate_after_manual_navigation() {
        let h = Harness::new("/onboarding");
        h.sign_up(None).await;
        h.resolver.attach(h.services()).await;
        h.resolver.wait_until(|v| !v.loading).await;
        h.settle().await;
        assert!(h.nav.navigations().is_empty());

        h.nav.navigate("/dashboard");
        h.resolver.revalidate();
        h.settle().await;
        assert_eq!(
            h.nav.navigations(),
            vec!["/dashboard".to_string(), "/onboarding".to_string()]
        );
    }
}
