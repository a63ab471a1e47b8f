//! Route table and the guard that decides where a session belongs.

use crate::profile::UserProfile;

pub const HOME: &str = "/";
pub const LOGIN: &str = "/login";
pub const SIGNUP: &str = "/signup";
pub const ONBOARDING: &str = "/onboarding";
pub const DASHBOARD: &str = "/dashboard";
pub const SETTINGS: &str = "/dashboard/settings";
pub const EXPERTS: &str = "/experts";
pub const COURSES: &str = "/courses";

/// Paths reachable without signing in, matched exactly.
const PUBLIC_EXACT: &[&str] = &[HOME, LOGIN, SIGNUP];

/// Path prefixes reachable without signing in.
const PUBLIC_PREFIXES: &[&str] = &[EXPERTS, COURSES];

/// Whether `path` equals `prefix` or lies under it as a path segment.
fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_EXACT.contains(&path) || PUBLIC_PREFIXES.iter().any(|p| is_under(path, p))
}

/// Path of the task-review page for `task_id`.
pub fn task_review_path(task_id: &str) -> String {
    format!("{DASHBOARD}/tasks/{task_id}/review")
}

/// Path of an expert's profile page.
pub fn expert_path(expert_id: &str) -> String {
    format!("{EXPERTS}/{expert_id}")
}

/// What the guard knows about the current session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuardState<'a> {
    /// Auth state (or the first profile read) has not resolved yet.
    Loading,
    SignedOut,
    /// Signed in. `profile` is `None` when no document exists yet.
    SignedIn { profile: Option<&'a UserProfile> },
}

/// Decide whether the session at `path` must be sent elsewhere.
///
/// Returns `None` when the current page is acceptable.
pub fn redirect_for(state: GuardState<'_>, path: &str) -> Option<&'static str> {
    match state {
        GuardState::Loading => None,
        GuardState::SignedOut if is_public_path(path) => None,
        GuardState::SignedOut => Some(LOGIN),
        GuardState::SignedIn { .. } if is_under(path, ONBOARDING) => None,
        GuardState::SignedIn {
            profile: Some(profile),
        } => (!profile.is_complete()).then_some(ONBOARDING),
        // Social sign-in creates the document after the auth state flips.
        GuardState::SignedIn { profile: None } if is_under(path, SIGNUP) => None,
        GuardState::SignedIn { profile: None } => Some(ONBOARDING),
    }
}
