//! Signed-in session tracking and account actions for MentorHub.
//!
//! Authentication and profile storage are delegated to an external
//! identity provider and document store, reached through the
//! [`AuthProvider`](provider::AuthProvider) and
//! [`ProfileStore`](provider::ProfileStore) traits. The
//! [`SessionResolver`](resolver::SessionResolver) combines the two into a
//! single `{user, profile, loading}` view and keeps the user on a page they
//! are allowed to see.

pub mod accounts;
pub mod firebase;
pub mod memory;
pub mod provider;
pub mod resolver;
pub mod subscription;

pub use accounts::{AccountError, AccountService};
pub use provider::{
    AuthError, AuthEvent, AuthProvider, AuthUser, FederatedCredential, Navigator, ProfileSnapshot,
    ProfileStore, StoreError, StoreErrorCode, WriteMode,
};
pub use resolver::{Services, SessionResolver, SessionView};
pub use subscription::{Listeners, Subscription};
