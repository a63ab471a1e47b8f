//! Domain layer for the MentorHub marketplace.
//!
//! Pure types and rules shared by the identity, AI and HTTP crates: the
//! seed catalog, the booking wizard, user profiles, route guarding, account
//! form validation and the task-review prompt.

pub mod account;
pub mod booking;
pub mod catalog;
pub mod error;
pub mod navigation;
pub mod profile;
pub mod review;
pub mod types;
