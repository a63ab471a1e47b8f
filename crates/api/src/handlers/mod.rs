//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Errors are mapped to HTTP responses via [`AppError`](crate::error::AppError).

pub mod booking;
pub mod catalog;
pub mod review;
