//! Request handlers.
//!
//! Handlers delegate to the repositories in `sheltered_db` through a
//! per-request session, convert with [`crate::mapper`], and map errors via
//! [`AppError`](crate::error::AppError).

pub mod animal;
