//! Request handlers.
//!
//! Handlers delegate to `rdti_pipeline` and `rdti_core` and map errors via
//! [`crate::error::AppError`].

pub mod documents;
