//! Request guards.
//!
//! - [`api_key::ApiKey`] -- Requires the configured `x-api-key` header.

pub mod api_key;
