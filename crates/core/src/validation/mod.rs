//! Project record validation.
//!
//! Two validators share one contract:
//!
//! - [`record`] checks required fields rule by rule on the raw JSON and always
//!   returns a best-effort normalized record. The batch pipeline uses it.
//! - [`schema`] expresses the same checks declaratively, adds format rules
//!   (email shape, numeric timestamps) and returns either a parsed record or
//!   flat path-qualified error strings. The strict dry-run path uses it.

pub mod record;
pub mod rules;
pub mod schema;
