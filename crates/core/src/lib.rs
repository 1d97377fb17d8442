//! Pure validation and shaping logic for RDTI project documents.
//!
//! Nothing in this crate performs I/O. The pipeline crate drives these
//! functions and owns template loading, rendering and storage.

pub mod boolish;
pub mod dates;
pub mod error;
pub mod input;
pub mod naming;
pub mod payload;
pub mod sanitize;
pub mod types;
pub mod validation;
