//! Core types shared across the CareOps admin server crates.
//!
//! Provides the error taxonomy used by every subsystem and the access-context
//! types consumed by the route registry's access resolver.

pub mod access;
pub mod error;

pub use access::{AccessContext, FacilityContext, FacilityPermission};
pub use error::{CoreError, ErrorCategory, Result};
