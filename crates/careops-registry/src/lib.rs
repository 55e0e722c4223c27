//! Role-aware route registry and access resolution.
//!
//! The registry is the central catalogue of navigable paths: each entry is a
//! [`RouteConfig`] describing display metadata, the handler component it
//! mounts, and the access requirements a caller must satisfy. Registries are
//! plain constructed values — the server builds one at startup and injects it
//! into its state, tests build isolated instances.
//!
//! Access decisions go through a single resolver ([`resolver::resolve`]); every
//! access-relevant field declared on [`RouteConfig`] is enforced there, so no
//! flag is advisory.

pub mod navigation;
pub mod registry;
pub mod resolver;
pub mod route;

pub use navigation::{NavigationEntry, NavigationSection};
pub use registry::{RegistryStats, RouteRegistry};
pub use resolver::{AccessDecision, DenyReason};
pub use route::{RouteCategory, RouteConfig, RouteUpdate};
