//! Declarative, per-table search over the administrative database.
//!
//! The search stack has four layers:
//!
//! - [`catalog`] — discovers the searchable text columns of a table, either
//!   from the live database schema or from a static catalog.
//! - [`types`] — the declarative model: filters, an explicit boolean
//!   expression tree ([`FilterExpr`]), per-table [`SearchConfig`], and the
//!   paginated [`SearchPage`] envelope.
//! - [`sql`] — renders an expression tree into a parameterized PostgreSQL
//!   query; all user input travels as bind parameters.
//! - [`backend`] / [`engine`] — execution. The [`SearchBackend`] trait
//!   separates query semantics from transport; the in-memory backend
//!   evaluates expressions in process (used by tests), the PostgreSQL
//!   backend executes the rendered SQL.

pub mod backend;
pub mod catalog;
pub mod engine;
pub mod manager;
pub mod postgres;
pub mod sql;
pub mod types;

pub use backend::{BackendPage, DynBackend, MemoryBackend, SearchBackend, TableQuery};
pub use catalog::{SchemaCatalog, StaticCatalog};
pub use engine::SearchEngine;
pub use manager::SearchConfigManager;
pub use postgres::{PostgresBackend, PostgresCatalog};
pub use types::{FilterExpr, FilterOperator, SearchConfig, SearchFilter, SearchPage, SortOrder};
