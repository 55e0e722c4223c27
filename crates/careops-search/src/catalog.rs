//! Schema catalogs: which text columns of a table are searchable.
//!
//! The catalog is a trait so field discovery can come from the live database
//! schema ([`crate::postgres::PostgresCatalog`]) instead of a guess. The
//! [`StaticCatalog`] carries the known administrative tables and is the
//! offline/test catalog; unknown tables fall back to a generic column set.

use async_trait::async_trait;

/// Discovers queryable text columns for a table.
#[async_trait]
pub trait SchemaCatalog: Send + Sync {
    /// Ordered searchable column names for `table`.
    async fn searchable_fields(&self, table: &str) -> Vec<String>;

    /// All tables this catalog knows about.
    async fn tables(&self) -> Vec<String>;
}

/// Fallback columns for tables the static catalog does not know.
const FALLBACK_FIELDS: [&str; 3] = ["name", "description", "email"];

/// Known administrative tables and their searchable text columns.
const STATIC_FIELDS: [(&str, &[&str]); 7] = [
    ("profiles", &["first_name", "last_name", "email"]),
    ("users", &["first_name", "last_name", "email"]),
    (
        "patients",
        &["first_name", "last_name", "email", "medical_record_number"],
    ),
    ("facilities", &["name", "address", "email", "phone"]),
    ("modules", &["name", "description"]),
    ("roles", &["name", "description"]),
    ("permissions", &["name", "description"]),
];

/// Built-in catalog of the administrative schema.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog;

impl StaticCatalog {
    pub fn new() -> Self {
        Self
    }

    /// All known table names; the trait impl delegates here.
    pub fn table_names() -> Vec<String> {
        STATIC_FIELDS.iter().map(|(name, _)| (*name).to_string()).collect()
    }

    /// Synchronous lookup; the trait impl delegates here.
    pub fn fields_for(table: &str) -> Vec<String> {
        STATIC_FIELDS
            .iter()
            .find(|(name, _)| *name == table)
            .map(|(_, fields)| fields.iter().map(|f| (*f).to_string()).collect())
            .unwrap_or_else(|| FALLBACK_FIELDS.iter().map(|f| (*f).to_string()).collect())
    }
}

#[async_trait]
impl SchemaCatalog for StaticCatalog {
    async fn searchable_fields(&self, table: &str) -> Vec<String> {
        Self::fields_for(table)
    }

    async fn tables(&self) -> Vec<String> {
        Self::table_names()
    }
}
