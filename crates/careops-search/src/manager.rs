//! Per-table search configuration ownership.
//!
//! The manager holds one [`SearchConfig`] per table in a concurrent map.
//! `auto_detect` seeds a default config for every table the catalog knows —
//! invoked explicitly during server bootstrap, not on a background timer, so
//! startup order is deterministic and tests control when it runs.

use dashmap::DashMap;
use tracing::info;

use crate::catalog::SchemaCatalog;
use crate::types::SearchConfig;

/// Owns per-table search configs.
#[derive(Debug, Default)]
pub struct SearchConfigManager {
    configs: DashMap<String, SearchConfig>,
}

impl SearchConfigManager {
    pub fn new() -> Self {
        Self {
            configs: DashMap::new(),
        }
    }

    /// Seed a default config for every table the catalog reports.
    /// Existing configs for a table are replaced. Returns how many tables
    /// were seeded.
    pub async fn auto_detect(&self, catalog: &dyn SchemaCatalog) -> usize {
        let tables = catalog.tables().await;
        for table in &tables {
            let fields = catalog.searchable_fields(table).await;
            self.configs
                .insert(table.clone(), SearchConfig::default_for(table, fields));
        }
        info!(tables = tables.len(), "search capabilities detected");
        tables.len()
    }

    /// The config for a table, if one is registered.
    pub fn get(&self, table: &str) -> Option<SearchConfig> {
        self.configs.get(table).map(|entry| entry.value().clone())
    }

    /// Replace a table's config wholesale.
    pub fn set(&self, config: SearchConfig) {
        self.configs.insert(config.table_name.clone(), config);
    }

    /// Remove a table's config; returns whether one existed.
    pub fn remove(&self, table: &str) -> bool {
        self.configs.remove(table).is_some()
    }

    /// All tables with a registered config, sorted.
    pub fn tables(&self) -> Vec<String> {
        let mut tables: Vec<String> =
            self.configs.iter().map(|entry| entry.key().clone()).collect();
        tables.sort();
        tables
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
