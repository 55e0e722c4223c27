//! Shared server state injected into every handler.

use std::sync::Arc;

use careops_registry::RouteRegistry;
use careops_search::{SearchConfigManager, SearchEngine};

use crate::config::SearchSettings;

/// Constructed once at startup and cloned into the router. Tests build their
/// own instances with isolated registries and in-memory backends.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RouteRegistry>,
    pub search_configs: Arc<SearchConfigManager>,
    pub engine: SearchEngine,
    /// Configured request bounds enforced by the search handlers.
    pub search: SearchSettings,
}

impl AppState {
    pub fn new(
        registry: Arc<RouteRegistry>,
        search_configs: Arc<SearchConfigManager>,
        engine: SearchEngine,
    ) -> Self {
        Self {
            registry,
            search_configs,
            engine,
            search: SearchSettings::default(),
        }
    }

    pub fn with_search_settings(mut self, search: SearchSettings) -> Self {
        self.search = search;
        self
    }
}
