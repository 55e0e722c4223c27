//! The route registry: a concurrent map from path to [`RouteConfig`].
//!
//! Categories are a derived view — `routes_by_category` filters the path map
//! on read, so category membership can never drift from the stored route.
//! Uses DashMap for lock-free concurrent access; all mutation happens at
//! startup and through explicit admin operations.

use dashmap::DashMap;
use indexmap::IndexMap;
use serde::Serialize;

use careops_core::{AccessContext, CoreError, Result};

use crate::navigation::{self, NavigationSection};
use crate::resolver::{self, AccessDecision};
use crate::route::{RouteCategory, RouteConfig, RouteUpdate};

/// Central catalogue of routes plus role/tenant-aware access queries.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: DashMap<String, RouteConfig>,
}

/// Aggregate counts over a registry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total_routes: usize,
    pub by_category: IndexMap<String, usize>,
    pub auth_required: usize,
    pub public: usize,
}

impl RouteRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            routes: DashMap::new(),
        }
    }

    /// Register a route.
    ///
    /// Fails when `path` or `component` is empty — a startup configuration
    /// error. There is no duplicate-path detection: re-registering a path
    /// silently replaces the prior entry.
    pub fn register(&self, config: RouteConfig) -> Result<()> {
        if config.path.trim().is_empty() {
            return Err(CoreError::invalid_route_config(
                "route registration requires a non-empty path",
            ));
        }
        if config.component.trim().is_empty() {
            return Err(CoreError::invalid_route_config(format!(
                "route '{}' registration requires a component",
                config.path
            )));
        }

        let path = config.path.clone();
        if self.routes.insert(path.clone(), config).is_some() {
            tracing::debug!(%path, "route re-registered, prior entry replaced");
        }
        Ok(())
    }

    /// Register several routes in order; stops at the first failure.
    pub fn register_batch(&self, configs: impl IntoIterator<Item = RouteConfig>) -> Result<()> {
        for config in configs {
            self.register(config)?;
        }
        Ok(())
    }

    /// Look up a route by path.
    pub fn get_route(&self, path: &str) -> Option<RouteConfig> {
        self.routes.get(path).map(|entry| entry.value().clone())
    }

    /// All registered routes, in no particular order.
    pub fn get_all_routes(&self) -> Vec<RouteConfig> {
        self.routes.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Routes in one category — derived from the path map on read.
    pub fn routes_by_category(&self, category: RouteCategory) -> Vec<RouteConfig> {
        self.routes
            .iter()
            .filter(|entry| entry.value().category == category)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// All routes the caller may access.
    pub fn accessible_routes(&self, ctx: &AccessContext) -> Vec<RouteConfig> {
        self.routes
            .iter()
            .filter(|entry| resolver::resolve(entry.value(), ctx).is_allowed())
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Whether the caller may access the route at `path`.
    /// Unknown paths are not accessible.
    pub fn can_access(&self, path: &str, ctx: &AccessContext) -> bool {
        self.resolve(path, ctx).is_some_and(|d| d.is_allowed())
    }

    /// Full access decision for the route at `path`, or `None` when unknown.
    pub fn resolve(&self, path: &str, ctx: &AccessContext) -> Option<AccessDecision> {
        self.routes
            .get(path)
            .map(|entry| resolver::resolve(entry.value(), ctx))
    }

    /// Navigation menu for the caller: accessible routes grouped by category,
    /// each group sorted ascending by title.
    pub fn navigation_items(&self, ctx: &AccessContext) -> Vec<NavigationSection> {
        navigation::build(self.accessible_routes(ctx))
    }

    /// Shallow-merge a partial update into the route at `path`.
    /// No-op when the path is unknown; returns whether a route was updated.
    pub fn update_route(&self, path: &str, update: RouteUpdate) -> bool {
        match self.routes.get_mut(path) {
            Some(mut entry) => {
                update.apply(entry.value_mut());
                true
            }
            None => false,
        }
    }

    /// Remove the route at `path`; returns whether an entry existed.
    pub fn unregister(&self, path: &str) -> bool {
        self.routes.remove(path).is_some()
    }

    /// Aggregate counts: total, per-category, auth-required, public.
    pub fn stats(&self) -> RegistryStats {
        let mut by_category: IndexMap<String, usize> = RouteCategory::ALL
            .iter()
            .map(|c| (c.to_string(), 0))
            .collect();
        let mut auth_required = 0;
        let mut public = 0;

        for entry in self.routes.iter() {
            let route = entry.value();
            *by_category.entry(route.category.to_string()).or_insert(0) += 1;
            if route.requires_auth && !route.is_public {
                auth_required += 1;
            }
            if route.is_public {
                public += 1;
            }
        }

        RegistryStats {
            total_routes: self.routes.len(),
            by_category,
            auth_required,
            public,
        }
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the registry holds no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
