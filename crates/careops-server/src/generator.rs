//! Route generation: materialize the registry into an axum router.
//!
//! Every active route is mounted with its component's handler, wrapped in a
//! panic-catching layer so one page's failure cannot take down its siblings,
//! and — when the route is neither public nor auth-exempt — an auth gate
//! that defers the allow/deny decision to the registry's resolver.

use std::any::Any;
use std::collections::HashMap;

use axum::{
    Json,
    Router,
    body::Body,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;

use careops_core::{CoreError, Result};
use careops_registry::RouteRegistry;

use crate::handlers;
use crate::middleware as app_middleware;
use crate::state::AppState;

/// Maps component names to their handlers.
///
/// Route configs reference components by name; resolution happens once at
/// startup, and an unknown name is a configuration error that prevents the
/// server from starting.
#[derive(Clone, Default)]
pub struct ComponentResolver {
    components: HashMap<String, MethodRouter<AppState>>,
}

impl ComponentResolver {
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
        }
    }

    /// Resolver with the built-in page components. Each serves the route's
    /// metadata; deployments replace entries with real handlers.
    pub fn with_defaults() -> Self {
        let mut resolver = Self::new();
        for name in [
            "Dashboard",
            "UserManagement",
            "PatientManagement",
            "FacilityManagement",
            "OnboardingWizard",
            "ModuleManagement",
            "ApiServices",
            "SecuritySettings",
            "Reports",
            "TestingSuite",
            "RoleManagement",
            "Login",
        ] {
            resolver.insert(name, axum::routing::get(handlers::page));
        }
        resolver
    }

    pub fn insert(&mut self, name: impl Into<String>, handler: MethodRouter<AppState>) {
        self.components.insert(name.into(), handler);
    }

    pub fn get(&self, name: &str) -> Option<MethodRouter<AppState>> {
        self.components.get(name).cloned()
    }
}

/// Build the page router from the registry.
///
/// Inactive routes are skipped entirely. The generator decides only whether
/// the auth gate is present; it never makes access decisions itself.
pub fn build_routes(
    registry: &RouteRegistry,
    resolver: &ComponentResolver,
    state: AppState,
) -> Result<Router<AppState>> {
    let mut router = Router::new();

    for route in registry.get_all_routes() {
        if !route.is_active {
            continue;
        }

        let handler = resolver
            .get(&route.component)
            .ok_or_else(|| CoreError::unknown_component(&route.component))?;

        let mut page = Router::new().route(&route.path, handler);

        if route.requires_auth && !route.is_public {
            page = page.layer(middleware::from_fn_with_state(
                state.clone(),
                app_middleware::auth_gate,
            ));
        }

        // Fault isolation per page: a panicking handler yields a logged 500
        // for this route only.
        page = page.layer(CatchPanicLayer::custom(handle_panic));

        router = router.merge(page);
    }

    Ok(router)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = %detail, "page handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": { "code": "internal", "message": "Internal server error" }
        })),
    )
        .into_response()
}
