//! Request middleware: request ids, caller identity, and the auth gate.
//!
//! Identity arrives from the external auth provider as trusted gateway
//! headers; this layer only parses them into an [`AccessContext`] extension.
//! The gate itself defers every allow/deny decision to the registry's
//! resolver.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use uuid::Uuid;

use careops_core::{AccessContext, FacilityContext, FacilityPermission};
use careops_registry::AccessDecision;

use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const USER_ID_HEADER: &str = "x-user-id";
const ROLES_HEADER: &str = "x-user-roles";
const PERMISSIONS_HEADER: &str = "x-user-permissions";
const FACILITY_ID_HEADER: &str = "x-facility-id";
const FACILITY_TYPE_HEADER: &str = "x-facility-type";
const FACILITY_PERMISSION_HEADER: &str = "x-facility-permission";
const SUPER_ADMIN_HEADER: &str = "x-super-admin";

// =============================================================================
// Request ID
// =============================================================================

/// Assign a request id when the caller did not send one, and echo it on the
/// response.
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Ok(value) = HeaderValue::from_str(&id) {
        req.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
        let mut res = next.run(req).await;
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
        res
    } else {
        next.run(req).await
    }
}

// =============================================================================
// Access Context
// =============================================================================

/// Parse the gateway identity headers into an [`AccessContext`] request
/// extension. Absent headers produce the anonymous context; downstream
/// gates decide what that means.
pub async fn access_context(mut req: Request<Body>, next: Next) -> Response {
    let ctx = context_from_headers(&req);
    req.extensions_mut().insert(ctx);
    next.run(req).await
}

fn context_from_headers(req: &Request<Body>) -> AccessContext {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    let list = |name: &str| {
        header(name)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    };

    let facility = header(FACILITY_ID_HEADER).map(|facility_id| {
        let mut facility = FacilityContext::new(facility_id);
        if let Some(facility_type) = header(FACILITY_TYPE_HEADER) {
            facility = facility.with_type(facility_type);
        }
        if let Some(permission) = header(FACILITY_PERMISSION_HEADER) {
            facility = facility.with_permission(FacilityPermission::parse_lenient(permission));
        }
        facility
    });

    AccessContext {
        user_id: header(USER_ID_HEADER).map(str::to_string),
        roles: list(ROLES_HEADER),
        permissions: list(PERMISSIONS_HEADER),
        facility,
        is_super_admin: header(SUPER_ADMIN_HEADER)
            .is_some_and(|v| v.eq_ignore_ascii_case("true")),
    }
}

/// The caller's parsed context, or anonymous when the middleware did not run.
pub fn caller(req: &Request<Body>) -> AccessContext {
    req.extensions()
        .get::<AccessContext>()
        .cloned()
        .unwrap_or_else(AccessContext::anonymous)
}

// =============================================================================
// Auth Gate
// =============================================================================

/// Per-route auth gate, attached by the route generator to routes with
/// `requires_auth && !is_public`. Consults the registry's resolver for the
/// requested path and answers 401/403 with the structured deny reason.
pub async fn auth_gate(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let ctx = caller(&req);

    match state.registry.resolve(&path, &ctx) {
        Some(AccessDecision::Allow) => next.run(req).await,
        Some(AccessDecision::Deny(reason)) => {
            tracing::debug!(%path, code = %reason.code, "access denied");
            let status = if reason.code == "unauthenticated" {
                StatusCode::UNAUTHORIZED
            } else {
                StatusCode::FORBIDDEN
            };
            (status, Json(json!({ "error": reason }))).into_response()
        }
        // Path not in the registry: the route was unregistered after mount.
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "code": "route-not-found", "message": "Route not found" } })),
        )
            .into_response(),
    }
}

/// Coarse gate for the /system endpoints: any authenticated identity passes,
/// fine-grained checks happen per query against the registry.
pub async fn require_auth(req: Request<Body>, next: Next) -> Response {
    if caller(&req).is_authenticated() {
        next.run(req).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "code": "unauthenticated", "message": "Authentication required" } })),
        )
            .into_response()
    }
}
