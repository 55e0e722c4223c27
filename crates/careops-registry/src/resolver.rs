//! Access resolution: the single place every access-relevant route field is
//! enforced.
//!
//! The resolver is a pure function over a route and a caller context. Checks
//! run in a fixed order; the first failing check produces a [`DenyReason`]
//! naming exactly what was missing, which the server surfaces in 401/403
//! responses and logs.

use careops_core::AccessContext;
use serde::Serialize;

use crate::route::RouteConfig;

// =============================================================================
// Access Decision
// =============================================================================

/// Result of access resolution.
#[derive(Debug, Clone)]
pub enum AccessDecision {
    /// Access is granted.
    Allow,
    /// Access is denied with a reason.
    Deny(DenyReason),
}

impl AccessDecision {
    /// Returns `true` if access was granted.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns `true` if access was denied.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Deny(_))
    }

    /// Get the deny reason if access was denied.
    #[must_use]
    pub fn deny_reason(&self) -> Option<&DenyReason> {
        match self {
            Self::Deny(reason) => Some(reason),
            Self::Allow => None,
        }
    }
}

// =============================================================================
// Deny Reason
// =============================================================================

/// Reason for access denial.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DenyReason {
    /// Error code for programmatic handling.
    pub code: String,

    /// Human-readable error message.
    pub message: String,
}

impl DenyReason {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn route_inactive() -> Self {
        Self::new("route-inactive", "Route is not active")
    }

    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::new("unauthenticated", "Authentication required")
    }

    #[must_use]
    pub fn role_required(roles: &[String]) -> Self {
        Self::new(
            "role-required",
            format!("Requires one of roles: {}", roles.join(", ")),
        )
    }

    #[must_use]
    pub fn permission_required(permissions: &[String]) -> Self {
        Self::new(
            "permission-required",
            format!("Requires permissions: {}", permissions.join(", ")),
        )
    }

    #[must_use]
    pub fn facility_required() -> Self {
        Self::new(
            "facility-required",
            "A facility must be selected for this route",
        )
    }

    #[must_use]
    pub fn facility_type_mismatch(types: &[String]) -> Self {
        Self::new(
            "facility-type-mismatch",
            format!("Route is limited to facility types: {}", types.join(", ")),
        )
    }

    #[must_use]
    pub fn facility_permission_insufficient(required: &str) -> Self {
        Self::new(
            "facility-permission-insufficient",
            format!("Requires facility permission: {required}"),
        )
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolve whether `ctx` may access `route`.
///
/// Check order: inactive, public, authentication, super-admin override,
/// roles, permissions, tenant scope, facility-context requirement, facility
/// type, facility permission tier. Public routes pass unconditionally;
/// super-admins bypass everything after the public check.
pub fn resolve(route: &RouteConfig, ctx: &AccessContext) -> AccessDecision {
    if !route.is_active {
        return AccessDecision::Deny(DenyReason::route_inactive());
    }

    if route.is_public {
        return AccessDecision::Allow;
    }

    if route.requires_auth && !ctx.is_authenticated() {
        return AccessDecision::Deny(DenyReason::unauthenticated());
    }

    if ctx.is_super_admin {
        return AccessDecision::Allow;
    }

    if !route.allowed_roles.is_empty() && !ctx.has_any_role(&route.allowed_roles) {
        return AccessDecision::Deny(DenyReason::role_required(&route.allowed_roles));
    }

    if !ctx.has_all_permissions(&route.required_permissions) {
        return AccessDecision::Deny(DenyReason::permission_required(
            &route.required_permissions,
        ));
    }

    let needs_facility =
        (route.tenant_scoped && !route.cross_tenant) || route.require_facility_context;
    let facility = match (&ctx.facility, needs_facility) {
        (Some(facility), _) => Some(facility),
        (None, true) => return AccessDecision::Deny(DenyReason::facility_required()),
        (None, false) => None,
    };

    if !route.facility_types.is_empty() {
        let matches_type = facility
            .and_then(|f| f.facility_type.as_deref())
            .is_some_and(|t| route.facility_types.iter().any(|allowed| allowed == t));
        if !matches_type {
            return AccessDecision::Deny(DenyReason::facility_type_mismatch(
                &route.facility_types,
            ));
        }
    }

    if let Some(required) = route.facility_permission {
        let held = facility.map(|f| f.permission);
        if held.is_none_or(|held| held < required) {
            return AccessDecision::Deny(DenyReason::facility_permission_insufficient(
                &required.to_string(),
            ));
        }
    }

    AccessDecision::Allow
}
