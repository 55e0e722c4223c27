//! Caller identity and facility context used by access resolution.
//!
//! An [`AccessContext`] describes who is asking: their roles, permissions,
//! the facility they are currently operating in (if any), and whether they
//! hold the super-admin override. It is built once per request by the server
//! middleware from the external auth provider's gateway headers and consulted
//! by the route registry's resolver.

use serde::{Deserialize, Serialize};

/// Facility-level permission tier, ordered from weakest to strongest.
///
/// `Read < Write < Admin`; a caller satisfies a route's minimum tier when
/// their own tier is greater or equal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FacilityPermission {
    #[default]
    Read,
    Write,
    Admin,
}

impl FacilityPermission {
    /// Parse from the lowercase wire form. Unknown values map to `Read`,
    /// the weakest tier, so a garbled header never grants extra access.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Self::Admin,
            "write" => Self::Write,
            _ => Self::Read,
        }
    }
}

impl std::fmt::Display for FacilityPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// The facility a caller is currently scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityContext {
    /// Facility identifier (tenant boundary).
    pub facility_id: String,

    /// Facility type, e.g. `hospital`, `clinic`. Matched against a route's
    /// `facility_types` restriction when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility_type: Option<String>,

    /// The caller's permission tier within this facility.
    #[serde(default)]
    pub permission: FacilityPermission,
}

impl FacilityContext {
    pub fn new(facility_id: impl Into<String>) -> Self {
        Self {
            facility_id: facility_id.into(),
            facility_type: None,
            permission: FacilityPermission::default(),
        }
    }

    pub fn with_type(mut self, facility_type: impl Into<String>) -> Self {
        self.facility_type = Some(facility_type.into());
        self
    }

    pub fn with_permission(mut self, permission: FacilityPermission) -> Self {
        self.permission = permission;
        self
    }
}

/// Everything access resolution needs to know about the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessContext {
    /// Subject identifier from the auth provider, if authenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Role names held by the caller.
    #[serde(default)]
    pub roles: Vec<String>,

    /// Permission names held by the caller.
    #[serde(default)]
    pub permissions: Vec<String>,

    /// Currently selected facility, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility: Option<FacilityContext>,

    /// Super-admin override: bypasses role, permission, and tenant checks.
    #[serde(default)]
    pub is_super_admin: bool,
}

impl AccessContext {
    /// An unauthenticated, empty context.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context for an authenticated user with the given roles.
    pub fn with_roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn facility(mut self, facility: FacilityContext) -> Self {
        self.facility = Some(facility);
        self
    }

    pub fn super_admin(mut self, is_super_admin: bool) -> Self {
        self.is_super_admin = is_super_admin;
        self
    }

    /// Whether the caller carries any authenticated identity.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some() || !self.roles.is_empty() || self.is_super_admin
    }

    /// Whether the caller holds at least one of the given roles.
    #[must_use]
    pub fn has_any_role(&self, roles: &[String]) -> bool {
        roles.iter().any(|r| self.roles.iter().any(|own| own == r))
    }

    /// Whether the caller holds every one of the given permissions.
    #[must_use]
    pub fn has_all_permissions(&self, permissions: &[String]) -> bool {
        permissions
            .iter()
            .all(|p| self.permissions.iter().any(|own| own == p))
    }
}
