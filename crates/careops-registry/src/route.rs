//! Route configuration: one entry per navigable path.

use careops_core::FacilityPermission;
use serde::{Deserialize, Serialize};

/// Menu grouping for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteCategory {
    Management,
    Admin,
    Reporting,
    System,
}

impl RouteCategory {
    /// All categories in menu display order.
    pub const ALL: [RouteCategory; 4] = [
        Self::Management,
        Self::Admin,
        Self::Reporting,
        Self::System,
    ];
}

impl std::fmt::Display for RouteCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Management => write!(f, "management"),
            Self::Admin => write!(f, "admin"),
            Self::Reporting => write!(f, "reporting"),
            Self::System => write!(f, "system"),
        }
    }
}

/// Describes one navigable path: display metadata, the component it mounts,
/// and the access requirements enforced by the resolver.
///
/// Defaults: `requires_auth = true`, `is_active = true`; everything else is
/// opt-in. `path` is the unique key — re-registering a path silently replaces
/// the prior entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
    /// URL path, unique key within a registry.
    pub path: String,

    /// Name of the handler component mounted at this path.
    pub component: String,

    /// Display title, used for navigation ordering.
    pub title: String,

    /// Display description.
    #[serde(default)]
    pub description: String,

    /// Menu grouping.
    pub category: RouteCategory,

    /// Whether the caller must be authenticated.
    #[serde(default = "default_true")]
    pub requires_auth: bool,

    /// Public routes bypass every access check.
    #[serde(default)]
    pub is_public: bool,

    /// Caller must hold at least one of these roles (empty = no restriction).
    #[serde(default)]
    pub allowed_roles: Vec<String>,

    /// Caller must hold every one of these permissions.
    #[serde(default)]
    pub required_permissions: Vec<String>,

    /// Route operates within one facility's data.
    #[serde(default)]
    pub tenant_scoped: bool,

    /// Route may span facilities even when tenant-scoped.
    #[serde(default)]
    pub cross_tenant: bool,

    /// Allowed facility types (empty = any).
    #[serde(default)]
    pub facility_types: Vec<String>,

    /// Minimum facility-level permission tier, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_permission: Option<FacilityPermission>,

    /// A facility must be selected to use this route.
    #[serde(default)]
    pub require_facility_context: bool,

    /// Inactive routes are never accessible and are not mounted.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl RouteConfig {
    /// Create a route with the defaults applied (`requires_auth = true`,
    /// `is_active = true`, no restrictions).
    pub fn new(
        path: impl Into<String>,
        component: impl Into<String>,
        title: impl Into<String>,
        category: RouteCategory,
    ) -> Self {
        Self {
            path: path.into(),
            component: component.into(),
            title: title.into(),
            description: String::new(),
            category,
            requires_auth: true,
            is_public: false,
            allowed_roles: Vec::new(),
            required_permissions: Vec::new(),
            tenant_scoped: false,
            cross_tenant: false,
            facility_types: Vec::new(),
            facility_permission: None,
            require_facility_context: false,
            is_active: true,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn public(mut self) -> Self {
        self.is_public = true;
        self.requires_auth = false;
        self
    }

    pub fn allowed_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn required_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn tenant_scoped(mut self) -> Self {
        self.tenant_scoped = true;
        self
    }

    pub fn cross_tenant(mut self) -> Self {
        self.cross_tenant = true;
        self
    }

    pub fn facility_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facility_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn facility_permission(mut self, permission: FacilityPermission) -> Self {
        self.facility_permission = Some(permission);
        self
    }

    pub fn require_facility_context(mut self) -> Self {
        self.require_facility_context = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Partial route update applied by shallow merge: `Some` fields replace the
/// stored value, `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub component: Option<String>,
    pub category: Option<RouteCategory>,
    pub requires_auth: Option<bool>,
    pub is_public: Option<bool>,
    pub allowed_roles: Option<Vec<String>>,
    pub required_permissions: Option<Vec<String>>,
    pub tenant_scoped: Option<bool>,
    pub cross_tenant: Option<bool>,
    pub facility_types: Option<Vec<String>>,
    pub facility_permission: Option<FacilityPermission>,
    pub require_facility_context: Option<bool>,
    pub is_active: Option<bool>,
}

impl RouteUpdate {
    /// Apply this update onto an existing config.
    pub(crate) fn apply(self, config: &mut RouteConfig) {
        if let Some(title) = self.title {
            config.title = title;
        }
        if let Some(description) = self.description {
            config.description = description;
        }
        if let Some(component) = self.component {
            config.component = component;
        }
        if let Some(category) = self.category {
            config.category = category;
        }
        if let Some(requires_auth) = self.requires_auth {
            config.requires_auth = requires_auth;
        }
        if let Some(is_public) = self.is_public {
            config.is_public = is_public;
        }
        if let Some(allowed_roles) = self.allowed_roles {
            config.allowed_roles = allowed_roles;
        }
        if let Some(required_permissions) = self.required_permissions {
            config.required_permissions = required_permissions;
        }
        if let Some(tenant_scoped) = self.tenant_scoped {
            config.tenant_scoped = tenant_scoped;
        }
        if let Some(cross_tenant) = self.cross_tenant {
            config.cross_tenant = cross_tenant;
        }
        if let Some(facility_types) = self.facility_types {
            config.facility_types = facility_types;
        }
        if let Some(facility_permission) = self.facility_permission {
            config.facility_permission = Some(facility_permission);
        }
        if let Some(require_facility_context) = self.require_facility_context {
            config.require_facility_context = require_facility_context;
        }
        if let Some(is_active) = self.is_active {
            config.is_active = is_active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_applied_on_new() {
        let route = RouteConfig::new("/users", "UserManagement", "Users", RouteCategory::Management);
        assert!(route.requires_auth);
        assert!(route.is_active);
        assert!(!route.is_public);
        assert!(route.allowed_roles.is_empty());
        assert!(route.facility_permission.is_none());
    }

    #[test]
    fn public_clears_auth_requirement() {
        let route = RouteConfig::new("/login", "Login", "Login", RouteCategory::System).public();
        assert!(route.is_public);
        assert!(!route.requires_auth);
    }

    #[test]
    fn update_is_shallow_merge() {
        let mut route =
            RouteConfig::new("/users", "UserManagement", "Users", RouteCategory::Management)
                .allowed_roles(["admin"]);

        RouteUpdate {
            title: Some("User Management".to_string()),
            is_active: Some(false),
            ..RouteUpdate::default()
        }
        .apply(&mut route);

        assert_eq!(route.title, "User Management");
        assert!(!route.is_active);
        // untouched fields survive
        assert_eq!(route.allowed_roles, vec!["admin".to_string()]);
        assert_eq!(route.component, "UserManagement");
    }

    #[test]
    fn category_display() {
        assert_eq!(RouteCategory::Management.to_string(), "management");
        assert_eq!(RouteCategory::Reporting.to_string(), "reporting");
    }
}
