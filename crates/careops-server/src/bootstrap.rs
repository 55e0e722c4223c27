//! Startup initialization: the route table and the search configs.
//!
//! Routes are created once here and live in memory for the process lifetime.
//! Registration failures are fatal — a misconfigured route table must not
//! produce a partially navigable server.

use std::sync::Arc;

use careops_core::{FacilityPermission, Result};
use careops_registry::{RouteCategory, RouteConfig, RouteRegistry};
use careops_search::{SchemaCatalog, SearchConfigManager};
use tracing::info;

/// Register the administrative route table.
pub fn initialize_routes(registry: &RouteRegistry) -> Result<()> {
    registry.register_batch([
        RouteConfig::new("/", "Dashboard", "Dashboard", RouteCategory::Management)
            .description("Administrative overview"),
        RouteConfig::new("/login", "Login", "Login", RouteCategory::System)
            .description("Sign in")
            .public(),
        RouteConfig::new("/users", "UserManagement", "Users", RouteCategory::Management)
            .description("Manage user accounts")
            .allowed_roles(["admin", "superAdmin"])
            .required_permissions(["users.read"]),
        RouteConfig::new(
            "/patients",
            "PatientManagement",
            "Patients",
            RouteCategory::Management,
        )
        .description("Patient records for the selected facility")
        .tenant_scoped(),
        RouteConfig::new(
            "/facilities",
            "FacilityManagement",
            "Facilities",
            RouteCategory::Management,
        )
        .description("Manage facilities")
        .allowed_roles(["admin", "superAdmin"]),
        RouteConfig::new(
            "/onboarding",
            "OnboardingWizard",
            "Onboarding",
            RouteCategory::Management,
        )
        .description("Facility onboarding wizard")
        .tenant_scoped()
        .require_facility_context()
        .facility_permission(FacilityPermission::Write),
        RouteConfig::new(
            "/modules",
            "ModuleManagement",
            "Modules",
            RouteCategory::Admin,
        )
        .description("Enable and configure modules")
        .allowed_roles(["superAdmin"]),
        RouteConfig::new(
            "/api-services",
            "ApiServices",
            "API Services",
            RouteCategory::Admin,
        )
        .description("API integration registry")
        .allowed_roles(["superAdmin"]),
        RouteConfig::new(
            "/security",
            "SecuritySettings",
            "Security",
            RouteCategory::Admin,
        )
        .description("Security settings")
        .allowed_roles(["superAdmin"]),
        RouteConfig::new(
            "/role-management",
            "RoleManagement",
            "Role Management",
            RouteCategory::Admin,
        )
        .description("Roles and permission assignments")
        .allowed_roles(["superAdmin"]),
        RouteConfig::new("/reports", "Reports", "Reports", RouteCategory::Reporting)
            .description("Cross-facility reporting")
            .tenant_scoped()
            .cross_tenant(),
        RouteConfig::new("/testing", "TestingSuite", "Testing", RouteCategory::System)
            .description("Testing and verification dashboard")
            .allowed_roles(["superAdmin", "qa"]),
    ])?;

    info!(routes = registry.len(), "route table initialized");
    Ok(())
}

/// Seed per-table search configs from the schema catalog.
pub async fn initialize_search(
    manager: &SearchConfigManager,
    catalog: &dyn SchemaCatalog,
) -> usize {
    manager.auto_detect(catalog).await
}

/// Convenience constructor for a fully initialized registry.
pub fn build_registry() -> Result<Arc<RouteRegistry>> {
    let registry = Arc::new(RouteRegistry::new());
    initialize_routes(&registry)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use careops_core::AccessContext;
    use careops_search::StaticCatalog;
    use tokio_test::block_on;

    #[test]
    fn route_table_registers_cleanly() {
        let registry = build_registry().unwrap();
        assert_eq!(registry.len(), 12);

        let stats = registry.stats();
        assert_eq!(stats.total_routes, 12);
        assert_eq!(stats.public, 1);
        assert_eq!(stats.auth_required, 11);
    }

    #[test]
    fn nurse_navigation_excludes_admin_routes() {
        let registry = build_registry().unwrap();
        let nurse = AccessContext::with_roles(["nurse"]);

        let sections = registry.navigation_items(&nurse);
        let paths: Vec<String> = sections
            .iter()
            .flat_map(|s| s.routes.iter().map(|r| r.path.clone()))
            .collect();

        assert!(paths.contains(&"/".to_string()));
        assert!(paths.contains(&"/login".to_string()));
        assert!(paths.contains(&"/reports".to_string()));
        assert!(!paths.contains(&"/security".to_string()));
        assert!(!paths.contains(&"/patients".to_string())); // no facility selected
    }

    #[test]
    fn super_admin_sees_every_active_route() {
        let registry = build_registry().unwrap();
        let admin = AccessContext::anonymous().super_admin(true);
        assert_eq!(registry.accessible_routes(&admin).len(), 12);
    }

    #[test]
    fn search_configs_seeded_from_catalog() {
        let manager = SearchConfigManager::new();
        let seeded = block_on(initialize_search(&manager, &StaticCatalog::new()));
        assert_eq!(seeded, 7);
        assert!(manager.get("facilities").is_some());
    }
}
