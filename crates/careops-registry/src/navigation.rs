//! Navigation menus derived from accessible routes.

use serde::Serialize;

use crate::route::{RouteCategory, RouteConfig};

/// One entry in a navigation menu.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEntry {
    pub path: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl From<&RouteConfig> for NavigationEntry {
    fn from(route: &RouteConfig) -> Self {
        Self {
            path: route.path.clone(),
            title: route.title.clone(),
            description: route.description.clone(),
        }
    }
}

/// A category of navigation entries, sorted ascending by title.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSection {
    pub category: RouteCategory,
    pub routes: Vec<NavigationEntry>,
}

/// Group routes by category and sort each group by title. Categories appear
/// in display order ([`RouteCategory::ALL`]); empty categories are omitted.
pub fn build(routes: Vec<RouteConfig>) -> Vec<NavigationSection> {
    RouteCategory::ALL
        .iter()
        .filter_map(|&category| {
            let mut entries: Vec<NavigationEntry> = routes
                .iter()
                .filter(|r| r.category == category)
                .map(NavigationEntry::from)
                .collect();
            if entries.is_empty() {
                return None;
            }
            entries.sort_by(|a, b| a.title.cmp(&b.title));
            Some(NavigationSection { category, routes: entries })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(path: &str, title: &str, category: RouteCategory) -> RouteConfig {
        RouteConfig::new(path, "Page", title, category)
    }

    #[test]
    fn groups_by_category_and_sorts_by_title() {
        let sections = build(vec![
            route("/users", "Users", RouteCategory::Management),
            route("/facilities", "Facilities", RouteCategory::Management),
            route("/reports", "Reports", RouteCategory::Reporting),
            route("/api-services", "API Services", RouteCategory::Management),
        ]);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].category, RouteCategory::Management);
        let titles: Vec<_> = sections[0].routes.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["API Services", "Facilities", "Users"]);
        assert_eq!(sections[1].category, RouteCategory::Reporting);
    }

    #[test]
    fn empty_categories_omitted() {
        let sections = build(vec![route("/testing", "Testing", RouteCategory::System)]);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].category, RouteCategory::System);
    }

    #[test]
    fn no_routes_yields_no_sections() {
        assert!(build(Vec::new()).is_empty());
    }
}
