//! Search execution: turns a [`SearchConfig`] into a backend query and a
//! paginated envelope.

use careops_core::{CoreError, Result};

use crate::backend::{DynBackend, TableQuery};
use crate::types::{FilterExpr, SearchConfig, SearchFilter, SearchPage};

/// Executes declarative searches against a backend.
#[derive(Clone)]
pub struct SearchEngine {
    backend: DynBackend,
}

impl SearchEngine {
    pub fn new(backend: DynBackend) -> Self {
        Self { backend }
    }

    /// Execute a config's search: its filters AND-composed, its sort and
    /// page window applied. Returns the paginated envelope with the exact
    /// total count.
    pub async fn execute_search(&self, config: &SearchConfig) -> Result<SearchPage> {
        let expr = FilterExpr::and_all(config.filters.iter().cloned());
        self.run(config, expr).await
    }

    /// Full-text search: one case-insensitive substring filter per
    /// searchable field, OR-composed, so a row matching the term in any
    /// field is returned. Configs with `full_text_search` disabled are
    /// rejected.
    pub async fn full_text_search(&self, config: &SearchConfig, term: &str) -> Result<SearchPage> {
        if !config.full_text_search {
            return Err(CoreError::invalid_filter(format!(
                "full-text search is disabled for table '{}'",
                config.table_name
            )));
        }
        let term = term.trim();
        if term.is_empty() {
            return Err(CoreError::invalid_filter("search term must not be empty"));
        }
        if config.searchable_fields.is_empty() {
            return Err(CoreError::invalid_filter(format!(
                "table '{}' has no searchable fields",
                config.table_name
            )));
        }

        let expr = FilterExpr::or_all(
            config
                .searchable_fields
                .iter()
                .map(|field| SearchFilter::contains(field, term)),
        );
        self.run(config, expr).await
    }

    async fn run(&self, config: &SearchConfig, expr: Option<FilterExpr>) -> Result<SearchPage> {
        if config.limit == 0 {
            return Err(CoreError::invalid_filter("limit must be > 0"));
        }

        let query = TableQuery {
            table: config.table_name.clone(),
            expr,
            sort_by: config.sort_by.clone(),
            sort_order: config.sort_order,
            limit: config.limit,
            offset: config.offset,
        };

        let page = self.backend.fetch(&query).await?;
        SearchPage::assemble(page.rows, page.total, config.limit, config.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::types::{FilterOperator, SortOrder};
    use serde_json::json;
    use std::sync::Arc;
    use tokio_test::block_on;

    fn engine_with_patients(total: usize) -> SearchEngine {
        let backend = MemoryBackend::new();
        for i in 0..total {
            backend.insert(
                "patients",
                json!({
                    "first_name": format!("Patient{i}"),
                    "last_name": if i % 2 == 0 { "Smith" } else { "Jones" },
                    "email": format!("p{i}@example.org"),
                    "created_at": format!("2024-01-{:02}", i % 28 + 1),
                }),
            );
        }
        SearchEngine::new(Arc::new(backend))
    }

    fn config() -> SearchConfig {
        SearchConfig::default_for(
            "patients",
            vec![
                "first_name".to_string(),
                "last_name".to_string(),
                "email".to_string(),
            ],
        )
    }

    #[test]
    fn pagination_envelope_from_backend_count() {
        let engine = engine_with_patients(120);
        let page = block_on(engine.execute_search(&config())).unwrap();

        assert_eq!(page.count, 120);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 1);
        assert!(page.has_more);
        assert_eq!(page.data.len(), 50);
    }

    #[test]
    fn config_filters_compose_as_and() {
        let engine = engine_with_patients(10);
        let mut cfg = config();
        cfg.filters = vec![
            SearchFilter::new("last_name", FilterOperator::Eq, json!("Smith")),
            SearchFilter::contains("email", "p2@"),
        ];

        let page = block_on(engine.execute_search(&cfg)).unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.data[0]["first_name"], json!("Patient2"));
    }

    #[test]
    fn full_text_matches_any_field() {
        let engine = engine_with_patients(10);
        let mut cfg = config();
        cfg.sort_by = Some("first_name".to_string());
        cfg.sort_order = SortOrder::Asc;

        // "jones" appears only in last_name; "p3@" only in email
        let by_name = block_on(engine.full_text_search(&cfg, "jones")).unwrap();
        assert_eq!(by_name.count, 5);

        let by_email = block_on(engine.full_text_search(&cfg, "p3@")).unwrap();
        assert_eq!(by_email.count, 1);
        assert_eq!(by_email.data[0]["first_name"], json!("Patient3"));
    }

    #[test]
    fn full_text_rejects_empty_term_and_fieldless_config() {
        let engine = engine_with_patients(1);
        assert!(block_on(engine.full_text_search(&config(), "  ")).is_err());

        let mut cfg = config();
        cfg.searchable_fields.clear();
        assert!(block_on(engine.full_text_search(&cfg, "smith")).is_err());
    }

    #[test]
    fn full_text_respects_disabled_flag() {
        let engine = engine_with_patients(5);
        let mut cfg = config();
        cfg.full_text_search = false;

        let err = block_on(engine.full_text_search(&cfg, "smith")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFilter { .. }));
        // plain filtered search is unaffected
        assert!(block_on(engine.execute_search(&cfg)).is_ok());
    }

    #[test]
    fn zero_limit_rejected() {
        let engine = engine_with_patients(1);
        let mut cfg = config();
        cfg.limit = 0;
        assert!(block_on(engine.execute_search(&cfg)).is_err());
    }

    #[test]
    fn backend_errors_propagate() {
        let engine = SearchEngine::new(Arc::new(MemoryBackend::new()));
        let err = block_on(engine.execute_search(&config())).unwrap_err();
        assert!(matches!(err, CoreError::UnknownTable(_)));
    }
}
