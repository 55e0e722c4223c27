//! Declarative search model: filters, expression trees, per-table configs,
//! and the paginated result envelope.

use careops_core::{CoreError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operator applied to a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "eq")]
    Eq,
    #[serde(rename = "neq")]
    Neq,
    #[serde(rename = "gt")]
    Gt,
    #[serde(rename = "gte")]
    Gte,
    #[serde(rename = "lt")]
    Lt,
    #[serde(rename = "lte")]
    Lte,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "ilike")]
    Ilike,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "is")]
    Is,
    #[serde(rename = "not.is")]
    NotIs,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::Ilike => "ilike",
            Self::In => "in",
            Self::Is => "is",
            Self::NotIs => "not.is",
        }
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One field comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
}

impl SearchFilter {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Case-insensitive substring match, the building block of full-text
    /// search.
    pub fn contains(field: impl Into<String>, term: &str) -> Self {
        Self::new(
            field,
            FilterOperator::Ilike,
            Value::String(format!("%{}%", escape_like(term))),
        )
    }
}

/// Escape LIKE wildcards in user-supplied terms.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Explicit boolean composition of filters.
///
/// A plain filter list composes as AND; full-text search composes one
/// substring filter per field with OR. The tree makes both choices explicit
/// and testable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterExpr {
    Leaf(SearchFilter),
    And(Vec<FilterExpr>),
    Or(Vec<FilterExpr>),
}

impl FilterExpr {
    /// AND-compose filters; `None` when the list is empty, the bare leaf for
    /// a single filter.
    pub fn and_all(filters: impl IntoIterator<Item = SearchFilter>) -> Option<Self> {
        Self::compose(filters, Self::And)
    }

    /// OR-compose filters; `None` when the list is empty.
    pub fn or_all(filters: impl IntoIterator<Item = SearchFilter>) -> Option<Self> {
        Self::compose(filters, Self::Or)
    }

    fn compose(
        filters: impl IntoIterator<Item = SearchFilter>,
        combine: fn(Vec<FilterExpr>) -> Self,
    ) -> Option<Self> {
        let mut leaves: Vec<FilterExpr> = filters.into_iter().map(Self::Leaf).collect();
        match leaves.len() {
            0 => None,
            1 => leaves.pop(),
            _ => Some(combine(leaves)),
        }
    }

    /// Evaluate this expression against a JSON row (in-memory backend).
    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Self::Leaf(filter) => leaf_matches(filter, row),
            Self::And(children) => children.iter().all(|c| c.matches(row)),
            Self::Or(children) => children.iter().any(|c| c.matches(row)),
        }
    }
}

fn leaf_matches(filter: &SearchFilter, row: &Value) -> bool {
    let field = row.get(&filter.field);
    match filter.operator {
        FilterOperator::Eq => field == Some(&filter.value),
        FilterOperator::Neq => field != Some(&filter.value),
        FilterOperator::Gt => compare(field, &filter.value).is_some_and(|o| o.is_gt()),
        FilterOperator::Gte => compare(field, &filter.value).is_some_and(|o| o.is_ge()),
        FilterOperator::Lt => compare(field, &filter.value).is_some_and(|o| o.is_lt()),
        FilterOperator::Lte => compare(field, &filter.value).is_some_and(|o| o.is_le()),
        FilterOperator::Like => like_matches(field, &filter.value, false),
        FilterOperator::Ilike => like_matches(field, &filter.value, true),
        FilterOperator::In => match (&filter.value, field) {
            (Value::Array(candidates), Some(v)) => candidates.contains(v),
            _ => false,
        },
        FilterOperator::Is => match &filter.value {
            Value::Null => field.is_none_or(Value::is_null),
            expected => field == Some(expected),
        },
        FilterOperator::NotIs => match &filter.value {
            Value::Null => field.is_some_and(|v| !v.is_null()),
            expected => field != Some(expected),
        },
    }
}

fn compare(field: Option<&Value>, expected: &Value) -> Option<std::cmp::Ordering> {
    match (field?, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn like_matches(field: Option<&Value>, pattern: &Value, case_insensitive: bool) -> bool {
    let (Some(Value::String(text)), Value::String(pattern)) = (field, pattern) else {
        return false;
    };
    // Interpret the common %term% / term% / %term shapes; escaped wildcards
    // were produced by escape_like and are restored literally.
    let inner = pattern.trim_matches('%').replace("\\%", "%").replace("\\_", "_").replace("\\\\", "\\");
    let (text, inner) = if case_insensitive {
        (text.to_lowercase(), inner.to_lowercase())
    } else {
        (text.clone(), inner)
    };
    match (pattern.starts_with('%'), pattern.ends_with('%')) {
        (true, true) => text.contains(&inner),
        (true, false) => text.ends_with(&inner),
        (false, true) => text.starts_with(&inner),
        (false, false) => text == inner,
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Per-table search behavior. Seeded by the config manager at startup and
/// replaced wholesale on change, never field-mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    pub table_name: String,
    pub searchable_fields: Vec<String>,
    #[serde(default)]
    pub filters: Vec<SearchFilter>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub full_text_search: bool,
}

impl SearchConfig {
    pub const DEFAULT_LIMIT: u64 = 50;

    /// Default config for a table: newest first, page size 50, full-text on.
    pub fn default_for(table_name: impl Into<String>, searchable_fields: Vec<String>) -> Self {
        Self {
            table_name: table_name.into(),
            searchable_fields,
            filters: Vec::new(),
            sort_by: Some("created_at".to_string()),
            sort_order: SortOrder::Desc,
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
            full_text_search: true,
        }
    }
}

/// Paginated result envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub data: Vec<Value>,
    pub count: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub has_more: bool,
}

impl SearchPage {
    /// Assemble a page from backend rows and the exact total count.
    pub fn assemble(data: Vec<Value>, count: u64, limit: u64, offset: u64) -> Result<Self> {
        if limit == 0 {
            return Err(CoreError::invalid_filter("limit must be > 0"));
        }
        let total_pages = count.div_ceil(limit);
        let current_page = offset / limit + 1;
        let has_more = offset + (data.len() as u64) < count;
        Ok(Self {
            data,
            count,
            total_pages,
            current_page,
            has_more,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pagination_envelope_math() {
        let page = SearchPage::assemble(vec![json!({}); 50], 120, 50, 0).unwrap();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 1);
        assert!(page.has_more);

        let last = SearchPage::assemble(vec![json!({}); 20], 120, 50, 100).unwrap();
        assert_eq!(last.current_page, 3);
        assert!(!last.has_more);

        assert!(SearchPage::assemble(Vec::new(), 10, 0, 0).is_err());
    }

    #[test]
    fn and_or_composition() {
        assert!(FilterExpr::and_all([]).is_none());

        let single = FilterExpr::and_all([SearchFilter::new(
            "name",
            FilterOperator::Eq,
            json!("General"),
        )])
        .unwrap();
        assert!(matches!(single, FilterExpr::Leaf(_)));

        let multi = FilterExpr::or_all([
            SearchFilter::contains("name", "gen"),
            SearchFilter::contains("email", "gen"),
        ])
        .unwrap();
        assert!(matches!(multi, FilterExpr::Or(ref v) if v.len() == 2));
    }

    #[test]
    fn leaf_operators_match_rows() {
        let row = json!({
            "name": "General Hospital",
            "beds": 120,
            "email": null,
            "state": "WA"
        });

        let eq = FilterExpr::Leaf(SearchFilter::new("state", FilterOperator::Eq, json!("WA")));
        assert!(eq.matches(&row));

        let gt = FilterExpr::Leaf(SearchFilter::new("beds", FilterOperator::Gt, json!(100)));
        assert!(gt.matches(&row));
        let lt = FilterExpr::Leaf(SearchFilter::new("beds", FilterOperator::Lt, json!(100)));
        assert!(!lt.matches(&row));

        let is_null = FilterExpr::Leaf(SearchFilter::new("email", FilterOperator::Is, json!(null)));
        assert!(is_null.matches(&row));
        let not_null =
            FilterExpr::Leaf(SearchFilter::new("email", FilterOperator::NotIs, json!(null)));
        assert!(!not_null.matches(&row));

        let included = FilterExpr::Leaf(SearchFilter::new(
            "state",
            FilterOperator::In,
            json!(["OR", "WA"]),
        ));
        assert!(included.matches(&row));
    }

    #[test]
    fn ilike_is_case_insensitive_contains() {
        let row = json!({ "name": "General Hospital" });
        let filter = FilterExpr::Leaf(SearchFilter::contains("name", "hosp"));
        assert!(filter.matches(&row));

        let sensitive = FilterExpr::Leaf(SearchFilter::new(
            "name",
            FilterOperator::Like,
            json!("%hosp%"),
        ));
        assert!(!sensitive.matches(&row));
    }

    #[test]
    fn or_tree_matches_any_field() {
        let expr = FilterExpr::or_all([
            SearchFilter::contains("name", "smith"),
            SearchFilter::contains("email", "smith"),
        ])
        .unwrap();

        assert!(expr.matches(&json!({ "name": "Jo", "email": "j.smith@example.org" })));
        assert!(!expr.matches(&json!({ "name": "Jo", "email": "jo@example.org" })));
    }

    #[test]
    fn and_tree_requires_all() {
        let expr = FilterExpr::and_all([
            SearchFilter::contains("name", "smith"),
            SearchFilter::contains("email", "smith"),
        ])
        .unwrap();

        assert!(!expr.matches(&json!({ "name": "Jo", "email": "j.smith@example.org" })));
        assert!(expr.matches(&json!({ "name": "Dr Smith", "email": "j.smith@example.org" })));
    }

    #[test]
    fn like_term_escaping() {
        let filter = SearchFilter::contains("name", "100%");
        assert_eq!(filter.value, json!("%100\\%%"));
    }

    #[test]
    fn default_config_shape() {
        let cfg = SearchConfig::default_for("facilities", vec!["name".to_string()]);
        assert_eq!(cfg.limit, 50);
        assert_eq!(cfg.offset, 0);
        assert_eq!(cfg.sort_by.as_deref(), Some("created_at"));
        assert_eq!(cfg.sort_order, SortOrder::Desc);
        assert!(cfg.full_text_search);
    }

    #[test]
    fn operator_serde_round_trip() {
        let op: FilterOperator = serde_json::from_str("\"not.is\"").unwrap();
        assert_eq!(op, FilterOperator::NotIs);
        assert_eq!(serde_json::to_string(&FilterOperator::Ilike).unwrap(), "\"ilike\"");
    }
}
