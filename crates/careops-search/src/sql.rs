//! Renders filter expressions into parameterized PostgreSQL queries.
//!
//! All identifiers (table and column names) are validated to alphanumerics
//! and underscores before they reach SQL text; every user-supplied value
//! travels as a bind parameter. Rows are selected as `to_jsonb(t.*)` so the
//! backend needs no per-table row mapping.

use careops_core::{CoreError, Result};
use serde_json::Value;

use crate::types::{FilterExpr, FilterOperator, SortOrder};

/// A bindable value for a `$n` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    TextArray(Vec<String>),
}

impl BindValue {
    /// Convert a JSON filter value into a bindable scalar.
    fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err(CoreError::invalid_filter(format!("unbindable number: {n}")))
                }
            }
            other => Err(CoreError::invalid_filter(format!(
                "unbindable filter value: {other}"
            ))),
        }
    }

    /// Convert a JSON array into a text-array bind for `= ANY($n)`.
    fn text_array(value: &Value) -> Result<Self> {
        let Value::Array(items) = value else {
            return Err(CoreError::invalid_filter(
                "'in' operator requires an array value",
            ));
        };
        let mut texts = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(s) => texts.push(s.clone()),
                Value::Number(n) => texts.push(n.to_string()),
                other => {
                    return Err(CoreError::invalid_filter(format!(
                        "'in' operator requires scalar elements, got {other}"
                    )));
                }
            }
        }
        Ok(Self::TextArray(texts))
    }
}

/// A rendered query: SQL text plus its bind parameters in order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

/// Validate an identifier (table name, column name).
///
/// Only allows ASCII alphanumerics and underscores, not starting with a
/// digit.
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_head = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_head && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(CoreError::invalid_identifier(name))
    }
}

/// Render the page-select query for a table.
pub fn build_select(
    table: &str,
    expr: Option<&FilterExpr>,
    sort_by: Option<&str>,
    sort_order: SortOrder,
    limit: u64,
    offset: u64,
) -> Result<SqlQuery> {
    validate_identifier(table)?;

    let mut sql = format!("SELECT to_jsonb(t.*) AS data FROM \"{table}\" t");
    let mut binds = Vec::new();

    if let Some(expr) = expr {
        let clause = render_expr(expr, &mut binds)?;
        sql.push_str(" WHERE ");
        sql.push_str(&clause);
    }

    if let Some(sort_by) = sort_by {
        validate_identifier(sort_by)?;
        sql.push_str(&format!(" ORDER BY t.\"{sort_by}\" {}", sort_order.as_sql()));
    }

    sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
    Ok(SqlQuery { sql, binds })
}

/// Render the matching exact-count query.
pub fn build_count(table: &str, expr: Option<&FilterExpr>) -> Result<SqlQuery> {
    validate_identifier(table)?;

    let mut sql = format!("SELECT COUNT(*) FROM \"{table}\" t");
    let mut binds = Vec::new();

    if let Some(expr) = expr {
        let clause = render_expr(expr, &mut binds)?;
        sql.push_str(" WHERE ");
        sql.push_str(&clause);
    }
    Ok(SqlQuery { sql, binds })
}

fn render_expr(expr: &FilterExpr, binds: &mut Vec<BindValue>) -> Result<String> {
    match expr {
        FilterExpr::Leaf(filter) => render_leaf(filter, binds),
        FilterExpr::And(children) => render_children(children, " AND ", binds),
        FilterExpr::Or(children) => render_children(children, " OR ", binds),
    }
}

fn render_children(
    children: &[FilterExpr],
    joiner: &str,
    binds: &mut Vec<BindValue>,
) -> Result<String> {
    if children.is_empty() {
        return Err(CoreError::invalid_filter("empty boolean expression"));
    }
    let rendered: Vec<String> = children
        .iter()
        .map(|c| render_expr(c, binds))
        .collect::<Result<_>>()?;
    Ok(format!("({})", rendered.join(joiner)))
}

fn render_leaf(
    filter: &crate::types::SearchFilter,
    binds: &mut Vec<BindValue>,
) -> Result<String> {
    validate_identifier(&filter.field)?;
    let column = format!("t.\"{}\"", filter.field);

    let comparison = |op: &str, bind: BindValue, binds: &mut Vec<BindValue>| {
        binds.push(bind);
        format!("{column} {op} ${}", binds.len())
    };

    Ok(match filter.operator {
        FilterOperator::Eq => comparison("=", BindValue::from_json(&filter.value)?, binds),
        FilterOperator::Neq => comparison("<>", BindValue::from_json(&filter.value)?, binds),
        FilterOperator::Gt => comparison(">", BindValue::from_json(&filter.value)?, binds),
        FilterOperator::Gte => comparison(">=", BindValue::from_json(&filter.value)?, binds),
        FilterOperator::Lt => comparison("<", BindValue::from_json(&filter.value)?, binds),
        FilterOperator::Lte => comparison("<=", BindValue::from_json(&filter.value)?, binds),
        FilterOperator::Like => comparison("LIKE", BindValue::from_json(&filter.value)?, binds),
        FilterOperator::Ilike => comparison("ILIKE", BindValue::from_json(&filter.value)?, binds),
        FilterOperator::In => {
            binds.push(BindValue::text_array(&filter.value)?);
            format!("{column}::text = ANY(${})", binds.len())
        }
        FilterOperator::Is => match &filter.value {
            Value::Null => format!("{column} IS NULL"),
            Value::Bool(true) => format!("{column} IS TRUE"),
            Value::Bool(false) => format!("{column} IS FALSE"),
            other => {
                return Err(CoreError::invalid_filter(format!(
                    "'is' operator requires null or boolean, got {other}"
                )));
            }
        },
        FilterOperator::NotIs => match &filter.value {
            Value::Null => format!("{column} IS NOT NULL"),
            Value::Bool(true) => format!("{column} IS NOT TRUE"),
            Value::Bool(false) => format!("{column} IS NOT FALSE"),
            other => {
                return Err(CoreError::invalid_filter(format!(
                    "'not.is' operator requires null or boolean, got {other}"
                )));
            }
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchFilter;
    use serde_json::json;

    #[test]
    fn identifier_validation() {
        assert!(validate_identifier("created_at").is_ok());
        assert!(validate_identifier("_private").is_ok());
        assert!(validate_identifier("1col").is_err());
        assert!(validate_identifier("name; DROP TABLE users").is_err());
        assert!(validate_identifier("").is_err());
    }

    #[test]
    fn select_without_filters() {
        let q = build_select("facilities", None, Some("created_at"), SortOrder::Desc, 50, 0)
            .unwrap();
        assert_eq!(
            q.sql,
            "SELECT to_jsonb(t.*) AS data FROM \"facilities\" t \
             ORDER BY t.\"created_at\" DESC LIMIT 50 OFFSET 0"
        );
        assert!(q.binds.is_empty());
    }

    #[test]
    fn select_with_and_filters() {
        let expr = FilterExpr::and_all([
            SearchFilter::new("state", FilterOperator::Eq, json!("WA")),
            SearchFilter::new("beds", FilterOperator::Gte, json!(100)),
        ])
        .unwrap();

        let q = build_select("facilities", Some(&expr), None, SortOrder::Asc, 10, 20).unwrap();
        assert_eq!(
            q.sql,
            "SELECT to_jsonb(t.*) AS data FROM \"facilities\" t \
             WHERE (t.\"state\" = $1 AND t.\"beds\" >= $2) LIMIT 10 OFFSET 20"
        );
        assert_eq!(
            q.binds,
            vec![BindValue::Text("WA".to_string()), BindValue::Int(100)]
        );
    }

    #[test]
    fn or_tree_renders_with_or_joiner() {
        let expr = FilterExpr::or_all([
            SearchFilter::contains("name", "gen"),
            SearchFilter::contains("email", "gen"),
        ])
        .unwrap();

        let q = build_count("profiles", Some(&expr)).unwrap();
        assert_eq!(
            q.sql,
            "SELECT COUNT(*) FROM \"profiles\" t \
             WHERE (t.\"name\" ILIKE $1 OR t.\"email\" ILIKE $2)"
        );
        assert_eq!(q.binds.len(), 2);
    }

    #[test]
    fn null_checks_render_without_binds() {
        let expr = FilterExpr::Leaf(SearchFilter::new("email", FilterOperator::Is, json!(null)));
        let q = build_count("profiles", Some(&expr)).unwrap();
        assert_eq!(q.sql, "SELECT COUNT(*) FROM \"profiles\" t WHERE t.\"email\" IS NULL");
        assert!(q.binds.is_empty());

        let expr =
            FilterExpr::Leaf(SearchFilter::new("email", FilterOperator::NotIs, json!(null)));
        let q = build_count("profiles", Some(&expr)).unwrap();
        assert!(q.sql.ends_with("t.\"email\" IS NOT NULL"));
    }

    #[test]
    fn in_operator_binds_text_array() {
        let expr = FilterExpr::Leaf(SearchFilter::new(
            "status",
            FilterOperator::In,
            json!(["active", "pending"]),
        ));
        let q = build_count("modules", Some(&expr)).unwrap();
        assert_eq!(
            q.sql,
            "SELECT COUNT(*) FROM \"modules\" t WHERE t.\"status\"::text = ANY($1)"
        );
        assert_eq!(
            q.binds,
            vec![BindValue::TextArray(vec![
                "active".to_string(),
                "pending".to_string()
            ])]
        );
    }

    #[test]
    fn invalid_field_rejected() {
        let expr = FilterExpr::Leaf(SearchFilter::new(
            "name\"; --",
            FilterOperator::Eq,
            json!("x"),
        ));
        assert!(build_count("modules", Some(&expr)).is_err());
        assert!(build_count("modules; DROP", None).is_err());
    }

    #[test]
    fn is_operator_rejects_non_boolean_scalars() {
        let expr = FilterExpr::Leaf(SearchFilter::new("email", FilterOperator::Is, json!("x")));
        assert!(build_count("profiles", Some(&expr)).is_err());
    }
}
