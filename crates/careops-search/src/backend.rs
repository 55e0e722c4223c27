//! Search execution backends.
//!
//! The [`SearchBackend`] trait separates what a search means (expression,
//! sort, page) from how it is executed. The in-memory backend evaluates
//! expressions over JSON rows and backs the test suite; the PostgreSQL
//! backend lives in [`crate::postgres`].

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use careops_core::{CoreError, Result};

use crate::types::{FilterExpr, SortOrder};

/// A fully resolved table query, ready for execution.
#[derive(Debug, Clone)]
pub struct TableQuery {
    pub table: String,
    pub expr: Option<FilterExpr>,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
    pub limit: u64,
    pub offset: u64,
}

/// One page of backend rows plus the exact total match count.
#[derive(Debug, Clone)]
pub struct BackendPage {
    pub rows: Vec<Value>,
    pub total: u64,
}

/// Executes table queries against some store.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn fetch(&self, query: &TableQuery) -> Result<BackendPage>;
}

/// Type alias for a shareable backend instance
pub type DynBackend = Arc<dyn SearchBackend>;

/// In-memory backend over JSON object rows, keyed by table name.
///
/// Filtering, sorting, and pagination reproduce the SQL semantics closely
/// enough for unit tests and for running the server without a database.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: DashMap<String, Vec<Value>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
        }
    }

    /// Insert a row into a table, creating the table on first use.
    pub fn insert(&self, table: impl Into<String>, row: Value) {
        self.tables.entry(table.into()).or_default().push(row);
    }

    /// Replace a table's rows wholesale.
    pub fn load(&self, table: impl Into<String>, rows: Vec<Value>) {
        self.tables.insert(table.into(), rows);
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |rows| rows.len())
    }
}

#[async_trait]
impl SearchBackend for MemoryBackend {
    async fn fetch(&self, query: &TableQuery) -> Result<BackendPage> {
        let rows = self
            .tables
            .get(&query.table)
            .ok_or_else(|| CoreError::unknown_table(&query.table))?;

        let mut matched: Vec<Value> = rows
            .iter()
            .filter(|row| query.expr.as_ref().is_none_or(|e| e.matches(row)))
            .cloned()
            .collect();

        if let Some(sort_by) = &query.sort_by {
            matched.sort_by(|a, b| {
                let ordering = compare_values(a.get(sort_by), b.get(sort_by));
                match query.sort_order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        let total = matched.len() as u64;
        let page: Vec<Value> = matched
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();

        Ok(BackendPage { rows: page, total })
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}
