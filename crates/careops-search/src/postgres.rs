//! PostgreSQL execution backend and schema catalog.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx_core::pool::PoolOptions;
use sqlx_core::query::query;
use sqlx_core::query_scalar::query_scalar;
use sqlx_core::row::Row;
use sqlx_postgres::{PgPool, PgRow, Postgres};
use tracing::{debug, warn};

use careops_core::{CoreError, Result};

use crate::backend::{BackendPage, SearchBackend, TableQuery};
use crate::catalog::{SchemaCatalog, StaticCatalog};
use crate::sql::{self, BindValue};

/// Type alias for PostgreSQL pool options.
pub type PgPoolOptions = PoolOptions<Postgres>;

/// Create a connection pool for the search backend.
pub async fn create_pool(url: &str, pool_size: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(pool_size)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await
        .map_err(|e| CoreError::backend(format!("failed to connect to PostgreSQL: {e}")))
}

/// Executes rendered SQL against a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchBackend for PostgresBackend {
    async fn fetch(&self, table_query: &TableQuery) -> Result<BackendPage> {
        let select = sql::build_select(
            &table_query.table,
            table_query.expr.as_ref(),
            table_query.sort_by.as_deref(),
            table_query.sort_order,
            table_query.limit,
            table_query.offset,
        )?;
        let count = sql::build_count(&table_query.table, table_query.expr.as_ref())?;

        debug!(table = %table_query.table, sql = %select.sql, "executing search");

        let mut page_query = query(&select.sql);
        for bind in &select.binds {
            page_query = apply_bind(page_query, bind);
        }
        let rows: Vec<PgRow> = page_query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CoreError::backend(e.to_string()))?;

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            let value: Value = row
                .try_get("data")
                .map_err(|e| CoreError::backend(e.to_string()))?;
            data.push(value);
        }

        let mut count_query = query_scalar::<_, i64>(&count.sql);
        for bind in &count.binds {
            count_query = apply_scalar_bind(count_query, bind);
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CoreError::backend(e.to_string()))?;

        Ok(BackendPage {
            rows: data,
            total: total.max(0) as u64,
        })
    }
}

fn apply_bind<'q>(
    q: sqlx_core::query::Query<'q, Postgres, sqlx_postgres::PgArguments>,
    bind: &'q BindValue,
) -> sqlx_core::query::Query<'q, Postgres, sqlx_postgres::PgArguments> {
    match bind {
        BindValue::Text(s) => q.bind(s),
        BindValue::Int(i) => q.bind(i),
        BindValue::Float(f) => q.bind(f),
        BindValue::Bool(b) => q.bind(b),
        BindValue::TextArray(items) => q.bind(items),
    }
}

fn apply_scalar_bind<'q>(
    q: sqlx_core::query_scalar::QueryScalar<'q, Postgres, i64, sqlx_postgres::PgArguments>,
    bind: &'q BindValue,
) -> sqlx_core::query_scalar::QueryScalar<'q, Postgres, i64, sqlx_postgres::PgArguments> {
    match bind {
        BindValue::Text(s) => q.bind(s),
        BindValue::Int(i) => q.bind(i),
        BindValue::Float(f) => q.bind(f),
        BindValue::Bool(b) => q.bind(b),
        BindValue::TextArray(items) => q.bind(items),
    }
}

/// Schema catalog backed by `information_schema`.
///
/// Discovers text-typed columns per table so new tables get real searchable
/// fields instead of a guessed default. Falls back to the static catalog on
/// query failure (e.g. degraded database) rather than returning nothing.
#[derive(Debug, Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemaCatalog for PostgresCatalog {
    async fn searchable_fields(&self, table: &str) -> Vec<String> {
        if sql::validate_identifier(table).is_err() {
            return Vec::new();
        }

        let result = query_scalar::<_, String>(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = $1 \
             AND data_type IN ('text', 'character varying', 'citext') \
             ORDER BY ordinal_position",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await;

        match result {
            Ok(columns) if !columns.is_empty() => columns,
            Ok(_) => Vec::new(),
            Err(e) => {
                warn!(table, error = %e, "schema introspection failed, using static catalog");
                StaticCatalog::fields_for(table)
            }
        }
    }

    async fn tables(&self) -> Vec<String> {
        let result = query_scalar::<_, String>(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
             ORDER BY table_name",
        )
        .fetch_all(&self.pool)
        .await;

        match result {
            Ok(tables) => tables,
            Err(e) => {
                warn!(error = %e, "table listing failed, using static catalog");
                StaticCatalog::table_names()
            }
        }
    }
}
