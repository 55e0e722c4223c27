use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use careops_core::{AccessContext, CoreError, ErrorCategory};
use careops_search::{SearchConfig, SearchFilter, SortOrder};

use crate::state::AppState;

// =============================================================================
// Error mapping
// =============================================================================

/// Wraps a core error for HTTP responses; status follows the error category.
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.category() {
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Validation | ErrorCategory::Serialization => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, category = %self.0.category(), "request failed");
        }
        let body = json!({
            "error": {
                "code": self.0.category().to_string(),
                "message": self.0.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Health and info
// =============================================================================

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ready" }))
}

// =============================================================================
// Pages
// =============================================================================

/// Built-in page component: serves the route's own metadata. The visual
/// layer lives elsewhere; what matters here is that the route is mounted and
/// gated.
pub async fn page(State(state): State<AppState>, uri: Uri) -> Result<Response, ApiError> {
    let route = state
        .registry
        .get_route(uri.path())
        .ok_or_else(|| CoreError::route_not_found(uri.path()))?;

    Ok(Json(json!({
        "path": route.path,
        "title": route.title,
        "description": route.description,
        "category": route.category,
        "component": route.component,
    }))
    .into_response())
}

// =============================================================================
// System: registry queries
// =============================================================================

pub async fn navigation(
    State(state): State<AppState>,
    Extension(ctx): Extension<AccessContext>,
) -> impl IntoResponse {
    Json(state.registry.navigation_items(&ctx))
}

pub async fn routes_list(State(state): State<AppState>) -> impl IntoResponse {
    let mut routes = state.registry.get_all_routes();
    routes.sort_by(|a, b| a.path.cmp(&b.path));
    Json(routes)
}

#[derive(Deserialize)]
pub struct AccessQuery {
    pub path: String,
}

/// Accessibility probe: would this caller be allowed at `path`?
pub async fn route_access(
    State(state): State<AppState>,
    Extension(ctx): Extension<AccessContext>,
    Query(query): Query<AccessQuery>,
) -> impl IntoResponse {
    match state.registry.resolve(&query.path, &ctx) {
        Some(decision) => {
            let body = match decision.deny_reason() {
                None => json!({ "path": query.path, "allowed": true }),
                Some(reason) => {
                    json!({ "path": query.path, "allowed": false, "reason": reason })
                }
            };
            (StatusCode::OK, Json(body))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "code": "not_found", "message": "Route not found" } })),
        ),
    }
}

pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.registry.stats())
}

// =============================================================================
// System: search
// =============================================================================

/// Optional overrides applied to a table's stored search config.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub filters: Option<Vec<SearchFilter>>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
}

impl SearchRequest {
    fn apply(self, mut config: SearchConfig) -> SearchConfig {
        if let Some(filters) = self.filters {
            config.filters = filters;
        }
        if let Some(sort_by) = self.sort_by {
            config.sort_by = Some(sort_by);
        }
        if let Some(sort_order) = self.sort_order {
            config.sort_order = sort_order;
        }
        if let Some(limit) = self.limit {
            config.limit = limit;
        }
        if let Some(offset) = self.offset {
            config.offset = offset;
        }
        config
    }
}

pub async fn search(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(request): Json<SearchRequest>,
) -> Result<Response, ApiError> {
    let config = state
        .search_configs
        .get(&table)
        .ok_or_else(|| CoreError::unknown_table(&table))?;

    let mut config = request.apply(config);
    config.limit = config.limit.min(state.search.max_limit);
    let page = state.engine.execute_search(&config).await?;
    Ok(Json(page).into_response())
}

#[derive(Debug, Deserialize)]
pub struct TextSearchRequest {
    pub query: String,
    #[serde(flatten)]
    pub overrides: SearchRequest,
}

pub async fn full_text_search(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(request): Json<TextSearchRequest>,
) -> Result<Response, ApiError> {
    let config = state
        .search_configs
        .get(&table)
        .ok_or_else(|| CoreError::unknown_table(&table))?;

    let mut config = request.overrides.apply(config);
    config.limit = config.limit.min(state.search.max_limit);
    let page = state.engine.full_text_search(&config, &request.query).await?;
    Ok(Json(page).into_response())
}
