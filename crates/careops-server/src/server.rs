use std::net::SocketAddr;

use axum::{Router, middleware, routing::get, routing::post};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use careops_core::Result;

use crate::generator::{self, ComponentResolver};
use crate::{config::AppConfig, handlers, middleware as app_middleware, state::AppState};

pub struct CareopsServer {
    addr: SocketAddr,
    app: Router,
}

/// Assemble the full application router: health endpoints, the gated
/// /system API, and the pages generated from the route registry.
pub fn build_app(
    cfg: &AppConfig,
    state: AppState,
    resolver: &ComponentResolver,
) -> Result<Router> {
    let state = state.with_search_settings(cfg.search.clone());

    let system = Router::new()
        .route("/system/navigation", get(handlers::navigation))
        .route("/system/routes", get(handlers::routes_list))
        .route("/system/access", get(handlers::route_access))
        .route("/system/stats", get(handlers::stats))
        .route("/system/search/{table}", post(handlers::search))
        .route("/system/search/{table}/text", post(handlers::full_text_search))
        .layer(middleware::from_fn(app_middleware::require_auth));

    let pages = generator::build_routes(&state.registry, resolver, state.clone())?;

    let app = Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .merge(system)
        .merge(pages)
        // Middleware stack (order: request id -> access context -> cors/trace -> body limit)
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(middleware::from_fn(app_middleware::access_context))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(axum::extract::DefaultBodyLimit::max(cfg.server.body_limit_bytes))
        .with_state(state);

    Ok(app)
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
    resolver: ComponentResolver,
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
            resolver: ComponentResolver::with_defaults(),
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn with_resolver(mut self, resolver: ComponentResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn build(self, state: AppState) -> Result<CareopsServer> {
        let app = build_app(&self.config, state, &self.resolver)?;

        Ok(CareopsServer {
            addr: self.addr,
            app,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CareopsServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header::CONTENT_TYPE};
    use careops_search::{MemoryBackend, SearchConfigManager, SearchEngine, StaticCatalog};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn test_app() -> Router {
        app_with(AppConfig::default()).await
    }

    async fn app_with(cfg: AppConfig) -> Router {
        let registry = bootstrap::build_registry().unwrap();

        let backend = MemoryBackend::new();
        for i in 0..120 {
            backend.insert(
                "facilities",
                json!({
                    "name": format!("Facility {i}"),
                    "address": format!("{i} Main St"),
                    "email": format!("facility{i}@example.org"),
                    "phone": "555-0100",
                    "created_at": format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1),
                }),
            );
        }
        backend.insert(
            "facilities",
            json!({
                "name": "General Hospital",
                "address": "1 Hill Rd",
                "email": "info@general.example.org",
                "phone": "555-0199",
                "created_at": "2025-01-01",
            }),
        );

        let manager = Arc::new(SearchConfigManager::new());
        manager.auto_detect(&StaticCatalog::new()).await;

        let state = AppState::new(
            registry,
            manager,
            SearchEngine::new(Arc::new(backend)),
        );

        build_app(&cfg, state, &ComponentResolver::with_defaults()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn get_as(uri: &str, roles: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-user-roles", roles)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(res: axum::response::Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoints_are_public() {
        let app = test_app().await;
        let res = app.clone().oneshot(get("/healthz")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let res = app.oneshot(get("/readyz")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn public_page_serves_without_identity() {
        let app = test_app().await;
        let res = app.oneshot(get("/login")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["path"], json!("/login"));
        assert_eq!(body["component"], json!("Login"));
    }

    #[tokio::test]
    async fn protected_page_requires_identity() {
        let app = test_app().await;
        let res = app.oneshot(get("/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn role_restricted_page_enforces_roles() {
        let app = test_app().await;

        let res = app.clone().oneshot(get_as("/security", "nurse")).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body = body_json(res).await;
        assert_eq!(body["error"]["code"], json!("role-required"));

        let res = app.oneshot(get_as("/security", "superAdmin")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn tenant_scoped_page_needs_facility_header() {
        let app = test_app().await;

        let res = app.clone().oneshot(get_as("/patients", "staff")).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let req = Request::builder()
            .uri("/patients")
            .header("x-user-roles", "staff")
            .header("x-facility-id", "facility-1")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn system_endpoints_require_identity() {
        let app = test_app().await;
        let res = app.clone().oneshot(get("/system/stats")).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = app.oneshot(get_as("/system/stats", "nurse")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["totalRoutes"], json!(12));
    }

    #[tokio::test]
    async fn navigation_reflects_caller_roles() {
        let app = test_app().await;
        let res = app
            .oneshot(get_as("/system/navigation", "nurse"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let sections = body_json(res).await;
        let paths: Vec<String> = sections
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|s| s["routes"].as_array().unwrap().iter())
            .map(|r| r["path"].as_str().unwrap().to_string())
            .collect();
        assert!(paths.contains(&"/".to_string()));
        assert!(!paths.contains(&"/security".to_string()));
    }

    #[tokio::test]
    async fn access_probe_reports_deny_reason() {
        let app = test_app().await;
        let res = app
            .oneshot(get_as("/system/access?path=/security", "nurse"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["allowed"], json!(false));
        assert_eq!(body["reason"]["code"], json!("role-required"));
    }

    fn post_json(uri: &str, roles: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("x-user-roles", roles)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn search_paginates_with_exact_count() {
        let app = test_app().await;
        let res = app
            .oneshot(post_json("/system/search/facilities", "admin", json!({})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let page = body_json(res).await;
        assert_eq!(page["count"], json!(121));
        assert_eq!(page["currentPage"], json!(1));
        assert_eq!(page["hasMore"], json!(true));
        assert_eq!(page["data"].as_array().unwrap().len(), 50);
    }

    #[tokio::test]
    async fn search_limit_clamped_to_configured_max() {
        let mut cfg = AppConfig::default();
        cfg.search.max_limit = 10;
        let app = app_with(cfg).await;

        let res = app
            .oneshot(post_json(
                "/system/search/facilities",
                "admin",
                json!({ "limit": 1_000_000 }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let page = body_json(res).await;
        assert_eq!(page["count"], json!(121));
        assert_eq!(page["data"].as_array().unwrap().len(), 10);
        assert_eq!(page["totalPages"], json!(13));
    }

    #[tokio::test]
    async fn search_unknown_table_is_not_found() {
        let app = test_app().await;
        let res = app
            .oneshot(post_json("/system/search/ghosts", "admin", json!({})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn full_text_search_matches_any_field() {
        let app = test_app().await;
        // "general" appears in one row's name and email only
        let res = app
            .oneshot(post_json(
                "/system/search/facilities/text",
                "admin",
                json!({ "query": "general" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let page = body_json(res).await;
        assert_eq!(page["count"], json!(1));
        assert_eq!(page["data"][0]["name"], json!("General Hospital"));
    }

    #[tokio::test]
    async fn unknown_path_is_plain_404() {
        let app = test_app().await;
        let res = app.oneshot(get("/does-not-exist")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
