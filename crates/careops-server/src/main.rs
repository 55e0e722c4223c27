use std::{env, sync::Arc};

use careops_search::{
    MemoryBackend, PostgresBackend, PostgresCatalog, SearchConfigManager, SearchEngine,
    StaticCatalog,
};
use careops_server::config::load_config;
use careops_server::{AppState, ServerBuilder, bootstrap, observability};

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From CAREOPS_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (careops.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (CAREOPS_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist - it's optional
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    // Initialize tracing early with the default level
    observability::init_tracing();

    let (config_path, source) = resolve_config_path();

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );

    observability::apply_logging_level(&cfg.logging.level);

    // Route table
    let registry = match bootstrap::build_registry() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Route initialization failed: {e}");
            std::process::exit(2);
        }
    };

    // Search stack: PostgreSQL when configured, in-memory otherwise
    let search_configs = Arc::new(SearchConfigManager::new());
    let engine = match &cfg.storage.postgres {
        Some(pg) => {
            let pool = match careops_search::postgres::create_pool(&pg.url, pg.pool_size).await {
                Ok(pool) => pool,
                Err(e) => {
                    eprintln!("Database connection failed: {e}");
                    std::process::exit(2);
                }
            };
            let catalog = PostgresCatalog::new(pool.clone());
            let seeded = bootstrap::initialize_search(&search_configs, &catalog).await;
            tracing::info!(tables = seeded, backend = "postgres", "search initialized");
            SearchEngine::new(Arc::new(PostgresBackend::new(pool)))
        }
        None => {
            let seeded = bootstrap::initialize_search(&search_configs, &StaticCatalog::new()).await;
            tracing::info!(tables = seeded, backend = "memory", "search initialized");
            SearchEngine::new(Arc::new(MemoryBackend::new()))
        }
    };

    let state = AppState::new(registry, search_configs, engine);

    let server = match ServerBuilder::new().with_config(cfg).build(state) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Server initialization failed: {e}");
            std::process::exit(2);
        }
    };

    if let Err(err) = server.run().await {
        eprintln!("Server error: {err}");
    }
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: CAREOPS_CONFIG
/// 3. Default: careops.toml
fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return (path, ConfigSource::CliArgument);
            }
        }
    }

    if let Ok(path) = env::var("CAREOPS_CONFIG") {
        if !path.is_empty() {
            return (path, ConfigSource::EnvironmentVariable);
        }
    }

    ("careops.toml".to_string(), ConfigSource::Default)
}
