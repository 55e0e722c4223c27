//! CareOps admin server: HTTP wiring over the route registry and the search
//! stack.

pub mod bootstrap;
pub mod config;
pub mod generator;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod state;

pub use config::AppConfig;
pub use server::{CareopsServer, ServerBuilder, build_app};
pub use state::AppState;
