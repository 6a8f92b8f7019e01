//! # PawMart API
//!
//! REST JSON server for the PawMart pet marketplace.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          PawMart API Server                             │
//! │                                                                         │
//! │  client ──► TraceLayer ──► CorsLayer ──► Router                         │
//! │                                            │                            │
//! │        /health ◄───────────────────────────┤                            │
//! │        /api/users, /api/pets, ... ◄────────┘                            │
//! │                       │                                                 │
//! │          extractors   │  AuthUser / OptionalAuth (Bearer JWT)           │
//! │                       │  ApiJson / ApiQuery (400 on bad input)          │
//! │                       ▼                                                 │
//! │  ┌──────────────────────────┐      ┌──────────────────────────┐        │
//! │  │  pawmart-core            │      │  pawmart-db              │        │
//! │  │  policy, workflows,      │◄────►│  repositories,           │        │
//! │  │  validation, money       │      │  UnitOfWork (SQLite tx)  │        │
//! │  └──────────────────────────┘      └──────────────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Read from `pawmart.toml` (optional) and `PAWMART_*` environment
//! variables, see [`config::ApiConfig`].

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::http::HeaderValue;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_origin.as_deref());

    Router::new()
        .merge(routes::health::routes())
        .nest("/api", routes::api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin),
        Some(Err(e)) => {
            warn!(error = %e, "Invalid CORS origin, allowing any");
            base.allow_origin(Any)
        }
        None => base.allow_origin(Any),
    }
}
