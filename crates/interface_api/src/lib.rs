//! HTTP API Layer
//!
//! This crate exposes product accounting configuration over REST using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: create, update, fetch and delete a product's configuration,
//!   plus the rules template
//! - **Middleware**: tracing, audit logging with request ids
//! - **DTOs**: path and query extraction, template responses
//! - **Error Handling**: domain errors mapped to status codes with field details
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(coordinator, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_accounting::MappingLifecycleCoordinator;

use crate::config::ApiConfig;
use crate::handlers::{accounting, health, rules};
use crate::middleware::audit_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<MappingLifecycleCoordinator>,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `coordinator` - Lifecycle coordinator wired to its storage and reference ports
/// * `config` - API configuration
pub fn create_router(coordinator: Arc<MappingLifecycleCoordinator>, config: ApiConfig) -> Router {
    let state = AppState { coordinator, config };

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let product_routes = Router::new().route(
        "/:product_type/:product_id/accounting",
        get(accounting::get_configuration)
            .post(accounting::create_configuration)
            .put(accounting::update_configuration)
            .delete(accounting::delete_configuration),
    );

    let api_routes = Router::new()
        .nest("/products", product_routes)
        .route("/accounting/rules/:product_type", get(rules::rules_template))
        .layer(axum_middleware::from_fn(audit_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
