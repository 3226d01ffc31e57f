//! # formsmith - JSON Schema composition and form derivation
//!
//! formsmith merges a catalog of reusable field definitions and a catalog of
//! object definitions into one fully dereferenced JSON Schema, then derives
//! from any object schema a default data instance and a form layout.
//!
//! ## Features
//!
//! - **Composition**: local `$ref` inlining with cycle detection
//! - **Default data**: type-driven zero values, declared defaults, nested objects
//! - **Layouts**: one control per property, presentation options by policy
//! - **Form session**: schema/layout/data triple with tolerant updates
//! - **HTTP API**: compose, synthesize and edit over JSON
//! - **Live reload**: catalogs are re-read when files change
//!
//! ## Architecture
//!
//! - **Engine**: the pure composition and synthesis functions
//! - **Domain**: shared types, errors and the catalog port
//! - **Adapters**: catalog sources, form session, HTTP handlers
//! - **Config**: settings, validation and the catalog watcher

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;

use crate::adapters::api_handler::{self, ApiState};
use crate::adapters::health_handler::HealthHandler;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

/// Creates the Axum application router with all endpoints configured.
pub fn create_app(state: ApiState) -> Router {
    let health_handler = Arc::new(HealthHandler::new(state.clone()));

    let health_router = Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/ready", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.ready().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }));

    let api_router = Router::new()
        // Stateless engine calls
        .route("/compose", post(api_handler::compose_catalogs))
        .route("/defaults", post(api_handler::defaults_for_schema))
        .route("/layout", post(api_handler::layout_for_schema))
        // Configured catalogs
        .route("/schema", get(api_handler::get_schema))
        .route("/objects", get(api_handler::list_objects))
        .route("/objects/:name", get(api_handler::get_object))
        // Form session
        .route("/session", get(api_handler::get_session))
        .route("/session/schema", put(api_handler::put_session_schema))
        .route("/session/layout", put(api_handler::put_session_layout))
        .route(
            "/session/data",
            put(api_handler::put_session_data).patch(api_handler::patch_session_data),
        )
        .route("/session/activate/:name", post(api_handler::activate_object))
        .with_state(state);

    health_router.nest("/api", api_router).layer(
        tower_http::cors::CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
