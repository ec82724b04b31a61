//! Field Service API Library
//!
//! Service requests against installed equipment, invoices with VAT totals,
//! supplier purchase orders and a spare-parts stock ledger, exposed over an
//! axum HTTP API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod lifecycle;
pub mod middleware_helpers;
pub mod migrator;
pub mod money;
pub mod openapi;
pub mod sequence;
pub mod services;
pub mod tracing;

use axum::{extract::FromRef, response::Json, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::{AuthConfig, AuthService};
use crate::clock::Clock;
use crate::services::{AppServices, DocumentDefaults};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<config::AppConfig>,
    pub services: AppServices,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Wires every service against one pool and clock
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let services = AppServices::new(db.clone(), clock, DocumentDefaults::from(&config));
        let auth = Arc::new(AuthService::new(AuthConfig::from(&config)));
        Self {
            db,
            config: Arc::new(config),
            services,
            auth,
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn success_response_outside_request_has_no_id() {
        let response = ApiResponse::success(42);
        assert!(response.success);
        assert_eq!(response.data, Some(42));
        assert!(response.meta.expect("metadata expected").request_id.is_none());
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Every authenticated endpoint, to be nested under `/api/v1`
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::service_request_routes())
        .merge(handlers::invoice_routes())
        .merge(handlers::purchase_order_routes())
        .merge(handlers::inventory_routes())
        .merge(handlers::reference_routes())
}

/// Full application router without transport layers
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .merge(handlers::health::health_routes())
        .merge(openapi::swagger_ui())
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}
