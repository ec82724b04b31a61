#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use chrono::{TimeZone, Utc};
use fieldservice_api::{
    auth::{AuthUser, Role},
    clock::{Clock, FixedClock},
    config::AppConfig,
    db,
    entities::{client, equipment_catalog, equipment_unit, service_request, vendor},
    services::{
        clients::CreateClient,
        equipment::{CreateCatalogItem, CreateEquipmentUnit},
        inventory::{CreateSparePart, SparePart},
        service_requests::CreateServiceRequest,
        vendors::CreateVendor,
    },
    AppState,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_purposes_only_32chars";

/// Application state backed by a private in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub clock: Arc<FixedClock>,
    pub admin: AuthUser,
    pub manager: AuthUser,
    pub engineer: AuthUser,
}

impl TestApp {
    /// Fresh schema, clock pinned to 2025-03-10 09:00 UTC.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Same as `new`, with the config adjusted before services are built
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_JWT_SECRET.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // Every connection to `sqlite::memory:` is its own database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        adjust(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
        ));
        let state = AppState::new(Arc::new(pool), cfg, clock.clone() as Arc<dyn Clock>);
        let router = fieldservice_api::build_router(state.clone());

        Self {
            router,
            state,
            clock,
            admin: AuthUser::new(Uuid::new_v4(), Role::Admin),
            manager: AuthUser::new(Uuid::new_v4(), Role::Manager),
            engineer: AuthUser::new(Uuid::new_v4(), Role::Engineer),
        }
    }

    pub fn token_for(&self, user: &AuthUser) -> String {
        self.state
            .auth
            .issue_token(user.user_id, user.name.clone(), &[user.role])
            .expect("issue test token")
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Authenticated request as `user`
    pub async fn request_as(
        &self,
        user: &AuthUser,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let token = self.token_for(user);
        self.request(method, uri, body, Some(&token)).await
    }

    pub async fn seed_client(&self, name: &str) -> client::Model {
        self.state
            .services
            .clients
            .create(
                &self.engineer,
                CreateClient {
                    name: name.to_string(),
                    tax_id: None,
                    registration_number: None,
                    contact_person: Some("Petrov".to_string()),
                    phone: None,
                    email: None,
                    address: Some("Lenina 1".to_string()),
                    manager_id: None,
                    notes: None,
                },
            )
            .await
            .expect("seed client")
    }

    pub async fn seed_catalog_item(&self, name: &str) -> equipment_catalog::Model {
        self.state
            .services
            .equipment
            .create_catalog_item(
                &self.admin,
                CreateCatalogItem {
                    name: name.to_string(),
                    model: Some("X-200".to_string()),
                    manufacturer: Some("Termo".to_string()),
                    category: Some("boilers".to_string()),
                    description: None,
                    price: Some(Decimal::new(150_000, 2)),
                },
            )
            .await
            .expect("seed catalog item")
    }

    pub async fn seed_equipment(&self, client_id: Uuid, serial: &str) -> equipment_unit::Model {
        let catalog = self.seed_catalog_item(&format!("Boiler {}", serial)).await;
        self.state
            .services
            .equipment
            .create_unit(
                &self.engineer,
                CreateEquipmentUnit {
                    client_id,
                    catalog_id: catalog.id,
                    serial_number: serial.to_string(),
                    install_date: None,
                    address: Some("Boiler room".to_string()),
                    warranty_until: None,
                    notes: None,
                },
            )
            .await
            .expect("seed equipment")
    }

    /// Client plus one installed unit
    pub async fn seed_site(&self, serial: &str) -> (client::Model, equipment_unit::Model) {
        let client = self.seed_client(&format!("Client {}", serial)).await;
        let unit = self.seed_equipment(client.id, serial).await;
        (client, unit)
    }

    pub async fn open_request(
        &self,
        client_id: Uuid,
        equipment_id: Uuid,
    ) -> service_request::Model {
        self.state
            .services
            .service_requests
            .create(
                &self.engineer,
                CreateServiceRequest {
                    client_id,
                    equipment_id,
                    kind: None,
                    priority: None,
                    description: "Boiler does not ignite".to_string(),
                },
            )
            .await
            .expect("open service request")
    }

    pub async fn seed_vendor(&self, name: &str) -> vendor::Model {
        self.state
            .services
            .vendors
            .create(
                &self.manager,
                CreateVendor {
                    name: name.to_string(),
                    contact_person: None,
                    phone: None,
                    email: None,
                    address: None,
                    tax_id: None,
                    notes: None,
                },
            )
            .await
            .expect("seed vendor")
    }

    pub async fn seed_part(&self, name: &str, quantity: i32, min_quantity: i32) -> SparePart {
        self.state
            .services
            .inventory
            .create_part(
                &self.engineer,
                CreateSparePart {
                    name: name.to_string(),
                    part_number: Some(format!("PN-{}", name.to_uppercase())),
                    catalog_id: None,
                    vendor_id: None,
                    quantity,
                    min_quantity,
                    unit: None,
                    cost_price: Decimal::new(40_000, 2),
                    sale_price: Decimal::new(60_000, 2),
                    location: Some("Shelf A".to_string()),
                },
            )
            .await
            .expect("seed spare part")
    }
}

/// Reads and parses a JSON response body
pub async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is json")
}
