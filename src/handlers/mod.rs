pub mod clients;
pub mod common;
pub mod equipment;
pub mod health;
pub mod inventory;
pub mod invoices;
pub mod purchase_orders;
pub mod service_requests;
pub mod vendors;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn service_request_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/service-requests",
            get(service_requests::list_requests).post(service_requests::create_request),
        )
        .route(
            "/service-requests/:id",
            get(service_requests::get_request).put(service_requests::update_request),
        )
        .route(
            "/service-requests/:id/status",
            post(service_requests::set_request_status),
        )
        .route(
            "/service-requests/:id/assign",
            post(service_requests::assign_engineer),
        )
        .route(
            "/service-requests/:id/parts",
            get(service_requests::request_parts),
        )
}

pub fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/invoices",
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route("/invoices/:id", get(invoices::get_invoice))
        .route("/invoices/:id/items", post(invoices::add_invoice_item))
        .route(
            "/invoices/:id/items/:item_id",
            axum::routing::delete(invoices::remove_invoice_item),
        )
        .route("/invoices/:id/status", post(invoices::set_invoice_status))
}

pub fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/purchase-orders",
            get(purchase_orders::list_purchase_orders)
                .post(purchase_orders::create_purchase_order),
        )
        .route(
            "/purchase-orders/:id",
            get(purchase_orders::get_purchase_order),
        )
        .route(
            "/purchase-orders/:id/status",
            post(purchase_orders::set_purchase_order_status),
        )
}

pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/spare-parts",
            get(inventory::list_parts).post(inventory::create_part),
        )
        .route("/spare-parts/low-stock", get(inventory::low_stock))
        .route(
            "/spare-parts/:id",
            get(inventory::get_part).put(inventory::update_part),
        )
        .route("/spare-parts/:id/receive", post(inventory::receive_stock))
        .route("/spare-parts/:id/use", post(inventory::use_part))
        .route("/spare-parts/:id/usages", get(inventory::part_usages))
}

pub fn reference_routes() -> Router<AppState> {
    Router::new()
        // Clients
        .route(
            "/clients",
            get(clients::list_clients).post(clients::create_client),
        )
        .route(
            "/clients/:id",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::deactivate_client),
        )
        .route(
            "/clients/:id/interactions",
            get(clients::list_interactions).post(clients::add_interaction),
        )
        // Equipment catalog
        .route(
            "/equipment-catalog",
            get(equipment::list_catalog).post(equipment::create_catalog_item),
        )
        .route(
            "/equipment-catalog/:id",
            get(equipment::get_catalog_item)
                .put(equipment::update_catalog_item)
                .delete(equipment::deactivate_catalog_item),
        )
        // Installed equipment
        .route(
            "/equipment",
            get(equipment::list_units).post(equipment::create_unit),
        )
        .route(
            "/equipment/:id",
            get(equipment::get_unit).put(equipment::update_unit),
        )
        .route(
            "/equipment/:id/decommission",
            post(equipment::decommission_unit),
        )
        .route("/equipment/:id/requests", get(equipment::unit_requests))
        // Vendors
        .route(
            "/vendors",
            get(vendors::list_vendors).post(vendors::create_vendor),
        )
        .route(
            "/vendors/:id",
            get(vendors::get_vendor)
                .put(vendors::update_vendor)
                .delete(vendors::delete_vendor),
        )
        .route(
            "/vendors/:id/purchase-orders",
            get(vendors::vendor_orders),
        )
}
