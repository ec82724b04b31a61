use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Field Service API",
        version = "1.0.0",
        description = r#"
# Field Service API

Service requests, invoicing, purchasing and spare-parts stock for an
equipment maintenance business.

## Authentication

Every `/api/v1` endpoint expects a bearer JWT:

```
Authorization: Bearer <your-jwt-token>
```

Engineers can open and work requests, record part usage and draft invoices.
Managers additionally assign engineers, move invoices and purchase orders
through their lifecycles and maintain vendors. Admins maintain the equipment
catalog.

## Documents

Service requests, invoices and purchase orders are numbered per year:
`ZVK-2025-00001`, `SCH-2025-00001`, `PO-2025-00001`.

## Errors

Failures share one body:

```json
{
  "error": "Bad Request",
  "code": "invalid_transition",
  "message": "Invalid service request transition: closed -> in_progress",
  "request_id": "6c1f...",
  "timestamp": "2025-03-01T09:00:00Z"
}
```
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "service-requests", description = "Service request lifecycle"),
        (name = "invoices", description = "Invoices and VAT totals"),
        (name = "purchase-orders", description = "Supplier purchase orders"),
        (name = "inventory", description = "Spare-parts stock and usage ledger"),
        (name = "clients", description = "Clients and interaction history"),
        (name = "equipment", description = "Equipment catalog and installed units"),
        (name = "vendors", description = "Suppliers"),
        (name = "health", description = "Health check")
    ),
    paths(
        // Service requests
        crate::handlers::service_requests::list_requests,
        crate::handlers::service_requests::create_request,
        crate::handlers::service_requests::get_request,
        crate::handlers::service_requests::update_request,
        crate::handlers::service_requests::set_request_status,
        crate::handlers::service_requests::assign_engineer,
        crate::handlers::service_requests::request_parts,

        // Invoices
        crate::handlers::invoices::list_invoices,
        crate::handlers::invoices::create_invoice,
        crate::handlers::invoices::get_invoice,
        crate::handlers::invoices::add_invoice_item,
        crate::handlers::invoices::remove_invoice_item,
        crate::handlers::invoices::set_invoice_status,

        // Purchase orders
        crate::handlers::purchase_orders::list_purchase_orders,
        crate::handlers::purchase_orders::create_purchase_order,
        crate::handlers::purchase_orders::get_purchase_order,
        crate::handlers::purchase_orders::set_purchase_order_status,

        // Inventory
        crate::handlers::inventory::list_parts,
        crate::handlers::inventory::low_stock,
        crate::handlers::inventory::create_part,
        crate::handlers::inventory::get_part,
        crate::handlers::inventory::update_part,
        crate::handlers::inventory::receive_stock,
        crate::handlers::inventory::use_part,
        crate::handlers::inventory::part_usages,

        // Clients
        crate::handlers::clients::list_clients,
        crate::handlers::clients::create_client,
        crate::handlers::clients::get_client,
        crate::handlers::clients::update_client,
        crate::handlers::clients::deactivate_client,
        crate::handlers::clients::list_interactions,
        crate::handlers::clients::add_interaction,

        // Equipment
        crate::handlers::equipment::list_catalog,
        crate::handlers::equipment::create_catalog_item,
        crate::handlers::equipment::get_catalog_item,
        crate::handlers::equipment::update_catalog_item,
        crate::handlers::equipment::deactivate_catalog_item,
        crate::handlers::equipment::list_units,
        crate::handlers::equipment::create_unit,
        crate::handlers::equipment::get_unit,
        crate::handlers::equipment::update_unit,
        crate::handlers::equipment::decommission_unit,
        crate::handlers::equipment::unit_requests,

        // Vendors
        crate::handlers::vendors::list_vendors,
        crate::handlers::vendors::create_vendor,
        crate::handlers::vendors::get_vendor,
        crate::handlers::vendors::update_vendor,
        crate::handlers::vendors::delete_vendor,
        crate::handlers::vendors::vendor_orders,

        // Health
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::errors::ErrorResponse,
            crate::money::Totals,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDocV1;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_routes_and_auth() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Field Service API"));
        assert!(json.contains("/api/v1/service-requests/{id}/status"));
        assert!(json.contains("/api/v1/spare-parts/{id}/use"));
        assert!(json.contains("bearer_auth"));
    }
}
