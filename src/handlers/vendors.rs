use crate::{
    auth::AuthUser,
    entities::{purchase_order, vendor},
    errors::{ErrorResponse, ServiceError},
    handlers::common::{created_response, no_content_response},
    services::vendors::{CreateVendor, UpdateVendor, VendorFilter},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::{Json, Response},
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/vendors",
    params(VendorFilter),
    responses(
        (status = 200, description = "Vendors listed", body = ApiResponse<Vec<vendor::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "vendors"
)]
pub async fn list_vendors(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<VendorFilter>,
) -> ApiResult<Vec<vendor::Model>> {
    let vendors = state.services.vendors.list(filter).await?;
    Ok(Json(ApiResponse::success(vendors)))
}

#[utoipa::path(
    post,
    path = "/api/v1/vendors",
    request_body = CreateVendor,
    responses(
        (status = 201, description = "Vendor created", body = ApiResponse<vendor::Model>),
        (status = 403, description = "Manager role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "vendors"
)]
pub async fn create_vendor(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateVendor>,
) -> Result<Response, ServiceError> {
    let vendor = state.services.vendors.create(&user, payload).await?;
    Ok(created_response(vendor))
}

#[utoipa::path(
    get,
    path = "/api/v1/vendors/{id}",
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 200, description = "Vendor fetched", body = ApiResponse<vendor::Model>),
        (status = 404, description = "Vendor not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "vendors"
)]
pub async fn get_vendor(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<vendor::Model> {
    let vendor = state.services.vendors.get(id).await?;
    Ok(Json(ApiResponse::success(vendor)))
}

#[utoipa::path(
    put,
    path = "/api/v1/vendors/{id}",
    params(("id" = Uuid, Path, description = "Vendor id")),
    request_body = UpdateVendor,
    responses(
        (status = 200, description = "Vendor updated", body = ApiResponse<vendor::Model>),
        (status = 403, description = "Manager role required", body = ErrorResponse),
        (status = 404, description = "Vendor not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "vendors"
)]
pub async fn update_vendor(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVendor>,
) -> ApiResult<vendor::Model> {
    let vendor = state.services.vendors.update(&user, id, payload).await?;
    Ok(Json(ApiResponse::success(vendor)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/vendors/{id}",
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 204, description = "Vendor deleted"),
        (status = 403, description = "Manager role required", body = ErrorResponse),
        (status = 409, description = "Vendor still referenced by purchase orders", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "vendors"
)]
pub async fn delete_vendor(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.vendors.delete(&user, id).await?;
    Ok(no_content_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/vendors/{id}/purchase-orders",
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 200, description = "Orders placed with the vendor", body = ApiResponse<Vec<purchase_order::Model>>),
        (status = 404, description = "Vendor not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "vendors"
)]
pub async fn vendor_orders(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<purchase_order::Model>> {
    state.services.vendors.get(id).await?;
    let orders = state.services.purchase_orders.for_vendor(id).await?;
    Ok(Json(ApiResponse::success(orders)))
}
