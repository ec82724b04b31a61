use crate::{
    auth::AuthUser,
    entities::purchase_order,
    errors::{ErrorResponse, ServiceError},
    handlers::common::created_response,
    services::purchase_orders::{
        CreatePurchaseOrder, PurchaseOrderDetails, PurchaseOrderFilter, SetPurchaseOrderStatus,
    },
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::{Json, Response},
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders",
    params(PurchaseOrderFilter),
    responses(
        (status = 200, description = "Purchase orders listed", body = ApiResponse<Vec<purchase_order::Model>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "purchase-orders"
)]
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<PurchaseOrderFilter>,
) -> ApiResult<Vec<purchase_order::Model>> {
    let orders = state.services.purchase_orders.list(filter).await?;
    Ok(Json(ApiResponse::success(orders)))
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders",
    request_body = CreatePurchaseOrder,
    responses(
        (status = 201, description = "Draft purchase order created", body = ApiResponse<PurchaseOrderDetails>),
        (status = 400, description = "Invalid order", body = ErrorResponse),
        (status = 403, description = "Manager role required", body = ErrorResponse),
        (status = 404, description = "Vendor or referenced item not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "purchase-orders"
)]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePurchaseOrder>,
) -> Result<Response, ServiceError> {
    let order = state.services.purchase_orders.create(&user, payload).await?;
    Ok(created_response(order))
}

#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    responses(
        (status = 200, description = "Purchase order with items", body = ApiResponse<PurchaseOrderDetails>),
        (status = 404, description = "Purchase order not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "purchase-orders"
)]
pub async fn get_purchase_order(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<PurchaseOrderDetails> {
    let order = state.services.purchase_orders.get(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/status",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    request_body = SetPurchaseOrderStatus,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<PurchaseOrderDetails>),
        (status = 400, description = "Transition not allowed", body = ErrorResponse),
        (status = 403, description = "Manager role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "purchase-orders"
)]
pub async fn set_purchase_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetPurchaseOrderStatus>,
) -> ApiResult<PurchaseOrderDetails> {
    let order = state
        .services
        .purchase_orders
        .set_status(&user, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}
