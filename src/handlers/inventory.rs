use crate::{
    auth::AuthUser,
    entities::parts_usage,
    errors::{ErrorResponse, ServiceError},
    handlers::common::created_response,
    services::inventory::{
        CreateSparePart, PartFilter, ReceiveStock, SparePart, UpdateSparePart, UsePart,
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
    path = "/api/v1/spare-parts",
    params(PartFilter),
    responses(
        (status = 200, description = "Spare parts listed", body = ApiResponse<Vec<SparePart>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn list_parts(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<PartFilter>,
) -> ApiResult<Vec<SparePart>> {
    let parts = state.services.inventory.list_parts(filter).await?;
    Ok(Json(ApiResponse::success(parts)))
}

#[utoipa::path(
    get,
    path = "/api/v1/spare-parts/low-stock",
    responses(
        (status = 200, description = "Parts at or below their minimum", body = ApiResponse<Vec<SparePart>>)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn low_stock(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Vec<SparePart>> {
    let parts = state.services.inventory.low_stock().await?;
    Ok(Json(ApiResponse::success(parts)))
}

#[utoipa::path(
    post,
    path = "/api/v1/spare-parts",
    request_body = CreateSparePart,
    responses(
        (status = 201, description = "Spare part created", body = ApiResponse<SparePart>),
        (status = 400, description = "Invalid part", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn create_part(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateSparePart>,
) -> Result<Response, ServiceError> {
    let part = state.services.inventory.create_part(&user, payload).await?;
    Ok(created_response(part))
}

#[utoipa::path(
    get,
    path = "/api/v1/spare-parts/{id}",
    params(("id" = Uuid, Path, description = "Spare part id")),
    responses(
        (status = 200, description = "Spare part fetched", body = ApiResponse<SparePart>),
        (status = 404, description = "Spare part not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn get_part(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<SparePart> {
    let part = state.services.inventory.get_part(id).await?;
    Ok(Json(ApiResponse::success(part)))
}

#[utoipa::path(
    put,
    path = "/api/v1/spare-parts/{id}",
    params(("id" = Uuid, Path, description = "Spare part id")),
    request_body = UpdateSparePart,
    responses(
        (status = 200, description = "Spare part updated", body = ApiResponse<SparePart>),
        (status = 404, description = "Spare part not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn update_part(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSparePart>,
) -> ApiResult<SparePart> {
    let part = state
        .services
        .inventory
        .update_part(&user, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(part)))
}

#[utoipa::path(
    post,
    path = "/api/v1/spare-parts/{id}/receive",
    params(("id" = Uuid, Path, description = "Spare part id")),
    request_body = ReceiveStock,
    responses(
        (status = 200, description = "Stock increased", body = ApiResponse<SparePart>),
        (status = 400, description = "Quantity must be positive", body = ErrorResponse),
        (status = 404, description = "Spare part not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn receive_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReceiveStock>,
) -> ApiResult<SparePart> {
    let part = state.services.inventory.receive(&user, id, payload).await?;
    Ok(Json(ApiResponse::success(part)))
}

#[utoipa::path(
    post,
    path = "/api/v1/spare-parts/{id}/use",
    params(("id" = Uuid, Path, description = "Spare part id")),
    request_body = UsePart,
    responses(
        (status = 201, description = "Usage recorded and stock decreased", body = ApiResponse<parts_usage::Model>),
        (status = 404, description = "Part or service request not found", body = ErrorResponse),
        (status = 422, description = "Insufficient stock", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn use_part(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UsePart>,
) -> Result<Response, ServiceError> {
    let usage = state.services.inventory.use_part(&user, id, payload).await?;
    Ok(created_response(usage))
}

#[utoipa::path(
    get,
    path = "/api/v1/spare-parts/{id}/usages",
    params(("id" = Uuid, Path, description = "Spare part id")),
    responses(
        (status = 200, description = "Consumption history, newest first", body = ApiResponse<Vec<parts_usage::Model>>),
        (status = 404, description = "Spare part not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn part_usages(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<parts_usage::Model>> {
    let usages = state.services.inventory.usages(id).await?;
    Ok(Json(ApiResponse::success(usages)))
}
