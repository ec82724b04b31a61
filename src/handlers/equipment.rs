use crate::{
    auth::AuthUser,
    entities::{equipment_catalog, equipment_unit, service_request},
    errors::{ErrorResponse, ServiceError},
    handlers::common::created_response,
    services::equipment::{
        CatalogFilter, CreateCatalogItem, CreateEquipmentUnit, EquipmentFilter,
        UpdateCatalogItem, UpdateEquipmentUnit,
    },
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::{Json, Response},
};
use uuid::Uuid;

// Catalog

#[utoipa::path(
    get,
    path = "/api/v1/equipment-catalog",
    params(CatalogFilter),
    responses(
        (status = 200, description = "Active catalog items", body = ApiResponse<Vec<equipment_catalog::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "equipment"
)]
pub async fn list_catalog(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<CatalogFilter>,
) -> ApiResult<Vec<equipment_catalog::Model>> {
    let items = state.services.equipment.list_catalog(filter).await?;
    Ok(Json(ApiResponse::success(items)))
}

#[utoipa::path(
    post,
    path = "/api/v1/equipment-catalog",
    request_body = CreateCatalogItem,
    responses(
        (status = 201, description = "Catalog item created", body = ApiResponse<equipment_catalog::Model>),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "equipment"
)]
pub async fn create_catalog_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCatalogItem>,
) -> Result<Response, ServiceError> {
    let item = state
        .services
        .equipment
        .create_catalog_item(&user, payload)
        .await?;
    Ok(created_response(item))
}

#[utoipa::path(
    get,
    path = "/api/v1/equipment-catalog/{id}",
    params(("id" = Uuid, Path, description = "Catalog item id")),
    responses(
        (status = 200, description = "Catalog item fetched", body = ApiResponse<equipment_catalog::Model>),
        (status = 404, description = "Catalog item not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "equipment"
)]
pub async fn get_catalog_item(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<equipment_catalog::Model> {
    let item = state.services.equipment.get_catalog_item(id).await?;
    Ok(Json(ApiResponse::success(item)))
}

#[utoipa::path(
    put,
    path = "/api/v1/equipment-catalog/{id}",
    params(("id" = Uuid, Path, description = "Catalog item id")),
    request_body = UpdateCatalogItem,
    responses(
        (status = 200, description = "Catalog item updated", body = ApiResponse<equipment_catalog::Model>),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "equipment"
)]
pub async fn update_catalog_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCatalogItem>,
) -> ApiResult<equipment_catalog::Model> {
    let item = state
        .services
        .equipment
        .update_catalog_item(&user, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/equipment-catalog/{id}",
    params(("id" = Uuid, Path, description = "Catalog item id")),
    responses(
        (status = 200, description = "Catalog item deactivated", body = ApiResponse<equipment_catalog::Model>),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "equipment"
)]
pub async fn deactivate_catalog_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<equipment_catalog::Model> {
    let item = state
        .services
        .equipment
        .deactivate_catalog_item(&user, id)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

// Installed units

#[utoipa::path(
    get,
    path = "/api/v1/equipment",
    params(EquipmentFilter),
    responses(
        (status = 200, description = "Equipment units listed", body = ApiResponse<Vec<equipment_unit::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "equipment"
)]
pub async fn list_units(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<EquipmentFilter>,
) -> ApiResult<Vec<equipment_unit::Model>> {
    let units = state.services.equipment.list_units(filter).await?;
    Ok(Json(ApiResponse::success(units)))
}

#[utoipa::path(
    post,
    path = "/api/v1/equipment",
    request_body = CreateEquipmentUnit,
    responses(
        (status = 201, description = "Equipment unit registered", body = ApiResponse<equipment_unit::Model>),
        (status = 404, description = "Client or catalog item not found", body = ErrorResponse),
        (status = 409, description = "Serial number already registered", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "equipment"
)]
pub async fn create_unit(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateEquipmentUnit>,
) -> Result<Response, ServiceError> {
    let unit = state.services.equipment.create_unit(&user, payload).await?;
    Ok(created_response(unit))
}

#[utoipa::path(
    get,
    path = "/api/v1/equipment/{id}",
    params(("id" = Uuid, Path, description = "Equipment unit id")),
    responses(
        (status = 200, description = "Equipment unit fetched", body = ApiResponse<equipment_unit::Model>),
        (status = 404, description = "Equipment unit not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "equipment"
)]
pub async fn get_unit(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<equipment_unit::Model> {
    let unit = state.services.equipment.get_unit(id).await?;
    Ok(Json(ApiResponse::success(unit)))
}

#[utoipa::path(
    put,
    path = "/api/v1/equipment/{id}",
    params(("id" = Uuid, Path, description = "Equipment unit id")),
    request_body = UpdateEquipmentUnit,
    responses(
        (status = 200, description = "Equipment unit updated", body = ApiResponse<equipment_unit::Model>),
        (status = 404, description = "Equipment unit not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "equipment"
)]
pub async fn update_unit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEquipmentUnit>,
) -> ApiResult<equipment_unit::Model> {
    let unit = state
        .services
        .equipment
        .update_unit(&user, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(unit)))
}

#[utoipa::path(
    post,
    path = "/api/v1/equipment/{id}/decommission",
    params(("id" = Uuid, Path, description = "Equipment unit id")),
    responses(
        (status = 200, description = "Equipment decommissioned", body = ApiResponse<equipment_unit::Model>),
        (status = 403, description = "Manager role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "equipment"
)]
pub async fn decommission_unit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<equipment_unit::Model> {
    let unit = state.services.equipment.decommission_unit(&user, id).await?;
    Ok(Json(ApiResponse::success(unit)))
}

#[utoipa::path(
    get,
    path = "/api/v1/equipment/{id}/requests",
    params(("id" = Uuid, Path, description = "Equipment unit id")),
    responses(
        (status = 200, description = "Service history of the unit", body = ApiResponse<Vec<service_request::Model>>),
        (status = 404, description = "Equipment unit not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "equipment"
)]
pub async fn unit_requests(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<service_request::Model>> {
    state.services.equipment.get_unit(id).await?;
    let requests = state.services.service_requests.for_equipment(id).await?;
    Ok(Json(ApiResponse::success(requests)))
}
