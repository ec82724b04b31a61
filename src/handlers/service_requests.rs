use crate::{
    auth::AuthUser,
    entities::service_request,
    errors::{ErrorResponse, ServiceError},
    handlers::common::created_response,
    services::service_requests::{
        AssignEngineer, CreateServiceRequest, RequestFilter, RequestPartLine, SetRequestStatus,
        UpdateServiceRequest,
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
    path = "/api/v1/service-requests",
    params(RequestFilter),
    responses(
        (status = 200, description = "Service requests listed", body = ApiResponse<Vec<service_request::Model>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "service-requests"
)]
pub async fn list_requests(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<RequestFilter>,
) -> ApiResult<Vec<service_request::Model>> {
    let requests = state.services.service_requests.list(filter).await?;
    Ok(Json(ApiResponse::success(requests)))
}

#[utoipa::path(
    post,
    path = "/api/v1/service-requests",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service request opened", body = ApiResponse<service_request::Model>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Client or equipment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "service-requests"
)]
pub async fn create_request(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<Response, ServiceError> {
    let request = state.services.service_requests.create(&user, payload).await?;
    Ok(created_response(request))
}

#[utoipa::path(
    get,
    path = "/api/v1/service-requests/{id}",
    params(("id" = Uuid, Path, description = "Service request id")),
    responses(
        (status = 200, description = "Service request fetched", body = ApiResponse<service_request::Model>),
        (status = 404, description = "Service request not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "service-requests"
)]
pub async fn get_request(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<service_request::Model> {
    let request = state.services.service_requests.get(id).await?;
    Ok(Json(ApiResponse::success(request)))
}

#[utoipa::path(
    put,
    path = "/api/v1/service-requests/{id}",
    params(("id" = Uuid, Path, description = "Service request id")),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Service request updated", body = ApiResponse<service_request::Model>),
        (status = 400, description = "Request is closed or input invalid", body = ErrorResponse),
        (status = 404, description = "Service request not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "service-requests"
)]
pub async fn update_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateServiceRequest>,
) -> ApiResult<service_request::Model> {
    let request = state
        .services
        .service_requests
        .update(&user, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(request)))
}

#[utoipa::path(
    post,
    path = "/api/v1/service-requests/{id}/status",
    params(("id" = Uuid, Path, description = "Service request id")),
    request_body = SetRequestStatus,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<service_request::Model>),
        (status = 400, description = "Transition not allowed", body = ErrorResponse),
        (status = 404, description = "Service request not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "service-requests"
)]
pub async fn set_request_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetRequestStatus>,
) -> ApiResult<service_request::Model> {
    let request = state
        .services
        .service_requests
        .set_status(&user, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(request)))
}

#[utoipa::path(
    post,
    path = "/api/v1/service-requests/{id}/assign",
    params(("id" = Uuid, Path, description = "Service request id")),
    request_body = AssignEngineer,
    responses(
        (status = 200, description = "Engineer assigned", body = ApiResponse<service_request::Model>),
        (status = 403, description = "Manager role required", body = ErrorResponse),
        (status = 404, description = "Service request not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "service-requests"
)]
pub async fn assign_engineer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignEngineer>,
) -> ApiResult<service_request::Model> {
    let request = state
        .services
        .service_requests
        .assign_engineer(&user, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(request)))
}

#[utoipa::path(
    get,
    path = "/api/v1/service-requests/{id}/parts",
    params(("id" = Uuid, Path, description = "Service request id")),
    responses(
        (status = 200, description = "Parts consumed by the request", body = ApiResponse<Vec<RequestPartLine>>),
        (status = 404, description = "Service request not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "service-requests"
)]
pub async fn request_parts(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<RequestPartLine>> {
    let parts = state.services.service_requests.parts(id).await?;
    Ok(Json(ApiResponse::success(parts)))
}
