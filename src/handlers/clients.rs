use crate::{
    auth::AuthUser,
    entities::{client, interaction},
    errors::{ErrorResponse, ServiceError},
    handlers::common::created_response,
    services::clients::{ClientFilter, CreateClient, CreateInteraction, UpdateClient},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::{Json, Response},
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/clients",
    params(ClientFilter),
    responses(
        (status = 200, description = "Clients listed", body = ApiResponse<Vec<client::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "clients"
)]
pub async fn list_clients(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<ClientFilter>,
) -> ApiResult<Vec<client::Model>> {
    let clients = state.services.clients.list(filter).await?;
    Ok(Json(ApiResponse::success(clients)))
}

#[utoipa::path(
    post,
    path = "/api/v1/clients",
    request_body = CreateClient,
    responses(
        (status = 201, description = "Client created", body = ApiResponse<client::Model>),
        (status = 400, description = "Invalid client", body = ErrorResponse),
        (status = 409, description = "Tax id already registered", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "clients"
)]
pub async fn create_client(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateClient>,
) -> Result<Response, ServiceError> {
    let client = state.services.clients.create(&user, payload).await?;
    Ok(created_response(client))
}

#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}",
    params(("id" = Uuid, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client fetched", body = ApiResponse<client::Model>),
        (status = 404, description = "Client not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "clients"
)]
pub async fn get_client(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<client::Model> {
    let client = state.services.clients.get(id).await?;
    Ok(Json(ApiResponse::success(client)))
}

#[utoipa::path(
    put,
    path = "/api/v1/clients/{id}",
    params(("id" = Uuid, Path, description = "Client id")),
    request_body = UpdateClient,
    responses(
        (status = 200, description = "Client updated", body = ApiResponse<client::Model>),
        (status = 404, description = "Client not found", body = ErrorResponse),
        (status = 409, description = "Tax id already registered", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "clients"
)]
pub async fn update_client(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClient>,
) -> ApiResult<client::Model> {
    let client = state.services.clients.update(&user, id, payload).await?;
    Ok(Json(ApiResponse::success(client)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/clients/{id}",
    params(("id" = Uuid, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client deactivated", body = ApiResponse<client::Model>),
        (status = 404, description = "Client not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "clients"
)]
pub async fn deactivate_client(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<client::Model> {
    let client = state.services.clients.deactivate(&user, id).await?;
    Ok(Json(ApiResponse::success(client)))
}

#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}/interactions",
    params(("id" = Uuid, Path, description = "Client id")),
    responses(
        (status = 200, description = "Interaction history, newest first", body = ApiResponse<Vec<interaction::Model>>),
        (status = 404, description = "Client not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "clients"
)]
pub async fn list_interactions(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<interaction::Model>> {
    let interactions = state.services.clients.interactions(id).await?;
    Ok(Json(ApiResponse::success(interactions)))
}

#[utoipa::path(
    post,
    path = "/api/v1/clients/{id}/interactions",
    params(("id" = Uuid, Path, description = "Client id")),
    request_body = CreateInteraction,
    responses(
        (status = 201, description = "Interaction logged", body = ApiResponse<interaction::Model>),
        (status = 404, description = "Client not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "clients"
)]
pub async fn add_interaction(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateInteraction>,
) -> Result<Response, ServiceError> {
    let interaction = state
        .services
        .clients
        .add_interaction(&user, id, payload)
        .await?;
    Ok(created_response(interaction))
}
