use crate::{
    auth::AuthUser,
    entities::invoice,
    errors::{ErrorResponse, ServiceError},
    handlers::common::created_response,
    services::invoices::{
        CreateInvoice, InvoiceDetails, InvoiceFilter, InvoiceItemInput, SetInvoiceStatus,
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
    path = "/api/v1/invoices",
    params(InvoiceFilter),
    responses(
        (status = 200, description = "Invoices listed", body = ApiResponse<Vec<invoice::Model>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "invoices"
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<InvoiceFilter>,
) -> ApiResult<Vec<invoice::Model>> {
    let invoices = state.services.invoices.list(filter).await?;
    Ok(Json(ApiResponse::success(invoices)))
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices",
    request_body = CreateInvoice,
    responses(
        (status = 201, description = "Draft invoice created", body = ApiResponse<InvoiceDetails>),
        (status = 400, description = "Invalid invoice", body = ErrorResponse),
        (status = 404, description = "Client or request not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "invoices"
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateInvoice>,
) -> Result<Response, ServiceError> {
    let invoice = state.services.invoices.create(&user, payload).await?;
    Ok(created_response(invoice))
}

#[utoipa::path(
    get,
    path = "/api/v1/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice with items", body = ApiResponse<InvoiceDetails>),
        (status = 404, description = "Invoice not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "invoices"
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<InvoiceDetails> {
    let invoice = state.services.invoices.get(id).await?;
    Ok(Json(ApiResponse::success(invoice)))
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/items",
    params(("id" = Uuid, Path, description = "Invoice id")),
    request_body = InvoiceItemInput,
    responses(
        (status = 200, description = "Item added and totals recomputed", body = ApiResponse<InvoiceDetails>),
        (status = 400, description = "Invoice is not a draft or item invalid", body = ErrorResponse),
        (status = 404, description = "Invoice not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "invoices"
)]
pub async fn add_invoice_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<InvoiceItemInput>,
) -> ApiResult<InvoiceDetails> {
    let invoice = state.services.invoices.add_item(&user, id, payload).await?;
    Ok(Json(ApiResponse::success(invoice)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/invoices/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Invoice id"),
        ("item_id" = Uuid, Path, description = "Invoice item id")
    ),
    responses(
        (status = 200, description = "Item removed and totals recomputed", body = ApiResponse<InvoiceDetails>),
        (status = 400, description = "Invoice is not a draft", body = ErrorResponse),
        (status = 404, description = "Invoice or item not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "invoices"
)]
pub async fn remove_invoice_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<InvoiceDetails> {
    let invoice = state
        .services
        .invoices
        .remove_item(&user, id, item_id)
        .await?;
    Ok(Json(ApiResponse::success(invoice)))
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/status",
    params(("id" = Uuid, Path, description = "Invoice id")),
    request_body = SetInvoiceStatus,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<InvoiceDetails>),
        (status = 400, description = "Transition not allowed", body = ErrorResponse),
        (status = 403, description = "Manager role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "invoices"
)]
pub async fn set_invoice_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetInvoiceStatus>,
) -> ApiResult<InvoiceDetails> {
    let invoice = state
        .services
        .invoices
        .set_status(&user, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(invoice)))
}
