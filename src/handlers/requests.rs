// src/handlers/requests.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::intake::{Request, RequestSummary},
    services::intake_service::CreateRequestInput,
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestPayload {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub profile_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Informe o nome da companhia."))]
    #[schema(example = "Acme S.A.S.")]
    pub company_name: String,

    #[schema(example = "compras@acme.com")]
    pub email: Option<String>,

    #[schema(example = "Colombia")]
    pub trading: Option<String>,

    #[schema(example = "Bogotá")]
    pub location: Option<String>,

    #[schema(example = "Español")]
    pub language: Option<String>,

    #[schema(example = "Una vez por semana")]
    pub reminder_frequency: Option<String>,

    // Obrigatório para o perfil "proveedor"
    #[schema(example = "Ana Ruiz")]
    pub requested_by: Option<String>,
}

impl From<CreateRequestPayload> for CreateRequestInput {
    fn from(p: CreateRequestPayload) -> Self {
        Self {
            profile_id: p.profile_id,
            company_name: p.company_name,
            email: p.email,
            trading: p.trading,
            location: p.location,
            language: p.language,
            reminder_frequency: p.reminder_frequency,
            requested_by: p.requested_by,
        }
    }
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListRequestsQuery {
    #[validate(length(min = 1, message = "Informe a companhia."))]
    pub company: String,
    pub profile_id: Uuid,
    #[validate(range(min = 1, max = 200))]
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotesPayload {
    #[validate(length(max = 10000))]
    #[schema(example = "2025-08-20: recordatorio enviado por correo")]
    pub notification_followup: Option<String>,

    #[validate(length(max = 10000))]
    pub general_comments: Option<String>,
}

// =============================================================================
//  HANDLERS
// =============================================================================

// POST /api/requests
#[utoipa::path(
    post,
    path = "/api/requests",
    tag = "Requests",
    request_body = CreateRequestPayload,
    responses(
        (status = 201, description = "Solicitação criada", body = Request),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Perfil não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_request(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateRequestPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let request = app_state
        .intake_service
        .create_request(payload.into(), &user.0)
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

// GET /api/requests?company=&profileId=&limit=
#[utoipa::path(
    get,
    path = "/api/requests",
    tag = "Requests",
    params(ListRequestsQuery),
    responses(
        (status = 200, description = "Solicitações da companhia, mais recentes primeiro", body = Vec<RequestSummary>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_requests(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<ListRequestsQuery>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;

    let requests = app_state
        .checklist_service
        .list_requests(query.company.trim(), query.profile_id, query.limit)
        .await?;

    Ok((StatusCode::OK, Json(requests)))
}

// GET /api/requests/{id}
#[utoipa::path(
    get,
    path = "/api/requests/{id}",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Solicitação com as notas", body = Request),
        (status = 404, description = "Solicitação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_request(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let request = app_state.checklist_service.load_request(request_id).await?;
    Ok((StatusCode::OK, Json(request)))
}

// PUT /api/requests/{id}/notes
#[utoipa::path(
    put,
    path = "/api/requests/{id}/notes",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    request_body = UpdateNotesPayload,
    responses(
        (status = 204, description = "Notas sobrescritas"),
        (status = 404, description = "Solicitação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_notes(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<UpdateNotesPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state
        .intake_service
        .update_notes(request_id, payload.notification_followup, payload.general_comments)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
