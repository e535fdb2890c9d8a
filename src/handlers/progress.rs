// src/handlers/progress.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::progress::{ProgressOverviewEntry, RequestProgress},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProgressQuery {
    /// Apenas as solicitações criadas pelo usuário do token.
    pub mine: Option<bool>,
}

// GET /api/requests/{id}/progress
#[utoipa::path(
    get,
    path = "/api/requests/{id}/progress",
    tag = "Progress",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Percentual e status de cada documento", body = RequestProgress),
        (status = 404, description = "Solicitação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn request_progress(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let progress = app_state.checklist_service.request_progress(request_id).await?;
    Ok((StatusCode::OK, Json(progress)))
}

// GET /api/progress?mine=true
#[utoipa::path(
    get,
    path = "/api/progress",
    tag = "Progress",
    params(ProgressQuery),
    responses(
        (status = 200, description = "Painel de progresso de todas as solicitações", body = Vec<ProgressOverviewEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn progress_overview(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ProgressQuery>,
) -> Result<impl IntoResponse, AppError> {
    let created_by = query.mine.unwrap_or(false).then_some(user.0.email.as_str());

    let overview = app_state.checklist_service.progress_overview(created_by).await?;
    Ok((StatusCode::OK, Json(overview)))
}
