// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::intake::{DocumentType, Profile},
};

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, description = "Servidor no ar", body = String))
)]
pub async fn health() -> &'static str {
    "OK"
}

// GET /api/profiles
#[utoipa::path(
    get,
    path = "/api/profiles",
    tag = "Catalog",
    responses(
        (status = 200, description = "Perfis ordenados por nome", body = Vec<Profile>),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_profiles(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let profiles = app_state.checklist_service.list_profiles().await?;
    Ok((StatusCode::OK, Json(profiles)))
}

// GET /api/profiles/{id}/document-types
#[utoipa::path(
    get,
    path = "/api/profiles/{id}/document-types",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do perfil")),
    responses(
        (status = 200, description = "Checklist do perfil, ordenado por nome (pode ser vazio)", body = Vec<DocumentType>),
        (status = 404, description = "Perfil não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_document_types(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let checklist = app_state.checklist_service.resolve_checklist(profile_id).await?;
    Ok((StatusCode::OK, Json(checklist)))
}

// GET /api/companies
#[utoipa::path(
    get,
    path = "/api/companies",
    tag = "Catalog",
    responses((status = 200, description = "Nomes de companhia já cadastrados", body = Vec<String>)),
    security(("api_jwt" = []))
)]
pub async fn list_companies(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let names = app_state.checklist_service.list_company_names().await?;
    Ok((StatusCode::OK, Json(names)))
}
