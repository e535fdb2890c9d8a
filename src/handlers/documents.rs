// src/handlers/documents.rs

use std::collections::HashMap;

use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        intake::{DocumentType, RequestNotes, UploadedDocument},
        progress::SaveReport,
    },
    services::intake_service::PendingFile,
};

const DOC_FIELD_PREFIX: &str = "doc:";

/// Checklist do perfil + uploads da solicitação, indexados por tipo de documento.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestDocuments {
    pub request_id: Uuid,
    pub checklist: Vec<DocumentType>,
    pub uploads: HashMap<Uuid, UploadedDocument>,
}

/// Formato do corpo multipart (apenas para a documentação).
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct SaveDocumentsForm {
    /// Uma parte `doc:<documentTypeId>` por arquivo PDF; pode repetir.
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    /// Sobrescreve o acompanhamento de notificações.
    followup: Option<String>,
    /// Sobrescreve os comentários gerais.
    comments: Option<String>,
}

// GET /api/requests/{id}/documents
#[utoipa::path(
    get,
    path = "/api/requests/{id}/documents",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Checklist e documentos carregados", body = RequestDocuments),
        (status = 404, description = "Solicitação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let service = &app_state.checklist_service;

    let request = service.load_request(request_id).await?;
    let checklist = service.resolve_checklist(request.profile_id).await?;
    let uploads = service.resolve_uploads(request_id).await?;

    Ok((StatusCode::OK, Json(RequestDocuments { request_id, checklist, uploads })))
}

// POST /api/requests/{id}/documents
#[utoipa::path(
    post,
    path = "/api/requests/{id}/documents",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    request_body(content = SaveDocumentsForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Tudo salvo", body = SaveReport),
        (status = 207, description = "Envio interrompido no Drive; o que foi enviado está salvo", body = SaveReport),
        (status = 400, description = "Arquivo não-PDF, tipo de documento de outro perfil ou multipart inválido"),
        (status = 404, description = "Solicitação ou tipo de documento não encontrado"),
        (status = 500, description = "Falha no banco; nada foi gravado, repita o envio"),
        (status = 502, description = "Drive indisponível e nada a gravar")
    ),
    security(("api_jwt" = []))
)]
pub async fn save_documents(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(request_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut files = Vec::new();
    let mut followup = None;
    let mut comments = None;
    let mut notes_sent = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidMultipart(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(raw_id) = name.strip_prefix(DOC_FIELD_PREFIX) {
            files.push(read_file(raw_id, field).await?);
            continue;
        }

        match name.as_str() {
            "followup" => {
                followup = read_text(field).await?;
                notes_sent = true;
            }
            "comments" => {
                comments = read_text(field).await?;
                notes_sent = true;
            }
            other => tracing::debug!("Campo multipart ignorado: '{}'", other),
        }
    }

    let notes = notes_sent.then_some(RequestNotes {
        notification_followup: followup,
        general_comments: comments,
    });

    let report = app_state
        .intake_service
        .save_documents(request_id, files, notes, &user.0)
        .await?;

    let status = if report.failed_upload.is_some() {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::OK
    };

    Ok((status, Json(report)))
}

async fn read_file(raw_id: &str, field: Field<'_>) -> Result<PendingFile, AppError> {
    let document_type_id = Uuid::parse_str(raw_id).map_err(|_| {
        AppError::InvalidMultipart(format!("'{DOC_FIELD_PREFIX}{raw_id}' não traz um UUID válido"))
    })?;

    let file_name = field
        .file_name()
        .map(str::to_string)
        .ok_or_else(|| AppError::InvalidMultipart(format!("a parte '{DOC_FIELD_PREFIX}{raw_id}' não é um arquivo")))?;

    let content = field
        .bytes()
        .await
        .map_err(|e| AppError::InvalidMultipart(e.body_text()))?;

    Ok(PendingFile { document_type_id, file_name, content: content.to_vec() })
}

// Texto vazio vira NULL
async fn read_text(field: Field<'_>) -> Result<Option<String>, AppError> {
    let text = field
        .text()
        .await
        .map_err(|e| AppError::InvalidMultipart(e.body_text()))?;

    let trimmed = text.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}
