// src/models/intake.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Dados de configuração ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "cliente")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentType {
    pub id: Uuid,
    pub profile_id: Uuid,
    #[schema(example = "Cámara de Comercio")]
    pub name: String,
    #[schema(example = true)]
    pub is_required: bool,
}

// --- Solicitação de criação ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: Uuid,
    pub profile_id: Uuid,
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
    pub requested_by: Option<String>,
    #[schema(example = "comercial")]
    pub requested_by_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by_email: Option<String>,
    // Preenchido uma única vez, no primeiro upload.
    pub first_upload_at: Option<DateTime<Utc>>,
    pub notification_followup: Option<String>,
    pub general_comments: Option<String>,
}

/// Linha resumida usada nas listagens (seleção de solicitação, painel de progresso).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummary {
    pub id: Uuid,
    pub company_name: String,
    pub profile_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub created_by_email: Option<String>,
}

/// Dados já validados para inserir uma nova solicitação.
#[derive(Debug, Clone, Default)]
pub struct NewRequest {
    pub profile_id: Uuid,
    pub company_name: String,
    pub email: Option<String>,
    pub trading: Option<String>,
    pub location: Option<String>,
    pub language: Option<String>,
    pub reminder_frequency: Option<String>,
    pub requested_by: Option<String>,
    pub requested_by_type: Option<String>,
    pub created_by_email: Option<String>,
}

// --- Documentos carregados ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    pub id: Uuid,
    pub request_id: Uuid,
    pub document_type_id: Uuid,
    // Para "Verificaciones de seguridad": lista separada por vírgulas.
    #[schema(example = "rut.pdf")]
    pub file_name: String,
    #[schema(example = "https://drive.google.com/file/d/abc/view")]
    pub drive_link: String,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Insert-or-replace do registro inteiro.
    Replace,
    /// Acrescenta nome e link às listas já gravadas.
    Append,
}

#[derive(Debug, Clone)]
pub struct UploadWrite {
    pub document_type_id: Uuid,
    pub file_name: String,
    pub drive_link: String,
    pub uploaded_by: String,
    pub mode: WriteMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestNotes {
    pub notification_followup: Option<String>,
    pub general_comments: Option<String>,
}

/// Tudo o que uma ação de "salvar" grava no banco, aplicado numa única transação.
#[derive(Debug, Clone)]
pub struct ChangeSet {
    pub request_id: Uuid,
    pub uploads: Vec<UploadWrite>,
    pub notes: Option<RequestNotes>,
    pub at: DateTime<Utc>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.uploads.is_empty() && self.notes.is_none()
    }
}
