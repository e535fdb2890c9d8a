// src/models/progress.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    #[schema(example = "Archivo 1")]
    pub label: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatus {
    pub document_type_id: Uuid,
    pub name: String,
    pub is_required: bool,
    pub is_multi_file: bool,
    pub fulfilled: bool,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub uploaded_by: Option<String>,
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletionReport {
    #[schema(example = 67)]
    pub percent: u8,
    #[schema(example = 2)]
    pub fulfilled_count: usize,
    #[schema(example = 3)]
    pub total_required: usize,
    pub documents: Vec<DocumentStatus>,
}

/// Progresso de uma solicitação, com as notas de acompanhamento.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestProgress {
    pub request_id: Uuid,
    pub company_name: String,
    pub profile_id: Uuid,
    pub notification_followup: Option<String>,
    pub general_comments: Option<String>,
    pub completion: CompletionReport,
}

/// Linha do painel geral de progresso.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOverviewEntry {
    pub request_id: Uuid,
    pub company_name: String,
    pub profile_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub created_by_email: Option<String>,
    pub percent: u8,
    pub fulfilled_count: usize,
    pub total_required: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailedUpload {
    pub document_type_id: Uuid,
    pub file_name: String,
    pub reason: String,
}

/// Resultado de uma ação de salvar (documentos + notas).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveReport {
    #[schema(example = 2)]
    pub uploaded: usize,
    pub notes_saved: bool,
    pub failed_upload: Option<FailedUpload>,
}
