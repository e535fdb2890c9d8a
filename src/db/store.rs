// src/db/store.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::intake::{
        ChangeSet, DocumentType, NewRequest, Profile, Request, RequestSummary, UploadedDocument,
    },
};

/// Porta de persistência usada pelos serviços.
///
/// Em produção é o `IntakeRepository` (PostgreSQL); nos testes, o
/// `MemoryIntakeStore`. Nenhuma regra de negócio mora aqui, exceto o
/// merge de listas do modo `Append`, que ambas as implementações fazem
/// com `csv_list::append` dentro da própria transação.
#[async_trait]
pub trait IntakeStore: Send + Sync {
    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError>;

    async fn find_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, AppError>;

    /// Tipos de documento do perfil, ordenados por nome.
    async fn list_document_types(&self, profile_id: Uuid) -> Result<Vec<DocumentType>, AppError>;

    async fn find_document_type(
        &self,
        document_type_id: Uuid,
    ) -> Result<Option<DocumentType>, AppError>;

    async fn list_company_names(&self) -> Result<Vec<String>, AppError>;

    async fn insert_request(&self, new_request: &NewRequest) -> Result<Request, AppError>;

    async fn find_request(&self, request_id: Uuid) -> Result<Option<Request>, AppError>;

    /// Solicitações de uma companhia + perfil, mais recentes primeiro.
    async fn list_requests_by_company(
        &self,
        company_name: &str,
        profile_id: Uuid,
        limit: i64,
    ) -> Result<Vec<RequestSummary>, AppError>;

    /// Todas as solicitações (ou só as criadas por `created_by`, sem diferenciar maiúsculas).
    async fn list_requests_for_progress(
        &self,
        created_by: Option<&str>,
    ) -> Result<Vec<RequestSummary>, AppError>;

    async fn list_uploads(&self, request_id: Uuid) -> Result<Vec<UploadedDocument>, AppError>;

    /// Aplica upserts, notas e `first_upload_at` de forma atômica: tudo ou nada.
    async fn apply_changes(&self, changes: &ChangeSet) -> Result<(), AppError>;
}
