// src/services/checklist_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::IntakeStore,
    models::{
        intake::{DocumentType, Profile, Request, RequestSummary, UploadedDocument},
        progress::{ProgressOverviewEntry, RequestProgress},
    },
    services::completion::compute_completion,
};

pub const DEFAULT_REQUEST_LIMIT: i64 = 20;

// Leitura: checklist do perfil, mapa de uploads e progresso.
#[derive(Clone)]
pub struct ChecklistService {
    store: Arc<dyn IntakeStore>,
}

impl ChecklistService {
    pub fn new(store: Arc<dyn IntakeStore>) -> Self {
        Self { store }
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        self.store.list_profiles().await
    }

    pub async fn list_company_names(&self) -> Result<Vec<String>, AppError> {
        self.store.list_company_names().await
    }

    /// Lista vazia é válida (perfil sem documentos configurados); perfil inexistente é `ProfileNotFound`.
    pub async fn resolve_checklist(&self, profile_id: Uuid) -> Result<Vec<DocumentType>, AppError> {
        self.store
            .find_profile(profile_id)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        self.store.list_document_types(profile_id).await
    }

    pub async fn resolve_uploads(
        &self,
        request_id: Uuid,
    ) -> Result<HashMap<Uuid, UploadedDocument>, AppError> {
        self.load_request(request_id).await?;
        self.upload_map(request_id).await
    }

    pub async fn load_request(&self, request_id: Uuid) -> Result<Request, AppError> {
        self.store
            .find_request(request_id)
            .await?
            .ok_or(AppError::RequestNotFound)
    }

    pub async fn list_requests(
        &self,
        company_name: &str,
        profile_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<RequestSummary>, AppError> {
        let limit = limit.unwrap_or(DEFAULT_REQUEST_LIMIT).clamp(1, 200);
        self.store
            .list_requests_by_company(company_name, profile_id, limit)
            .await
    }

    pub async fn request_progress(&self, request_id: Uuid) -> Result<RequestProgress, AppError> {
        let request = self.load_request(request_id).await?;
        let documents = self.resolve_checklist(request.profile_id).await?;
        let uploads = self.upload_map(request_id).await?;

        Ok(RequestProgress {
            request_id: request.id,
            company_name: request.company_name,
            profile_id: request.profile_id,
            notification_followup: request.notification_followup,
            general_comments: request.general_comments,
            completion: compute_completion(&documents, &uploads),
        })
    }

    pub async fn progress_overview(
        &self,
        created_by: Option<&str>,
    ) -> Result<Vec<ProgressOverviewEntry>, AppError> {
        let requests = self.store.list_requests_for_progress(created_by).await?;

        // Cada perfil é carregado uma vez só
        let mut checklists: HashMap<Uuid, Vec<DocumentType>> = HashMap::new();
        let mut entries = Vec::with_capacity(requests.len());

        for request in requests {
            if !checklists.contains_key(&request.profile_id) {
                let documents = self.store.list_document_types(request.profile_id).await?;
                checklists.insert(request.profile_id, documents);
            }
            let documents = &checklists[&request.profile_id];
            let uploads = self.upload_map(request.id).await?;
            let report = compute_completion(documents, &uploads);

            entries.push(ProgressOverviewEntry {
                request_id: request.id,
                company_name: request.company_name,
                profile_id: request.profile_id,
                created_at: request.created_at,
                created_by_email: request.created_by_email,
                percent: report.percent,
                fulfilled_count: report.fulfilled_count,
                total_required: report.total_required,
            });
        }

        Ok(entries)
    }

    async fn upload_map(&self, request_id: Uuid) -> Result<HashMap<Uuid, UploadedDocument>, AppError> {
        let uploads = self.store.list_uploads(request_id).await?;
        Ok(uploads
            .into_iter()
            .map(|u| (u.document_type_id, u))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryIntakeStore;
    use crate::models::intake::NewRequest;

    async fn seeded() -> (Arc<MemoryIntakeStore>, Profile) {
        let store = Arc::new(MemoryIntakeStore::new());
        let cliente = store.add_profile("cliente").await;
        store.add_document_type(cliente.id, "RUT", true).await;
        store.add_document_type(cliente.id, "Cámara de Comercio", true).await;
        store.add_document_type(cliente.id, "Brochure", false).await;
        (store, cliente)
    }

    #[tokio::test]
    async fn checklist_is_sorted_by_name() {
        let (store, cliente) = seeded().await;
        let service = ChecklistService::new(store);

        let names: Vec<String> = service
            .resolve_checklist(cliente.id)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Brochure", "Cámara de Comercio", "RUT"]);
    }

    #[tokio::test]
    async fn unknown_profile_is_not_found_but_empty_profile_is_ok() {
        let (store, _) = seeded().await;
        let vacio = store.add_profile("proveedor").await;
        let service = ChecklistService::new(store);

        assert!(service.resolve_checklist(vacio.id).await.unwrap().is_empty());
        assert!(matches!(
            service.resolve_checklist(Uuid::new_v4()).await,
            Err(AppError::ProfileNotFound)
        ));
    }

    #[tokio::test]
    async fn uploads_of_unknown_request_is_not_found() {
        let (store, _) = seeded().await;
        let service = ChecklistService::new(store);
        assert!(matches!(
            service.resolve_uploads(Uuid::new_v4()).await,
            Err(AppError::RequestNotFound)
        ));
    }

    #[tokio::test]
    async fn overview_filters_by_creator_case_insensitively() {
        let (store, cliente) = seeded().await;
        for (company, creator) in [("Acme", "Ana@Acme.com"), ("Beta", "luis@beta.com")] {
            store
                .insert_request(&NewRequest {
                    profile_id: cliente.id,
                    company_name: company.to_string(),
                    created_by_email: Some(creator.to_string()),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        let service = ChecklistService::new(store);

        let mine = service.progress_overview(Some("ana@acme.com")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].company_name, "Acme");
        assert_eq!(mine[0].percent, 0);
        assert_eq!(mine[0].total_required, 2);

        assert_eq!(service.progress_overview(None).await.unwrap().len(), 2);
    }
}
