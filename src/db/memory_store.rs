// src/db/memory_store.rs
//
// Implementação em memória do IntakeStore, só para testes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::{csv_list, error::AppError},
    db::store::IntakeStore,
    models::intake::{
        ChangeSet, DocumentType, NewRequest, Profile, Request, RequestSummary, UploadedDocument,
        WriteMode,
    },
};

#[derive(Default, Clone)]
struct State {
    profiles: Vec<Profile>,
    document_types: Vec<DocumentType>,
    requests: HashMap<Uuid, Request>,
    // Chave única (request_id, document_type_id), como no banco.
    uploads: HashMap<(Uuid, Uuid), UploadedDocument>,
}

#[derive(Default)]
pub struct MemoryIntakeStore {
    state: RwLock<State>,
    fail_writes: AtomicBool,
}

impl MemoryIntakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_profile(&self, name: &str) -> Profile {
        let profile = Profile { id: Uuid::new_v4(), name: name.to_string() };
        self.state.write().await.profiles.push(profile.clone());
        profile
    }

    pub async fn add_document_type(
        &self,
        profile_id: Uuid,
        name: &str,
        is_required: bool,
    ) -> DocumentType {
        let doc_type = DocumentType {
            id: Uuid::new_v4(),
            profile_id,
            name: name.to_string(),
            is_required,
        };
        self.state.write().await.document_types.push(doc_type.clone());
        doc_type
    }

    /// Faz o próximo `apply_changes`/`insert_request` falhar como um erro de banco.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn request_count(&self) -> usize {
        self.state.read().await.requests.len()
    }

    pub async fn upload_count(&self, request_id: Uuid) -> usize {
        self.state
            .read()
            .await
            .uploads
            .keys()
            .filter(|(rid, _)| *rid == request_id)
            .count()
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(sqlx::Error::Protocol(
                "falha simulada de escrita".into(),
            )));
        }
        Ok(())
    }
}

fn summary(request: &Request) -> RequestSummary {
    RequestSummary {
        id: request.id,
        company_name: request.company_name.clone(),
        profile_id: request.profile_id,
        created_at: request.created_at,
        created_by_email: request.created_by_email.clone(),
    }
}

#[async_trait]
impl IntakeStore for MemoryIntakeStore {
    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        let mut profiles = self.state.read().await.profiles.clone();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }

    async fn find_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, AppError> {
        let state = self.state.read().await;
        Ok(state.profiles.iter().find(|p| p.id == profile_id).cloned())
    }

    async fn list_document_types(&self, profile_id: Uuid) -> Result<Vec<DocumentType>, AppError> {
        let state = self.state.read().await;
        let mut types: Vec<DocumentType> = state
            .document_types
            .iter()
            .filter(|d| d.profile_id == profile_id)
            .cloned()
            .collect();
        types.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(types)
    }

    async fn find_document_type(
        &self,
        document_type_id: Uuid,
    ) -> Result<Option<DocumentType>, AppError> {
        let state = self.state.read().await;
        Ok(state.document_types.iter().find(|d| d.id == document_type_id).cloned())
    }

    async fn list_company_names(&self) -> Result<Vec<String>, AppError> {
        let state = self.state.read().await;
        let mut names: Vec<String> =
            state.requests.values().map(|r| r.company_name.clone()).collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn insert_request(&self, new_request: &NewRequest) -> Result<Request, AppError> {
        self.check_writable()?;

        let request = Request {
            id: Uuid::new_v4(),
            profile_id: new_request.profile_id,
            company_name: new_request.company_name.clone(),
            email: new_request.email.clone(),
            trading: new_request.trading.clone(),
            location: new_request.location.clone(),
            language: new_request.language.clone(),
            reminder_frequency: new_request.reminder_frequency.clone(),
            requested_by: new_request.requested_by.clone(),
            requested_by_type: new_request.requested_by_type.clone(),
            created_at: Utc::now(),
            created_by_email: new_request.created_by_email.clone(),
            first_upload_at: None,
            notification_followup: None,
            general_comments: None,
        };
        self.state.write().await.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_request(&self, request_id: Uuid) -> Result<Option<Request>, AppError> {
        Ok(self.state.read().await.requests.get(&request_id).cloned())
    }

    async fn list_requests_by_company(
        &self,
        company_name: &str,
        profile_id: Uuid,
        limit: i64,
    ) -> Result<Vec<RequestSummary>, AppError> {
        let state = self.state.read().await;
        let mut rows: Vec<RequestSummary> = state
            .requests
            .values()
            .filter(|r| r.company_name == company_name && r.profile_id == profile_id)
            .map(summary)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn list_requests_for_progress(
        &self,
        created_by: Option<&str>,
    ) -> Result<Vec<RequestSummary>, AppError> {
        let state = self.state.read().await;
        let mut rows: Vec<RequestSummary> = state
            .requests
            .values()
            .filter(|r| match created_by {
                None => true,
                Some(email) => r
                    .created_by_email
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase() == email.to_lowercase()),
            })
            .map(summary)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn list_uploads(&self, request_id: Uuid) -> Result<Vec<UploadedDocument>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .uploads
            .values()
            .filter(|u| u.request_id == request_id)
            .cloned()
            .collect())
    }

    async fn apply_changes(&self, changes: &ChangeSet) -> Result<(), AppError> {
        self.check_writable()?;

        let mut guard = self.state.write().await;
        // Trabalha numa cópia: só substitui o estado se tudo der certo.
        let mut next = guard.clone();

        for write in &changes.uploads {
            let key = (changes.request_id, write.document_type_id);
            let previous = next.uploads.get(&key);

            let (file_name, drive_link) = match write.mode {
                WriteMode::Replace => (write.file_name.clone(), write.drive_link.clone()),
                WriteMode::Append => (
                    csv_list::append(previous.map(|p| p.file_name.as_str()), &write.file_name),
                    csv_list::append(previous.map(|p| p.drive_link.as_str()), &write.drive_link),
                ),
            };
            let id = previous.map(|p| p.id).unwrap_or_else(Uuid::new_v4);

            next.uploads.insert(
                key,
                UploadedDocument {
                    id,
                    request_id: changes.request_id,
                    document_type_id: write.document_type_id,
                    file_name,
                    drive_link,
                    uploaded_at: changes.at,
                    uploaded_by: Some(write.uploaded_by.clone()),
                },
            );
        }

        let request = next
            .requests
            .get_mut(&changes.request_id)
            .ok_or(AppError::RequestNotFound)?;

        if !changes.uploads.is_empty() && request.first_upload_at.is_none() {
            request.first_upload_at = Some(changes.at);
        }

        if let Some(notes) = &changes.notes {
            request.notification_followup = notes.notification_followup.clone();
            request.general_comments = notes.general_comments.clone();
        }

        *guard = next;
        Ok(())
    }
}
