// src/services/intake_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::{
        csv_list,
        error::{AppError, ExternalServiceError},
        normalize::{is_security_verification, is_valid_email, normalize_name},
    },
    db::IntakeStore,
    models::{
        auth::Identity,
        intake::{
            ChangeSet, DocumentType, NewRequest, Profile, Request, RequestNotes, UploadWrite,
            WriteMode,
        },
        progress::{FailedUpload, SaveReport},
    },
    services::{
        drive_service::{FileStore, FolderRoot},
        ledger_service::{LedgerDispatcher, LedgerRecord},
    },
};

/// Campos informados pelo operador ao abrir uma solicitação.
#[derive(Debug, Clone, Default)]
pub struct CreateRequestInput {
    pub profile_id: Uuid,
    pub company_name: String,
    pub email: Option<String>,
    pub trading: Option<String>,
    pub location: Option<String>,
    pub language: Option<String>,
    pub reminder_frequency: Option<String>,
    pub requested_by: Option<String>,
}

/// Arquivo recebido numa ação de salvar, ainda não enviado ao Drive.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub document_type_id: Uuid,
    pub file_name: String,
    pub content: Vec<u8>,
}

// Texto vazio é gravado como NULL.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_pdf(file_name: &str) -> bool {
    file_name.trim().to_lowercase().ends_with(".pdf")
}

// Gravações: solicitações, documentos e notas.
#[derive(Clone)]
pub struct IntakeService {
    store: Arc<dyn IntakeStore>,
    files: Arc<dyn FileStore>,
    ledger: LedgerDispatcher,
    folder_root: FolderRoot,
}

impl IntakeService {
    pub fn new(
        store: Arc<dyn IntakeStore>,
        files: Arc<dyn FileStore>,
        ledger: LedgerDispatcher,
        folder_root: FolderRoot,
    ) -> Self {
        Self { store, files, ledger, folder_root }
    }

    // =========================================================================
    //  SOLICITAÇÕES
    // =========================================================================

    pub async fn create_request(
        &self,
        input: CreateRequestInput,
        actor: &Identity,
    ) -> Result<Request, AppError> {
        let company_name = input.company_name.trim().to_string();
        let email = non_blank(input.email);
        let requested_by = non_blank(input.requested_by);

        // 1. Validações de formato, antes de qualquer escrita
        let mut errors = validator::ValidationErrors::new();
        if company_name.is_empty() {
            let mut err = validator::ValidationError::new("required");
            err.message = Some("Informe o nome da companhia.".into());
            errors.add("companyName", err);
        }
        if let Some(address) = &email {
            if !is_valid_email(address) {
                let mut err = validator::ValidationError::new("invalid_email");
                err.message = Some("O e-mail não parece válido.".into());
                errors.add("email", err);
            }
        }

        // 2. Perfil define o tipo de solicitante
        let profile = self
            .store
            .find_profile(input.profile_id)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        let requested_by_type = match normalize_name(&profile.name).as_str() {
            "cliente" => Some("comercial".to_string()),
            "proveedor" => {
                if requested_by.is_none() {
                    let mut err = validator::ValidationError::new("required");
                    err.message = Some("Informe o nome de quem solicita.".into());
                    errors.add("requestedBy", err);
                }
                Some("solicitante_proveedor".to_string())
            }
            _ => None,
        };

        if !errors.is_empty() {
            return Err(AppError::ValidationError(errors));
        }

        // 3. Grava
        let request = self
            .store
            .insert_request(&NewRequest {
                profile_id: profile.id,
                company_name,
                email,
                trading: non_blank(input.trading),
                location: non_blank(input.location),
                language: non_blank(input.language),
                reminder_frequency: non_blank(input.reminder_frequency),
                requested_by,
                requested_by_type,
                created_by_email: non_blank(Some(actor.email.clone())),
            })
            .await?;

        tracing::info!(
            "✅ Solicitação {} criada para '{}' ({})",
            request.id,
            request.company_name,
            profile.name
        );

        // 4. Espelho na planilha: fora da transação, sem bloquear a resposta
        self.ledger.dispatch(LedgerRecord::from_request(&request, &profile));

        Ok(request)
    }

    pub async fn update_notes(
        &self,
        request_id: Uuid,
        notification_followup: Option<String>,
        general_comments: Option<String>,
    ) -> Result<(), AppError> {
        self.load_request(request_id).await?;

        self.store
            .apply_changes(&ChangeSet {
                request_id,
                uploads: Vec::new(),
                notes: Some(RequestNotes { notification_followup, general_comments }),
                at: Utc::now(),
            })
            .await
    }

    // =========================================================================
    //  DOCUMENTOS
    // =========================================================================

    /// Registra um arquivo já armazenado no Drive.
    pub async fn upsert_upload(
        &self,
        request_id: Uuid,
        document_type_id: Uuid,
        file_name: &str,
        reference: &str,
        uploaded_by: &str,
    ) -> Result<(), AppError> {
        let request = self.load_request(request_id).await?;
        let doc_type = self.document_type_for(&request, document_type_id).await?;

        if reference.trim().is_empty() {
            return Err(AppError::invalid_field(
                "reference",
                "required",
                "A referência do arquivo está vazia.",
            ));
        }
        // Na lista multi-arquivo, nome vazio desalinharia rótulos e links
        if file_name.trim().is_empty() && is_security_verification(&doc_type.name) {
            return Err(AppError::invalid_field(
                "fileName",
                "required",
                "Informe o nome do arquivo.",
            ));
        }

        self.store
            .apply_changes(&ChangeSet {
                request_id,
                uploads: vec![Self::write_for(&doc_type, file_name, reference, uploaded_by)],
                notes: None,
                at: Utc::now(),
            })
            .await
    }

    /// Ação de salvar: envia os arquivos ao Drive e grava uploads + notas numa transação.
    ///
    /// Falha no Drive interrompe os envios seguintes, mas o que já foi enviado
    /// é gravado e reportado. Falha no banco desfaz tudo; os arquivos já enviados
    /// ficam no Drive e repetir a ação é seguro. Sem nada enviado e sem notas,
    /// a falha do Drive volta como `ExternalService`.
    pub async fn save_documents(
        &self,
        request_id: Uuid,
        files: Vec<PendingFile>,
        notes: Option<RequestNotes>,
        actor: &Identity,
    ) -> Result<SaveReport, AppError> {
        let request = self.load_request(request_id).await?;

        // 1. Valida tudo antes de tocar no Drive
        let mut prepared: Vec<(DocumentType, PendingFile)> = Vec::with_capacity(files.len());
        for file in files {
            let doc_type = self.document_type_for(&request, file.document_type_id).await?;
            if !is_pdf(&file.file_name) {
                return Err(AppError::invalid_field(
                    "file",
                    "invalid_file_type",
                    &format!("Apenas arquivos PDF são aceitos ({}).", file.file_name),
                ));
            }
            if file.content.is_empty() {
                return Err(AppError::invalid_field(
                    "file",
                    "empty_file",
                    &format!("O arquivo {} está vazio.", file.file_name),
                ));
            }
            prepared.push((doc_type, file));
        }

        // 2. Envia ao Drive
        let uploaded_by = actor.display_name();
        let mut writes = Vec::with_capacity(prepared.len());
        let mut failed_upload = None;

        if !prepared.is_empty() {
            let profile = self
                .store
                .find_profile(request.profile_id)
                .await?
                .ok_or(AppError::ProfileNotFound)?;

            match self.upload_all(&request, &profile, prepared, &uploaded_by, &mut writes).await {
                Ok(()) => {}
                // Nada a gravar: a falha do Drive é o resultado
                Err((_, source)) if writes.is_empty() && notes.is_none() => {
                    tracing::error!("❌ Drive indisponível para a solicitação {}: {}", request_id, source);
                    return Err(AppError::ExternalService(source));
                }
                Err((failed, _)) => {
                    tracing::warn!(
                        "⚠️ Envio interrompido na solicitação {} ({} enviado(s)): {}",
                        request_id,
                        writes.len(),
                        failed.reason
                    );
                    failed_upload = Some(failed);
                }
            }
        }

        // 3. Uma transação para uploads + notas
        let notes_saved = notes.is_some();
        let changes = ChangeSet { request_id, uploads: writes, notes, at: Utc::now() };
        let uploaded = changes.uploads.len();

        if !changes.is_empty() {
            self.store.apply_changes(&changes).await?;
        }

        tracing::info!(
            "💾 Solicitação {}: {} documento(s) carregado(s), notas {}",
            request_id,
            uploaded,
            if notes_saved { "salvas" } else { "inalteradas" }
        );

        Ok(SaveReport { uploaded, notes_saved, failed_upload })
    }

    async fn upload_all(
        &self,
        request: &Request,
        profile: &Profile,
        prepared: Vec<(DocumentType, PendingFile)>,
        uploaded_by: &str,
        writes: &mut Vec<UploadWrite>,
    ) -> Result<(), (FailedUpload, ExternalServiceError)> {
        let folder_name = format!("Solicitud - {} - {}", request.company_name, profile.name);

        let folder = match self.files.ensure_folder(&folder_name, &self.folder_root).await {
            Ok(folder) => folder,
            Err(e) => {
                let (document_type_id, file_name) = prepared
                    .first()
                    .map(|(_, f)| (f.document_type_id, f.file_name.clone()))
                    .unwrap_or_default();
                let failed = FailedUpload { document_type_id, file_name, reason: e.to_string() };
                return Err((failed, e));
            }
        };

        for (doc_type, file) in prepared {
            match self.files.store_file(&folder, file.content, &file.file_name).await {
                Ok(link) => writes.push(Self::write_for(&doc_type, &file.file_name, &link, uploaded_by)),
                Err(e) => {
                    let failed = FailedUpload {
                        document_type_id: doc_type.id,
                        file_name: file.file_name,
                        reason: e.to_string(),
                    };
                    return Err((failed, e));
                }
            }
        }

        Ok(())
    }

    // =========================================================================
    //  HELPERS
    // =========================================================================

    async fn load_request(&self, request_id: Uuid) -> Result<Request, AppError> {
        self.store
            .find_request(request_id)
            .await?
            .ok_or(AppError::RequestNotFound)
    }

    /// O tipo de documento precisa existir e pertencer ao perfil da solicitação.
    async fn document_type_for(
        &self,
        request: &Request,
        document_type_id: Uuid,
    ) -> Result<DocumentType, AppError> {
        let doc_type = self
            .store
            .find_document_type(document_type_id)
            .await?
            .ok_or(AppError::DocumentTypeNotFound)?;

        if doc_type.profile_id != request.profile_id {
            return Err(AppError::DocumentTypeProfileMismatch);
        }

        Ok(doc_type)
    }

    fn write_for(doc_type: &DocumentType, file_name: &str, link: &str, uploaded_by: &str) -> UploadWrite {
        let (mode, file_name, drive_link) = if is_security_verification(&doc_type.name) {
            (WriteMode::Append, csv_list::label_item(file_name), csv_list::link_item(link))
        } else {
            (WriteMode::Replace, file_name.trim().to_string(), link.trim().to_string())
        };

        UploadWrite {
            document_type_id: doc_type.id,
            file_name,
            drive_link,
            uploaded_by: uploaded_by.to_string(),
            mode,
        }
    }
}
