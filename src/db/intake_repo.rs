// src/db/intake_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{csv_list, error::AppError},
    db::store::IntakeStore,
    models::intake::{
        ChangeSet, DocumentType, NewRequest, Profile, Request, RequestNotes, RequestSummary,
        UploadWrite, UploadedDocument, WriteMode,
    },
};

const REQUEST_COLUMNS: &str = r#"
    id, profile_id, company_name, email, trading, location, language,
    reminder_frequency, requested_by, requested_by_type, created_at,
    created_by_email, first_upload_at, notification_followup, general_comments
"#;

// O repositório das solicitações de criação, tipos de documento e uploads.
#[derive(Clone)]
pub struct IntakeRepository {
    pool: PgPool,
}

impl IntakeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  HELPERS (rodam dentro da transação do apply_changes)
    // =========================================================================

    // Garante que a linha exista antes do FOR UPDATE: um INSERT concorrente
    // espera no índice único até o primeiro commit.
    async fn reserve_slot<'e, E>(
        executor: E,
        request_id: Uuid,
        write: &UploadWrite,
        at: DateTime<Utc>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO uploaded_documents (
                request_id, document_type_id, file_name, drive_link, uploaded_at, uploaded_by
            )
            VALUES ($1, $2, '', '', $3, $4)
            ON CONFLICT (request_id, document_type_id) DO NOTHING
            "#,
        )
        .bind(request_id)
        .bind(write.document_type_id)
        .bind(at)
        .bind(&write.uploaded_by)
        .execute(executor)
        .await?;

        Ok(())
    }

    async fn existing_lists<'e, E>(
        executor: E,
        request_id: Uuid,
        document_type_id: Uuid,
    ) -> Result<Option<(String, String)>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT file_name, drive_link
            FROM uploaded_documents
            WHERE request_id = $1 AND document_type_id = $2
            FOR UPDATE
            "#,
        )
        .bind(request_id)
        .bind(document_type_id)
        .fetch_optional(executor)
        .await?;

        Ok(row)
    }

    async fn upsert_document<'e, E>(
        executor: E,
        request_id: Uuid,
        write: &UploadWrite,
        file_name: &str,
        drive_link: &str,
        at: DateTime<Utc>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO uploaded_documents (
                request_id, document_type_id, file_name, drive_link, uploaded_at, uploaded_by
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (request_id, document_type_id)
            DO UPDATE SET
                file_name   = EXCLUDED.file_name,
                drive_link  = EXCLUDED.drive_link,
                uploaded_at = EXCLUDED.uploaded_at,
                uploaded_by = EXCLUDED.uploaded_by
            "#,
        )
        .bind(request_id)
        .bind(write.document_type_id)
        .bind(file_name)
        .bind(drive_link)
        .bind(at)
        .bind(&write.uploaded_by)
        .execute(executor)
        .await?;

        Ok(())
    }

    async fn set_first_upload_at_if_null<'e, E>(
        executor: E,
        request_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE creation_requests
            SET first_upload_at = COALESCE(first_upload_at, $2)
            WHERE id = $1
            "#,
        )
        .bind(request_id)
        .bind(at)
        .execute(executor)
        .await?;

        Ok(())
    }

    async fn update_notes<'e, E>(
        executor: E,
        request_id: Uuid,
        notes: &RequestNotes,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE creation_requests
            SET notification_followup = $2,
                general_comments      = $3
            WHERE id = $1
            "#,
        )
        .bind(request_id)
        .bind(&notes.notification_followup)
        .bind(&notes.general_comments)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl IntakeStore for IntakeRepository {
    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        let profiles =
            sqlx::query_as::<_, Profile>("SELECT id, name FROM profiles ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(profiles)
    }

    async fn find_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>("SELECT id, name FROM profiles WHERE id = $1")
            .bind(profile_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn list_document_types(&self, profile_id: Uuid) -> Result<Vec<DocumentType>, AppError> {
        // Desempate pelo id para a ordem ser determinística
        let types = sqlx::query_as::<_, DocumentType>(
            r#"
            SELECT id, profile_id, name, is_required
            FROM document_types
            WHERE profile_id = $1
            ORDER BY name ASC, id ASC
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(types)
    }

    async fn find_document_type(
        &self,
        document_type_id: Uuid,
    ) -> Result<Option<DocumentType>, AppError> {
        let doc_type = sqlx::query_as::<_, DocumentType>(
            "SELECT id, profile_id, name, is_required FROM document_types WHERE id = $1",
        )
        .bind(document_type_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(doc_type)
    }

    async fn list_company_names(&self) -> Result<Vec<String>, AppError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT company_name FROM creation_requests ORDER BY company_name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    async fn insert_request(&self, new_request: &NewRequest) -> Result<Request, AppError> {
        let sql = format!(
            r#"
            INSERT INTO creation_requests (
                profile_id, company_name, email, trading, location, language,
                reminder_frequency, requested_by, requested_by_type, created_by_email
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {REQUEST_COLUMNS}
            "#
        );

        let request = sqlx::query_as::<_, Request>(&sql)
            .bind(new_request.profile_id)
            .bind(&new_request.company_name)
            .bind(&new_request.email)
            .bind(&new_request.trading)
            .bind(&new_request.location)
            .bind(&new_request.language)
            .bind(&new_request.reminder_frequency)
            .bind(&new_request.requested_by)
            .bind(&new_request.requested_by_type)
            .bind(&new_request.created_by_email)
            .fetch_one(&self.pool)
            .await?;

        Ok(request)
    }

    async fn find_request(&self, request_id: Uuid) -> Result<Option<Request>, AppError> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM creation_requests WHERE id = $1");

        let request = sqlx::query_as::<_, Request>(&sql)
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(request)
    }

    async fn list_requests_by_company(
        &self,
        company_name: &str,
        profile_id: Uuid,
        limit: i64,
    ) -> Result<Vec<RequestSummary>, AppError> {
        let requests = sqlx::query_as::<_, RequestSummary>(
            r#"
            SELECT id, company_name, profile_id, created_at, created_by_email
            FROM creation_requests
            WHERE company_name = $1 AND profile_id = $2
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(company_name)
        .bind(profile_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn list_requests_for_progress(
        &self,
        created_by: Option<&str>,
    ) -> Result<Vec<RequestSummary>, AppError> {
        let requests = sqlx::query_as::<_, RequestSummary>(
            r#"
            SELECT id, company_name, profile_id, created_at, created_by_email
            FROM creation_requests
            WHERE ($1::TEXT IS NULL OR LOWER(created_by_email) = LOWER($1))
            ORDER BY created_at DESC
            "#,
        )
        .bind(created_by)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn list_uploads(&self, request_id: Uuid) -> Result<Vec<UploadedDocument>, AppError> {
        let uploads = sqlx::query_as::<_, UploadedDocument>(
            r#"
            SELECT id, request_id, document_type_id, file_name, drive_link, uploaded_at, uploaded_by
            FROM uploaded_documents
            WHERE request_id = $1
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(uploads)
    }

    async fn apply_changes(&self, changes: &ChangeSet) -> Result<(), AppError> {
        // --- INÍCIO DA TRANSAÇÃO ---
        // Qualquer `?` abaixo derruba o `tx` sem commit: rollback automático no drop.
        let mut tx = self.pool.begin().await?;

        for write in &changes.uploads {
            let (file_name, drive_link) = match write.mode {
                WriteMode::Replace => (write.file_name.clone(), write.drive_link.clone()),
                WriteMode::Append => {
                    Self::reserve_slot(&mut *tx, changes.request_id, write, changes.at).await?;
                    let existing = Self::existing_lists(
                        &mut *tx,
                        changes.request_id,
                        write.document_type_id,
                    )
                    .await?;
                    let (names, links) = existing.unzip();
                    (
                        csv_list::append(names.as_deref(), &write.file_name),
                        csv_list::append(links.as_deref(), &write.drive_link),
                    )
                }
            };

            Self::upsert_document(
                &mut *tx,
                changes.request_id,
                write,
                &file_name,
                &drive_link,
                changes.at,
            )
            .await?;
        }

        if !changes.uploads.is_empty() {
            Self::set_first_upload_at_if_null(&mut *tx, changes.request_id, changes.at).await?;
        }

        if let Some(notes) = &changes.notes {
            if Self::update_notes(&mut *tx, changes.request_id, notes).await? == 0 {
                return Err(AppError::RequestNotFound);
            }
        }

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        Ok(())
    }
}
