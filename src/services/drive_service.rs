// src/services/drive_service.rs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{common::error::ExternalServiceError, services::google_auth::GoogleAuth};

const SERVICE: &str = "Google Drive";
const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

// Um delimitador novo por envio
fn new_boundary() -> String {
    format!("compliance-intake-{}", Uuid::new_v4().simple())
}

/// Corpo multipart/related: metadados JSON + bytes do PDF.
fn related_body(metadata: &serde_json::Value, content: &[u8], boundary: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 512);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n--{boundary}\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

/// Onde as pastas das solicitações são criadas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderRoot {
    ParentFolder(String),
    SharedDrive(String),
    MyDrive,
}

impl FolderRoot {
    /// A pasta-pai configurada tem precedência sobre o shared drive.
    pub fn from_settings(parent_folder_id: Option<String>, shared_drive_id: Option<String>) -> Self {
        match (parent_folder_id, shared_drive_id) {
            (Some(parent), _) => FolderRoot::ParentFolder(parent),
            (None, Some(drive)) => FolderRoot::SharedDrive(drive),
            (None, None) => FolderRoot::MyDrive,
        }
    }

    fn parent_id(&self) -> Option<&str> {
        match self {
            FolderRoot::ParentFolder(id) | FolderRoot::SharedDrive(id) => Some(id.as_str()),
            FolderRoot::MyDrive => None,
        }
    }
}

/// Serviço de hospedagem de arquivos: "guarde o arquivo, devolva uma referência".
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Busca a pasta pelo nome ou cria (idempotente).
    async fn ensure_folder(&self, name: &str, root: &FolderRoot) -> Result<String, ExternalServiceError>;

    /// Envia o conteúdo e devolve o link (URL) do arquivo.
    async fn store_file(
        &self,
        folder_key: &str,
        content: Vec<u8>,
        file_name: &str,
    ) -> Result<String, ExternalServiceError>;
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    web_view_link: Option<String>,
}

pub struct GoogleDriveClient {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<GoogleAuth>,
}

impl GoogleDriveClient {
    pub fn new(base_url: &str, auth: Arc<GoogleAuth>, timeout: Duration) -> Result<Self, ExternalServiceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ExternalServiceError::Http { service: SERVICE, source })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ExternalServiceError> {
        let token = self.auth.bearer().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| ExternalServiceError::Http { service: SERVICE, source })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ExternalServiceError::Status { service: SERVICE, status, body });
        }

        Ok(response)
    }

    async fn find_folder(&self, name: &str, root: &FolderRoot) -> Result<Option<String>, ExternalServiceError> {
        let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
        let mut q = format!("mimeType = '{FOLDER_MIME}' and name = '{escaped}' and trashed = false");
        if let Some(parent) = root.parent_id() {
            q.push_str(&format!(" and '{parent}' in parents"));
        }

        let mut params: Vec<(&str, String)> = vec![
            ("q", q),
            ("fields", "files(id, name)".to_string()),
            ("supportsAllDrives", "true".to_string()),
            ("includeItemsFromAllDrives", "true".to_string()),
        ];
        if let FolderRoot::SharedDrive(drive_id) = root {
            params.push(("corpora", "drive".to_string()));
            params.push(("driveId", drive_id.clone()));
        }

        let response = self
            .send(self.http.get(format!("{}/drive/v3/files", self.base_url)).query(&params))
            .await?;
        let list: FileList = response
            .json()
            .await
            .map_err(|source| ExternalServiceError::Http { service: SERVICE, source })?;

        Ok(list.files.into_iter().next().map(|f| f.id))
    }
}

#[async_trait]
impl FileStore for GoogleDriveClient {
    async fn ensure_folder(&self, name: &str, root: &FolderRoot) -> Result<String, ExternalServiceError> {
        if let Some(id) = self.find_folder(name, root).await? {
            return Ok(id);
        }

        let mut metadata = json!({ "name": name, "mimeType": FOLDER_MIME });
        if let Some(parent) = root.parent_id() {
            metadata["parents"] = json!([parent]);
        }

        let response = self
            .send(
                self.http
                    .post(format!("{}/drive/v3/files", self.base_url))
                    .query(&[("supportsAllDrives", "true"), ("fields", "id")])
                    .json(&metadata),
            )
            .await?;
        let created: DriveFile = response
            .json()
            .await
            .map_err(|source| ExternalServiceError::Http { service: SERVICE, source })?;

        tracing::info!("📁 Pasta '{}' criada no Drive ({})", name, created.id);
        Ok(created.id)
    }

    async fn store_file(
        &self,
        folder_key: &str,
        content: Vec<u8>,
        file_name: &str,
    ) -> Result<String, ExternalServiceError> {
        let metadata = json!({ "name": file_name, "parents": [folder_key] });

        let boundary = new_boundary();
        let body = related_body(&metadata, &content, &boundary);

        let response = self
            .send(
                self.http
                    .post(format!("{}/upload/drive/v3/files", self.base_url))
                    .query(&[
                        ("uploadType", "multipart"),
                        ("supportsAllDrives", "true"),
                        ("fields", "id,webViewLink"),
                    ])
                    .header(
                        reqwest::header::CONTENT_TYPE,
                        format!("multipart/related; boundary={boundary}"),
                    )
                    .body(body),
            )
            .await?;
        let uploaded: DriveFile = response
            .json()
            .await
            .map_err(|source| ExternalServiceError::Http { service: SERVICE, source })?;

        Ok(uploaded
            .web_view_link
            .unwrap_or_else(|| format!("https://drive.google.com/file/d/{}/view", uploaded.id)))
    }
}
