// src/services/ledger_service.rs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::task::JoinHandle;

use crate::{
    common::error::ExternalServiceError,
    models::intake::{Profile, Request},
    services::google_auth::GoogleAuth,
};

const SERVICE: &str = "Google Sheets";

/// Linha espelhada na planilha de controle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    pub request_id: String,
    pub profile_name: String,
    pub company_name: String,
    pub email: String,
    pub trading: String,
    pub location: String,
    pub language: String,
    pub reminder_frequency: String,
    pub requested_by: String,
    pub requested_by_type: String,
    pub created_at: String,
    pub created_by_email: String,
}

impl LedgerRecord {
    pub fn from_request(request: &Request, profile: &Profile) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            request_id: request.id.to_string(),
            profile_name: profile.name.clone(),
            company_name: request.company_name.clone(),
            email: text(&request.email),
            trading: text(&request.trading),
            location: text(&request.location),
            language: text(&request.language),
            reminder_frequency: text(&request.reminder_frequency),
            requested_by: text(&request.requested_by),
            requested_by_type: text(&request.requested_by_type),
            created_at: request.created_at.to_rfc3339(),
            created_by_email: text(&request.created_by_email),
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.request_id.clone(),
            self.profile_name.clone(),
            self.company_name.clone(),
            self.email.clone(),
            self.trading.clone(),
            self.location.clone(),
            self.language.clone(),
            self.reminder_frequency.clone(),
            self.requested_by.clone(),
            self.requested_by_type.clone(),
            self.created_at.clone(),
            self.created_by_email.clone(),
        ]
    }
}

#[async_trait]
pub trait LedgerMirror: Send + Sync {
    async fn append_record(&self, record: &LedgerRecord) -> Result<(), ExternalServiceError>;
}

pub struct SheetsLedger {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    range: String,
    auth: Arc<GoogleAuth>,
}

impl SheetsLedger {
    pub fn new(
        base_url: &str,
        spreadsheet_id: String,
        range: String,
        auth: Arc<GoogleAuth>,
        timeout: Duration,
    ) -> Result<Self, ExternalServiceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ExternalServiceError::Http { service: SERVICE, source })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id,
            range,
            auth,
        })
    }
}

#[async_trait]
impl LedgerMirror for SheetsLedger {
    async fn append_record(&self, record: &LedgerRecord) -> Result<(), ExternalServiceError> {
        let token = self.auth.bearer().await?;
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}:append",
            self.base_url, self.spreadsheet_id, self.range
        );

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .query(&[("valueInputOption", "USER_ENTERED"), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({ "values": [record.to_row()] }))
            .send()
            .await
            .map_err(|source| ExternalServiceError::Http { service: SERVICE, source })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ExternalServiceError::Status { service: SERVICE, status, body });
        }

        Ok(())
    }
}

/// Dispara o espelhamento em segundo plano. Nunca bloqueia nem falha a
/// gravação principal: erros viram `warn` no log.
#[derive(Clone)]
pub struct LedgerDispatcher {
    mirror: Option<Arc<dyn LedgerMirror>>,
}

impl LedgerDispatcher {
    pub fn new(mirror: Arc<dyn LedgerMirror>) -> Self {
        Self { mirror: Some(mirror) }
    }

    pub fn disabled() -> Self {
        Self { mirror: None }
    }

    pub fn dispatch(&self, record: LedgerRecord) -> Option<JoinHandle<()>> {
        let Some(mirror) = self.mirror.clone() else {
            tracing::debug!("Espelho em planilha desativado; solicitação {} não espelhada", record.request_id);
            return None;
        };

        Some(tokio::spawn(async move {
            match mirror.append_record(&record).await {
                Ok(()) => tracing::info!("📄 Solicitação {} espelhada na planilha", record.request_id),
                Err(e) => tracing::warn!(
                    "⚠️ Falha ao espelhar solicitação {} na planilha: {}",
                    record.request_id,
                    e
                ),
            }
        }))
    }
}
