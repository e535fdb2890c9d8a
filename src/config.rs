// src/config.rs

use crate::{
    db::IntakeRepository,
    services::{
        checklist_service::ChecklistService,
        drive_service::{FolderRoot, GoogleDriveClient},
        google_auth::GoogleAuth,
        intake_service::IntakeService,
        ledger_service::{LedgerDispatcher, SheetsLedger},
    },
};
use anyhow::{anyhow, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, path::PathBuf, sync::Arc, time::Duration};

/// Configuração lida das variáveis de ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub max_upload_bytes: usize,
    pub google_credentials: Option<PathBuf>,
    pub google_access_token: Option<String>,
    pub google_api_base: String,
    pub google_sheets_base: String,
    pub google_timeout: Duration,
    pub drive_parent_folder_id: Option<String>,
    pub drive_shared_drive_id: Option<String>,
    pub ledger_spreadsheet_id: Option<String>,
    pub ledger_range: String,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de uma função de busca (testável sem mexer no ambiente).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Valor vazio conta como ausente
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| optional(key).ok_or_else(|| anyhow!("{key} deve ser definida"));
        let or_default = |key: &str, default: &str| optional(key).unwrap_or_else(|| default.to_string());
        let number = |key: &str, default: u64| -> anyhow::Result<u64> {
            match optional(key) {
                Some(raw) => raw.parse().with_context(|| format!("{key} inválida: '{raw}'")),
                None => Ok(default),
            }
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: or_default("BIND_ADDR", "0.0.0.0:3000"),
            db_max_connections: u32::try_from(number("DB_MAX_CONNECTIONS", 5)?)
                .context("DB_MAX_CONNECTIONS fora do intervalo")?,
            max_upload_bytes: usize::try_from(number("MAX_UPLOAD_MB", 25)?)
                .context("MAX_UPLOAD_MB fora do intervalo")?
                * 1024
                * 1024,
            google_credentials: optional("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from),
            google_access_token: optional("GOOGLE_ACCESS_TOKEN"),
            google_api_base: or_default("GOOGLE_API_BASE", "https://www.googleapis.com"),
            google_sheets_base: or_default("GOOGLE_SHEETS_BASE", "https://sheets.googleapis.com"),
            google_timeout: Duration::from_secs(number("GOOGLE_TIMEOUT_SECS", 30)?),
            drive_parent_folder_id: optional("DRIVE_PARENT_FOLDER_ID"),
            drive_shared_drive_id: optional("DRIVE_SHARED_DRIVE_ID"),
            ledger_spreadsheet_id: optional("LEDGER_SPREADSHEET_ID"),
            ledger_range: or_default("LEDGER_RANGE", "Solicitudes!A1"),
        })
    }

    /// Service account tem precedência sobre o token estático.
    pub fn google_auth(&self) -> anyhow::Result<GoogleAuth> {
        if let Some(path) = &self.google_credentials {
            return GoogleAuth::from_key_file(path, self.google_timeout)
                .with_context(|| format!("Falha ao ler credenciais em {}", path.display()));
        }
        if let Some(token) = &self.google_access_token {
            return Ok(GoogleAuth::StaticToken(token.clone()));
        }
        tracing::warn!("⚠️ Credenciais do Google ausentes: envios ao Drive vão falhar");
        Ok(GoogleAuth::Unconfigured)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub max_upload_bytes: usize,
    pub checklist_service: ChecklistService,
    pub intake_service: IntakeService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let settings = Settings::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let store = Arc::new(IntakeRepository::new(db_pool.clone()));
        let google_auth = Arc::new(settings.google_auth()?);

        let drive = Arc::new(GoogleDriveClient::new(
            &settings.google_api_base,
            google_auth.clone(),
            settings.google_timeout,
        )?);

        let ledger = match &settings.ledger_spreadsheet_id {
            Some(spreadsheet_id) => LedgerDispatcher::new(Arc::new(SheetsLedger::new(
                &settings.google_sheets_base,
                spreadsheet_id.clone(),
                settings.ledger_range.clone(),
                google_auth.clone(),
                settings.google_timeout,
            )?)),
            None => {
                tracing::warn!("⚠️ LEDGER_SPREADSHEET_ID ausente: solicitações não serão espelhadas");
                LedgerDispatcher::disabled()
            }
        };

        let folder_root = FolderRoot::from_settings(
            settings.drive_parent_folder_id.clone(),
            settings.drive_shared_drive_id.clone(),
        );

        let checklist_service = ChecklistService::new(store.clone());
        let intake_service = IntakeService::new(store, drive, ledger, folder_root);

        Ok(Self {
            db_pool,
            jwt_secret: settings.jwt_secret,
            bind_addr: settings.bind_addr,
            max_upload_bytes: settings.max_upload_bytes,
            checklist_service,
            intake_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/intake"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(settings.bind_addr, "0.0.0.0:3000");
        assert_eq!(settings.db_max_connections, 5);
        assert_eq!(settings.max_upload_bytes, 25 * 1024 * 1024);
        assert_eq!(settings.google_timeout, Duration::from_secs(30));
        assert_eq!(settings.ledger_range, "Solicitudes!A1");
        assert!(settings.ledger_spreadsheet_id.is_none());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = Settings::from_lookup(lookup(&[("JWT_SECRET", "segredo")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn blank_values_count_as_absent() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/intake"),
            ("JWT_SECRET", "segredo"),
            ("DRIVE_PARENT_FOLDER_ID", "  "),
            ("MAX_UPLOAD_MB", "10"),
        ]))
        .unwrap();

        assert!(settings.drive_parent_folder_id.is_none());
        assert_eq!(settings.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn non_numeric_limits_are_rejected() {
        let result = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/intake"),
            ("JWT_SECRET", "segredo"),
            ("GOOGLE_TIMEOUT_SECS", "trinta"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn static_token_is_used_without_key_file() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/intake"),
            ("JWT_SECRET", "segredo"),
            ("GOOGLE_ACCESS_TOKEN", "ya29.x"),
        ]))
        .unwrap();
        assert!(matches!(settings.google_auth().unwrap(), GoogleAuth::StaticToken(t) if t == "ya29.x"));
    }
}
