// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Falhas dos serviços externos (Google Drive, Google Sheets, token OAuth).
#[derive(Debug, Error)]
pub enum ExternalServiceError {
    #[error("Falha de transporte ao chamar {service}: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} respondeu {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Falha de autenticação com o Google: {0}")]
    Auth(String),

    #[error("Serviço externo não configurado: {0}")]
    NotConfigured(&'static str),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("O tipo de documento não pertence ao perfil da solicitação")]
    DocumentTypeProfileMismatch,

    #[error("Upload inválido: {0}")]
    InvalidMultipart(String),

    #[error("Perfil não encontrado")]
    ProfileNotFound,

    #[error("Solicitação não encontrada")]
    RequestNotFound,

    #[error("Tipo de documento não encontrado")]
    DocumentTypeNotFound,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro em serviço externo: {0}")]
    ExternalService(#[from] ExternalServiceError),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Atalho para erros de validação de regra de negócio (sem `derive(Validate)`).
    pub fn invalid_field(field: &'static str, code: &'static str, message: &str) -> Self {
        let mut errors = validator::ValidationErrors::new();
        let mut err = validator::ValidationError::new(code);
        err.message = Some(message.to_string().into());
        errors.add(field, err);
        AppError::ValidationError(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidMultipart(ref msg) => {
                let body = Json(json!({ "error": format!("Upload inválido: {}", msg) }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::DocumentTypeProfileMismatch => (
                StatusCode::BAD_REQUEST,
                "O tipo de documento não pertence ao perfil da solicitação.",
            ),
            AppError::ProfileNotFound => (StatusCode::NOT_FOUND, "Perfil não encontrado."),
            AppError::RequestNotFound => (StatusCode::NOT_FOUND, "Solicitação não encontrada."),
            AppError::DocumentTypeNotFound => {
                (StatusCode::NOT_FOUND, "Tipo de documento não encontrado.")
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.",
            ),

            // Falha de escrita no banco: a transação já sofreu rollback, o operador repete o envio.
            AppError::DatabaseError(ref e) => {
                tracing::error!("Erro de persistência: {}", e);
                let body = Json(json!({
                    "error": "Não foi possível salvar as alterações.",
                    "detail": e.to_string(),
                }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
            AppError::ExternalService(ref e) => {
                tracing::error!("Erro em serviço externo: {}", e);
                let body = Json(json!({
                    "error": "Falha ao comunicar com o serviço externo.",
                    "detail": e.to_string(),
                }));
                return (StatusCode::BAD_GATEWAY, body).into_response();
            }
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
