// src/services/google_auth.rs

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::common::error::ExternalServiceError;

const SCOPES: &str =
    "https://www.googleapis.com/auth/drive https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

// Renova o token um minuto antes de expirar.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Campos usados do JSON de chave de service account.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

/// Origem do bearer token usado nas APIs do Google.
pub enum GoogleAuth {
    Unconfigured,
    StaticToken(String),
    ServiceAccount(ServiceAccountAuth),
}

impl GoogleAuth {
    pub fn from_key_file(path: &Path, timeout: Duration) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let key: ServiceAccountKey = serde_json::from_str(&raw)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(GoogleAuth::ServiceAccount(ServiceAccountAuth {
            key,
            http,
            cached: Mutex::new(None),
        }))
    }

    pub async fn bearer(&self) -> Result<String, ExternalServiceError> {
        match self {
            GoogleAuth::Unconfigured => Err(ExternalServiceError::NotConfigured("credenciais do Google")),
            GoogleAuth::StaticToken(token) => Ok(token.clone()),
            GoogleAuth::ServiceAccount(auth) => auth.access_token().await,
        }
    }
}

impl ServiceAccountAuth {
    async fn access_token(&self) -> Result<String, ExternalServiceError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref() {
            if token.expires_at > now {
                return Ok(token.value.clone());
            }
        }

        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: SCOPES,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + 3600,
        };
        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| ExternalServiceError::Auth(format!("chave privada inválida: {e}")))?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .map_err(|e| ExternalServiceError::Auth(format!("falha ao assinar asserção: {e}")))?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|source| ExternalServiceError::Http { service: "Google OAuth", source })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ExternalServiceError::Status { service: "Google OAuth", status, body });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|source| ExternalServiceError::Http { service: "Google OAuth", source })?;

        let expires_at =
            now + chrono::Duration::seconds((token.expires_in - EXPIRY_MARGIN_SECS).max(0));
        *cached = Some(CachedToken { value: token.access_token.clone(), expires_at });

        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_is_returned_as_is() {
        let auth = GoogleAuth::StaticToken("ya29.token".into());
        assert_eq!(auth.bearer().await.unwrap(), "ya29.token");
    }

    #[tokio::test]
    async fn unconfigured_auth_fails_without_network() {
        let err = GoogleAuth::Unconfigured.bearer().await.unwrap_err();
        assert!(matches!(err, ExternalServiceError::NotConfigured(_)));
    }
}
