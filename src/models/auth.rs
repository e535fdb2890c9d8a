// src/models/auth.rs

use serde::{Deserialize, Serialize};

// Claims emitidas pelo provedor de identidade (já autenticado lá fora).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,          // E-mail do usuário
    pub name: Option<String>, // Nome de exibição
    pub exp: usize,
}

/// Quem está agindo: usado em `uploaded_by` e `created_by_email`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub name: Option<String>,
}

impl Identity {
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .or_else(|| Some(self.email.trim()).filter(|e| !e.is_empty()))
            .unwrap_or("system")
            .to_string()
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.sub,
            name: claims.name,
        }
    }
}
