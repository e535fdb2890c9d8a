// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::catalog::health,

        // --- Catalog ---
        handlers::catalog::list_profiles,
        handlers::catalog::list_document_types,
        handlers::catalog::list_companies,

        // --- Requests ---
        handlers::requests::create_request,
        handlers::requests::list_requests,
        handlers::requests::get_request,
        handlers::requests::update_notes,

        // --- Documents ---
        handlers::documents::list_documents,
        handlers::documents::save_documents,

        // --- Progress ---
        handlers::progress::request_progress,
        handlers::progress::progress_overview,
    ),
    components(
        schemas(
            // --- Intake ---
            models::intake::Profile,
            models::intake::DocumentType,
            models::intake::Request,
            models::intake::RequestSummary,
            models::intake::UploadedDocument,

            // --- Progress ---
            models::progress::FileEntry,
            models::progress::DocumentStatus,
            models::progress::CompletionReport,
            models::progress::RequestProgress,
            models::progress::ProgressOverviewEntry,
            models::progress::FailedUpload,
            models::progress::SaveReport,

            // --- Payloads ---
            handlers::requests::CreateRequestPayload,
            handlers::requests::UpdateNotesPayload,
            handlers::documents::RequestDocuments,
            handlers::documents::SaveDocumentsForm,
        )
    ),
    tags(
        (name = "Health", description = "Verificação de disponibilidade"),
        (name = "Catalog", description = "Perfis, checklists e companhias"),
        (name = "Requests", description = "Solicitações de criação e notas de acompanhamento"),
        (name = "Documents", description = "Documentos carregados no Drive"),
        (name = "Progress", description = "Percentual de documentação obrigatória")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/health",
            "/api/profiles",
            "/api/profiles/{id}/document-types",
            "/api/companies",
            "/api/requests",
            "/api/requests/{id}",
            "/api/requests/{id}/notes",
            "/api/requests/{id}/documents",
            "/api/requests/{id}/progress",
            "/api/progress",
        ] {
            assert!(doc.paths.paths.contains_key(path), "faltando {path}");
        }
        assert!(doc.components.unwrap().security_schemes.contains_key("api_jwt"));
    }
}
