//src/main.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new().await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Catálogo (perfis, checklists, companhias)
    let catalog_routes = Router::new()
        .route("/profiles", get(handlers::catalog::list_profiles))
        .route("/profiles/{id}/document-types", get(handlers::catalog::list_document_types))
        .route("/companies", get(handlers::catalog::list_companies));

    // Solicitações, documentos e progresso
    let request_routes = Router::new()
        .route(
            "/requests",
            post(handlers::requests::create_request).get(handlers::requests::list_requests),
        )
        .route("/requests/{id}", get(handlers::requests::get_request))
        .route("/requests/{id}/notes", put(handlers::requests::update_notes))
        .route(
            "/requests/{id}/documents",
            get(handlers::documents::list_documents)
                .post(handlers::documents::save_documents)
                .layer(DefaultBodyLimit::max(app_state.max_upload_bytes)),
        )
        .route("/requests/{id}/progress", get(handlers::progress::request_progress))
        .route("/progress", get(handlers::progress::progress_overview));

    let protected_routes = Router::new()
        .merge(catalog_routes)
        .merge(request_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let bind_addr = app_state.bind_addr.clone();

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(handlers::catalog::health))
        .nest("/api", protected_routes)
        .with_state(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
