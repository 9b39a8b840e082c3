//! HTTP server implementation

use std::sync::Arc;

use axum::Router;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing::warn;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::api::session::SessionManager;
use crate::config::AppConfig;
use crate::dialogue::DialogueEngine;
use crate::forms::FormParser;
use crate::forms::FormPipeline;
use crate::kb;
use crate::kb::KnowledgeIndex;
use crate::llm::AzureOpenAi;
use crate::llm::FieldExtractor;
use crate::ocr::DocumentIntelligence;
use crate::rag::RetrievalAugmentedAnswerer;
use crate::Result;

/// Start the API server
pub async fn serve_api(
    config: &AppConfig,
    host: String,
    port: u16,
    enable_cors: bool,
) -> Result<()> {
    info!("Starting careline API server...");

    let state = build_state(config).await?;

    let mut app = Router::new()
        .nest("/api", routes::api_routes(state))
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        info!("CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET    /api/health                - Health check");
    info!("  POST   /api/sessions              - Start a dialogue session");
    info!("  POST   /api/sessions/:id/messages - Send a message");
    info!("  GET    /api/sessions/:id/profile  - Collected profile");
    info!("  DELETE /api/sessions/:id          - Drop a session");
    info!("  POST   /api/kb/search             - Search the knowledge base");
    info!("  POST   /api/forms/extract         - OCR and extract a form");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize all services and the knowledge index from configuration
pub async fn build_state(config: &AppConfig) -> Result<AppState> {
    let azure = Arc::new(AzureOpenAi::from_config(&config.azure_openai)?);
    let ocr = Arc::new(DocumentIntelligence::from_config(
        &config.document_intelligence,
    )?);

    let kb_config = &config.knowledge_base;
    let loaded = kb::load_dir(&kb_config.dir)?;
    if !loaded.failed_files.is_empty() {
        warn!(
            "{} knowledge base file(s) could not be read",
            loaded.failed_files.len()
        );
    }
    info!(
        "Loaded {} passages from {}",
        loaded.passages.len(),
        kb_config.dir
    );

    let index = Arc::new(
        KnowledgeIndex::build(loaded.passages, azure.clone(), kb_config.max_embed_chars).await,
    );
    info!("Knowledge index ready ({} entries)", index.len());

    let engine = Arc::new(DialogueEngine::new(
        FieldExtractor::new(azure.clone()),
        RetrievalAugmentedAnswerer::new(index.clone(), azure.clone(), kb_config.top_k),
    ));
    let forms = Arc::new(FormPipeline::new(ocr, FormParser::new(azure)));
    let sessions = Arc::new(SessionManager::new(config.session_timeout_secs()));

    Ok(AppState {
        engine,
        sessions,
        index,
        forms,
    })
}
