mod catalog;
mod chat;
mod config;
mod db;
mod embedding;
mod errors;
mod llm_client;
mod matching;
mod memory;
mod models;
mod rag;
mod response;
mod routes;
mod skills;
mod state;
mod store;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::CatalogService;
use crate::chat::ChatService;
use crate::config::Config;
use crate::db::create_pool;
use crate::embedding::huggingface::HuggingFaceEmbedder;
use crate::embedding::EmbeddingClient;
use crate::llm_client::LlmClient;
use crate::matching::MatchEngine;
use crate::rag::RagPipeline;
use crate::routes::build_router;
use crate::skills::{
    CandidateInfoExtractor, LlmCandidateInfoExtractor, RegexCandidateInfoExtractor, SkillExtractor,
};
use crate::state::AppState;
use crate::store::postgres::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(db));

    // Extraction runs colder than chat for stable structured output.
    let extraction_llm = Arc::new(LlmClient::new(config.anthropic_api_key.clone())?.with_temperature(0.1));
    let chat_llm = Arc::new(LlmClient::new(config.anthropic_api_key.clone())?.with_temperature(0.3));
    info!("LLM clients initialized (model: {})", llm_client::MODEL);

    let embeddings = EmbeddingClient::new(Arc::new(HuggingFaceEmbedder::new(
        config.embedding_api_url.clone(),
        config.huggingface_api_key.clone(),
    )?));
    info!("Embedding client initialized ({})", config.embedding_api_url);

    let skills = SkillExtractor::new(extraction_llm.clone());
    let candidate_info: Arc<dyn CandidateInfoExtractor> = if config.enable_llm_candidate_info {
        Arc::new(LlmCandidateInfoExtractor::new(extraction_llm))
    } else {
        Arc::new(RegexCandidateInfoExtractor::new()?)
    };
    info!("Candidate info extractor: {}", candidate_info.backend());

    // Build app state
    let state = AppState {
        catalog: CatalogService::new(store.clone(), skills.clone(), candidate_info, embeddings.clone()),
        matcher: MatchEngine::new(store.clone(), skills, embeddings.clone()),
        chat: ChatService::new(store.clone(), store, RagPipeline::new(embeddings, chat_llm)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
