use crate::catalog::CatalogService;
use crate::chat::ChatService;
use crate::matching::MatchEngine;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every service holds its collaborators behind `Arc`, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub matcher: MatchEngine,
    pub chat: ChatService,
}
