use std::sync::Arc;

use crate::{
    config::Config,
    db::ProfileStore,
    services::{
        ingest::{FeedFetcher, HttpFeedFetcher},
        providers::{CoverResolver, OpenAiModel, OpenLibraryResolver, RecommendationModel},
    },
};

/// Shared application state
///
/// External collaborators are held as trait objects so tests can wire
/// in stub implementations.
#[derive(Clone)]
pub struct AppState {
    pub store: ProfileStore,
    pub feed: Arc<dyn FeedFetcher>,
    pub model: Arc<dyn RecommendationModel>,
    pub covers: Arc<dyn CoverResolver>,
}

impl AppState {
    /// Builds production state from configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            store: ProfileStore::new(config.profile_cache_dir.clone()),
            feed: Arc::new(HttpFeedFetcher::new(config.feed_base_url.clone())),
            model: Arc::new(OpenAiModel::new(
                config.openai_api_key.clone(),
                config.openai_api_url.clone(),
                config.openai_model.clone(),
            )),
            covers: Arc::new(OpenLibraryResolver::new(config.open_library_url.clone())),
        }
    }

    /// Assembles state from explicit collaborators
    pub fn new(
        store: ProfileStore,
        feed: Arc<dyn FeedFetcher>,
        model: Arc<dyn RecommendationModel>,
        covers: Arc<dyn CoverResolver>,
    ) -> Self {
        Self {
            store,
            feed,
            model,
            covers,
        }
    }
}
