/// External collaborator abstractions
///
/// The recommendation model and the cover catalog are injected into the
/// engine as traits so tests can substitute stub clients.
use crate::error::AppResult;

pub mod open_library;
pub mod openai;

pub use open_library::OpenLibraryResolver;
pub use openai::OpenAiModel;

/// A model completion before any contract validation
///
/// The engine, not the client, decides what a missing body or an early
/// finish reason means.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    pub content: Option<String>,
    pub finish_reason: Option<String>,
}

/// Language model behind the gift recommendation engine
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationModel: Send + Sync {
    /// Runs one structured-output completion over a system and user message
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> AppResult<ModelReply>;
}

/// Best-effort cover artwork lookup
///
/// Implementations never fail the caller; anything that goes wrong
/// resolves to no cover.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CoverResolver: Send + Sync {
    async fn resolve(&self, title: &str, author: &str) -> Option<String>;
}
