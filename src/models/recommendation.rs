use serde::{Deserialize, Serialize};

/// One gift suggestion produced by the recommendation model
///
/// `cover_url` is absent until cover enrichment completes; every other
/// field comes straight from the model's structured output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub genre: String,
    pub page_count: Option<u32>,
    /// Short rationale for why this book fits the reader
    pub reason: String,
    #[serde(default)]
    pub cover_url: Option<String>,
}

/// Top-level shape the model must return
#[derive(Debug, Deserialize)]
pub struct RecommendationBatch {
    pub recommendations: Vec<Recommendation>,
}
