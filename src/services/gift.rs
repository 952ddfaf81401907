use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{Book, ReaderCatalog, Recommendation, RecommendationBatch},
    services::providers::{CoverResolver, ModelReply, RecommendationModel},
};

/// Upper bound on the favorites sample sent to the model; shuffling
/// first keeps the sample representative of the whole shelf instead of
/// whatever order the feed happened to return
const FAVORITES_SAMPLE_CAP: usize = 50;

const SYSTEM_PROMPT: &str = "You are a thoughtful book recommender helping someone \
find the perfect book gifts for a friend. Respond with JSON only: no markdown \
fencing, no commentary outside the JSON document. Return exactly five \
recommendations. Never recommend a book from the reader's favorites list, and \
never repeat a title or author within the five. When you do not know a numeric \
field such as year or pageCount, use null rather than guessing.";

/// What the engine hands back to the caller
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftSuggestions {
    pub recommendations: Vec<Recommendation>,
    /// How many 5-star books seeded the request
    pub favorite_count: usize,
}

/// Books the reader rated 5 out of 5
pub fn filter_favorites(books: &[Book]) -> Vec<Book> {
    books
        .iter()
        .filter(|book| book.my_rating == 5)
        .cloned()
        .collect()
}

/// Uniformly shuffles the favorites and caps the sample size.
///
/// The random source is injected so the cap/shuffle logic can be pinned
/// down with a seeded generator.
pub fn sample_favorites<R: Rng>(mut favorites: Vec<Book>, rng: &mut R) -> Vec<Book> {
    favorites.shuffle(rng);
    favorites.truncate(FAVORITES_SAMPLE_CAP);
    favorites
}

/// Renders the favorites sample as the textual list the prompt carries
pub fn format_favorites(books: &[Book]) -> String {
    books
        .iter()
        .map(|book| {
            let mut entry = format!("- \"{}\" by {}", book.title, book.author);
            if let Some(year) = &book.year_published {
                entry.push_str(&format!(" ({})", year));
            }
            if let Some(description) = &book.description {
                entry.push_str(&format!("\n  Description: {}", description));
            }
            entry
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn build_user_prompt(favorites_list: &str) -> String {
    format!(
        "This reader rated the following books 5 stars (their absolute favorites):\n\n\
         {favorites_list}\n\n\
         Based on their taste, recommend five specific books that would make great \
         gifts, none of which appear above. Reply with a JSON document of this exact \
         shape:\n\
         {{\"recommendations\": [{{\"title\": string, \"author\": string, \
         \"year\": number|null, \"genre\": string, \"pageCount\": number|null, \
         \"reason\": string}}]}}\n\
         The reason should be one or two warm sentences tying the pick to their \
         favorites."
    )
}

/// Interprets a raw model reply against the structured-output contract.
///
/// A length-limited generation is reported separately from a malformed
/// one: truncation suggests retrying with a smaller sample, a schema
/// mismatch does not.
fn parse_reply(reply: ModelReply) -> AppResult<Vec<Recommendation>> {
    if reply.finish_reason.as_deref() == Some("length") {
        return Err(AppError::ModelTruncated);
    }

    let content = reply
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or(AppError::ModelEmpty)?;

    let batch: RecommendationBatch =
        serde_json::from_str(&content).map_err(|e| AppError::Schema(e.to_string()))?;

    Ok(batch.recommendations)
}

/// Looks up covers for all recommendations concurrently.
///
/// Lookups run as independent tasks; a failed or missing lookup leaves
/// that one recommendation without a cover and the output keeps the
/// model's ordering.
async fn enrich_covers(
    covers: Arc<dyn CoverResolver>,
    recommendations: Vec<Recommendation>,
) -> Vec<Recommendation> {
    let mut tasks = Vec::with_capacity(recommendations.len());
    for rec in &recommendations {
        let covers = Arc::clone(&covers);
        let title = rec.title.clone();
        let author = rec.author.clone();
        tasks.push(tokio::spawn(
            async move { covers.resolve(&title, &author).await },
        ));
    }

    let mut enriched = Vec::with_capacity(recommendations.len());
    for (rec, task) in recommendations.into_iter().zip(tasks) {
        let cover_url = match task.await {
            Ok(cover) => cover,
            Err(e) => {
                tracing::warn!(error = %e, "Cover lookup task failed");
                None
            }
        };
        enriched.push(Recommendation { cover_url, ..rec });
    }
    enriched
}

/// Derives gift suggestions from a reader's catalog.
///
/// Fails with `NoFavorites` before any model call when the catalog has
/// no 5-star books. Contract violations inside a well-shaped model reply
/// (wrong count, favorites overlap) are passed through: enforcement is
/// part of the prompt contract, not re-validated here.
pub async fn recommend(
    model: &dyn RecommendationModel,
    covers: Arc<dyn CoverResolver>,
    catalog: &ReaderCatalog,
) -> AppResult<GiftSuggestions> {
    let favorites = filter_favorites(&catalog.books);
    if favorites.is_empty() {
        return Err(AppError::NoFavorites);
    }
    let favorite_count = favorites.len();

    let sample = sample_favorites(favorites, &mut rand::thread_rng());
    let user_prompt = build_user_prompt(&format_favorites(&sample));

    let reply = model.generate(SYSTEM_PROMPT, &user_prompt).await?;
    let recommendations = parse_reply(reply)?;

    tracing::info!(
        reader_id = %catalog.reader_id,
        favorites = favorite_count,
        sampled = sample.len(),
        recommendations = recommendations.len(),
        "Gift recommendations generated"
    );

    let recommendations = enrich_covers(covers, recommendations).await;

    Ok(GiftSuggestions {
        recommendations,
        favorite_count,
    })
}
