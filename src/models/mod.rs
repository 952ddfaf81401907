mod book;
mod recommendation;

pub use book::{rating_phrase, Book, ReaderCatalog};
pub use recommendation::{Recommendation, RecommendationBatch};
