use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One read/rated item from a reader's shelf feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub title: String,
    pub author: String,
    /// Source-assigned book identifier
    pub book_id: String,
    pub isbn: Option<String>,
    pub pages: Option<u32>,
    /// Average rating across all readers of the source catalog
    pub avg_rating: Option<f64>,
    /// The reader's own rating, 0-5 where 0 means unrated
    pub my_rating: u8,
    /// Human-readable phrase derived from `my_rating`
    pub my_rating_text: Option<String>,
    /// Opaque date strings as the feed gives them, never reparsed
    pub date_read: Option<String>,
    pub date_added: Option<String>,
    pub date_created: Option<String>,
    pub year_published: Option<String>,
    pub image_url: Option<String>,
    pub review: Option<String>,
    /// Truncated to 500 characters at parse time
    pub description: Option<String>,
}

/// Maps a reader rating to its display phrase
///
/// An unrated book (0) has no phrase, and neither does any value
/// outside the 1-5 scale.
pub fn rating_phrase(rating: u8) -> Option<&'static str> {
    match rating {
        1 => Some("did not like it"),
        2 => Some("it was ok"),
        3 => Some("liked it"),
        4 => Some("really liked it"),
        5 => Some("it was amazing"),
        _ => None,
    }
}

/// One reader's ingested shelf
///
/// Created once per successful ingestion and never patched; a fresh
/// ingestion fully replaces the cached value for the reader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReaderCatalog {
    pub reader_id: String,
    pub display_name: Option<String>,
    pub shelf: String,
    /// Always equals `books.len()`
    pub total_books: usize,
    pub ingested_at: DateTime<Utc>,
    pub books: Vec<Book>,
}

impl ReaderCatalog {
    /// Assembles a catalog from freshly parsed books, stamping the
    /// ingestion time and deriving the book count.
    pub fn new(
        reader_id: String,
        shelf: String,
        display_name: Option<String>,
        books: Vec<Book>,
    ) -> Self {
        Self {
            reader_id,
            display_name,
            shelf,
            total_books: books.len(),
            ingested_at: Utc::now(),
            books,
        }
    }
}
