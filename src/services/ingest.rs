use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    feed,
    models::ReaderCatalog,
};

/// Fixed page size of the shelf feed; a short page is the authoritative
/// last-page signal
const FEED_PAGE_SIZE: usize = 100;

/// Transport capability for fetching one page of a reader's shelf feed
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch_page(&self, reader_id: &str, shelf: &str, page: u32) -> AppResult<String>;
}

/// Production fetcher hitting the public RSS feed host
#[derive(Clone)]
pub struct HttpFeedFetcher {
    http_client: HttpClient,
    base_url: String,
}

impl HttpFeedFetcher {
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch_page(&self, reader_id: &str, shelf: &str, page: u32) -> AppResult<String> {
        let url = format!("{}/review/list_rss/{}", self.base_url, reader_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("shelf", shelf), ("page", &page.to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "Feed returned status {} for page {}",
                status, page
            )));
        }

        Ok(response.text().await?)
    }
}

/// Ingests a reader's full shelf by walking the paginated feed in order.
///
/// Pages are requested one at a time starting at 1; the walk stops on a
/// page with fewer than 100 items, so a full page always triggers one
/// more request. The display name comes from page 1 only. An empty shelf
/// is returned as-is; the caller decides whether emptiness is an error.
pub async fn ingest(
    fetcher: &dyn FeedFetcher,
    reader_id: &str,
    shelf: &str,
) -> AppResult<ReaderCatalog> {
    let mut books = Vec::new();
    let mut display_name = None;
    let mut page = 1u32;

    loop {
        let xml = fetcher.fetch_page(reader_id, shelf, page).await?;
        let parsed = feed::parse_page(&xml);

        if page == 1 {
            display_name = parsed.display_name;
        }

        let page_count = parsed.books.len();
        books.extend(parsed.books);

        tracing::debug!(
            reader_id = %reader_id,
            page = page,
            items = page_count,
            "Feed page parsed"
        );

        if page_count < FEED_PAGE_SIZE {
            break;
        }
        page += 1;
    }

    tracing::info!(
        reader_id = %reader_id,
        shelf = %shelf,
        pages = page,
        books = books.len(),
        "Shelf ingestion completed"
    );

    Ok(ReaderCatalog::new(
        reader_id.to_string(),
        shelf.to_string(),
        display_name,
        books,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Serves a fixed script of pages and counts requests
    struct ScriptedFetcher {
        pages: Vec<String>,
        calls: AtomicU32,
    }

    impl ScriptedFetcher {
        fn new(pages: Vec<String>) -> Self {
            Self {
                pages,
                calls: AtomicU32::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl FeedFetcher for ScriptedFetcher {
        async fn fetch_page(&self, _reader_id: &str, _shelf: &str, page: u32) -> AppResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(page as usize - 1)
                .cloned()
                .ok_or_else(|| AppError::ExternalApi(format!("Unexpected page {}", page)))
        }
    }

    fn feed_page(channel_title: &str, item_count: usize) -> String {
        let mut xml = format!(
            "<?xml version=\"1.0\"?><rss><channel><title>{}</title>",
            channel_title
        );
        for i in 0..item_count {
            xml.push_str(&format!(
                "<item><title>Book {i}</title><book_id>{i}</book_id>\
                 <author_name>Author {i}</author_name><user_rating>4</user_rating></item>"
            ));
        }
        xml.push_str("</channel></rss>");
        xml
    }

    #[tokio::test]
    async fn test_full_page_triggers_one_more_request() {
        // 100 items on page 1, 40 on page 2: exactly two requests, 140 books
        let fetcher = ScriptedFetcher::new(vec![
            feed_page("Ben's bookshelf: read", 100),
            feed_page("Ben's bookshelf: read", 40),
        ]);

        let catalog = ingest(&fetcher, "23506884", "read").await.unwrap();

        assert_eq!(fetcher.call_count(), 2);
        assert_eq!(catalog.books.len(), 140);
        assert_eq!(catalog.total_books, 140);
    }

    #[tokio::test]
    async fn test_short_first_page_stops_immediately() {
        let fetcher = ScriptedFetcher::new(vec![feed_page("Ben's bookshelf: read", 3)]);

        let catalog = ingest(&fetcher, "23506884", "read").await.unwrap();

        assert_eq!(fetcher.call_count(), 1);
        assert_eq!(catalog.books.len(), 3);
    }

    #[tokio::test]
    async fn test_trailing_empty_page_stops_the_walk() {
        // An exactly-full shelf: page 2 exists but is empty
        let fetcher = ScriptedFetcher::new(vec![
            feed_page("Ben's bookshelf: read", 100),
            feed_page("Ben's bookshelf: read", 0),
        ]);

        let catalog = ingest(&fetcher, "23506884", "read").await.unwrap();

        assert_eq!(fetcher.call_count(), 2);
        assert_eq!(catalog.books.len(), 100);
    }

    #[tokio::test]
    async fn test_empty_shelf_yields_empty_catalog_not_error() {
        let fetcher = ScriptedFetcher::new(vec![feed_page("Some shelf", 0)]);

        let catalog = ingest(&fetcher, "23506884", "read").await.unwrap();

        assert_eq!(catalog.books.len(), 0);
        assert_eq!(catalog.total_books, 0);
    }

    #[tokio::test]
    async fn test_display_name_comes_from_page_one_only() {
        let fetcher = ScriptedFetcher::new(vec![
            feed_page("Ben's bookshelf: read", 100),
            feed_page("Somebody else's bookshelf: read", 1),
        ]);

        let catalog = ingest(&fetcher, "23506884", "read").await.unwrap();

        assert_eq!(catalog.display_name, Some("Ben".to_string()));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        // Page 2 is requested but the script has none
        let fetcher = ScriptedFetcher::new(vec![feed_page("Ben's bookshelf: read", 100)]);

        let result = ingest(&fetcher, "23506884", "read").await;

        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_books_accumulate_in_feed_order() {
        let fetcher = ScriptedFetcher::new(vec![feed_page("Ben's bookshelf: read", 5)]);

        let catalog = ingest(&fetcher, "23506884", "read").await.unwrap();

        let titles: Vec<_> = catalog.books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Book 0", "Book 1", "Book 2", "Book 3", "Book 4"]);
    }
}
