/// Open Library cover lookup
///
/// Searches the catalog for a title/author pair and derives a cover
/// image URL from the best identifier available. Strictly best-effort:
/// transport failures, bad statuses and empty result sets all resolve
/// to no cover.
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::services::providers::CoverResolver;

const COVERS_BASE_URL: &str = "https://covers.openlibrary.org";

#[derive(Clone)]
pub struct OpenLibraryResolver {
    http_client: HttpClient,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    #[serde(default)]
    cover_i: Option<u64>,
    #[serde(default)]
    isbn: Option<Vec<String>>,
}

impl OpenLibraryResolver {
    pub fn new(api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
        }
    }

    /// Builds the cover URL from a search hit, preferring the catalog's
    /// own cover identifier over an ISBN
    fn cover_url_from_doc(doc: &SearchDoc) -> Option<String> {
        if let Some(cover_id) = doc.cover_i {
            return Some(format!("{}/b/id/{}-M.jpg", COVERS_BASE_URL, cover_id));
        }

        let isbn = doc.isbn.as_ref()?.first()?;
        Some(format!("{}/b/isbn/{}-M.jpg", COVERS_BASE_URL, isbn))
    }

    async fn search(&self, title: &str, author: &str) -> Option<String> {
        let url = format!("{}/search.json", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("title", title),
                ("author", author),
                ("limit", "1"),
                ("fields", "isbn,cover_i"),
            ])
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            tracing::debug!(
                title = %title,
                status = %response.status(),
                "Cover search returned non-success status"
            );
            return None;
        }

        let search: SearchResponse = response.json().await.ok()?;
        search.docs.first().and_then(Self::cover_url_from_doc)
    }
}

#[async_trait::async_trait]
impl CoverResolver for OpenLibraryResolver {
    async fn resolve(&self, title: &str, author: &str) -> Option<String> {
        let cover = self.search(title, author).await;
        if cover.is_none() {
            tracing::debug!(title = %title, author = %author, "No cover found");
        }
        cover
    }
}
