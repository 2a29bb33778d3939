use anyhow::Result;
use async_trait::async_trait;

use crate::domain::page::{PageToUpsert, SearchResult};

#[async_trait]
pub trait VectorRepository: Send + Sync {
    /// Writes one point per page into the vector store. Point identity is
    /// keyed by the page URL, so re-indexing replaces rather than duplicates.
    async fn upsert_pages(&self, pages: &[PageToUpsert]) -> Result<()>;

    /// Returns up to `limit` nearest points by cosine similarity, payload
    /// attached, ordered by descending score.
    async fn search(&self, query_vector: Vec<f32>, limit: usize) -> Result<Vec<SearchResult>>;
}
