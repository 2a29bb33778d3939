use std::sync::Arc;

use anyhow::{anyhow, Result};
use log::info;

use crate::domain::embedder::TextEmbedder;
use crate::domain::page::{PageRecord, PageToUpsert};
use crate::domain::vector_repository::VectorRepository;

/// Embeds crawled pages and writes them to the index, one point per page.
/// Runs at startup population and from the `reindex` binary; because point
/// ids are derived from page URLs, repeat runs replace instead of duplicate.
pub struct IndexingService {
    embedder: Arc<dyn TextEmbedder>,
    index: Arc<dyn VectorRepository>,
}

impl IndexingService {
    pub fn new(embedder: Arc<dyn TextEmbedder>, index: Arc<dyn VectorRepository>) -> Self {
        Self { embedder, index }
    }

    /// Returns the number of pages written. Fails on the first page that
    /// cannot be embedded or stored; earlier writes stay in the index.
    pub async fn index_pages(&self, pages: &[PageRecord]) -> Result<usize> {
        info!("Indexing {} pages...", pages.len());

        for page in pages {
            let vector = self
                .embedder
                .embed(&[&page.content])?
                .pop()
                .ok_or_else(|| anyhow!("embedder returned no vector for {}", page.url))?;
            let point = PageToUpsert {
                vector,
                content: page.content.clone(),
                url: page.url.clone(),
                metadata: page.metadata.clone(),
            };
            self.index.upsert_pages(&[point]).await?;
        }

        info!("Indexed {} pages.", pages.len());
        Ok(pages.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::domain::page::{PageMetadata, SearchResult};

    struct StubEmbedder;

    impl TextEmbedder for StubEmbedder {
        fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }
    }

    #[derive(Default)]
    struct RecordingRepository {
        upserted: Mutex<Vec<PageToUpsert>>,
    }

    #[async_trait]
    impl VectorRepository for RecordingRepository {
        async fn upsert_pages(&self, pages: &[PageToUpsert]) -> Result<()> {
            self.upserted.lock().unwrap().extend_from_slice(pages);
            Ok(())
        }

        async fn search(
            &self,
            _query_vector: Vec<f32>,
            _limit: usize,
        ) -> Result<Vec<SearchResult>> {
            Ok(vec![])
        }
    }

    fn page(url: &str, content: &str) -> PageRecord {
        PageRecord {
            content: content.to_string(),
            url: url.to_string(),
            metadata: PageMetadata::default(),
        }
    }

    #[tokio::test]
    async fn writes_one_point_per_page() -> Result<()> {
        let repo = Arc::new(RecordingRepository::default());
        let service = IndexingService::new(Arc::new(StubEmbedder), repo.clone());

        let count = service
            .index_pages(&[page("http://a", "Hotel A"), page("http://b", "Hotel B")])
            .await?;

        assert_eq!(count, 2);
        let upserted = repo.upserted.lock().unwrap();
        assert_eq!(upserted.len(), 2);
        assert_eq!(upserted[0].url, "http://a");
        assert_eq!(upserted[0].content, "Hotel A");
        assert!(!upserted[0].vector.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn empty_page_list_is_a_no_op() -> Result<()> {
        let repo = Arc::new(RecordingRepository::default());
        let service = IndexingService::new(Arc::new(StubEmbedder), repo.clone());
        assert_eq!(service.index_pages(&[]).await?, 0);
        assert!(repo.upserted.lock().unwrap().is_empty());
        Ok(())
    }
}
