use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use voicedesk::domain::model::{ContentBlock, ModelResponse};
use voicedesk::{
    page_point_id, AnswerService, ChatModel, IndexingService, PageMetadata, PageRecord,
    PageToUpsert, SearchResult, TextCleaner, TextEmbedder, VectorRepository,
};

const DIM: usize = 32;

/// Deterministic bag-of-words embedder: shared tokens give overlapping
/// vectors, which is all cosine retrieval needs in a test.
struct BagOfWordsEmbedder;

impl TextEmbedder for BagOfWordsEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0f32; DIM];
                for token in text
                    .to_lowercase()
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|t| !t.is_empty())
                {
                    let mut hasher = DefaultHasher::new();
                    token.hash(&mut hasher);
                    vector[(hasher.finish() as usize) % DIM] += 1.0;
                }
                vector
            })
            .collect())
    }
}

/// In-memory stand-in for the vector store: points keyed the same way the
/// real repository keys them, searched by cosine similarity.
#[derive(Default)]
struct InMemoryRepository {
    points: Mutex<HashMap<uuid::Uuid, PageToUpsert>>,
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorRepository for InMemoryRepository {
    async fn upsert_pages(&self, pages: &[PageToUpsert]) -> Result<()> {
        let mut points = self.points.lock().unwrap();
        for page in pages {
            points.insert(page_point_id(&page.url), page.clone());
        }
        Ok(())
    }

    async fn search(&self, query_vector: Vec<f32>, limit: usize) -> Result<Vec<SearchResult>> {
        let points = self.points.lock().unwrap();
        let mut results: Vec<SearchResult> = points
            .values()
            .map(|page| SearchResult {
                score: cosine(&query_vector, &page.vector),
                content: page.content.clone(),
                url: page.url.clone(),
                metadata: page.metadata.clone(),
            })
            .collect();
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        results.truncate(limit);
        Ok(results)
    }
}

/// Echoes the prompt back as the reply, so assertions can look at what the
/// model actually received.
struct EchoModel {
    calls: Mutex<usize>,
}

impl EchoModel {
    fn new() -> Self {
        Self {
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl ChatModel for EchoModel {
    async fn complete(&self, prompt: &str) -> Result<ModelResponse> {
        *self.calls.lock().unwrap() += 1;
        Ok(ModelResponse {
            content: vec![ContentBlock::Text {
                text: prompt.to_string(),
            }],
        })
    }
}

fn pipeline(
    repository: Arc<InMemoryRepository>,
    model: Arc<EchoModel>,
) -> (IndexingService, AnswerService) {
    let embedder: Arc<dyn TextEmbedder> = Arc::new(BagOfWordsEmbedder);
    let indexing = IndexingService::new(embedder.clone(), repository.clone());
    let answer = AnswerService::new(embedder, repository, model, TextCleaner::default());
    (indexing, answer)
}

#[tokio::test]
async fn indexed_page_comes_back_through_the_answer() -> Result<()> {
    let repository = Arc::new(InMemoryRepository::default());
    let model = Arc::new(EchoModel::new());
    let (indexing, answer) = pipeline(repository.clone(), model.clone());

    let page = PageRecord {
        content: "Hotel Carthage, 4 stars, pool, $80/night".to_string(),
        url: "http://x".to_string(),
        metadata: PageMetadata::default(),
    };
    assert_eq!(indexing.index_pages(&[page]).await?, 1);

    let text = answer.answer("Tell me about Hotel Carthage").await?;
    assert!(text.contains("Hotel Carthage"));
    assert!(text.contains("$80/night"));
    Ok(())
}

#[tokio::test]
async fn reindexing_the_same_url_does_not_duplicate() -> Result<()> {
    let repository = Arc::new(InMemoryRepository::default());
    let model = Arc::new(EchoModel::new());
    let (indexing, _) = pipeline(repository.clone(), model);

    let page = |content: &str| PageRecord {
        content: content.to_string(),
        url: "http://x".to_string(),
        metadata: PageMetadata::default(),
    };
    indexing.index_pages(&[page("Hotel Carthage, 4 stars")]).await?;
    indexing
        .index_pages(&[page("Hotel Carthage, renovated, 5 stars")])
        .await?;

    let points = repository.points.lock().unwrap();
    assert_eq!(points.len(), 1);
    let stored = points.values().next().unwrap();
    assert!(stored.content.contains("renovated"));
    Ok(())
}

#[tokio::test]
async fn unmatched_query_still_calls_the_model() -> Result<()> {
    let repository = Arc::new(InMemoryRepository::default());
    let model = Arc::new(EchoModel::new());
    let (_, answer) = pipeline(repository, model.clone());

    let text = answer.answer("Do you have ski resorts?").await?;
    assert_eq!(*model.calls.lock().unwrap(), 1);
    assert!(text.contains("Customer question: Do you have ski resorts?"));
    Ok(())
}
