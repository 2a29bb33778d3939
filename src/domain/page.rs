use serde::{Deserialize, Serialize};

/// A single crawled listing page, as handed over by the crawl gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageRecord {
    pub content: String,
    pub url: String,
    pub metadata: PageMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub language: String,
    pub crawl_date: String,
}

/// A page that has been embedded and is ready to be written to the index.
/// The point id is derived from `url`, so writing the same page again
/// replaces the previous point instead of adding a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageToUpsert {
    pub vector: Vec<f32>,
    pub content: String,
    pub url: String,
    pub metadata: PageMetadata,
}

/// One similarity-search hit with its stored payload surfaced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub score: f32,
    pub content: String,
    pub url: String,
    pub metadata: PageMetadata,
}
