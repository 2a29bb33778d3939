use std::sync::Arc;

use anyhow::{anyhow, Result};
use log::info;

use crate::domain::embedder::TextEmbedder;
use crate::domain::model::ChatModel;
use crate::domain::vector_repository::VectorRepository;
use crate::infrastructure::cleaner::TextCleaner;

const RETRIEVAL_LIMIT: usize = 5;

/// Answers a customer question: embed the query, retrieve the nearest
/// indexed pages, scrub them into a context block, prompt the model, and
/// hand back the extracted reply text.
///
/// All collaborators are injected; the service owns no global state.
pub struct AnswerService {
    embedder: Arc<dyn TextEmbedder>,
    index: Arc<dyn VectorRepository>,
    model: Arc<dyn ChatModel>,
    cleaner: TextCleaner,
}

impl AnswerService {
    pub fn new(
        embedder: Arc<dyn TextEmbedder>,
        index: Arc<dyn VectorRepository>,
        model: Arc<dyn ChatModel>,
        cleaner: TextCleaner,
    ) -> Self {
        Self {
            embedder,
            index,
            model,
            cleaner,
        }
    }

    /// Runs the full retrieval-then-prompt pipeline. A query that matches
    /// nothing still reaches the model with an empty context block; any
    /// failure along the way propagates to the caller, no retries.
    pub async fn answer(&self, query: &str) -> Result<String> {
        let query_embedding = self
            .embedder
            .embed(&[query])?
            .pop()
            .ok_or_else(|| anyhow!("embedder returned no vector for query"))?;

        let results = self.index.search(query_embedding, RETRIEVAL_LIMIT).await?;
        info!("Retrieved {} passages for the query.", results.len());

        let mut context = String::new();
        for result in &results {
            let cleaned = self.cleaner.clean(&result.content);
            context.push_str(cleaned.trim());
            context.push_str("\n\n");
        }

        let prompt = build_prompt(&context, query);
        let response = self.model.complete(&prompt).await?;
        Ok(response.text())
    }
}

fn build_prompt(context: &str, query: &str) -> String {
    format!(
        r#"
You are a helpful and professional travel agent at a Tunisian travel agency.
Your job is to give detailed, accurate, and friendly advice to customers asking about hotels in Tunisia.
You know the hotel offerings in various cities (like Tunis, Hammamet, Mahdia, Sousse, etc.) and can speak about hotel names, prices (if available), star ratings, customer reviews, locations, and services offered (like pools, spas, Wi-Fi, etc.).

Always answer directly, **never say things like 'based on the data provided'**. Instead, speak like an expert providing insights.
If you find useful information in your internal documentation, include it naturally as part of your response.

Answer the following customer question clearly, using real names, numbers, ratings, reviews, or price ranges if available.
Use a helpful and friendly tone, as if speaking out loud to a customer at the counter.

Contextual knowledge about hotels:
{context}

Customer question: {query}

Respond now as a helpful travel advisor speaking to a customer in person.
"#
    )
}
