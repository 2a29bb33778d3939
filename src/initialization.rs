use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::answer_service::AnswerService;
use crate::application::indexing_service::IndexingService;
use crate::config::AppConfig;
use crate::domain::embedder::TextEmbedder;
use crate::domain::model::ChatModel;
use crate::domain::speech::SpeechSynthesizer;
use crate::domain::vector_repository::VectorRepository;
use crate::infrastructure::cleaner::TextCleaner;
use crate::infrastructure::crawler::FirecrawlClient;
use crate::infrastructure::embedding::EmbeddingGenerator;
use crate::infrastructure::llm::AnthropicClient;
use crate::infrastructure::speech::CommandSynthesizer;
use crate::infrastructure::vector_db::{qdrant_client::Qdrant, VectorDb};
use crate::infrastructure::EmbeddingModel;

/// Every handle the pipeline needs, constructed once at startup and passed
/// explicitly to the pieces that use it.
pub struct ServiceContext {
    pub embedder: Arc<EmbeddingGenerator>,
    pub index: Arc<dyn VectorRepository>,
    pub crawler: FirecrawlClient,
    pub indexing: IndexingService,
    pub answer: Arc<AnswerService>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

/// Builds the embedder, probes its dimension, connects to Qdrant, and
/// creates the collection. Everything here is startup-fatal except a
/// collection that already exists.
pub async fn initialize_services(config: &AppConfig) -> Result<ServiceContext> {
    let model_name = EmbeddingModel::AllMiniLML6V2;
    let cache_dir = config.embedding.cache_dir.clone();
    let embedder = tokio::task::spawn_blocking(move || EmbeddingGenerator::new(model_name, cache_dir))
        .await
        .context("embedding model initialization task failed")??;
    let embedder = Arc::new(embedder);

    let dimension = {
        let embedder = embedder.clone();
        tokio::task::spawn_blocking(move || embedder.probe_dimension())
            .await
            .context("embedding probe task failed")??
    };
    log::info!("Embedding dimension probed as {}.", dimension);

    let mut builder = Qdrant::from_url(&config.qdrant.url);
    if let Some(key) = &config.qdrant.api_key {
        builder = builder.api_key(key.clone());
    }
    let client = builder
        .build()
        .context("failed to construct Qdrant client")?;
    let vector_db = VectorDb::new(
        Box::new(client),
        config.qdrant.collection.clone(),
        dimension as u64,
    )?;
    vector_db.initialize_collection().await?;
    let index: Arc<dyn VectorRepository> = Arc::new(vector_db);

    let crawler = FirecrawlClient::new(
        config.crawler.api_url.clone(),
        config.crawler.api_key.clone(),
    )?;
    let model: Arc<dyn ChatModel> = Arc::new(AnthropicClient::new(&config.llm)?);
    let cleaner = TextCleaner::new(&config.crawler.site_domain);

    let embedder_handle: Arc<dyn TextEmbedder> = embedder.clone();
    let indexing = IndexingService::new(embedder_handle.clone(), index.clone());
    let answer = Arc::new(AnswerService::new(
        embedder_handle,
        index.clone(),
        model,
        cleaner,
    ));
    let speech: Arc<dyn SpeechSynthesizer> = Arc::new(CommandSynthesizer::new(
        config.speech.program.clone(),
        config.speech.extra_args.clone(),
    ));

    Ok(ServiceContext {
        embedder,
        index,
        crawler,
        indexing,
        answer,
        speech,
    })
}

/// Crawls the configured seed URL and indexes every page. Runs to completion
/// before the server starts accepting traffic; any failure is fatal.
pub async fn populate_index(ctx: &ServiceContext, config: &AppConfig) -> Result<usize> {
    log::info!("Crawling {}...", config.crawler.seed_url);
    let pages = ctx
        .crawler
        .crawl(&config.crawler.seed_url, config.crawler.page_limit)
        .await?;
    log::info!("Crawl returned {} pages.", pages.len());
    ctx.indexing.index_pages(&pages).await
}
