pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod initialization;
pub mod server;

/// Re-export the pieces main.rs, the reindex binary, and tests reach for.
pub use application::answer_service::AnswerService;
pub use application::indexing_service::IndexingService;
pub use config::load_config;
pub use domain::embedder::TextEmbedder;
pub use domain::model::{ChatModel, ContentBlock, ModelResponse};
pub use domain::page::{PageMetadata, PageRecord, PageToUpsert, SearchResult};
pub use domain::speech::SpeechSynthesizer;
pub use domain::vector_repository::VectorRepository;
pub use fastembed::EmbeddingModel;
pub use infrastructure::cleaner::TextCleaner;
pub use infrastructure::crawler::FirecrawlClient;
pub use infrastructure::embedding::EmbeddingGenerator;
pub use infrastructure::vector_db::{page_point_id, qdrant_client, VectorDb};
