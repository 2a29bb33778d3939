pub mod cleaner;
pub mod crawler;
pub mod embedding;
pub mod llm;
pub mod speech;
pub mod vector_db;

pub use cleaner::TextCleaner;
pub use crawler::FirecrawlClient;
pub use embedding::EmbeddingGenerator;
pub use llm::AnthropicClient;
pub use speech::CommandSynthesizer;
pub use vector_db::VectorDb;

// Re-export the model enum directly from the dependency
pub use fastembed::EmbeddingModel;
