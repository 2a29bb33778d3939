use anyhow::{anyhow, Result};
use fastembed::{EmbeddingModel, Error as FastEmbedError, InitOptions, TextEmbedding};

use crate::domain::embedder::TextEmbedder;

/// Generates text embeddings with a pre-initialized fastembed model.
pub struct EmbeddingGenerator {
    model: TextEmbedding,
}

impl EmbeddingGenerator {
    /// Initializes the embedding model. The first run may download model
    /// weights into `cache_dir` (or the fastembed default when `None`), so
    /// callers should construct this off the async runtime.
    pub fn new(
        model_name: EmbeddingModel,
        cache_dir: Option<std::path::PathBuf>,
    ) -> Result<Self, FastEmbedError> {
        let mut opts = InitOptions::new(model_name);
        if let Some(dir) = cache_dir {
            opts = opts.with_cache_dir(dir);
        }
        let model = TextEmbedding::try_new(opts)?;
        Ok(EmbeddingGenerator { model })
    }

    /// Embeds a probe string and reports the vector length. The collection
    /// is dimensioned from this value, and every later embedding from the
    /// same model matches it.
    pub fn probe_dimension(&self) -> Result<usize> {
        let probe = self
            .model
            .embed(vec!["test"], None)?
            .pop()
            .ok_or_else(|| anyhow!("embedding model returned no probe vector"))?;
        Ok(probe.len())
    }
}

impl TextEmbedder for EmbeddingGenerator {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(self.model.embed(texts.to_vec(), None)?)
    }
}
