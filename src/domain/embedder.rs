use anyhow::Result;

/// Produces fixed-length vectors for text. Query embedding at request time
/// must use the same implementation that embedded the indexed pages.
pub trait TextEmbedder: Send + Sync {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;
}
