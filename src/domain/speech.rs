use anyhow::Result;
use async_trait::async_trait;

/// Renders text to audio and returns the encoded bytes in memory.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}
