use anyhow::Result;
use async_trait::async_trait;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::process::Command;

use crate::domain::speech::SpeechSynthesizer;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("failed to create temporary audio file: {0}")]
    TempFile(#[source] std::io::Error),
    #[error("failed to run speech engine '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("speech engine '{program}' exited with {status}: {stderr}")]
    Engine {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("failed to read synthesized audio: {0}")]
    ReadAudio(#[source] std::io::Error),
}

/// Renders text to audio through an external engine invoked as
/// `{program} [extra_args..] -w <file> <text>` (the espeak-ng calling
/// convention). The output file is a uniquely named temp file that is
/// removed when the handle drops, on success and failure alike.
pub struct CommandSynthesizer {
    program: String,
    extra_args: Vec<String>,
}

impl CommandSynthesizer {
    pub fn new(program: String, extra_args: Vec<String>) -> Self {
        Self {
            program,
            extra_args,
        }
    }

    pub async fn synthesize_impl(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let audio_file = NamedTempFile::new().map_err(SpeechError::TempFile)?;

        let output = Command::new(&self.program)
            .args(&self.extra_args)
            .arg("-w")
            .arg(audio_file.path())
            .arg(text)
            .output()
            .await
            .map_err(|source| SpeechError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SpeechError::Engine {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let bytes = tokio::fs::read(audio_file.path())
            .await
            .map_err(SpeechError::ReadAudio)?;
        log::debug!("Synthesized {} bytes of audio.", bytes.len());
        Ok(bytes)
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        Ok(self.synthesize_impl(text).await?)
    }
}
