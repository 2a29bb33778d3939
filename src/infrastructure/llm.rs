use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::config::LlmConfig;
use crate::domain::model::{ChatModel, ModelResponse};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Anthropic Messages API client.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

impl AnthropicClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build language model HTTP client")?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl ChatModel for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<ModelResponse> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };
        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", self.api_key.trim())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .context("failed to call language model API")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            bail!("language model returned {}: {}", status, text);
        }

        response
            .json::<ModelResponse>()
            .await
            .context("failed to decode language model response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server_uri: &str) -> LlmConfig {
        LlmConfig {
            api_url: format!("{server_uri}/v1/messages"),
            api_key: "key".to_string(),
            model: "claude-3-haiku-20240307".to_string(),
            max_tokens: 1024,
        }
    }

    #[tokio::test]
    async fn complete_returns_typed_content_blocks() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    { "type": "text", "text": "Hotel Carthage is a solid pick." },
                    { "type": "text", "text": "Rooms start at $80." }
                ]
            })))
            .mount(&server)
            .await;

        let client = AnthropicClient::new(&test_config(&server.uri()))?;
        let response = client.complete("Tell me about Hotel Carthage").await?;
        assert_eq!(
            response.text(),
            "Hotel Carthage is a solid pick.\n\nRooms start at $80."
        );
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(
                ResponseTemplate::new(429).set_body_string("{\"error\":\"rate limited\"}"),
            )
            .mount(&server)
            .await;

        let client = AnthropicClient::new(&test_config(&server.uri()))?;
        let err = client.complete("hello").await.unwrap_err();
        assert!(err.to_string().contains("429"));
        Ok(())
    }
}
