use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// One block of a language-model reply. Only text blocks carry answer
/// content; anything else (tool use, thinking, future block kinds) is
/// preserved as `Other` and skipped during extraction.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// A structured language-model reply.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelResponse {
    pub content: Vec<ContentBlock>,
}

impl ModelResponse {
    /// All text blocks in response order, blank-line separated.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Submits a single-turn prompt and waits for the full reply.
    async fn complete(&self, prompt: &str) -> Result<ModelResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_joins_blocks_in_order() {
        let response = ModelResponse {
            content: vec![
                ContentBlock::Text {
                    text: "First paragraph.".to_string(),
                },
                ContentBlock::Other,
                ContentBlock::Text {
                    text: "Second paragraph.".to_string(),
                },
            ],
        };
        assert_eq!(response.text(), "First paragraph.\n\nSecond paragraph.");
    }

    #[test]
    fn text_of_empty_response_is_empty() {
        let response = ModelResponse { content: vec![] };
        assert_eq!(response.text(), "");
    }

    #[test]
    fn unknown_block_kinds_deserialize_as_other() {
        let json = r#"[{"type":"text","text":"hi"},{"type":"tool_use","id":"x"}]"#;
        let blocks: Vec<ContentBlock> = serde_json::from_str(json).unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[1], ContentBlock::Other));
    }
}
