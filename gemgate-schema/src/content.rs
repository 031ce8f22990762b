//! Polymorphic message `content` shared by the OpenAI and Anthropic shapes.
//!
//! Both APIs accept either a bare string or an array of typed content blocks.
//! We decode into a tagged variant up front so translators never have to look
//! at raw `serde_json::Value`s.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `content` of a chat message: `"hi"` or `[{"type":"text","text":"hi"}, ...]`.
///
/// An explicit `null` (OpenAI assistant turns carrying only tool calls) is
/// normalized to an empty string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Text(String::new())
    }
}

/// One element of a block-array `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContentBlock {
    /// `"text"`, `"image"`, `"image_url"`, `"tool_use"`, ...
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: Some("text".to_string()),
            text: Some(text.into()),
            extra: BTreeMap::new(),
        }
    }

    /// Text carried by this block if it is a text block. Blocks without a
    /// `type` are treated as text.
    pub fn as_text(&self) -> Option<&str> {
        match self.kind.as_deref() {
            None | Some("text") => self.text.as_deref(),
            Some(_) => None,
        }
    }
}

impl MessageContent {
    /// Plain text of the content. Text blocks are joined with a single space;
    /// non-text blocks are skipped.
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(ContentBlock::as_text)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl From<&str> for MessageContent {
    fn from(value: &str) -> Self {
        MessageContent::Text(value.to_string())
    }
}

impl<'de> Deserialize<'de> for MessageContent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawBlock {
            Bare(String),
            Block(ContentBlock),
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawContent {
            Null(()),
            String(String),
            Array(Vec<RawBlock>),
        }

        let normalized = match RawContent::deserialize(deserializer)? {
            RawContent::Null(()) => MessageContent::default(),
            RawContent::String(s) => MessageContent::Text(s),
            RawContent::Array(items) => MessageContent::Blocks(
                items
                    .into_iter()
                    .map(|item| match item {
                        RawBlock::Bare(s) => ContentBlock::text(s),
                        RawBlock::Block(block) => block,
                    })
                    .collect(),
            ),
        };
        Ok(normalized)
    }
}
