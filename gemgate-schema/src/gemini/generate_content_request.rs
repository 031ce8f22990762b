//! Typed Gemini v1beta request schema for the generate-content endpoints.
//!
//! Only text parts reach the upstream; every other field is kept in `extra`
//! catch-all maps so real client payloads always deserialize.

mod content;
mod generation;
mod system_instruction;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub use content::{Content, Part};
pub use generation::GenerationConfig;
use system_instruction::deserialize_system_instruction;

/// Gemini `generateContent` / `streamGenerateContent` request body.
///
/// Reference: <https://ai.google.dev/gemini-api/docs/text-generation>
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerateContentRequest {
    /// Required conversation turns.
    pub contents: Vec<Content>,

    /// System-level instruction, normalized to a single text part.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_system_instruction"
    )]
    pub system_instruction: Option<Content>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,

    /// `tools`, `toolConfig`, `safetySettings`, `cachedContent`, ...
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl GeminiGenerateContentRequest {
    /// Text of the normalized `systemInstruction`, if any.
    pub fn system_text(&self) -> Option<&str> {
        self.system_instruction
            .as_ref()
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_request_deserializes_with_defaults() {
        let req: GeminiGenerateContentRequest =
            serde_json::from_value(json!({"contents": []})).unwrap();
        assert!(req.contents.is_empty());
        assert!(req.system_instruction.is_none());
        assert!(req.generation_config.is_none());
        assert!(req.extra.is_empty());
    }

    #[test]
    fn missing_contents_rejected() {
        let err = serde_json::from_value::<GeminiGenerateContentRequest>(json!({})).unwrap_err();
        assert!(err.to_string().contains("contents"));
    }

    #[test]
    fn full_request_keeps_unmodelled_fields() {
        let req: GeminiGenerateContentRequest = serde_json::from_value(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "What is Rust?"}]},
                {"role": "model", "parts": [{"text": "A language."}]},
                {"parts": [{"text": "More."}]}
            ],
            "systemInstruction": {"role": "user", "parts": [{"text": "be helpful"}]},
            "generationConfig": {"temperature": 0.7, "maxOutputTokens": 1024, "stopSequences": ["END"]},
            "tools": [{"functionDeclarations": []}],
            "safetySettings": [{"category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_NONE"}]
        }))
        .unwrap();

        assert_eq!(req.contents.len(), 3);
        assert_eq!(req.contents[1].role.as_deref(), Some("model"));
        assert!(req.contents[2].role.is_none());
        assert_eq!(req.system_text(), Some("be helpful"));

        let gc = req.generation_config.as_ref().unwrap();
        assert_eq!(gc.temperature, Some(0.7));
        assert_eq!(gc.max_output_tokens, Some(1024));
        assert_eq!(gc.extra.get("stopSequences"), Some(&json!(["END"])));

        assert!(req.extra.contains_key("tools"));
        assert!(req.extra.contains_key("safetySettings"));
    }
}
