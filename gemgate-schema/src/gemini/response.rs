//! Gemini v1beta `GenerateContentResponse` as the gateway emits it.

use super::Content;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponseBody {
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,

    pub index: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SafetyRating {
    pub category: String,
    pub probability: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub safety_ratings: Vec<SafetyRating>,
}

impl SafetyRating {
    /// The four standard categories, all rated `NEGLIGIBLE`.
    pub fn negligible_set() -> Vec<SafetyRating> {
        SAFETY_CATEGORIES
            .iter()
            .map(|category| SafetyRating {
                category: (*category).to_string(),
                probability: "NEGLIGIBLE".to_string(),
            })
            .collect()
    }
}

impl GeminiResponseBody {
    /// Complete response for a finished reply.
    pub fn finished(text: impl Into<String>, finish_reason: &str) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content::model_text(text)),
                index: 0,
                finish_reason: Some(finish_reason.to_string()),
                safety_ratings: SafetyRating::negligible_set(),
            }],
            prompt_feedback: Some(PromptFeedback {
                safety_ratings: SafetyRating::negligible_set(),
            }),
            model_version: None,
            extra: BTreeMap::new(),
        }
    }

    /// One streamed text fragment.
    pub fn text_chunk(text: impl Into<String>) -> Self {
        Self::single(Candidate {
            content: Some(Content::model_text(text)),
            index: 0,
            finish_reason: None,
            safety_ratings: Vec::new(),
        })
    }

    /// Stream terminator carrying only the finish reason.
    pub fn finish_chunk(finish_reason: &str) -> Self {
        Self::single(Candidate {
            content: None,
            index: 0,
            finish_reason: Some(finish_reason.to_string()),
            safety_ratings: Vec::new(),
        })
    }

    fn single(candidate: Candidate) -> Self {
        Self {
            candidates: vec![candidate],
            prompt_feedback: None,
            model_version: None,
            extra: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finished_response_has_safety_ratings() {
        let v = serde_json::to_value(GeminiResponseBody::finished("hi", "STOP")).unwrap();
        let c = &v["candidates"][0];
        assert_eq!(c["content"]["role"], "model");
        assert_eq!(c["content"]["parts"][0]["text"], "hi");
        assert_eq!(c["finishReason"], "STOP");
        assert_eq!(c["safetyRatings"].as_array().unwrap().len(), 4);
        assert_eq!(c["safetyRatings"][0]["probability"], "NEGLIGIBLE");
        assert_eq!(v["promptFeedback"]["safetyRatings"], c["safetyRatings"]);
    }

    #[test]
    fn chunk_shapes() {
        assert_eq!(
            serde_json::to_value(GeminiResponseBody::text_chunk("x ")).unwrap(),
            json!({"candidates": [{"content": {"role": "model", "parts": [{"text": "x "}]}, "index": 0}]})
        );
        assert_eq!(
            serde_json::to_value(GeminiResponseBody::finish_chunk("STOP")).unwrap(),
            json!({"candidates": [{"index": 0, "finishReason": "STOP"}]})
        );
    }
}
