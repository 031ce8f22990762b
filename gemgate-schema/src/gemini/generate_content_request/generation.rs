use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `generationConfig` object. Values are validated by the translator, not
/// clamped here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<i64>,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn out_of_range_values_survive_parsing() {
        let gc: GenerationConfig =
            serde_json::from_value(json!({"temperature": 9.9, "maxOutputTokens": -1})).unwrap();
        assert_eq!(gc.temperature, Some(9.9));
        assert_eq!(gc.max_output_tokens, Some(-1));
    }

    #[test]
    fn unknown_fields_captured() {
        let gc: GenerationConfig = serde_json::from_value(json!({
            "topK": 40,
            "thinkingConfig": {"thinkingBudget": 1024}
        }))
        .unwrap();
        assert!(gc.temperature.is_none());
        assert_eq!(gc.extra.get("topK"), Some(&json!(40)));
        assert!(gc.extra.contains_key("thinkingConfig"));
    }
}
