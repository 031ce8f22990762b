use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GeminiModelList {
    pub models: Vec<GeminiModel>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeminiModel {
    pub name: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub supported_generation_methods: Vec<String>,
}

impl GeminiModelList {
    /// Builds `models/<id>` entries supporting both generation methods.
    pub fn from_model_names<I, S>(model_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let models = model_names
            .into_iter()
            .map(|model| {
                let id = model.into();
                GeminiModel {
                    name: format!("models/{id}"),
                    display_name: id,
                    description: None,
                    supported_generation_methods: vec![
                        "generateContent".to_string(),
                        "streamGenerateContent".to_string(),
                    ],
                }
            })
            .collect();
        Self { models }
    }
}
