use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClaudeModelList {
    pub data: Vec<ClaudeModel>,
    pub has_more: bool,
    pub first_id: Option<String>,
    pub last_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ClaudeModel {
    pub id: String,
    pub r#type: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl ClaudeModel {
    pub fn new(id: &str, display_name: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            r#type: "model".to_string(),
            display_name: display_name.to_string(),
            created_at,
        }
    }
}

impl ClaudeModelList {
    pub fn from_models(data: Vec<ClaudeModel>) -> Self {
        Self {
            first_id: data.first().map(|m| m.id.clone()),
            last_id: data.last().map(|m| m.id.clone()),
            has_more: false,
            data,
        }
    }
}
