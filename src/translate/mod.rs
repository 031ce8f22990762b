//! Conversion between the three public request shapes and the single prompt
//! the web app understands.

mod claude;
mod gemini;
mod normalized;
mod openai;

pub use claude::{
    DEFAULT_CLAUDE_MODEL, claude_model, claude_model_list, claude_response, claude_usage,
    count_tokens, map_claude_model, message_id, normalize_claude,
};
pub use gemini::{gemini_model_list, gemini_response, normalize_gemini, normalize_simple_chat};
pub use normalized::{NormalizedRequest, Role, Turn, estimate_tokens};
pub use openai::{completion_id, normalize_openai, openai_model_list, openai_response};
