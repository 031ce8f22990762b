pub mod claude;
pub mod content;
pub mod gemini;
pub mod openai;

pub use claude::{ClaudeErrorBody, MessagesRequest, MessagesResponse};
pub use content::{ContentBlock, MessageContent};
pub use gemini::{GeminiErrorBody, GeminiGenerateContentRequest, GeminiResponseBody, SimpleChatRequest};
pub use openai::{ChatCompletionRequest, ChatCompletionResponse, OpenaiErrorBody};
