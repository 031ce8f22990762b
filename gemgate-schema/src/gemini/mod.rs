mod error;
mod generate_content_request;
mod model_list;
mod response;
mod simple_chat;

pub use error::{GeminiErrorBody, GeminiErrorObject};
pub use generate_content_request::GeminiGenerateContentRequest;
pub use generate_content_request::{Content, GenerationConfig, Part};
pub use model_list::{GeminiModel, GeminiModelList};
pub use response::{Candidate, GeminiResponseBody, PromptFeedback, SafetyRating};
pub use simple_chat::{ChatCookies, SimpleChatRequest, SimpleChatResponse};
