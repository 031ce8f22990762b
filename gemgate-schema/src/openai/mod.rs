mod chat_request;
mod chat_response;
mod error;
mod model_list;

pub use chat_request::{ChatCompletionRequest, ChatMessage};
pub use chat_response::{
    AssistantMessage, ChatChoice, ChatCompletionChunk, ChatCompletionResponse, ChunkChoice,
    ChunkDelta, Usage,
};
pub use error::{OpenaiErrorBody, OpenaiErrorObject};
pub use model_list::{OpenaiModel, OpenaiModelList};
