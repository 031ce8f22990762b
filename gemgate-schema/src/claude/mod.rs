mod count_tokens;
mod error;
mod messages_request;
mod messages_response;
mod model_list;
mod stream_event;

pub use count_tokens::{CountTokensRequest, CountTokensResponse};
pub use error::{ClaudeErrorBody, ClaudeErrorObject};
pub use messages_request::{ClaudeMessage, MessagesRequest};
pub use messages_response::{ClaudeUsage, MessagesResponse, ResponseTextBlock};
pub use model_list::{ClaudeModel, ClaudeModelList};
pub use stream_event::{MessageDeltaBody, StreamDelta, StreamEvent};
