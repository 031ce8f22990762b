//! Wire framing of synthesized streams, one builder per public shape.

use gemgate_schema::claude::{
    ClaudeUsage, MessageDeltaBody, MessagesResponse, ResponseTextBlock, StreamDelta, StreamEvent,
};
use gemgate_schema::gemini::GeminiResponseBody;
use gemgate_schema::openai::{ChatCompletionChunk, ChunkDelta};
use serde::Serialize;

/// Frames of one synthesized stream. `head` and `tail` go out back to back;
/// `tokens` are paced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamPlan {
    pub head: Vec<String>,
    pub tokens: Vec<String>,
    pub tail: Vec<String>,
}

/// Which shape to frame for, with the per-response identifiers it needs.
#[derive(Debug, Clone)]
pub enum StreamShape {
    Openai {
        id: String,
        created: i64,
        model: String,
    },
    Claude {
        id: String,
        model: String,
        usage: ClaudeUsage,
    },
    Gemini {
        sse: bool,
    },
}

impl StreamShape {
    pub fn content_type(&self) -> &'static str {
        match self {
            StreamShape::Gemini { sse: false } => "application/x-ndjson",
            _ => "text/event-stream",
        }
    }

    pub fn plan(&self, tokens: &[String]) -> Result<StreamPlan, serde_json::Error> {
        match self {
            StreamShape::Openai { id, created, model } => openai_plan(id, *created, model, tokens),
            StreamShape::Claude { id, model, usage } => claude_plan(id, model, *usage, tokens),
            StreamShape::Gemini { sse } => gemini_plan(*sse, tokens),
        }
    }
}

fn sse_data<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    Ok(format!("data: {}\n\n", serde_json::to_string(value)?))
}

fn sse_event(event: &StreamEvent) -> Result<String, serde_json::Error> {
    Ok(format!(
        "event: {}\ndata: {}\n\n",
        event.event_name(),
        serde_json::to_string(event)?
    ))
}

fn openai_plan(
    id: &str,
    created: i64,
    model: &str,
    tokens: &[String],
) -> Result<StreamPlan, serde_json::Error> {
    let tokens = tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            let delta = ChunkDelta {
                role: (i == 0).then(|| "assistant".to_string()),
                content: Some(token.clone()),
            };
            sse_data(&ChatCompletionChunk::new(id, created, model, delta, None))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let finish = ChatCompletionChunk::new(
        id,
        created,
        model,
        ChunkDelta::default(),
        Some("stop".to_string()),
    );
    Ok(StreamPlan {
        head: Vec::new(),
        tokens,
        tail: vec![sse_data(&finish)?, "data: [DONE]\n\n".to_string()],
    })
}

fn claude_plan(
    id: &str,
    model: &str,
    usage: ClaudeUsage,
    tokens: &[String],
) -> Result<StreamPlan, serde_json::Error> {
    let start = StreamEvent::MessageStart {
        message: MessagesResponse::assistant(
            id.to_string(),
            model.to_string(),
            Vec::new(),
            None,
            ClaudeUsage {
                input_tokens: usage.input_tokens,
                output_tokens: 0,
            },
        ),
    };
    let block_start = StreamEvent::ContentBlockStart {
        index: 0,
        content_block: ResponseTextBlock::text(""),
    };

    let tokens = tokens
        .iter()
        .map(|token| {
            sse_event(&StreamEvent::ContentBlockDelta {
                index: 0,
                delta: StreamDelta::TextDelta {
                    text: token.clone(),
                },
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let tail = [
        StreamEvent::ContentBlockStop { index: 0 },
        StreamEvent::MessageDelta {
            delta: MessageDeltaBody {
                stop_reason: Some("end_turn".to_string()),
                stop_sequence: None,
            },
            usage,
        },
        StreamEvent::MessageStop,
    ]
    .iter()
    .map(sse_event)
    .collect::<Result<Vec<_>, _>>()?;

    Ok(StreamPlan {
        head: vec![sse_event(&start)?, sse_event(&block_start)?],
        tokens,
        tail,
    })
}

fn gemini_plan(sse: bool, tokens: &[String]) -> Result<StreamPlan, serde_json::Error> {
    let frame = |body: &GeminiResponseBody| -> Result<String, serde_json::Error> {
        if sse {
            sse_data(body)
        } else {
            Ok(format!("{}\n", serde_json::to_string(body)?))
        }
    };

    let tokens = tokens
        .iter()
        .map(|token| frame(&GeminiResponseBody::text_chunk(token.clone())))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(StreamPlan {
        head: Vec::new(),
        tokens,
        tail: vec![frame(&GeminiResponseBody::finish_chunk("STOP"))?],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn data_json(frame: &str) -> Value {
        let data = frame
            .lines()
            .find_map(|l| l.strip_prefix("data: "))
            .unwrap();
        serde_json::from_str(data).unwrap()
    }

    #[test]
    fn openai_frames() {
        let shape = StreamShape::Openai {
            id: "chatcmpl-1".to_string(),
            created: 1,
            model: "gpt-4".to_string(),
        };
        let plan = shape.plan(&tokens(&["x ", "y"])).unwrap();
        assert!(plan.head.is_empty());

        let first = data_json(&plan.tokens[0]);
        assert_eq!(first["object"], "chat.completion.chunk");
        assert_eq!(first["choices"][0]["delta"], json!({"role": "assistant", "content": "x "}));
        assert_eq!(first["choices"][0]["finish_reason"], Value::Null);
        assert_eq!(data_json(&plan.tokens[1])["choices"][0]["delta"], json!({"content": "y"}));

        let finish = data_json(&plan.tail[0]);
        assert_eq!(finish["choices"][0]["finish_reason"], "stop");
        assert_eq!(finish["choices"][0]["delta"], json!({}));
        assert_eq!(plan.tail[1], "data: [DONE]\n\n");
    }

    #[test]
    fn claude_event_sequence() {
        let shape = StreamShape::Claude {
            id: "msg_1".to_string(),
            model: "claude-sonnet-4-6".to_string(),
            usage: ClaudeUsage {
                input_tokens: 7,
                output_tokens: 3,
            },
        };
        let plan = shape.plan(&tokens(&["a ", "b"])).unwrap();
        let names: Vec<&str> = plan
            .head
            .iter()
            .chain(&plan.tokens)
            .chain(&plan.tail)
            .map(|f| f.lines().next().unwrap().strip_prefix("event: ").unwrap())
            .collect();
        assert_eq!(
            names,
            [
                "message_start",
                "content_block_start",
                "content_block_delta",
                "content_block_delta",
                "content_block_stop",
                "message_delta",
                "message_stop"
            ]
        );

        let start = data_json(&plan.head[0]);
        assert_eq!(start["message"]["usage"], json!({"input_tokens": 7, "output_tokens": 0}));
        assert_eq!(start["message"]["content"], json!([]));
        assert_eq!(
            data_json(&plan.tokens[1])["delta"],
            json!({"type": "text_delta", "text": "b"})
        );
        let delta = data_json(&plan.tail[1]);
        assert_eq!(delta["delta"]["stop_reason"], "end_turn");
        assert_eq!(delta["usage"]["output_tokens"], 3);
    }

    #[test]
    fn gemini_ndjson_and_sse() {
        let ndjson = StreamShape::Gemini { sse: false }
            .plan(&tokens(&["x ", "y ", "z"]))
            .unwrap();
        assert_eq!(ndjson.tokens.len(), 3);
        let chunk: Value = serde_json::from_str(ndjson.tokens[2].trim_end()).unwrap();
        assert_eq!(chunk["candidates"][0]["content"]["parts"][0]["text"], "z");
        assert!(ndjson.tokens[0].ends_with('\n') && !ndjson.tokens[0].ends_with("\n\n"));
        let last: Value = serde_json::from_str(ndjson.tail[0].trim_end()).unwrap();
        assert_eq!(last["candidates"][0]["finishReason"], "STOP");

        let sse = StreamShape::Gemini { sse: true }.plan(&tokens(&["x"])).unwrap();
        assert!(sse.tokens[0].starts_with("data: {"));
        assert_eq!(StreamShape::Gemini { sse: true }.content_type(), "text/event-stream");
        assert_eq!(StreamShape::Gemini { sse: false }.content_type(), "application/x-ndjson");
    }
}
