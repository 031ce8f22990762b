use crate::error::{GatewayError, UpstreamFailure};
use crate::providers::geminiweb::Reply;
use crate::server::router::GatewayState;
use crate::stream::{StreamPlan, StreamShape, SynthesisOutcome, split_tokens, synthesize};
use axum::{
    body::Body,
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_stream::StreamExt;
use tokio_util::{io::ReaderStream, sync::CancellationToken};
use tracing::{debug, warn};

/// Pipe capacity between the synthesizer and the response body.
const STREAM_PIPE_BYTES: usize = 16 * 1024;

/// Streams `reply` back in the framing of `shape`.
///
/// The synthesizer runs in its own task writing into a pipe whose read half
/// is the response body. Dropping the body cancels the synthesizer, and so
/// does reaching `deadline`.
pub fn stream_response(
    state: &GatewayState,
    shape: StreamShape,
    reply: &Reply,
    deadline: Instant,
) -> Result<Response, GatewayError> {
    let tokens = split_tokens(&reply.text, &state.stream.split_delimiter);
    let plan = shape
        .plan(&tokens)
        .map_err(|e| UpstreamFailure::parse(format!("encode stream frames: {e}")))?;
    let (body, _synthesis) = spawn_synthesis(plan, state.stream.chunk_delay(), deadline);

    Ok((
        [
            (CONTENT_TYPE, shape.content_type()),
            (CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response())
}

/// Spawns the synthesizer and returns the body reading from it. The handle
/// yields `None` when `deadline` cut synthesis short.
fn spawn_synthesis(
    plan: StreamPlan,
    delay: Duration,
    deadline: Instant,
) -> (Body, JoinHandle<Option<SynthesisOutcome>>) {
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();
    let (mut writer, reader) = tokio::io::duplex(STREAM_PIPE_BYTES);

    let handle = tokio::spawn(async move {
        let run = synthesize(&mut writer, &plan, delay, &task_cancel);
        match tokio::time::timeout_at(deadline, run).await {
            Ok(outcome) => {
                debug!(?outcome, "Stream synthesis finished");
                Some(outcome)
            }
            Err(_) => {
                task_cancel.cancel();
                warn!("Stream deadline reached, closing without terminator");
                None
            }
        }
    });

    // The guard lives as long as the body; dropping it cancels the synthesizer.
    let guard = cancel.drop_guard();
    let stream = ReaderStream::new(reader).map(move |chunk| {
        let _alive = &guard;
        chunk
    });
    (Body::from_stream(stream), handle)
}
