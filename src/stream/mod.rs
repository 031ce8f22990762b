//! Synthesized streaming: a completed reply is split into tokens and paced
//! out to a byte sink in the framing the client's shape expects.

mod frames;

pub use frames::{StreamPlan, StreamShape};

use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisOutcome {
    Completed { frames: usize },
    Cancelled { frames: usize },
}

impl SynthesisOutcome {
    pub fn frames(self) -> usize {
        match self {
            SynthesisOutcome::Completed { frames } | SynthesisOutcome::Cancelled { frames } => frames,
        }
    }
}

/// Splits on `delimiter`, re-attaching it to every token but the last, so the
/// tokens concatenate back to `text`.
pub fn split_tokens(text: &str, delimiter: &str) -> Vec<String> {
    if delimiter.is_empty() {
        return vec![text.to_string()];
    }
    let mut pieces = text.split(delimiter).peekable();
    let mut tokens = Vec::new();
    while let Some(piece) = pieces.next() {
        if pieces.peek().is_some() {
            tokens.push(format!("{piece}{delimiter}"));
        } else {
            tokens.push(piece.to_string());
        }
    }
    tokens
}

/// Writes `plan` to `sink`, flushing after every frame and sleeping `delay`
/// between token frames.
///
/// Cancellation is checked before each write and raced against each sleep;
/// once observed nothing more is written, the terminator included. A failed
/// write means the peer is gone and counts as cancellation.
pub async fn synthesize<W>(
    sink: &mut W,
    plan: &StreamPlan,
    delay: Duration,
    cancel: &CancellationToken,
) -> SynthesisOutcome
where
    W: AsyncWrite + Unpin,
{
    let mut frames = 0;

    for frame in &plan.head {
        if !write_frame(sink, frame, cancel).await {
            return SynthesisOutcome::Cancelled { frames };
        }
        frames += 1;
    }

    for (i, frame) in plan.tokens.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            if cancel.is_cancelled() {
                return SynthesisOutcome::Cancelled { frames };
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return SynthesisOutcome::Cancelled { frames },
                _ = tokio::time::sleep(delay) => {}
            }
        }
        if !write_frame(sink, frame, cancel).await {
            return SynthesisOutcome::Cancelled { frames };
        }
        frames += 1;
    }

    for frame in &plan.tail {
        if !write_frame(sink, frame, cancel).await {
            return SynthesisOutcome::Cancelled { frames };
        }
        frames += 1;
    }

    SynthesisOutcome::Completed { frames }
}

async fn write_frame<W>(sink: &mut W, frame: &str, cancel: &CancellationToken) -> bool
where
    W: AsyncWrite + Unpin,
{
    if cancel.is_cancelled() {
        return false;
    }
    let written = match sink.write_all(frame.as_bytes()).await {
        Ok(()) => sink.flush().await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        debug!(error = %e, "Stream sink closed, stopping synthesis");
        cancel.cancel();
        return false;
    }
    true
}
