use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pacing of synthesized streams.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamConfig {
    /// Pause between emitted chunks.
    /// TOML: `stream.chunk_delay_ms`. Default: `30`.
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,

    /// Token boundary for chunking the reply text.
    /// TOML: `stream.split_delimiter`. Default: `" "`.
    #[serde(default = "default_split_delimiter")]
    pub split_delimiter: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_delay_ms: default_chunk_delay_ms(),
            split_delimiter: default_split_delimiter(),
        }
    }
}

impl StreamConfig {
    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }
}

fn default_chunk_delay_ms() -> u64 {
    30
}

fn default_split_delimiter() -> String {
    " ".to_string()
}
