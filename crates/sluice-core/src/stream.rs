//! Streaming compression and decompression utilities.

/// Flush modes for streaming compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flush {
    /// No flush - buffer data for optimal compression.
    #[default]
    None,

    /// Block flush - complete the current block without byte alignment.
    Block,

    /// Partial flush - emit pending output behind an empty fixed block.
    Partial,

    /// Sync flush - emit all pending output on a byte boundary, keep history.
    /// Use for: periodic checkpoints, network packets.
    Sync,

    /// Full flush - as sync, and forget match history.
    /// Use for: seeking support, error recovery.
    Full,

    /// Finish - complete stream with trailer.
    /// Use for: end of stream.
    Finish,
}

impl Flush {
    /// Strength ordering used to detect repeated flushes that cannot
    /// make progress. `Block` sits between `None` and `Partial`.
    pub fn rank(self) -> u8 {
        match self {
            Flush::None => 0,
            Flush::Block => 1,
            Flush::Partial => 2,
            Flush::Sync => 4,
            Flush::Full => 6,
            Flush::Finish => 8,
        }
    }
}

/// Non-error result of a streaming call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// Progress was made; call again with more input or output space.
    #[default]
    Ok,
    /// The stream is complete and all output has been written.
    StreamEnd,
    /// A preset dictionary is required before decoding can continue.
    NeedDictionary,
    /// No progress was possible; supply more output space or input.
    BufError,
}

/// What a single streaming call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outcome {
    /// Bytes taken from the input slice.
    pub consumed: usize,
    /// Bytes written to the output slice.
    pub produced: usize,
    /// Resulting status.
    pub status: Status,
}

impl Outcome {
    /// Create a new outcome.
    pub fn new(consumed: usize, produced: usize, status: Status) -> Self {
        Self {
            consumed,
            produced,
            status,
        }
    }

    /// Whether the stream reported its end.
    pub fn is_stream_end(&self) -> bool {
        self.status == Status::StreamEnd
    }
}

/// Configuration for stream buffers.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Input chunk size fed per call (default: 64 KB).
    pub input_buffer_size: usize,

    /// Output chunk size offered per call (default: 64 KB).
    pub output_buffer_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            input_buffer_size: 65536,
            output_buffer_size: 65536,
        }
    }
}

impl StreamConfig {
    /// Set the input chunk size (at least 1 byte).
    pub fn with_input_buffer_size(mut self, size: usize) -> Self {
        self.input_buffer_size = size.max(1);
        self
    }

    /// Set the output chunk size (at least 1 byte).
    pub fn with_output_buffer_size(mut self, size: usize) -> Self {
        self.output_buffer_size = size.max(1);
        self
    }
}

/// Stream state for tracking progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    /// Stream not started.
    #[default]
    Initial,
    /// Stream in progress.
    Active,
    /// Final data accepted; remaining output may still be pending.
    Finishing,
    /// Stream finished successfully.
    Finished,
    /// Stream encountered error.
    Error,
    /// Buffers released by `end`.
    Ended,
}

impl StreamState {
    /// Check if stream is in a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            StreamState::Finished | StreamState::Error | StreamState::Ended
        )
    }

    /// Check if stream can accept more input.
    pub fn can_write(self) -> bool {
        matches!(self, StreamState::Initial | StreamState::Active)
    }

    /// Short name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            StreamState::Initial => "initial",
            StreamState::Active => "active",
            StreamState::Finishing => "finishing",
            StreamState::Finished => "finished",
            StreamState::Error => "error",
            StreamState::Ended => "ended",
        }
    }
}
