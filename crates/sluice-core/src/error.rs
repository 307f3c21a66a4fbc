//! Error types for compression operations.

use thiserror::Error;

/// Result type alias for compression operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Malformed compressed data.
///
/// Each variant is a distinct signal so callers can react to the exact
/// failure; the display strings are the conventional zlib diagnostics.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataError {
    /// Header names a compression method other than DEFLATE.
    #[error("unknown compression method")]
    UnknownMethod,

    /// Header window size exceeds the configured window.
    #[error("invalid window size")]
    InvalidWindowSize,

    /// `(CMF << 8 | FLG)` is not a multiple of 31.
    #[error("incorrect header check")]
    IncorrectHeaderCheck,

    /// Supplied preset dictionary does not match the stream's DICTID.
    #[error("incorrect dictionary")]
    IncorrectDictionary,

    /// Reserved block type 3.
    #[error("invalid block type")]
    InvalidBlockType,

    /// Stored block LEN is not the ones-complement of NLEN.
    #[error("invalid stored block lengths")]
    InvalidStoredLengths,

    /// HLIT or HDIST beyond the alphabet size.
    #[error("too many length or distance symbols")]
    TooManySymbols,

    /// Bit-length alphabet is over-subscribed or incomplete.
    #[error("invalid code lengths set")]
    InvalidCodeLengthsSet,

    /// Repeat code with nothing to repeat, or running past the symbol count.
    #[error("invalid bit length repeat")]
    InvalidBitLengthRepeat,

    /// Literal/length alphabet has no end-of-block code.
    #[error("invalid code -- missing end-of-block")]
    MissingEndOfBlock,

    /// Literal/length alphabet is over-subscribed or incomplete.
    #[error("invalid literal/lengths set")]
    InvalidLiteralLengthsSet,

    /// Distance alphabet is over-subscribed or incomplete.
    #[error("invalid distances set")]
    InvalidDistancesSet,

    /// Input bits do not form a literal/length code.
    #[error("invalid literal/length code")]
    InvalidLiteralLengthCode,

    /// Input bits do not form a distance code.
    #[error("invalid distance code")]
    InvalidDistanceCode,

    /// Back-reference reaches before the start of the output.
    #[error("invalid distance too far back")]
    DistanceTooFarBack,

    /// Adler-32 trailer does not match the decompressed data.
    #[error("incorrect data check")]
    IncorrectDataCheck,
}

/// Compression error types.
#[derive(Debug, Error)]
pub enum Error {
    /// Input data is corrupted or invalid.
    #[error("corrupted data: {0}")]
    Data(#[from] DataError),

    /// API misuse: the stream cannot accept this call.
    #[error("stream error: {message}")]
    Stream { message: String },

    /// Buffer too small for output.
    #[error("buffer too small: need {required} bytes, got {provided}")]
    BufferTooSmall { required: usize, provided: usize },

    /// Invalid compression level specified.
    #[error("invalid compression level {level}: must be in range [{min}, {max}]")]
    InvalidLevel { level: i32, min: i32, max: i32 },

    /// A configuration parameter is out of range.
    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: i64 },

    /// Dictionary not found or invalid.
    #[error("invalid dictionary: {0}")]
    InvalidDictionary(String),

    /// Unexpected end of input stream.
    #[error("unexpected EOF after {bytes_read} bytes")]
    UnexpectedEof { bytes_read: usize },

    /// I/O error from underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stream state error.
    #[error("invalid state: expected {expected}, got {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },
}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Misuse of the API or invalid parameters. Fatal to the instance.
    Stream,
    /// Corrupt or inconsistent compressed data. Fatal to the instance.
    Data,
    /// Not enough buffer space or input. Retry with more.
    Buffer,
    /// Failure reported by the surrounding I/O layer.
    Io,
}

impl Error {
    /// Create a stream (API misuse) error.
    pub fn stream(message: impl Into<String>) -> Self {
        Error::Stream {
            message: message.into(),
        }
    }

    /// Create a buffer too small error.
    pub fn buffer_too_small(required: usize, provided: usize) -> Self {
        Error::BufferTooSmall { required, provided }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(bytes_read: usize) -> Self {
        Error::UnexpectedEof { bytes_read }
    }

    /// Create an I/O error with a custom message.
    pub fn io(message: impl Into<String>) -> Self {
        Error::Io(std::io::Error::other(message.into()))
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(name: &'static str, value: impl Into<i64>) -> Self {
        Error::InvalidParameter {
            name,
            value: value.into(),
        }
    }

    /// The data error carried by this error, if any.
    pub fn data_error(&self) -> Option<DataError> {
        match self {
            Error::Data(e) => Some(*e),
            _ => None,
        }
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Data(_) => ErrorKind::Data,
            Error::BufferTooSmall { .. } | Error::UnexpectedEof { .. } => ErrorKind::Buffer,
            Error::Io(_) => ErrorKind::Io,
            Error::Stream { .. }
            | Error::InvalidLevel { .. }
            | Error::InvalidParameter { .. }
            | Error::InvalidDictionary(_)
            | Error::InvalidState { .. } => ErrorKind::Stream,
        }
    }

    /// Check if error is recoverable (can retry with different parameters).
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::Buffer
    }

    /// Get error category for metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Data(_) => "corrupted_data",
            Error::Stream { .. } => "stream_error",
            Error::BufferTooSmall { .. } => "buffer_too_small",
            Error::InvalidLevel { .. } => "invalid_level",
            Error::InvalidParameter { .. } => "invalid_parameter",
            Error::InvalidDictionary(_) => "invalid_dictionary",
            Error::UnexpectedEof { .. } => "unexpected_eof",
            Error::Io(_) => "io_error",
            Error::InvalidState { .. } => "invalid_state",
        }
    }
}
