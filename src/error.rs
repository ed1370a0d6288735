//! Error types shared by the decoders, the trace store and the transform pipeline.

use std::fmt;

/// Coarse failure category of a [`WaveformError`].
///
/// Every error variant maps onto one of these four kinds; callers that only
/// need to know whether a file was unreadable, malformed or misconfigured can
/// match on this instead of the full enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File missing or unreadable
    IoFailure,
    /// Unsupported bit width, header grammar, or missing sentinel
    UnsupportedFormat,
    /// Structural mismatch between header and payload
    DecodeError,
    /// Invalid transform parameter or configuration
    ConfigError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::IoFailure => "I/O failure",
            ErrorKind::UnsupportedFormat => "unsupported format",
            ErrorKind::DecodeError => "decode error",
            ErrorKind::ConfigError => "configuration error",
        };
        f.write_str(name)
    }
}

/// A channel of a capture group that failed to decode.
#[derive(Debug)]
pub struct ChannelFailure {
    /// Channel name the file was expected to provide
    pub channel: String,
    /// Why decoding failed
    pub error: WaveformError,
}

impl fmt::Display for ChannelFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.channel, self.error)
    }
}

/// Errors that can occur while decoding captures or deriving traces
#[derive(Debug, thiserror::Error)]
pub enum WaveformError {
    /// I/O error reading a capture or setup file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not follow a supported layout
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Header and payload disagree
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid transform parameter or pipeline option
    #[error("Configuration error: {0}")]
    Config(String),

    /// A trace does not match the length of the shared time axis
    #[error("Trace '{name}' has {actual} samples, time axis has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// A trace with this name already exists in the set
    #[error("Trace '{0}' already exists")]
    DuplicateTrace(String),

    /// No channel of a capture group could be decoded
    #[error("No channel of the capture group decoded ({} failures)", .failures.len())]
    EmptyGroup { failures: Vec<ChannelFailure> },

    /// Error parsing a TOML pipeline configuration
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Error writing CSV output
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error serializing JSON output
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WaveformError {
    /// Failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WaveformError::Io(_) | WaveformError::Csv(_) | WaveformError::Json(_) => {
                ErrorKind::IoFailure
            }
            WaveformError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            WaveformError::Decode(_)
            | WaveformError::LengthMismatch { .. }
            | WaveformError::EmptyGroup { .. } => ErrorKind::DecodeError,
            WaveformError::Config(_)
            | WaveformError::DuplicateTrace(_)
            | WaveformError::Toml(_) => ErrorKind::ConfigError,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, WaveformError>;
