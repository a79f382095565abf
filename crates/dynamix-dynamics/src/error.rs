//! Error types for the dynamics engine.

use thiserror::Error;

/// Errors raised at the processing boundary.
///
/// These describe programmer errors in how buffers are handed over. The
/// sample loop itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Input channel count differs from the processor's or the output's.
    #[error("channel count mismatch: expected {expected}, got {actual}")]
    ChannelMismatch {
        /// Channels the processor was built for.
        expected: usize,
        /// Channels supplied.
        actual: usize,
    },

    /// A channel's input and output lengths differ, or channels differ in length.
    #[error("buffer length mismatch on channel {channel}: input {input}, output {output}")]
    LengthMismatch {
        /// Offending channel index.
        channel: usize,
        /// Input length.
        input: usize,
        /// Output length.
        output: usize,
    },

    /// The requested channel count cannot be processed.
    #[error("unsupported channel count {0} (supported: 1..={max})", max = crate::MAX_CHANNELS)]
    UnsupportedChannels(usize),
}

/// Failure to parse a flavour name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown flavor '{0}'")]
pub struct ParseFlavorError(pub String);

/// Failure to parse a parameter string ID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown parameter '{0}'")]
pub struct ParseParamError(pub String);
