use std::collections::TryReserveError;

use crate::format::Encoding;

/// Errors raised by encoders, decoders and the compression adapter.
///
/// Every variant is fatal for the stream it was raised on: nothing in this
/// crate retries or skips past a failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A read ran past the end of the available bytes.
    #[error("unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// A varint kept its continuation bit past the width of its type.
    #[error("varint does not terminate within {bits} bits")]
    VarintOverflow { bits: u32 },

    /// The stream is structurally invalid.
    #[error("malformed stream: {0}")]
    Malformed(&'static str),

    /// `encode` was called on a finished encoder that was not reset.
    #[error("encode called after finish without reset")]
    EncodeAfterFinish,

    /// A fixed-length encoder received a value of a different length.
    #[error("fixed-length value mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The encoding exists but not for this value type.
    #[error("encoding {encoding} is not supported for {value_type} values")]
    UnsupportedEncoding {
        encoding: Encoding,
        value_type: &'static str,
    },

    /// The encoding id is not known.
    #[error("unknown encoding id {0}")]
    UnknownEncoding(u8),

    /// Growing a buffer failed.
    #[error("buffer allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// Decompressed output does not have the declared size.
    #[error("decompressed {actual} bytes but {expected} were declared")]
    SizeMismatch { expected: usize, actual: usize },

    /// Compressed page does not match its recorded checksum.
    #[error("page checksum mismatch: expected {expected:016x}, got {actual:016x}")]
    ChecksumMismatch { expected: u64, actual: u64 },

    /// The plugged-in compressor failed.
    #[error("compressor error: {0}")]
    Codec(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
