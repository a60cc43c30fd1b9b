use crate::format::SampleFormat;
use thiserror::Error;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for conversion operations
#[derive(Debug, Error)]
pub enum Error {
    /// The converter rejected a processing call. Carries the library's
    /// human-readable message; the cause (bad buffer sizes, unsupported
    /// ratio) is not transient, so these are never retried.
    #[error("sample rate conversion failed: {0}")]
    Engine(String),

    /// A runtime format tag was outside the recognized set.
    #[error("Invalid format combination")]
    InvalidFormatCombination,

    /// A raw byte buffer does not divide evenly into samples.
    #[error("byte buffer of {len} bytes is not a multiple of the {format:?} sample size")]
    InvalidByteLength { format: SampleFormat, len: usize },
}
