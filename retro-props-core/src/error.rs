use thiserror::Error;

/// POSIX `EIO`: structural read or seek failure.
pub const EIO: i32 = 5;

/// POSIX `EBADF`: the stream was never opened (or has been closed).
pub const EBADF: i32 = 9;

/// Errors that can occur during ROM and disc image analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// I/O error while reading the image
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing stream is not open
    #[error("Stream is not open")]
    NotOpen,

    /// The format is not recognized or is invalid
    #[error("Invalid ROM format: {0}")]
    InvalidFormat(String),

    /// A header is corrupted or incomplete
    #[error("Corrupted header: {0}")]
    CorruptedHeader(String),

    /// The image is too small to contain valid data
    #[error("ROM too small: expected at least {expected} bytes, got {actual}")]
    TooSmall { expected: u64, actual: u64 },

    /// Unsupported variant or version
    #[error("Unsupported variant: {0}")]
    UnsupportedVariant(String),

    /// Generic analysis error with message
    #[error("{0}")]
    Other(String),
}

impl AnalysisError {
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    pub fn corrupted_header(msg: impl Into<String>) -> Self {
        Self::CorruptedHeader(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedVariant(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Negative POSIX error code reported to callers that only understand
    /// status integers.
    ///
    /// `-EBADF` if the stream was never opened, `-EIO` for everything else.
    pub fn errno(&self) -> i32 {
        match self {
            Self::NotOpen => -EBADF,
            _ => -EIO,
        }
    }
}
