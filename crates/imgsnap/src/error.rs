use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can stop a comparison from reaching a verdict.
///
/// A visual mismatch is not in here: it is a normal
/// [`Outcome::Fail`](crate::Outcome::Fail).
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {what} image: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("dimension mismatch: {left_w}x{left_h} vs {right_w}x{right_h}")]
    DimensionMismatch {
        left_w: u32,
        left_h: u32,
        right_w: u32,
        right_h: u32,
    },

    #[error("screenshot is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid snapshot identifier {0:?}: must be non-empty and contain no path separators")]
    InvalidIdentifier(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("comparison task panicked: {0}")]
    TaskPanicked(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
