//! Error types shared by the manifest codec and every playlist transformation.

use thiserror::Error;

/// Result type for manifest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for manifest parsing and manipulation.
///
/// Every failure is synchronous and carries a human readable message. No
/// operation retries internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The text is not a well-formed playlist document.
    #[error("Malformed manifest at line {line}: {reason}")]
    MalformedManifest { line: usize, reason: String },

    /// Empty input where a document was required.
    #[error("Empty input: expected a manifest document")]
    EmptyInput,

    /// The playlist is of the wrong kind for the requested operation.
    #[error("Invalid playlist: {0}")]
    InvalidPlaylist(String),

    /// A filter or splice parameter could not be understood.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The clip request string is malformed or describes an empty window.
    #[error("Invalid clip info: {0}")]
    InvalidClipInfo(String),

    /// The clipping method is not one of the supported methods.
    #[error("Unsupported clipping method: {0}")]
    UnsupportedClippingMethod(String),
}

impl Error {
    /// Create a malformed manifest error for a 1-based line number.
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedManifest {
            line,
            reason: reason.into(),
        }
    }

    pub fn invalid_playlist(msg: impl Into<String>) -> Self {
        Self::InvalidPlaylist(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invalid_clip_info(msg: impl Into<String>) -> Self {
        Self::InvalidClipInfo(msg.into())
    }
}
