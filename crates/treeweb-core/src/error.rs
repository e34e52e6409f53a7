use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MarkupError>;

/// Errors raised while building or rendering a markup tree.
///
/// Nothing is coerced or repaired: a malformed tree fails at the first
/// violation and no partial markup is returned.
#[derive(Debug, Error)]
pub enum MarkupError {
    /// Any shape mismatch: bad tag, bad attribute value, bad content element.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A style value that is neither a declaration map nor a raw string.
    #[error("cannot convert {0} to style string")]
    Style(String),

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MarkupError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}
