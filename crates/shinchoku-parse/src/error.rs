use thiserror::Error;

/// Why a path could not be turned into a [`crate::ParsedFilename`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no usable title in \"{0}\" or its parent folders")]
    NoTitle(String),

    #[error("\"{0}\" is a placeholder name, a media title is required")]
    Placeholder(String),

    #[error("\"{0}\" looks like a stream URL, a media title is required")]
    StreamWithoutTitle(String),

    #[error("empty path")]
    Empty,
}
