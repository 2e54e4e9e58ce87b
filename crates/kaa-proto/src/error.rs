//! Error types for message parsing.

use thiserror::Error;

/// Convenience type alias for parse results.
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// A raw line that could not be turned into a [`Message`](crate::Message).
///
/// Parse failures are local to one line: callers log them and move on to the
/// next line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The line was empty or contained only whitespace.
    #[error("empty message")]
    EmptyMessage,

    /// The line had a prefix (or only a trailing parameter) but no command.
    #[error("no command in message: {line:?}")]
    MissingCommand {
        /// The offending line.
        line: String,
    },
}
