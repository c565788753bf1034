use core::fmt;
use std::io;

use thiserror::Error;

/// The category of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    /// The byte source failed. Distinct from end-of-input: a source that has
    /// no more bytes reports EOF, not an error.
    #[error("i/o error")]
    Io,
    /// A byte that does not fit the JSON grammar at the current position.
    #[error("unexpected input")]
    UnexpectedInput,
    /// The input ended inside an unfinished value or container.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// A single string or number lexeme grew past the configured
    /// `max_value_length`.
    #[error("value too long")]
    ValueTooLong,
    /// A string lexeme did not decode as UTF-8.
    #[error("invalid utf-8")]
    InvalidUtf8,
    /// A byte below 0x20 appeared unescaped inside a string.
    #[error("unescaped control character")]
    UnescapedControlCharacter,
    /// A malformed escape: unknown escape character, bad hex digit, or an
    /// invalid surrogate pairing in `\uXXXX` sequences.
    #[error("invalid escape sequence")]
    InvalidEscapeSequence,
    /// Internal invariant failure. Never produced by malformed input alone.
    #[error("unexpected internal error")]
    Unexpected,
}

/// Error produced by [`PullParser::read`](crate::PullParser::read).
///
/// Carries the failure category, the 1-based line where it was detected, and
/// a short snippet of the input that follows the failure point. After the
/// first error the parser is poisoned: subsequent `read` calls report
/// end-of-input.
#[derive(Debug)]
pub struct ParseError {
    kind: ErrorKind,
    line: usize,
    context: Option<String>,
    source: Option<io::Error>,
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind, line: usize, context: Option<String>) -> Self {
        Self {
            kind,
            line,
            context,
            source: None,
        }
    }

    pub(crate) fn io(source: io::Error, line: usize) -> Self {
        Self {
            kind: ErrorKind::Io,
            line,
            context: None,
            source: Some(source),
        }
    }

    /// The failure category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// 1-based line on which the failure was detected.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Up to 20 bytes of the input following the failure point, when any
    /// remain.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}", self.kind, self.line)?;
        if let Some(snippet) = &self.context {
            write!(f, " near {snippet:?}")?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_line_and_snippet() {
        let err = ParseError::new(ErrorKind::UnexpectedInput, 3, Some("x}".into()));
        assert_eq!(err.to_string(), "unexpected input at line 3 near \"x}\"");
    }

    #[test]
    fn io_errors_chain_their_source() {
        let inner = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let err = ParseError::io(inner, 1);
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "i/o error at line 1: pipe closed");
    }
}
