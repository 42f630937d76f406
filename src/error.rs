use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// The process has no usable terminal (for example it runs under a
    /// service manager without a console). Retrying will not help.
    Environment,

    /// Querying or changing the terminal's input mode failed.
    Device,

    /// Reading from or writing to the terminal failed, or input ended early.
    Stream,

    /// The user provided input that cannot be accepted, such as a
    /// confirmation that does not match. Callers may choose to prompt again.
    User,

    /// Any failure that cannot be confidently attributed to another category.
    Internal,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// No controlling terminal, or it could not be opened for read+write.
    DeviceUnavailable,
    /// The current terminal mode could not be read.
    ModeQueryFailed,
    /// The silent (no echo) mode could not be applied.
    ModeSetFailed,
    /// The underlying terminal read failed.
    ReadFailed,
    /// The terminal reported end-of-stream before any byte was captured.
    EndOfInput,
    /// A retyped line differs from the first capture.
    Mismatch,
    /// The captured line is not valid UTF-8.
    InvalidUtf8,
    /// Writing a prompt, or reading a non-terminal source, failed.
    Io,
}

impl ErrorKind {
    /// The category every error of this kind belongs to.
    pub fn category(self) -> ErrorCategory {
        match self {
            ErrorKind::DeviceUnavailable => ErrorCategory::Environment,
            ErrorKind::ModeQueryFailed | ErrorKind::ModeSetFailed => ErrorCategory::Device,
            ErrorKind::ReadFailed | ErrorKind::EndOfInput | ErrorKind::Io => ErrorCategory::Stream,
            ErrorKind::Mismatch | ErrorKind::InvalidUtf8 => ErrorCategory::User,
        }
    }
}

/// Error returned by every fallible operation in this crate.
///
/// Messages name the failing stage only. Captured secret bytes are never
/// part of the message or of the source chain.
#[derive(Debug, Error)]
#[error("{msg}")]
pub struct TtypassError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Specific condition tag.
    pub kind: ErrorKind,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl TtypassError {
    /// Creates a new error tagged with a kind; the category follows from the kind.
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category: kind.category(),
            kind,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that retains the originating source error.
    pub fn with_source(
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category: kind.category(),
            kind,
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// True when the user mistyped the confirmation.
    pub fn is_mismatch(&self) -> bool {
        self.kind == ErrorKind::Mismatch
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TtypassError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_category_follows_kind() {
        let err = TtypassError::new(ErrorKind::Mismatch, "answers did not match");
        assert_eq!(err.category, ErrorCategory::User);
        assert!(err.is_mismatch());

        let err = TtypassError::new(ErrorKind::DeviceUnavailable, "no terminal");
        assert_eq!(err.category, ErrorCategory::Environment);
        assert!(!err.is_mismatch());
    }

    #[test]
    fn test_with_context_preserves_kind_and_source() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let err = TtypassError::with_source(ErrorKind::ReadFailed, "failed to read terminal", io_err)
            .with_context("reading password");

        assert_eq!(err.kind, ErrorKind::ReadFailed);
        assert_eq!(err.category, ErrorCategory::Stream);
        assert_eq!(err.message(), "reading password");

        let inner = err.source_error().unwrap();
        assert_eq!(inner.to_string(), "failed to read terminal");
        assert_eq!(inner.source().unwrap().to_string(), "pipe closed");
    }
}
