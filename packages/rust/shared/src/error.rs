//! Error types for SchoolPrompt.
//!
//! Library crates use [`SchoolPromptError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Prompt generation itself has no error path: lookups are total and the
//! assembler is infallible. Errors only arise at the edges (config, reference
//! data overlays, input validation, clipboard).

use std::path::PathBuf;

/// Top-level error type for all SchoolPrompt operations.
#[derive(Debug, thiserror::Error)]
pub enum SchoolPromptError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Malformed or inconsistent country reference data.
    #[error("reference data error: {message}")]
    Reference { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// User input rejected by form validation.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Both the clipboard and the manual-copy fallback failed.
    #[error("clipboard error: {0}")]
    Clipboard(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SchoolPromptError>;

impl SchoolPromptError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a reference data error from any displayable message.
    pub fn reference(msg: impl Into<String>) -> Self {
        Self::Reference {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SchoolPromptError::config("unknown key `purpos`");
        assert_eq!(err.to_string(), "config error: unknown key `purpos`");

        let err = SchoolPromptError::reference("missing \"Other\" record");
        assert!(err.to_string().starts_with("reference data error:"));

        let err = SchoolPromptError::validation("school name: 2+ characters required");
        assert!(err.to_string().contains("2+ characters"));
    }

    #[test]
    fn io_error_keeps_path() {
        let err = SchoolPromptError::io(
            "/tmp/overlay.toml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("overlay.toml"));
    }
}
