//! Crate error type.
//!
//! Only configuration and input failures abort a run. Repository errors
//! are produced by the tier-3 client and absorbed by the progress tracker,
//! which degrades the affected project's tier-3 result to unavailable.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RoadmapError>;

/// Errors raised by the roadmap engine.
#[derive(Debug, Error)]
pub enum RoadmapError {
    /// Configuration is missing a required value or is internally inconsistent.
    #[error("config error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input document could not be decoded.
    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    /// The repository-hosting API rejected or failed a request.
    #[error("repository error for {repository}: {message}")]
    Repository { repository: String, message: String },

    /// A repository fetch exceeded its time budget.
    #[error("repository fetch for {repository} timed out after {seconds}s")]
    Timeout { repository: String, seconds: u64 },
}

impl RoadmapError {
    /// Creates a configuration error without a source.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a configuration error wrapping an underlying cause.
    pub fn config_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a parse error.
    pub fn parse(what: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            what: what.into(),
            message: message.to_string(),
        }
    }

    /// Creates a repository error.
    pub fn repository(repository: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Repository {
            repository: repository.into(),
            message: message.into(),
        }
    }

    /// Whether the pipeline must abort on this error.
    ///
    /// Repository failures and timeouts only disable tier 3 for one project.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Io { .. } | Self::Parse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(RoadmapError::config("bad").is_fatal());
        assert!(RoadmapError::parse("projects", "eof").is_fatal());
        assert!(!RoadmapError::repository("o/r", "404").is_fatal());
        assert!(!RoadmapError::Timeout {
            repository: "o/r".into(),
            seconds: 5
        }
        .is_fatal());
    }

    #[test]
    fn test_display() {
        let err = RoadmapError::repository("acme/api", "HTTP 403");
        assert_eq!(err.to_string(), "repository error for acme/api: HTTP 403");
    }
}
