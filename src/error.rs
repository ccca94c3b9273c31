//! Application-wide error types.
//!
//! This module provides a unified error hierarchy for the application.
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - Module-specific errors (e.g., [`crate::usdb::UsdbError`]) for
//!   detailed handling
//! - All errors implement `std::error::Error` for compatibility

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
///
/// Aggregates errors from all subsystems for unified handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Song database scrape/fetch error
    #[error("Song database error: {0}")]
    Usdb(#[from] crate::usdb::UsdbError),

    /// Session bootstrap or login error
    #[error("Authentication error: {0}")]
    Auth(#[from] crate::session::AuthError),

    /// Video search/download tool error
    #[error("Video error: {0}")]
    Video(#[from] crate::youtube::VideoError),

    /// Song folder materialization error
    #[error("Download error: {0}")]
    Download(#[from] crate::download::DownloadError),

    /// Download ledger error
    #[error("Ledger error: {0}")]
    Ledger(#[from] crate::download::LedgerError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, crate::download::LedgerError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Ledger(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_conversion() {
        fn returns_result() -> Result<()> {
            let failed: std::io::Result<()> = Err(std::io::Error::other("disk on fire"));
            failed?;
            Ok(())
        }

        let err = returns_result().unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_domain_error_converts() {
        fn returns_result() -> Result<()> {
            let failed: std::result::Result<(), crate::usdb::UsdbError> =
                Err(crate::usdb::UsdbError::MissingCookie);
            failed?;
            Ok(())
        }

        assert!(matches!(returns_result().unwrap_err(), Error::Usdb(_)));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::Usdb(crate::usdb::UsdbError::MissingCookie)
            .context("while logging in");
        let msg = err.to_string();
        assert!(msg.contains("while logging in"));
        assert!(matches!(err, Error::WithContext { .. }));
    }

    #[test]
    fn test_with_context_on_io_result() {
        let failed: std::io::Result<()> = Err(std::io::Error::other("disk on fire"));
        let err = failed.with_context("reading the ledger").unwrap_err();
        assert!(err.to_string().starts_with("reading the ledger"));
    }
}
