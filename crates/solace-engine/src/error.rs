//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and shutdown.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: solace_core::ConfigError,
    },

    /// Saving or loading the simulation failed.
    #[error("persistence error: {source}")]
    Persist {
        /// The underlying persistence error.
        #[from]
        source: solace_core::PersistError,
    },
}
