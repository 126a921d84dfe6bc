//! Top-level failures of a pipeline run.

use thiserror::Error;

use crate::lane::LaneStep;

/// Failure that ends (or, for lenient stages, is logged by) a pipeline run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// The run configuration is incomplete or malformed.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// The change-status report was not valid structured data.
    #[error("could not parse component status: {message}")]
    StatusParse {
        /// Parser detail.
        message: String,
    },

    /// The installed build tool is older than the required floor or its
    /// version could not be read.
    #[error("build tool version {found} is not supported (requires {required} or newer)")]
    UnsupportedToolVersion {
        /// Version reported by the tool, or its raw output when unreadable.
        found: String,
        /// Minimum supported version.
        required: String,
    },

    /// The registry scope could not be resolved with the configured token.
    #[error("scope {scope} is unavailable: it does not exist or the token cannot access it")]
    ScopeUnavailable {
        /// Qualified scope id.
        scope: String,
    },

    /// A build tool command outside the lane lifecycle failed.
    #[error("{operation} failed: {message}")]
    Tool {
        /// Operation being performed.
        operation: String,
        /// Tool failure detail.
        message: String,
    },

    /// A lane lifecycle step failed.
    #[error("lane {step} failed: {message}")]
    LaneOperation {
        /// Step that failed.
        step: LaneStep,
        /// Failure detail.
        message: String,
    },

    /// Label reconciliation could not read or write labels.
    #[error("label reconciliation failed: {message}")]
    LabelOperation {
        /// Failure detail.
        message: String,
    },

    /// The status comment could not be listed, created or updated.
    #[error("status comment could not be published: {message}")]
    CommentOperation {
        /// Failure detail.
        message: String,
    },

    /// Writing program output failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error message.
        message: String,
    },
}
