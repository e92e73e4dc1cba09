//! # rtcfactory Diagnostics
//!
//! Logging initialisation and codec reports for rtcfactory.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod codec_report;
pub mod debug_logger;

use thiserror::Error;

// Re-export main types
pub use codec_report::CodecReport;
pub use debug_logger::DebugLogger;

/// Diagnostics errors
#[derive(Error, Debug)]
pub enum DiagnosticsError {
    /// Logging could not be configured
    #[error("Logging setup failed: {reason}")]
    Logging {
        /// Failure reason
        reason: String,
    },

    /// Report serialization failed
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
