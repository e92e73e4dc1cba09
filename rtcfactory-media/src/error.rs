//! Media error types and handling
//!
//! This module defines the error types used by codec selection and audio
//! processing, with a category classification for logging and recovery.

use crate::audio::plugin::PluginError;
use rtcfactory_core::{NativeHandle, RtcFactoryError};
use thiserror::Error;

/// Main error type for media operations
#[derive(Error, Debug)]
pub enum MediaError {
    /// Encoding operation failed
    #[error("Encoding failed: {codec} - {reason}")]
    EncodingFailed {
        /// Codec name
        codec: String,
        /// Failure reason
        reason: String,
    },

    /// Decoding operation failed
    #[error("Decoding failed: {codec} - {reason}")]
    DecodingFailed {
        /// Codec name
        codec: String,
        /// Failure reason
        reason: String,
    },

    /// Codec initialization failed
    #[error("Codec initialization failed: {codec} - {reason}")]
    CodecInitializationFailed {
        /// Codec name
        codec: String,
        /// Failure reason
        reason: String,
    },

    /// No backing factory could produce an encoder or decoder
    #[error("Codec not available: {codec}")]
    CodecUnavailable {
        /// Codec name
        codec: String,
    },

    /// A platform codec registry lookup failed
    #[error("Codec lookup failed at index {index}: {reason}")]
    CodecLookupFailed {
        /// Registry index
        index: usize,
        /// Failure reason
        reason: String,
    },

    /// Invalid frame data error
    #[error("Invalid frame data: expected {expected} bytes, got {actual}")]
    InvalidFrameData {
        /// Expected data size
        expected: usize,
        /// Actual data size
        actual: usize,
    },

    /// Invalid state for operation
    #[error("Invalid state: {message}")]
    InvalidState {
        /// State error message
        message: String,
    },

    /// External processor plugin failure
    #[error("Plugin error: {source}")]
    Plugin {
        /// Underlying plugin error
        #[from]
        source: PluginError,
    },

    /// Handle does not refer to a live native resource
    #[error("Unknown handle: {handle}")]
    UnknownHandle {
        /// Stale or foreign handle
        handle: NativeHandle,
    },

    /// Audio specific errors
    #[error("Audio error: {message}")]
    Audio {
        /// Error message
        message: String,
    },
}

/// Result type alias for media operations
pub type MediaResult<T> = Result<T, MediaError>;

impl MediaError {
    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            MediaError::DecodingFailed { .. } => true,
            MediaError::EncodingFailed { .. } => true,
            MediaError::CodecLookupFailed { .. } => true,
            MediaError::CodecInitializationFailed { .. } => false,
            MediaError::CodecUnavailable { .. } => false,
            MediaError::Plugin { .. } => false,
            MediaError::UnknownHandle { .. } => false,
            _ => false,
        }
    }

    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            MediaError::EncodingFailed { .. } => ErrorCategory::Codec,
            MediaError::DecodingFailed { .. } => ErrorCategory::Codec,
            MediaError::CodecInitializationFailed { .. } => ErrorCategory::Codec,
            MediaError::CodecUnavailable { .. } => ErrorCategory::Codec,
            MediaError::CodecLookupFailed { .. } => ErrorCategory::Platform,
            MediaError::InvalidFrameData { .. } => ErrorCategory::Data,
            MediaError::InvalidState { .. } => ErrorCategory::State,
            MediaError::Plugin { .. } => ErrorCategory::System,
            MediaError::UnknownHandle { .. } => ErrorCategory::State,
            MediaError::Audio { .. } => ErrorCategory::Audio,
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// System-level errors (library loading, symbols)
    System,
    /// Codec-related errors
    Codec,
    /// Platform codec registry errors
    Platform,
    /// Data validation errors
    Data,
    /// State management errors
    State,
    /// Audio-specific errors
    Audio,
}

impl From<MediaError> for RtcFactoryError {
    fn from(error: MediaError) -> Self {
        match error {
            MediaError::UnknownHandle { handle } => RtcFactoryError::UnknownHandle { handle },
            other => RtcFactoryError::NativeCall {
                operation: format!("{:?}", other.category()).to_lowercase(),
                reason: other.to_string(),
            },
        }
    }
}
