//! Error types for rtcfactory

use crate::handle::NativeHandle;
use thiserror::Error;

/// Main error type for factory operations
#[derive(Error, Debug)]
pub enum RtcFactoryError {
    /// A required construction argument was missing or empty
    #[error("Invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        /// Name of the rejected argument
        argument: String,
        /// Why it was rejected
        reason: String,
    },

    /// A call across the native boundary failed
    #[error("Native call {operation} failed: {reason}")]
    NativeCall {
        /// Native operation name
        operation: String,
        /// Reason for the failure
        reason: String,
    },

    /// The native side has no resource for this handle
    #[error("Unknown native handle: {handle}")]
    UnknownHandle {
        /// Handle that did not resolve
        handle: NativeHandle,
    },

    /// Configuration could not be loaded or applied
    #[error("Configuration error: {reason}")]
    Configuration {
        /// Reason for configuration failure
        reason: String,
    },

    /// Initialization error
    #[error("Initialization failed: {reason}")]
    Initialization {
        /// Reason for initialization failure
        reason: String,
    },
}

/// Result alias for factory operations
pub type FactoryResult<T> = Result<T, RtcFactoryError>;

impl RtcFactoryError {
    /// Shorthand for an [`RtcFactoryError::InvalidArgument`]
    pub fn invalid_argument(argument: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.to_string(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`RtcFactoryError::NativeCall`]
    pub fn native_call(operation: &str, reason: impl Into<String>) -> Self {
        Self::NativeCall {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error was raised at construction time for bad input
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let error = RtcFactoryError::invalid_argument("libname", "must not be empty");
        assert_eq!(
            error.to_string(),
            "Invalid argument `libname`: must not be empty"
        );
        assert!(error.is_invalid_argument());
    }

    #[test]
    fn test_unknown_handle_display() {
        let handle = NativeHandle::from_raw(42).unwrap();
        let error = RtcFactoryError::UnknownHandle { handle };
        assert_eq!(error.to_string(), "Unknown native handle: 0x2a");
        assert!(!error.is_invalid_argument());
    }
}
