//! Structured debug logging setup

use crate::DiagnosticsError;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset and debug logging is on
pub const DEBUG_DIRECTIVES: &str = "rtcfactory=debug,rtcfactory_media=debug,rtcfactory_diagnostics=debug";
/// Filter used when `RUST_LOG` is unset and debug logging is off
pub const DEFAULT_DIRECTIVES: &str = "info";

/// Installs the global `tracing` subscriber
#[derive(Debug, Clone, Default)]
pub struct DebugLogger {
    debug: bool,
    file_info: bool,
}

impl DebugLogger {
    /// Logger with debug-level defaults when `debug` is set
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            file_info: false,
        }
    }

    /// Include file and line in each event
    pub fn with_file_info(mut self) -> Self {
        self.file_info = true;
        self
    }

    /// Default directives for this logger
    pub fn default_directives(&self) -> &'static str {
        if self.debug {
            DEBUG_DIRECTIVES
        } else {
            DEFAULT_DIRECTIVES
        }
    }

    /// `RUST_LOG` when set, otherwise the default directives
    pub fn filter(&self) -> Result<EnvFilter, DiagnosticsError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(self.default_directives()).map_err(|e| DiagnosticsError::Logging {
                reason: e.to_string(),
            }),
        }
    }

    /// Install the subscriber; returns `false` if one was already installed
    pub fn install(&self) -> Result<bool, DiagnosticsError> {
        let installed = tracing_subscriber::fmt()
            .with_env_filter(self.filter()?)
            .with_file(self.file_info)
            .with_line_number(self.file_info)
            .try_init()
            .is_ok();
        if installed {
            tracing::debug!(debug = self.debug, "Logging initialized");
        }
        Ok(installed)
    }

    /// Initialize logging; repeated calls are harmless
    pub fn init_logging(debug: bool) -> Result<(), DiagnosticsError> {
        Self::new(debug).install().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(DebugLogger::new(false).default_directives(), "info");
        assert!(DebugLogger::new(true)
            .default_directives()
            .contains("rtcfactory_media=debug"));
    }

    #[test]
    fn test_repeated_init_is_tolerated() {
        DebugLogger::init_logging(true).unwrap();
        DebugLogger::init_logging(false).unwrap();
        assert!(!DebugLogger::new(true).install().unwrap());
    }
}
