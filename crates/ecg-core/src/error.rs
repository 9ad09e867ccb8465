//! Error handling for the ECG acquisition framework
//!
//! The sampling pipeline itself never fails; these errors are raised at the
//! configuration boundary and by the foreground actions (export, display).

use core::fmt;

/// Result type alias for ECG framework operations
pub type EcgResult<T> = Result<T, EcgError>;

/// Error type for all ECG framework operations
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EcgError {
    /// Sample rate outside the accepted range
    InvalidSampleRate {
        /// Requested rate in Hz
        rate: u32,
        /// Lowest accepted rate in Hz
        min: u32,
        /// Highest accepted rate in Hz
        max: u32,
    },

    /// Invalid configuration value
    InvalidConfig {
        /// Description of the configuration error
        reason: String,
    },

    /// An operation needed acquired samples but none exist yet
    EmptyData {
        /// Operation that was requested
        operation: &'static str,
    },

    /// A long-running foreground loop was cancelled by the user
    Interrupted {
        /// Operation that was cancelled
        operation: &'static str,
    },

    /// File system error
    Io {
        /// I/O error description
        reason: String,
    },

    /// Serialization/deserialization error
    Serialization {
        /// Serialization error description
        reason: String,
    },
}

impl EcgError {
    /// Interruptions are an expected way back to idle, not a failure
    pub fn is_interruption(&self) -> bool {
        matches!(self, EcgError::Interrupted { .. })
    }
}

impl fmt::Display for EcgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcgError::InvalidSampleRate { rate, min, max } => {
                write!(f, "Sample rate out of range: {}Hz, valid range: {}-{} Hz",
                       rate, min, max)
            }
            EcgError::InvalidConfig { reason } => {
                write!(f, "Invalid configuration: {}", reason)
            }
            EcgError::EmptyData { operation } => {
                write!(f, "No data available for {}", operation)
            }
            EcgError::Interrupted { operation } => {
                write!(f, "{} interrupted by user", operation)
            }
            EcgError::Io { reason } => {
                write!(f, "I/O error: {}", reason)
            }
            EcgError::Serialization { reason } => {
                write!(f, "Serialization error: {}", reason)
            }
        }
    }
}

impl std::error::Error for EcgError {}

impl From<std::io::Error> for EcgError {
    fn from(err: std::io::Error) -> Self {
        EcgError::Io {
            reason: err.to_string(),
        }
    }
}

/// Convenience macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::error::EcgError::InvalidConfig {
            reason: format!($($arg)*)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = EcgError::InvalidSampleRate {
            rate: 600,
            min: 10,
            max: 500,
        };
        let display = format!("{}", error);
        assert!(display.contains("600"));
        assert!(display.contains("10-500"));
    }

    #[test]
    fn test_config_error_macro() {
        let error = config_error!("window size {} must be odd", 4);
        assert_eq!(
            error,
            EcgError::InvalidConfig {
                reason: "window size 4 must be odd".to_string()
            }
        );
    }

    #[test]
    fn test_interruption_is_not_failure() {
        assert!(EcgError::Interrupted { operation: "plotter" }.is_interruption());
        assert!(!EcgError::EmptyData { operation: "export" }.is_interruption());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: EcgError = io.into();
        assert!(matches!(error, EcgError::Io { .. }));
    }
}
