use std::path::PathBuf;
use thiserror::Error;

use crate::subprocess::ProcessError;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

/// Message shown when the Java probe fails
pub const JAVA_REQUIRED_MESSAGE: &str = "Java is required to run JasperReports.\n\
     Please install Java (JRE or JDK) and make sure `java` is in your PATH.";

/// The error type for every fallible report operation
#[derive(Error, Debug)]
pub enum JasperError {
    #[error("[E{code:04}] {message}")]
    RuntimeUnavailable {
        code: u16,
        message: String,
        #[source]
        source: Option<ProcessError>,
    },

    #[error("[E{code:04}] Execution failed: {message}")]
    ExecutionFailed {
        code: u16,
        message: String,
        command: Option<String>,
        exit_code: Option<i32>,
        #[source]
        source: Option<ProcessError>,
    },

    #[error("[E{code:04}] Invalid input: {message}")]
    InvalidInput {
        code: u16,
        message: String,
        path: Option<PathBuf>,
    },

    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl JasperError {
    /// Create the Java-missing error, keeping the probe failure as source
    pub fn runtime_unavailable(source: Option<ProcessError>) -> Self {
        Self::RuntimeUnavailable {
            code: ErrorCode::RUNTIME_UNAVAILABLE,
            message: JAVA_REQUIRED_MESSAGE.to_string(),
            source,
        }
    }

    /// Create an execution error from a command that reported failure
    pub fn execution_failed(
        code: u16,
        message: impl Into<String>,
        command: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::ExecutionFailed {
            code,
            message: message.into(),
            command: Some(command.into()),
            exit_code,
            source: None,
        }
    }

    /// Create an execution error from a command that could not be run at all
    pub fn execution_spawn_failed(code: u16, command: impl Into<String>, source: ProcessError) -> Self {
        Self::ExecutionFailed {
            code,
            message: source.to_string(),
            command: Some(command.into()),
            exit_code: None,
            source: Some(source),
        }
    }

    /// Create an error for a path that is not valid UTF-8
    pub fn non_utf8_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::InvalidInput {
            code: ErrorCode::INPUT_NOT_UTF8,
            message: format!("path is not valid UTF-8: {}", path.display()),
            path: Some(path),
        }
    }

    /// Reject a compile source that is not a `.jrxml` template
    pub fn not_a_template(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::InvalidInput {
            code: ErrorCode::INPUT_NOT_TEMPLATE,
            message: format!("not a report template (expected .jrxml): {}", path.display()),
            path: Some(path),
        }
    }

    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCode::CONFIG_GENERIC,
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Create a configuration error for a file that failed to load
    pub fn config_file(
        code: u16,
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        let path = path.into();
        Self::Config {
            code,
            message: format!("{}: {}", path.display(), source),
            path: Some(path),
            source: Some(Box::new(source)),
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::RuntimeUnavailable { code, .. }
            | Self::ExecutionFailed { code, .. }
            | Self::InvalidInput { code, .. }
            | Self::Config { code, .. } => *code,
        }
    }

    /// Get the diagnostic text carried by the error
    pub fn message(&self) -> &str {
        match self {
            Self::RuntimeUnavailable { message, .. }
            | Self::ExecutionFailed { message, .. }
            | Self::InvalidInput { message, .. }
            | Self::Config { message, .. } => message,
        }
    }

    pub fn is_runtime_unavailable(&self) -> bool {
        matches!(self, Self::RuntimeUnavailable { .. })
    }

    pub fn is_execution_failed(&self) -> bool {
        matches!(self, Self::ExecutionFailed { .. })
    }
}

/// Type alias for Results using JasperError
pub type Result<T> = std::result::Result<T, JasperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_unavailable_display() {
        let err = JasperError::runtime_unavailable(None);
        let text = err.to_string();
        assert!(text.starts_with("[E1001] Java is required"));
        assert!(text.contains("make sure `java` is in your PATH"));
        assert!(err.is_runtime_unavailable());
    }

    #[test]
    fn test_execution_failed_keeps_diagnostic_verbatim() {
        let err = JasperError::execution_failed(
            ErrorCode::EXEC_PROCESS_FAILED,
            "Error: report not found\n",
            "\"jasper\" process \"a.jasper\"",
            Some(2),
        );
        assert_eq!(err.message(), "Error: report not found\n");
        assert_eq!(err.code(), 2001);
        match err {
            JasperError::ExecutionFailed { exit_code, command, .. } => {
                assert_eq!(exit_code, Some(2));
                assert_eq!(command.as_deref(), Some("\"jasper\" process \"a.jasper\""));
            }
            other => panic!("Expected ExecutionFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_spawn_failure_keeps_source() {
        use std::error::Error as _;

        let err = JasperError::execution_spawn_failed(
            ErrorCode::EXEC_COMPILE_FAILED,
            "jasper compile",
            ProcessError::CommandNotFound("jasper".to_string()),
        );
        assert!(err.is_execution_failed());
        assert!(err.source().is_some());
        assert_eq!(err.message(), "Command not found: jasper");
    }

    #[test]
    fn test_describe_error_code() {
        assert_eq!(describe_error_code(1001), "Java runtime not available");
        assert_eq!(
            describe_error_code(ErrorCode::INPUT_NOT_TEMPLATE),
            "Path is not a report template"
        );
        assert_eq!(describe_error_code(9999), "Unknown error");
    }
}
