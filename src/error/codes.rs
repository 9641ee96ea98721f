/// Error code registry
///
/// Error codes are organized by category:
/// - 1000-1999: Runtime (Java) errors
/// - 2000-2999: Execution errors
/// - 3000-3999: Input errors
/// - 4000-4999: Configuration errors
pub struct ErrorCode;

impl ErrorCode {
    // Runtime errors (1000-1999)
    pub const RUNTIME_UNAVAILABLE: u16 = 1001;

    // Execution errors (2000-2999)
    pub const EXEC_PROCESS_FAILED: u16 = 2001;
    pub const EXEC_COMPILE_FAILED: u16 = 2002;

    // Input errors (3000-3999)
    pub const INPUT_NOT_UTF8: u16 = 3001;
    pub const INPUT_NOT_TEMPLATE: u16 = 3002;

    // Configuration errors (4000-4999)
    pub const CONFIG_GENERIC: u16 = 4001;
    pub const CONFIG_PARSE_ERROR: u16 = 4002;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::RUNTIME_UNAVAILABLE => "Java runtime not available",
        ErrorCode::EXEC_PROCESS_FAILED => "Report process step failed",
        ErrorCode::EXEC_COMPILE_FAILED => "Report template compilation failed",
        ErrorCode::INPUT_NOT_UTF8 => "Value cannot be represented as text",
        ErrorCode::INPUT_NOT_TEMPLATE => "Path is not a report template",
        ErrorCode::CONFIG_GENERIC => "Configuration error",
        ErrorCode::CONFIG_PARSE_ERROR => "Configuration file could not be parsed",
        _ => "Unknown error",
    }
}
