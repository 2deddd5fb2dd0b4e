//! Unified error types for scanvault.
//!
//! Only a small set of failures ever surface: rejected query limits and
//! ledger I/O. Everything else in the core degrades to empty results.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the scanvault core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected request parameters (e.g., a ledger query limit above 50).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The ledger file could not be created, opened, or written.
    #[error("LEDGER_IO: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded.
    #[error("SERIALIZATION: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::Io(e) => (-32002, e.to_string()),
            Error::Serialization(e) => (-32000, e.to_string()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("limit must not exceed 50".to_string());
        assert!(err.to_string().contains("INVALID_INPUT"));
        assert!(err.to_string().contains("limit must not exceed 50"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::InvalidInput("limit".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32602);
    }

    #[test]
    fn test_io_error_to_mcp_error() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"));
        assert!(err.to_string().starts_with("LEDGER_IO"));
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32002);
    }
}
