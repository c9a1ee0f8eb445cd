//! Error types for Skiff

use std::fmt;

/// Unified error type for all Skiff operations
#[derive(Debug)]
pub enum SkiffError {
    /// I/O error
    Io(std::io::Error),

    /// Protocol violation (unexpected message, truncated payload,
    /// out-of-range field)
    Protocol(String),

    /// The transport signalled EOF or a fatal error
    TransportClosed(String),

    /// A requested SSH service was refused by the server
    ServiceRejected(String),

    /// Other error
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for SkiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkiffError::Io(e) => write!(f, "IO error: {}", e),
            SkiffError::Protocol(msg) => write!(f, "Protocol violation: {}", msg),
            SkiffError::TransportClosed(msg) => write!(f, "Transport closed: {}", msg),
            SkiffError::ServiceRejected(msg) => write!(f, "Service rejected: {}", msg),
            SkiffError::Other(e) => write!(f, "Error: {}", e),
        }
    }
}

impl std::error::Error for SkiffError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SkiffError::Io(e) => Some(e),
            SkiffError::Other(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SkiffError {
    fn from(err: std::io::Error) -> Self {
        SkiffError::Io(err)
    }
}

/// Result type for Skiff operations
pub type SkiffResult<T> = Result<T, SkiffError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SkiffError::Protocol("unexpected message code 42".to_string());
        assert_eq!(
            err.to_string(),
            "Protocol violation: unexpected message code 42"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "connection reset");
        let skiff_err: SkiffError = io_err.into();
        assert!(matches!(skiff_err, SkiffError::Io(_)));
    }

    #[test]
    fn test_service_rejected_display() {
        let err = SkiffError::ServiceRejected("ssh-userauth".to_string());
        assert_eq!(err.to_string(), "Service rejected: ssh-userauth");
    }

    #[test]
    fn test_result_type() {
        fn example() -> SkiffResult<i32> {
            Ok(42)
        }

        assert_eq!(example().unwrap(), 42);
    }
}
