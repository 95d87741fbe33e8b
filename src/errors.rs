use std::path::PathBuf;
use thiserror::Error;

/// Result type for streaming and matching operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur while streaming directories or encoding records
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("Cursor is already closed")]
    AlreadyClosed,
    #[error("Directory read failed: {0}")]
    TransientIo(#[source] std::io::Error),
    #[error("Entry name of {len} bytes exceeds the 65535-byte record limit")]
    NameTooLong { len: usize },
    #[error("Record truncated: need {expected} bytes, have {available}")]
    TruncatedRecord { expected: usize, available: usize },
    #[error("Invalid entry kind tag: {0}")]
    InvalidKindTag(u8),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Self::NotADirectory(path.into())
    }

    pub fn name_too_long(len: usize) -> Self {
        Self::NameTooLong { len }
    }

    pub fn truncated_record(expected: usize, available: usize) -> Self {
        Self::TruncatedRecord {
            expected,
            available,
        }
    }

    pub fn invalid_pattern(pattern: impl Into<String>) -> Self {
        Self::InvalidPattern(pattern.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let path = Path::new("missing");
        let err = ScanError::not_found(path);
        assert!(matches!(err, ScanError::NotFound(_)));

        let err = ScanError::permission_denied(path);
        assert!(matches!(err, ScanError::PermissionDenied(_)));

        let err = ScanError::not_a_directory(path);
        assert!(matches!(err, ScanError::NotADirectory(_)));

        let err = ScanError::name_too_long(70_000);
        assert!(matches!(err, ScanError::NameTooLong { len: 70_000 }));

        let err = ScanError::invalid_pattern("unbalanced (");
        assert!(matches!(err, ScanError::InvalidPattern(_)));
    }

    #[test]
    fn test_error_messages() {
        let err = ScanError::not_found("missing");
        assert_eq!(err.to_string(), "Directory not found: missing");

        let err = ScanError::name_too_long(70_000);
        assert_eq!(
            err.to_string(),
            "Entry name of 70000 bytes exceeds the 65535-byte record limit"
        );

        let err = ScanError::truncated_record(7, 3);
        assert_eq!(err.to_string(), "Record truncated: need 7 bytes, have 3");

        let err = ScanError::config_error("batch capacity too small");
        assert_eq!(
            err.to_string(),
            "Configuration error: batch capacity too small"
        );

        assert_eq!(ScanError::AlreadyClosed.to_string(), "Cursor is already closed");
    }
}
