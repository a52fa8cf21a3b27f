// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for resfs

use std::io;
use std::path::Path;
use thiserror::Error;

/// Result type alias
pub type ResfsResult<T> = Result<T, ResfsError>;

/// Main error type
#[derive(Error, Debug)]
pub enum ResfsError {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    #[error("No resolver registered for scheme: {0}")]
    SchemeNotRegistered(String),

    /// A mutation did not take effect, confirmed by checking the filesystem afterwards.
    #[error("I/O failure: {0}")]
    IoFailure(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ResfsError {
    /// Classify an OS error for `path`, keeping the path in the message.
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        let display = path.display();
        match err.kind() {
            io::ErrorKind::NotFound => ResfsError::NotFound(display.to_string()),
            io::ErrorKind::PermissionDenied => ResfsError::PermissionDenied(display.to_string()),
            io::ErrorKind::AlreadyExists => ResfsError::AlreadyExists(display.to_string()),
            _ => ResfsError::IoFailure(format!("{display}: {err}")),
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            ResfsError::NotFound(_) => true,
            ResfsError::Io(err) => err.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        match self {
            ResfsError::PermissionDenied(_) => true,
            ResfsError::Io(err) => err.kind() == io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_keeps_path() {
        let path = Path::new("/srv/data/report.txt");

        let err = ResfsError::from_io(io::Error::new(io::ErrorKind::NotFound, "gone"), path);
        assert!(matches!(err, ResfsError::NotFound(ref p) if p == "/srv/data/report.txt"));

        let err = ResfsError::from_io(io::Error::new(io::ErrorKind::PermissionDenied, "no"), path);
        assert!(err.is_permission_denied());

        let err = ResfsError::from_io(io::Error::new(io::ErrorKind::Other, "disk on fire"), path);
        let message = err.to_string();
        assert!(message.contains("/srv/data/report.txt"));
        assert!(message.contains("disk on fire"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(ResfsError::NotFound("a".into()).is_not_found());
        assert!(ResfsError::Io(io::Error::new(io::ErrorKind::NotFound, "x")).is_not_found());
        assert!(!ResfsError::AlreadyExists("a".into()).is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = ResfsError::NotFound("/path/to/file".into());
        assert_eq!(format!("{}", err), "Path not found: /path/to/file");

        let err = ResfsError::InvalidName("../escape".into());
        assert_eq!(format!("{}", err), "Invalid name: \"../escape\"");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: ResfsError = io_err.into();
        assert!(matches!(err, ResfsError::Io(_)));
    }
}
