// SPDX-License-Identifier: AGPL-3.0-or-later
//! Resource locations
//!
//! Translation between filesystem paths, `file:` URIs and child names.

use std::path::{Component, Path, PathBuf};
use url::Url;

use crate::error::{ResfsError, ResfsResult};

pub const FILE_SCHEME: &str = "file";

/// Derive the `file:` URI for an absolute path.
pub fn path_to_uri(path: &Path) -> ResfsResult<Url> {
    Url::from_file_path(path).map_err(|_| ResfsError::InvalidUri(path.display().to_string()))
}

/// Extract the filesystem path from a `file:` URI.
pub fn uri_to_path(uri: &Url) -> ResfsResult<PathBuf> {
    if uri.scheme() != FILE_SCHEME {
        return Err(ResfsError::InvalidUri(uri.to_string()));
    }
    uri.to_file_path().map_err(|_| ResfsError::InvalidUri(uri.to_string()))
}

/// Parse user input as a URI, falling back to a local path.
///
/// Relative paths are resolved against `cwd`.
pub fn parse_location(input: &str, cwd: &Path) -> ResfsResult<Url> {
    if let Ok(uri) = Url::parse(input) {
        // Single-letter schemes are Windows drive letters, not URIs.
        if uri.scheme().len() > 1 {
            return Ok(uri);
        }
    }
    let path = Path::new(input);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    path_to_uri(&normalize(&absolute))
}

/// Lexically remove `.` and `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Check that `name` addresses a direct child: not empty, not `.` or `..`,
/// and free of path separators.
pub fn validate_name(name: &str) -> ResfsResult<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains(std::path::MAIN_SEPARATOR)
        || name.contains('\0');
    if invalid {
        Err(ResfsError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_path_to_uri() {
        let uri = path_to_uri(Path::new("/home/user/docs")).unwrap();
        assert_eq!(uri.as_str(), "file:///home/user/docs");
    }

    #[test]
    fn test_path_to_uri_escapes() {
        let uri = path_to_uri(Path::new("/tmp/with space")).unwrap();
        assert_eq!(uri.as_str(), "file:///tmp/with%20space");
        assert_eq!(uri_to_path(&uri).unwrap(), PathBuf::from("/tmp/with space"));
    }

    #[test]
    fn test_relative_path_is_not_a_uri() {
        assert!(path_to_uri(Path::new("relative/path")).is_err());
    }

    #[test]
    fn test_uri_to_path_rejects_other_schemes() {
        let uri = Url::parse("http://example.com/file").unwrap();
        assert!(matches!(uri_to_path(&uri), Err(ResfsError::InvalidUri(_))));
    }

    #[test]
    fn test_parse_location_uri() {
        let uri = parse_location("file:///var/log", Path::new("/ignored")).unwrap();
        assert_eq!(uri_to_path(&uri).unwrap(), PathBuf::from("/var/log"));
    }

    #[test]
    fn test_parse_location_relative() {
        let uri = parse_location("docs/../notes", Path::new("/home/user")).unwrap();
        assert_eq!(uri_to_path(&uri).unwrap(), PathBuf::from("/home/user/notes"));
    }

    #[test]
    fn test_parse_location_absolute() {
        let uri = parse_location("/srv/./data", Path::new("/home/user")).unwrap();
        assert_eq!(uri_to_path(&uri).unwrap(), PathBuf::from("/srv/data"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("report.txt").is_ok());
        assert!(validate_name(".ignore").is_ok());
        assert!(validate_name("..hidden").is_ok());

        assert!(validate_name("").is_err());
        assert!(validate_name(".").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("nul\0byte").is_err());
    }
}
