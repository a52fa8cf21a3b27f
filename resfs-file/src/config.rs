// SPDX-License-Identifier: AGPL-3.0-or-later
//! Backend configuration

use resfs_core::{uri::validate_name, ResfsError, ResfsResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Filesystem backend configuration
///
/// Handed to the resolver and passed on to every node it creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Initial caching mode of every directory
    pub caching: bool,
    /// Name of the per-directory ignore list
    pub ignore_file: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            caching: true,
            ignore_file: ".ignore".to_string(),
        }
    }
}

impl FileConfig {
    pub fn from_toml_str(text: &str) -> ResfsResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ResfsError::Config(e.to_string()))?;
        validate_name(&config.ignore_file).map_err(|_| {
            ResfsError::Config(format!("invalid ignore_file {:?}", config.ignore_file))
        })?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ResfsResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| ResfsError::from_io(e, path))?;
        Self::from_toml_str(&text)
    }

    pub fn with_caching(mut self, caching: bool) -> Self {
        self.caching = caching;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FileConfig::default();
        assert!(config.caching);
        assert_eq!(config.ignore_file, ".ignore");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = FileConfig::from_toml_str("caching = false\n").unwrap();
        assert!(!config.caching);
        assert_eq!(config.ignore_file, ".ignore");
    }

    #[test]
    fn test_full_toml() {
        let text = "caching = true\nignore_file = \".resfsignore\"\n";
        let config = FileConfig::from_toml_str(text).unwrap();
        assert_eq!(config, FileConfig { caching: true, ignore_file: ".resfsignore".into() });
    }

    #[test]
    fn test_rejects_nested_ignore_file() {
        let err = FileConfig::from_toml_str("ignore_file = \"sub/.ignore\"\n").unwrap_err();
        assert!(matches!(err, ResfsError::Config(_)));
    }

    #[test]
    fn test_rejects_bad_types() {
        assert!(FileConfig::from_toml_str("caching = \"sometimes\"\n").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileConfig::load(&dir.path().join("config.toml")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_with_caching() {
        assert!(!FileConfig::default().with_caching(false).caching);
    }
}
