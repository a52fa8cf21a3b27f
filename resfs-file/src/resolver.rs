// SPDX-License-Identifier: AGPL-3.0-or-later
//! `file:` URI resolver

use resfs_core::{uri, ResfsError, ResfsResult, ResourceResolver};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use url::Url;

use crate::{FileConfig, FileDirectory, FileItem, FileResource};

/// Resolves `file:` URIs to root resources
///
/// Roots have no parent of their own but may resolve one from their path.
pub struct FileResourceResolver {
    config: Arc<FileConfig>,
}

impl FileResourceResolver {
    pub fn new(config: FileConfig) -> Self {
        Self { config: Arc::new(config) }
    }

    pub fn config(&self) -> &FileConfig {
        &self.config
    }

    /// `Ok(None)` when the path is missing or neither file nor directory.
    pub fn resolve_path(&self, path: &Path) -> ResfsResult<Option<FileResource>> {
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(ResfsError::from_io(err, path)),
        };
        let resource = if meta.is_file() {
            FileResource::Item(FileItem::new(path, self.config.clone()))
        } else if meta.is_dir() {
            FileResource::Directory(FileDirectory::new(path, self.config.clone()))
        } else {
            return Ok(None);
        };
        Ok(Some(resource))
    }
}

impl Default for FileResourceResolver {
    fn default() -> Self {
        Self::new(FileConfig::default())
    }
}

impl ResourceResolver for FileResourceResolver {
    type Resource = FileResource;

    fn resolve(&self, uri: &Url) -> ResfsResult<Option<FileResource>> {
        self.resolve_path(&uri::uri_to_path(uri)?)
    }

    fn default_schemes(&self) -> &[&'static str] {
        &[uri::FILE_SCHEME]
    }
}
