// SPDX-License-Identifier: AGPL-3.0-or-later
//! Node identity shared by files and directories

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use resfs_core::{uri, ResfsError, ResfsResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tracing::debug;
use url::Url;

use crate::directory::{DirectoryState, FileDirectory};
use crate::FileConfig;

/// Location and parent link of a resource.
///
/// The parent link never owns the parent: a container's cache owns its
/// children, so children only keep a weak reference back. When that
/// container is gone, or was never given, the parent is rebuilt from the
/// path on demand if upward resolution is allowed.
pub(crate) struct Node {
    path: RwLock<PathBuf>,
    attached: Option<Weak<DirectoryState>>,
    allow_upward: bool,
    synthetic_parent: OnceCell<FileDirectory>,
    config: Arc<FileConfig>,
}

impl Node {
    pub(crate) fn new(
        path: PathBuf,
        parent: Option<&FileDirectory>,
        allow_upward: bool,
        config: Arc<FileConfig>,
    ) -> Self {
        Self {
            path: RwLock::new(path),
            attached: parent.map(FileDirectory::downgrade),
            allow_upward,
            synthetic_parent: OnceCell::new(),
            config,
        }
    }

    pub(crate) fn path(&self) -> PathBuf {
        self.path.read().clone()
    }

    pub(crate) fn set_path(&self, path: PathBuf) {
        *self.path.write() = path;
    }

    pub(crate) fn name(&self) -> String {
        let path = self.path.read();
        file_name(&path).unwrap_or_default()
    }

    pub(crate) fn config(&self) -> &Arc<FileConfig> {
        &self.config
    }

    pub(crate) fn allows_upward(&self) -> bool {
        self.allow_upward
    }

    pub(crate) fn parent(&self) -> Option<FileDirectory> {
        if let Some(state) = self.attached.as_ref().and_then(Weak::upgrade) {
            return Some(FileDirectory::from_state(state));
        }
        if !self.allow_upward {
            return None;
        }
        let containing = self.path().parent()?.to_path_buf();
        if containing.as_os_str().is_empty() {
            return None;
        }
        let parent = self.synthetic_parent.get_or_init(|| {
            FileDirectory::with_parent(containing, None, true, self.config.clone())
        });
        Some(parent.clone())
    }

    pub(crate) fn uri(&self) -> ResfsResult<Url> {
        uri::path_to_uri(&self.path())
    }

    /// Rename on disk, re-key the parent's cache, then move this node.
    ///
    /// `retarget` moves the node (and anything it caches) to the new path.
    pub(crate) fn rename(&self, name: &str, retarget: impl FnOnce(PathBuf)) -> ResfsResult<()> {
        uri::validate_name(name)?;
        let current = self.path();
        let old_name = file_name(&current)
            .ok_or_else(|| ResfsError::InvalidName(current.display().to_string()))?;
        let target = current.with_file_name(name);
        if fs::symlink_metadata(&target).is_ok() {
            return Err(ResfsError::AlreadyExists(format!(
                "Target file already exists: {}",
                target.display()
            )));
        }

        // Resolve before the move so a synthetic parent still sees the old layout.
        let parent = self.parent();
        fs::rename(&current, &target).map_err(|err| {
            ResfsError::IoFailure(format!(
                "Could not rename {} to {}: {err}",
                current.display(),
                target.display()
            ))
        })?;

        if let Some(parent) = parent {
            parent.rename_child(&old_name, name);
        }
        if self.path() != target {
            retarget(target.clone());
        }
        debug!(from = %current.display(), to = %target.display(), "renamed");
        Ok(())
    }
}

pub(crate) fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}
