// SPDX-License-Identifier: AGPL-3.0-or-later
//! Directory resources and their child cache
//!
//! A directory lists its children lazily. The first access performs a full
//! load (ignore list, listing, classification of every entry); afterwards
//! lookups are served from memory and create/delete/rename performed through
//! the same directory adjust the cached map in place. Creating or deleting a
//! child never forces a full load: when nothing is cached yet, there is
//! nothing to adjust and the next load sees the new state.
//!
//! With caching disabled every access reloads first.

use parking_lot::{Mutex, RwLock};
use resfs_core::prelude::*;
use resfs_core::{uri::validate_name, ResourceCapabilities, CONTENT_TYPE_DIRECTORY};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};
use url::Url;

use crate::node::Node;
use crate::{FileConfig, FileItem, FileResource, IgnoreList};

/// `None` marks a name that exists on disk but is neither file nor directory.
type ChildMap = BTreeMap<String, Option<FileResource>>;

pub(crate) struct DirectoryState {
    node: Node,
    children: RwLock<Option<ChildMap>>,
    caching: AtomicBool,
    ignored: RwLock<IgnoreList>,
    /// Serializes full loads and single-entry probes.
    monitor: Mutex<()>,
    full_loads: AtomicU64,
}

/// Outcome of probing a single path
enum Probe {
    Missing,
    Unsupported,
    Found(FileResource),
}

/// A directory on the local filesystem
///
/// Cloning yields another handle to the same directory and the same cache.
#[derive(Clone)]
pub struct FileDirectory {
    state: Arc<DirectoryState>,
}

impl FileDirectory {
    /// Root handle for `path`, able to resolve its parent from the path.
    pub fn new(path: impl Into<PathBuf>, config: Arc<FileConfig>) -> Self {
        Self::with_parent(path.into(), None, true, config)
    }

    pub(crate) fn with_parent(
        path: PathBuf,
        parent: Option<&FileDirectory>,
        allow_upward: bool,
        config: Arc<FileConfig>,
    ) -> Self {
        let caching = config.caching;
        Self {
            state: Arc::new(DirectoryState {
                node: Node::new(path, parent, allow_upward, config),
                children: RwLock::new(None),
                caching: AtomicBool::new(caching),
                ignored: RwLock::new(IgnoreList::default()),
                monitor: Mutex::new(()),
                full_loads: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn from_state(state: Arc<DirectoryState>) -> Self {
        Self { state }
    }

    pub(crate) fn downgrade(&self) -> Weak<DirectoryState> {
        Arc::downgrade(&self.state)
    }

    pub(crate) fn same_node(&self, other: &FileDirectory) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    pub fn path(&self) -> PathBuf {
        self.state.node.path()
    }

    pub fn parent(&self) -> Option<FileDirectory> {
        self.state.node.parent()
    }

    pub fn config(&self) -> &FileConfig {
        self.state.node.config()
    }

    /// Whether the child map is currently materialized.
    pub fn is_loaded(&self) -> bool {
        self.state.children.read().is_some()
    }

    /// Number of full loads this directory has performed.
    pub fn full_loads(&self) -> u64 {
        self.state.full_loads.load(Ordering::Relaxed)
    }

    /// Ignore list read by the most recent full load.
    pub fn ignore_list(&self) -> IgnoreList {
        self.state.ignored.read().clone()
    }

    /// Look up a child, probing the filesystem when the name is not cached.
    ///
    /// A probe that finds nothing is not remembered, so a later external
    /// creation is picked up by the next lookup. The ignore list is only
    /// applied by full loads; an ignored name can still be looked up directly.
    pub fn child(&self, name: &str) -> ResfsResult<Option<FileResource>> {
        validate_name(name)?;
        self.ensure_loaded()?;
        if let Some(entry) = self.cached(name) {
            return Ok(entry);
        }

        let _guard = self.state.monitor.lock();
        if let Some(entry) = self.cached(name) {
            return Ok(entry);
        }
        let entry = match self.probe(&self.path().join(name))? {
            Probe::Missing => return Ok(None),
            Probe::Unsupported => None,
            Probe::Found(resource) => Some(resource),
        };
        if let Some(children) = self.state.children.write().as_mut() {
            children.insert(name.to_string(), entry.clone());
            debug!(directory = %self, name, found = entry.is_some(), "cached probed child");
        }
        Ok(entry)
    }

    /// Children ordered by name.
    pub fn children(&self) -> ResfsResult<Vec<FileResource>> {
        self.ensure_loaded()?;
        let children = self.state.children.read();
        Ok(children
            .as_ref()
            .map(|map| map.values().flatten().cloned().collect())
            .unwrap_or_default())
    }

    /// Create a child, tolerating one that already exists with the same kind.
    pub fn create(&self, name: &str, kind: ResourceKind) -> ResfsResult<FileResource> {
        validate_name(name)?;
        let target = self.path().join(name);
        let config = self.state.node.config().clone();

        let resource = match kind {
            ResourceKind::Container => {
                if let Err(err) = fs::create_dir(&target) {
                    tolerate_existing(&target, err, kind)?;
                }
                let dir = FileDirectory::with_parent(target, Some(self), true, config);
                FileResource::Directory(dir)
            }
            ResourceKind::Leaf => {
                if let Err(err) = OpenOptions::new().write(true).create_new(true).open(&target) {
                    tolerate_existing(&target, err, kind)?;
                }
                FileResource::Item(FileItem::with_parent(target, Some(self), true, config))
            }
        };

        if let Some(children) = self.state.children.write().as_mut() {
            children.insert(name.to_string(), Some(resource.clone()));
        }
        debug!(directory = %self, name, %kind, "created child");
        Ok(resource)
    }

    /// Delete a child, recursively for directories.
    ///
    /// Success is decided by checking that the path is gone afterwards.
    /// Cached handles to nested directories held elsewhere are not invalidated.
    pub fn delete(&self, name: &str) -> ResfsResult<()> {
        validate_name(name)?;
        if let Some(children) = self.state.children.write().as_mut() {
            children.remove(name);
        }

        let target = self.path().join(name);
        let removed = match fs::symlink_metadata(&target) {
            Ok(meta) if meta.is_dir() => {
                self.purge_tree(&target);
                fs::remove_dir(&target)
            }
            Ok(_) => fs::remove_file(&target),
            Err(err) => Err(err),
        };
        if let Err(err) = removed {
            debug!(path = %target.display(), error = %err, "remove reported an error");
        }

        if fs::symlink_metadata(&target).is_ok() {
            return Err(ResfsError::IoFailure(format!(
                "Could not delete file: {}",
                target.display()
            )));
        }
        debug!(directory = %self, name, "deleted child");
        Ok(())
    }

    /// Walks the real filesystem, not the cache.
    fn purge_tree(&self, directory: &Path) {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(path = %directory.display(), error = %err, "cannot list for delete");
                return;
            }
        };
        for entry in entries.flatten() {
            // Keys are matched by bare name, even for nested entries.
            if let Some(name) = entry.file_name().to_str() {
                if let Some(children) = self.state.children.write().as_mut() {
                    children.remove(name);
                }
            }
            let path = entry.path();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            let removed = if is_dir {
                self.purge_tree(&path);
                fs::remove_dir(&path)
            } else {
                fs::remove_file(&path)
            };
            if let Err(err) = removed {
                debug!(path = %path.display(), error = %err, "nested remove failed");
            }
        }
    }

    /// Re-key a cached child after it was renamed on disk.
    pub(crate) fn rename_child(&self, old_name: &str, new_name: &str) {
        let moved = {
            let mut guard = self.state.children.write();
            let Some(children) = guard.as_mut() else {
                return;
            };
            let Some(entry) = children.remove(old_name) else {
                return;
            };
            children.insert(new_name.to_string(), entry.clone());
            entry
        };
        if let Some(resource) = moved {
            let target = self.path().join(new_name);
            if resource.path() != target {
                resource.retarget(target);
            }
        }
    }

    /// Move this directory and its cached descendants to `path`.
    pub(crate) fn retarget(&self, path: PathBuf) {
        self.state.node.set_path(path.clone());
        let cached: Vec<(String, FileResource)> = self
            .state
            .children
            .read()
            .as_ref()
            .map(|map| {
                map.iter()
                    .filter_map(|(name, entry)| entry.clone().map(|r| (name.clone(), r)))
                    .collect()
            })
            .unwrap_or_default();
        for (name, child) in cached {
            child.retarget(path.join(name));
        }
    }

    pub fn rename(&self, name: &str) -> ResfsResult<()> {
        self.state.node.rename(name, |target| self.retarget(target))
    }

    /// Standalone handle for the same directory with an empty cache.
    pub fn detach(&self) -> FileDirectory {
        FileDirectory::with_parent(self.path(), None, false, self.state.node.config().clone())
    }

    pub fn is_caching(&self) -> bool {
        self.state.caching.load(Ordering::Acquire)
    }

    pub fn set_caching(&self, enabled: bool) {
        self.state.caching.store(enabled, Ordering::Release);
    }

    pub fn reset_cache(&self) -> ResfsResult<()> {
        let _guard = self.state.monitor.lock();
        self.load_children()
    }

    pub fn uri(&self) -> ResfsResult<Url> {
        self.state.node.uri()
    }

    pub(crate) fn allows_upward(&self) -> bool {
        self.state.node.allows_upward()
    }

    fn needs_load(&self) -> bool {
        !self.is_caching() || !self.is_loaded()
    }

    fn ensure_loaded(&self) -> ResfsResult<()> {
        if self.needs_load() {
            let _guard = self.state.monitor.lock();
            if self.needs_load() {
                self.load_children()?;
            }
        }
        Ok(())
    }

    /// `Some(entry)` when `name` is a key of the materialized map.
    fn cached(&self, name: &str) -> Option<Option<FileResource>> {
        self.state.children.read().as_ref().and_then(|map| map.get(name).cloned())
    }

    /// Caller holds the monitor.
    fn load_children(&self) -> ResfsResult<()> {
        let directory = self.path();
        let ignored = IgnoreList::load(&directory.join(&self.config().ignore_file))?;
        let mut children = ChildMap::new();
        let mut skipped = 0usize;

        match fs::read_dir(&directory) {
            Ok(entries) => {
                for entry in entries {
                    let entry = entry.map_err(|e| ResfsError::from_io(e, &directory))?;
                    let name = match entry.file_name().into_string() {
                        Ok(name) => name,
                        Err(raw) => {
                            warn!(
                                directory = %directory.display(),
                                name = ?raw,
                                "skipping non UTF-8 name"
                            );
                            continue;
                        }
                    };
                    if ignored.contains(&name) {
                        skipped += 1;
                        continue;
                    }
                    match self.probe(&entry.path()) {
                        Ok(Probe::Found(resource)) => {
                            children.insert(name, Some(resource));
                        }
                        Ok(Probe::Missing | Probe::Unsupported) => {}
                        Err(err) => warn!(
                            directory = %directory.display(),
                            name = %name,
                            error = %err,
                            "skipping child"
                        ),
                    }
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(directory = %directory.display(), "directory vanished, loading as empty");
            }
            Err(err) => return Err(ResfsError::from_io(err, &directory)),
        }

        debug!(
            directory = %directory.display(),
            entries = children.len(),
            ignored = skipped,
            "loaded children"
        );
        *self.state.ignored.write() = ignored;
        *self.state.children.write() = Some(children);
        self.state.full_loads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn probe(&self, path: &Path) -> ResfsResult<Probe> {
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Probe::Missing),
            Err(err) => return Err(ResfsError::from_io(err, path)),
        };
        let config = self.state.node.config().clone();
        let path = path.to_path_buf();
        Ok(if meta.is_file() {
            let item = FileItem::with_parent(path, Some(self), true, config);
            Probe::Found(FileResource::Item(item))
        } else if meta.is_dir() {
            let dir = FileDirectory::with_parent(path, Some(self), true, config);
            Probe::Found(FileResource::Directory(dir))
        } else {
            Probe::Unsupported
        })
    }
}

/// A failed create is fine when the target now exists with the requested kind.
fn tolerate_existing(target: &Path, err: io::Error, kind: ResourceKind) -> ResfsResult<()> {
    match fs::metadata(target) {
        Ok(meta) if meta.is_dir() == kind.is_container() => {
            debug!(path = %target.display(), %kind, "already exists, treating create as done");
            Ok(())
        }
        Ok(_) => Err(ResfsError::AlreadyExists(format!(
            "{} exists but is not a {kind}",
            target.display()
        ))),
        Err(_) => Err(ResfsError::IoFailure(format!(
            "Could not create {kind} {}: {err}",
            target.display()
        ))),
    }
}

impl Resource for FileDirectory {
    fn name(&self) -> String {
        self.state.node.name()
    }

    fn content_type(&self) -> Option<String> {
        Some(CONTENT_TYPE_DIRECTORY.to_string())
    }

    fn kind(&self) -> ResourceKind {
        ResourceKind::Container
    }

    fn capabilities(&self) -> ResourceCapabilities {
        ResourceCapabilities::container()
    }
}

impl ResourceContainer for FileDirectory {
    type Child = FileResource;

    fn child(&self, name: &str) -> ResfsResult<Option<FileResource>> {
        FileDirectory::child(self, name)
    }

    fn children(&self) -> ResfsResult<Vec<FileResource>> {
        FileDirectory::children(self)
    }
}

impl ManageableContainer for FileDirectory {
    fn create(&self, name: &str, kind: ResourceKind) -> ResfsResult<FileResource> {
        FileDirectory::create(self, name, kind)
    }

    fn delete(&self, name: &str) -> ResfsResult<()> {
        FileDirectory::delete(self, name)
    }
}

impl CacheableResource for FileDirectory {
    fn is_caching(&self) -> bool {
        FileDirectory::is_caching(self)
    }

    fn set_caching(&self, enabled: bool) {
        FileDirectory::set_caching(self, enabled)
    }

    fn reset_cache(&self) -> ResfsResult<()> {
        FileDirectory::reset_cache(self)
    }
}

impl RenameableResource for FileDirectory {
    fn rename(&self, name: &str) -> ResfsResult<()> {
        FileDirectory::rename(self, name)
    }
}

impl LocatableResource for FileDirectory {
    fn uri(&self) -> ResfsResult<Url> {
        FileDirectory::uri(self)
    }
}

impl DetachableResource for FileDirectory {
    type Detached = FileDirectory;

    fn detach(&self) -> FileDirectory {
        FileDirectory::detach(self)
    }
}

impl PartialEq for FileDirectory {
    fn eq(&self, other: &Self) -> bool {
        self.path() == other.path()
    }
}

impl Eq for FileDirectory {}

impl Hash for FileDirectory {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path().hash(state);
    }
}

impl fmt::Debug for FileDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileDirectory")
            .field("path", &self.path())
            .field("caching", &self.is_caching())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl fmt::Display for FileDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}
