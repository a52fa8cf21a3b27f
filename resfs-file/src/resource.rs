// SPDX-License-Identifier: AGPL-3.0-or-later
//! Either kind of filesystem resource

use resfs_core::prelude::*;
use resfs_core::ResourceCapabilities;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use url::Url;

use crate::{FileDirectory, FileItem};

/// A file or a directory
///
/// Two resources are equal when their paths are equal, whatever their kind.
#[derive(Debug, Clone)]
pub enum FileResource {
    Item(FileItem),
    Directory(FileDirectory),
}

impl FileResource {
    pub fn path(&self) -> PathBuf {
        match self {
            FileResource::Item(item) => item.path(),
            FileResource::Directory(dir) => dir.path(),
        }
    }

    pub fn parent(&self) -> Option<FileDirectory> {
        match self {
            FileResource::Item(item) => item.parent(),
            FileResource::Directory(dir) => dir.parent(),
        }
    }

    pub fn is_item(&self) -> bool {
        matches!(self, FileResource::Item(_))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, FileResource::Directory(_))
    }

    pub fn as_item(&self) -> Option<&FileItem> {
        match self {
            FileResource::Item(item) => Some(item),
            FileResource::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&FileDirectory> {
        match self {
            FileResource::Directory(dir) => Some(dir),
            FileResource::Item(_) => None,
        }
    }

    pub fn into_item(self) -> Option<FileItem> {
        match self {
            FileResource::Item(item) => Some(item),
            FileResource::Directory(_) => None,
        }
    }

    pub fn into_directory(self) -> Option<FileDirectory> {
        match self {
            FileResource::Directory(dir) => Some(dir),
            FileResource::Item(_) => None,
        }
    }

    pub fn rename(&self, name: &str) -> ResfsResult<()> {
        match self {
            FileResource::Item(item) => item.rename(name),
            FileResource::Directory(dir) => dir.rename(name),
        }
    }

    pub fn detach(&self) -> FileResource {
        match self {
            FileResource::Item(item) => FileResource::Item(item.detach()),
            FileResource::Directory(dir) => FileResource::Directory(dir.detach()),
        }
    }

    pub fn uri(&self) -> ResfsResult<Url> {
        match self {
            FileResource::Item(item) => item.uri(),
            FileResource::Directory(dir) => dir.uri(),
        }
    }

    pub(crate) fn retarget(&self, path: PathBuf) {
        match self {
            FileResource::Item(item) => item.retarget(path),
            FileResource::Directory(dir) => dir.retarget(path),
        }
    }

    pub(crate) fn same_node(&self, other: &FileResource) -> bool {
        match (self, other) {
            (FileResource::Item(a), FileResource::Item(b)) => a.same_node(b),
            (FileResource::Directory(a), FileResource::Directory(b)) => a.same_node(b),
            _ => false,
        }
    }

    fn inner(&self) -> &dyn Resource {
        match self {
            FileResource::Item(item) => item,
            FileResource::Directory(dir) => dir,
        }
    }
}

impl Resource for FileResource {
    fn name(&self) -> String {
        self.inner().name()
    }

    fn content_type(&self) -> Option<String> {
        self.inner().content_type()
    }

    fn kind(&self) -> ResourceKind {
        self.inner().kind()
    }

    fn capabilities(&self) -> ResourceCapabilities {
        self.inner().capabilities()
    }
}

impl RenameableResource for FileResource {
    fn rename(&self, name: &str) -> ResfsResult<()> {
        FileResource::rename(self, name)
    }
}

impl LocatableResource for FileResource {
    fn uri(&self) -> ResfsResult<Url> {
        FileResource::uri(self)
    }
}

impl DetachableResource for FileResource {
    type Detached = FileResource;

    fn detach(&self) -> FileResource {
        FileResource::detach(self)
    }
}

impl From<FileItem> for FileResource {
    fn from(item: FileItem) -> Self {
        FileResource::Item(item)
    }
}

impl From<FileDirectory> for FileResource {
    fn from(dir: FileDirectory) -> Self {
        FileResource::Directory(dir)
    }
}

impl PartialEq for FileResource {
    fn eq(&self, other: &Self) -> bool {
        self.path() == other.path()
    }
}

impl Eq for FileResource {}

impl Hash for FileResource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path().hash(state);
    }
}

impl fmt::Display for FileResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}
