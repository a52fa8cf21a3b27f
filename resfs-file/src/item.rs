// SPDX-License-Identifier: AGPL-3.0-or-later
//! File resources

use bytes::Bytes;
use chrono::{DateTime, Utc};
use resfs_core::prelude::*;
use resfs_core::ResourceCapabilities;
use std::fmt;
use std::fs::{self, File, FileTimes, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;
use url::Url;

use crate::node::Node;
use crate::{FileConfig, FileDirectory};

/// A regular file on the local filesystem
///
/// Cloning yields another handle to the same node; a rename through one
/// handle is visible through all of them.
#[derive(Clone)]
pub struct FileItem {
    node: Arc<Node>,
}

impl FileItem {
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
        Self { node: Arc::new(Node::new(path, parent, allow_upward, config)) }
    }

    pub fn path(&self) -> PathBuf {
        self.node.path()
    }

    pub fn parent(&self) -> Option<FileDirectory> {
        self.node.parent()
    }

    pub fn uri(&self) -> ResfsResult<Url> {
        self.node.uri()
    }

    pub fn rename(&self, name: &str) -> ResfsResult<()> {
        self.node.rename(name, |target| self.node.set_path(target))
    }

    pub(crate) fn retarget(&self, path: PathBuf) {
        self.node.set_path(path);
    }

    pub fn detach(&self) -> FileItem {
        FileItem::with_parent(self.path(), None, false, self.node.config().clone())
    }

    pub(crate) fn allows_upward(&self) -> bool {
        self.node.allows_upward()
    }

    /// Whether both handles share one node, not just one path.
    pub(crate) fn same_node(&self, other: &FileItem) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Read the whole file.
    pub fn read_bytes(&self) -> ResfsResult<Bytes> {
        let mut buffer = Vec::new();
        self.readable()?
            .read_to_end(&mut buffer)
            .map_err(|e| ResfsError::from_io(e, &self.path()))?;
        Ok(Bytes::from(buffer))
    }

    /// Replace the file content.
    pub fn write_bytes(&self, data: impl AsRef<[u8]>) -> ResfsResult<()> {
        let mut writer = self.writable()?;
        writer
            .write_all(data.as_ref())
            .and_then(|_| writer.flush())
            .map_err(|e| ResfsError::from_io(e, &self.path()))
    }

    fn metadata(&self) -> ResfsResult<fs::Metadata> {
        let path = self.path();
        fs::metadata(&path).map_err(|e| ResfsError::from_io(e, &path))
    }

    fn open_for_write(&self, append: bool) -> ResfsResult<BufWriter<File>> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| ResfsError::from_io(e, parent))?;
            }
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .append(append)
            .truncate(!append)
            .open(&path)
            .map_err(|e| ResfsError::from_io(e, &path))?;
        Ok(BufWriter::new(file))
    }
}

/// A missing permission to update metadata must not block a read.
fn touch_accessed(file: &File, path: &std::path::Path) {
    let times = FileTimes::new().set_accessed(SystemTime::now());
    if let Err(err) = file.set_times(times) {
        debug!(path = %path.display(), error = %err, "could not update access time");
    }
}

fn to_utc(time: std::io::Result<SystemTime>, path: &std::path::Path) -> ResfsResult<DateTime<Utc>> {
    time.map(DateTime::<Utc>::from).map_err(|e| ResfsError::from_io(e, path))
}

impl Resource for FileItem {
    fn name(&self) -> String {
        self.node.name()
    }

    fn content_type(&self) -> Option<String> {
        mime_guess::from_path(self.node.name()).first_raw().map(String::from)
    }

    fn kind(&self) -> ResourceKind {
        ResourceKind::Leaf
    }

    fn capabilities(&self) -> ResourceCapabilities {
        ResourceCapabilities::leaf()
    }
}

impl ReadableResource for FileItem {
    type Reader = BufReader<File>;

    fn readable(&self) -> ResfsResult<BufReader<File>> {
        let path = self.path();
        let file = File::open(&path).map_err(|e| ResfsError::from_io(e, &path))?;
        touch_accessed(&file, &path);
        Ok(BufReader::new(file))
    }
}

impl WritableResource for FileItem {
    type Writer = BufWriter<File>;

    fn writable(&self) -> ResfsResult<BufWriter<File>> {
        self.open_for_write(false)
    }
}

impl AppendableResource for FileItem {
    fn appendable(&self) -> ResfsResult<BufWriter<File>> {
        self.open_for_write(true)
    }
}

impl FiniteResource for FileItem {
    fn size(&self) -> ResfsResult<u64> {
        Ok(self.metadata()?.len())
    }
}

impl TimestampedResource for FileItem {
    fn last_modified(&self) -> ResfsResult<DateTime<Utc>> {
        to_utc(self.metadata()?.modified(), &self.path())
    }
}

impl AccessTrackingResource for FileItem {
    fn last_accessed(&self) -> ResfsResult<DateTime<Utc>> {
        to_utc(self.metadata()?.accessed(), &self.path())
    }
}

impl RenameableResource for FileItem {
    fn rename(&self, name: &str) -> ResfsResult<()> {
        FileItem::rename(self, name)
    }
}

impl LocatableResource for FileItem {
    fn uri(&self) -> ResfsResult<Url> {
        FileItem::uri(self)
    }
}

impl DetachableResource for FileItem {
    type Detached = FileItem;

    fn detach(&self) -> FileItem {
        FileItem::detach(self)
    }
}

impl PartialEq for FileItem {
    fn eq(&self, other: &Self) -> bool {
        self.path() == other.path()
    }
}

impl Eq for FileItem {}

impl Hash for FileItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path().hash(state);
    }
}

impl fmt::Debug for FileItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileItem").field("path", &self.path()).finish()
    }
}

impl fmt::Display for FileItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn item(name: &str) -> (tempfile::TempDir, FileItem) {
        let tmp = tempfile::tempdir().unwrap();
        let item = FileItem::new(tmp.path().join(name), Arc::new(FileConfig::default()));
        (tmp, item)
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let (_tmp, item) = item("hello.txt");
        item.write_bytes("hello").unwrap();
        assert_eq!(item.read_bytes().unwrap(), Bytes::from_static(b"hello"));
        assert_eq!(item.size().unwrap(), 5);
    }

    #[test]
    fn test_writable_truncates() {
        let (_tmp, item) = item("t.txt");
        item.write_bytes("longer content").unwrap();
        item.write_bytes("short").unwrap();
        assert_eq!(&item.read_bytes().unwrap()[..], b"short");
    }

    #[test]
    fn test_appendable() {
        let (_tmp, item) = item("log.txt");
        item.write_bytes("one\n").unwrap();
        let mut writer = item.appendable().unwrap();
        writer.write_all(b"two\n").unwrap();
        drop(writer);
        assert_eq!(&item.read_bytes().unwrap()[..], b"one\ntwo\n");
    }

    #[test]
    fn test_writable_creates_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a/b/c.txt");
        let item = FileItem::new(&path, Arc::new(FileConfig::default()));
        item.write_bytes("x").unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let (_tmp, item) = item("missing.txt");
        let err = item.read_bytes().unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn test_read_updates_access_time() {
        let (_tmp, item) = item("atime.txt");
        item.write_bytes("x").unwrap();
        let old = SystemTime::now() - Duration::from_secs(3600);
        File::options()
            .write(true)
            .open(item.path())
            .unwrap()
            .set_times(FileTimes::new().set_accessed(old))
            .unwrap();
        let before = item.last_accessed().unwrap();

        item.read_bytes().unwrap();
        assert!(item.last_accessed().unwrap() > before);
    }

    #[cfg(unix)]
    #[test]
    fn test_read_only_file_is_still_readable() {
        use std::os::unix::fs::PermissionsExt;

        let (_tmp, item) = item("ro.txt");
        item.write_bytes("locked").unwrap();
        fs::set_permissions(item.path(), fs::Permissions::from_mode(0o444)).unwrap();
        assert_eq!(&item.read_bytes().unwrap()[..], b"locked");
    }

    /// Updating times on a file owned by someone else is refused, reading is not.
    #[cfg(unix)]
    #[test]
    fn test_read_survives_refused_access_time_update() {
        use std::os::unix::fs::MetadataExt;

        let foreign = std::path::Path::new("/etc/passwd");
        let Ok(foreign_meta) = fs::metadata(foreign) else {
            return;
        };
        let (_tmp, own) = item("mine.txt");
        own.write_bytes("x").unwrap();
        if fs::metadata(own.path()).unwrap().uid() == foreign_meta.uid() {
            return;
        }
        let refused = File::open(foreign)
            .unwrap()
            .set_times(FileTimes::new().set_accessed(SystemTime::now()))
            .is_err();
        assert!(refused);

        let item = FileItem::new(foreign, Arc::new(FileConfig::default()));
        assert_eq!(item.read_bytes().unwrap().len() as u64, foreign_meta.len());
    }

    #[test]
    fn test_timestamps() {
        let (_tmp, item) = item("ts.txt");
        item.write_bytes("x").unwrap();
        let modified = item.last_modified().unwrap();
        assert!((Utc::now() - modified).num_seconds().abs() < 60);
    }

    #[test]
    fn test_content_type() {
        let (_tmp, txt) = item("notes.txt");
        assert_eq!(txt.content_type().as_deref(), Some("text/plain"));
        let (_tmp, xml) = item("testing.something.xml");
        assert!(xml.content_type().unwrap().contains("xml"));
        let (_tmp, unknown) = item("blob.unknownext");
        assert!(unknown.content_type().is_none());
    }

    #[test]
    fn test_uri() {
        let (tmp, item) = item("u.txt");
        let uri = item.uri().unwrap();
        assert_eq!(uri.scheme(), "file");
        assert_eq!(uri.to_file_path().unwrap(), tmp.path().join("u.txt"));
    }

    #[test]
    fn test_parent_is_synthesized() {
        let (tmp, item) = item("p.txt");
        assert_eq!(item.parent().unwrap().path(), tmp.path());
    }

    #[test]
    fn test_detach() {
        let (_tmp, item) = item("d.txt");
        let detached = item.detach();
        assert!(item.allows_upward());
        assert!(!detached.allows_upward());
        assert!(detached.parent().is_none());
        assert_eq!(detached, item);
    }

    #[test]
    fn test_rename_shared_between_clones() {
        let (tmp, item) = item("before.txt");
        item.write_bytes("x").unwrap();
        let clone = item.clone();

        item.rename("after.txt").unwrap();
        assert_eq!(clone.path(), tmp.path().join("after.txt"));
        assert_eq!(clone.name(), "after.txt");
        assert!(!tmp.path().join("before.txt").exists());
    }

    #[test]
    fn test_rename_missing_file_fails() {
        let (_tmp, item) = item("ghost.txt");
        assert!(matches!(item.rename("other.txt"), Err(ResfsError::IoFailure(_))));
        assert_eq!(item.name(), "ghost.txt");
    }

    #[test]
    fn test_rename_rejects_paths() {
        let (_tmp, item) = item("n.txt");
        item.write_bytes("x").unwrap();
        assert!(matches!(item.rename("../escape"), Err(ResfsError::InvalidName(_))));
    }
}
