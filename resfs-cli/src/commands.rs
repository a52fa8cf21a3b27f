// SPDX-License-Identifier: AGPL-3.0-or-later
//! CLI command implementations

use chrono::{DateTime, Utc};
use console::style;
use resfs_core::prelude::*;
use resfs_core::{uri, ResolverRegistry};
use resfs_file::{FileConfig, FileDirectory, FileItem, FileResource};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tabled::{Table, Tabled};

/// Shared state for one CLI invocation
pub struct Context {
    registry: ResolverRegistry<FileResource>,
    config: Arc<FileConfig>,
    cwd: PathBuf,
}

impl Context {
    pub fn new(config: FileConfig) -> ResfsResult<Self> {
        let cwd = std::env::current_dir().map_err(ResfsError::Io)?;
        Ok(Self {
            registry: resfs_file::default_registry(config.clone()),
            config: Arc::new(config),
            cwd,
        })
    }

    /// Resolve a `file:` URI or a local path.
    fn lookup(&self, location: &str) -> ResfsResult<Option<FileResource>> {
        let uri = uri::parse_location(location, &self.cwd)?;
        tracing::debug!(%uri, "resolving");
        self.registry.resolve(&uri)
    }

    fn resolve(&self, location: &str) -> ResfsResult<FileResource> {
        self.lookup(location)?
            .ok_or_else(|| ResfsError::NotFound(location.to_string()))
    }

    fn directory(&self, location: &str) -> ResfsResult<FileDirectory> {
        self.resolve(location)?
            .into_directory()
            .ok_or_else(|| ResfsError::NotADirectory(location.to_string()))
    }

    /// A file that may not exist yet.
    fn item(&self, location: &str) -> ResfsResult<FileItem> {
        match self.lookup(location)? {
            Some(FileResource::Item(item)) => Ok(item),
            Some(FileResource::Directory(_)) => Err(ResfsError::NotAFile(location.to_string())),
            None => {
                let uri = uri::parse_location(location, &self.cwd)?;
                Ok(FileItem::new(uri::uri_to_path(&uri)?, self.config.clone()))
            }
        }
    }
}

/// Format a timestamp for display
fn format_time(dt: Option<DateTime<Utc>>) -> String {
    dt.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Format file size
fn format_size(size: Option<u64>, human: bool) -> String {
    match size {
        Some(s) if human => bytesize::ByteSize(s).to_string(),
        Some(s) => s.to_string(),
        None => "-".to_string(),
    }
}

fn format_kind(kind: ResourceKind) -> String {
    match kind {
        ResourceKind::Container => style("d").cyan().to_string(),
        ResourceKind::Leaf => "-".to_string(),
    }
}

#[derive(Tabled)]
struct LsEntry {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Modified")]
    modified: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl LsEntry {
    fn new(resource: &FileResource, human: bool) -> Self {
        let (size, modified) = match resource {
            FileResource::Item(item) => (item.size().ok(), item.last_modified().ok()),
            FileResource::Directory(_) => (None, None),
        };
        Self {
            kind: format_kind(resource.kind()),
            size: format_size(size, human),
            modified: format_time(modified),
            name: resource.name(),
        }
    }
}

/// List directory contents
pub fn ls(ctx: &Context, path: &str, long: bool, human: bool) -> ResfsResult<()> {
    let dir = ctx.directory(path)?;
    let children = dir.children()?;

    if children.is_empty() {
        println!("(empty directory)");
        return Ok(());
    }

    if long {
        let entries: Vec<LsEntry> = children.iter().map(|c| LsEntry::new(c, human)).collect();
        println!("{}", Table::new(entries));
    } else {
        for child in &children {
            match child {
                FileResource::Directory(_) => println!("{}", style(child.name()).cyan()),
                FileResource::Item(_) => println!("{}", child.name()),
            }
        }
    }
    Ok(())
}

/// Display file contents
pub fn cat(ctx: &Context, path: &str) -> ResfsResult<()> {
    let item = ctx
        .resolve(path)?
        .into_item()
        .ok_or_else(|| ResfsError::NotAFile(path.to_string()))?;
    let mut reader = item.readable()?;
    let mut stdout = io::stdout().lock();
    io::copy(&mut reader, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Write standard input to a file
pub fn put(ctx: &Context, path: &str, append: bool) -> ResfsResult<()> {
    let item = ctx.item(path)?;
    let mut writer = if append { item.appendable()? } else { item.writable()? };
    let written = io::copy(&mut io::stdin().lock(), &mut writer)?;
    writer.flush()?;
    eprintln!("Wrote {} to {}", bytesize::ByteSize(written), item);
    Ok(())
}

/// Create a directory
pub fn mkdir(ctx: &Context, parent: &str, name: &str) -> ResfsResult<()> {
    let created = ctx.directory(parent)?.create(name, ResourceKind::Container)?;
    println!("Created {}", created);
    Ok(())
}

/// Create an empty file
pub fn touch(ctx: &Context, parent: &str, name: &str) -> ResfsResult<()> {
    let created = ctx.directory(parent)?.create(name, ResourceKind::Leaf)?;
    println!("Created {}", created);
    Ok(())
}

/// Remove a child
pub fn rm(ctx: &Context, parent: &str, name: &str) -> ResfsResult<()> {
    let dir = ctx.directory(parent)?;
    dir.delete(name)?;
    println!("Removed {}", dir.path().join(name).display());
    Ok(())
}

/// Rename in place
pub fn mv(ctx: &Context, path: &str, new_name: &str) -> ResfsResult<()> {
    let resource = ctx.resolve(path)?;
    let before = resource.path();
    resource.rename(new_name)?;
    println!("Moved {} -> {}", before.display(), resource);
    Ok(())
}

#[derive(Debug, Serialize)]
struct StatInfo {
    path: PathBuf,
    uri: String,
    kind: ResourceKind,
    content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    accessed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<usize>,
}

impl StatInfo {
    fn collect(resource: &FileResource) -> ResfsResult<Self> {
        let mut info = StatInfo {
            path: resource.path(),
            uri: resource.uri()?.to_string(),
            kind: resource.kind(),
            content_type: resource.content_type(),
            size: None,
            modified: None,
            accessed: None,
            children: None,
        };
        match resource {
            FileResource::Item(item) => {
                info.size = Some(item.size()?);
                info.modified = Some(item.last_modified()?);
                info.accessed = Some(item.last_accessed()?);
            }
            FileResource::Directory(dir) => info.children = Some(dir.children()?.len()),
        }
        Ok(info)
    }
}

/// Show file/directory information
pub fn stat(ctx: &Context, path: &str, json: bool) -> ResfsResult<()> {
    let info = StatInfo::collect(&ctx.resolve(path)?)?;

    if json {
        let text = serde_json::to_string_pretty(&info)
            .map_err(|e| ResfsError::IoFailure(format!("cannot encode stat output: {e}")))?;
        println!("{text}");
        return Ok(());
    }

    println!("  Path: {}", info.path.display());
    println!("  URI: {}", info.uri);
    println!("  Type: {}", info.kind);
    if let Some(content_type) = &info.content_type {
        println!("  Content-Type: {}", content_type);
    }
    if let Some(size) = info.size {
        println!("  Size: {} ({})", size, bytesize::ByteSize(size));
    }
    if let Some(modified) = info.modified {
        println!("  Modified: {}", modified);
    }
    if let Some(accessed) = info.accessed {
        println!("  Accessed: {}", accessed);
    }
    if let Some(children) = info.children {
        println!("  Children: {}", children);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(root: &std::path::Path) -> Context {
        Context {
            registry: resfs_file::default_registry(FileConfig::default()),
            config: Arc::new(FileConfig::default()),
            cwd: root.to_path_buf(),
        }
    }

    #[test]
    fn test_relative_locations_use_cwd() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.txt"), "x").unwrap();
        let ctx = context(tmp.path());

        let found = ctx.resolve("a.txt").unwrap();
        assert!(found.is_item());
        assert!(ctx.resolve("./sub/../a.txt").unwrap().is_item());
        assert!(ctx.resolve("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_kind_checks() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.txt"), "x").unwrap();
        let ctx = context(tmp.path());

        assert!(matches!(ctx.directory("a.txt"), Err(ResfsError::NotADirectory(_))));
        assert!(matches!(ctx.item("."), Err(ResfsError::NotAFile(_))));
        assert_eq!(ctx.item("new.txt").unwrap().path(), tmp.path().join("new.txt"));
    }

    #[test]
    fn test_mkdir_touch_rm_mv() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(tmp.path());

        mkdir(&ctx, ".", "sub").unwrap();
        touch(&ctx, "sub", "f.txt").unwrap();
        assert!(tmp.path().join("sub/f.txt").is_file());

        mv(&ctx, "sub/f.txt", "g.txt").unwrap();
        assert!(tmp.path().join("sub/g.txt").is_file());

        rm(&ctx, ".", "sub").unwrap();
        assert!(!tmp.path().join("sub").exists());
    }

    #[test]
    fn test_stat_json() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("data.json"), "{}").unwrap();
        let ctx = context(tmp.path());

        let info = StatInfo::collect(&ctx.resolve("data.json").unwrap()).unwrap();
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["kind"], "leaf");
        assert_eq!(value["size"], 2);
        assert_eq!(value["content_type"], "application/json");
        assert!(value.get("children").is_none());

        let info = StatInfo::collect(&ctx.resolve(".").unwrap()).unwrap();
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["kind"], "container");
        assert_eq!(value["children"], 1);
    }
}
