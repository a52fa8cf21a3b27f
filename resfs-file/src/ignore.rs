// SPDX-License-Identifier: AGPL-3.0-or-later
//! Per-directory ignore lists

use resfs_core::{ResfsError, ResfsResult};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

/// Child names excluded from a directory listing
///
/// One name per line, surrounding whitespace trimmed, blank lines skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    names: HashSet<String>,
}

impl IgnoreList {
    pub fn parse(text: &str) -> Self {
        let names = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        Self { names }
    }

    /// Read the list at `path`. A missing file is an empty list.
    pub fn load(path: &Path) -> ResfsResult<Self> {
        match fs::read(path) {
            Ok(bytes) => Ok(Self::parse(&String::from_utf8_lossy(&bytes))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ResfsError::from_io(err, path)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
