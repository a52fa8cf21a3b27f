// SPDX-License-Identifier: AGPL-3.0-or-later
//! Resource capability traits
//!
//! A concrete node implements only the capabilities it supports. Directories
//! are typically containers that can be cached and detached; files are
//! readable, writable, appendable and timestamped.

use chrono::{DateTime, Utc};
use std::io::{Read, Write};
use url::Url;

use crate::{error::ResfsResult, ResourceKind};

/// Resource capabilities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceCapabilities {
    pub list: bool,
    pub manage: bool,
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub size: bool,
    pub timestamps: bool,
    pub access_tracking: bool,
    pub rename: bool,
    pub cache: bool,
    pub detach: bool,
    pub locate: bool,
}

impl ResourceCapabilities {
    pub fn leaf() -> Self {
        Self {
            read: true,
            write: true,
            append: true,
            size: true,
            timestamps: true,
            access_tracking: true,
            rename: true,
            detach: true,
            locate: true,
            ..Default::default()
        }
    }

    pub fn container() -> Self {
        Self {
            list: true,
            manage: true,
            rename: true,
            cache: true,
            detach: true,
            locate: true,
            ..Default::default()
        }
    }
}

/// Base trait for every addressable resource
pub trait Resource: Send + Sync {
    fn name(&self) -> String;
    fn content_type(&self) -> Option<String>;
    fn kind(&self) -> ResourceKind;
    fn capabilities(&self) -> ResourceCapabilities;
}

/// A resource with named children
pub trait ResourceContainer: Resource {
    type Child: Resource;

    /// Look up a single child by name.
    fn child(&self, name: &str) -> ResfsResult<Option<Self::Child>>;

    /// Snapshot of all children. Call again to restart the enumeration.
    fn children(&self) -> ResfsResult<Vec<Self::Child>>;
}

/// A container whose children can be created and removed
pub trait ManageableContainer: ResourceContainer {
    fn create(&self, name: &str, kind: ResourceKind) -> ResfsResult<Self::Child>;
    fn delete(&self, name: &str) -> ResfsResult<()>;
}

pub trait ReadableResource: Resource {
    type Reader: Read + Send;

    fn readable(&self) -> ResfsResult<Self::Reader>;
}

pub trait WritableResource: Resource {
    type Writer: Write + Send;

    /// Open for writing, replacing existing content.
    fn writable(&self) -> ResfsResult<Self::Writer>;
}

pub trait AppendableResource: WritableResource {
    fn appendable(&self) -> ResfsResult<Self::Writer>;
}

pub trait FiniteResource: Resource {
    fn size(&self) -> ResfsResult<u64>;
}

pub trait TimestampedResource: Resource {
    fn last_modified(&self) -> ResfsResult<DateTime<Utc>>;
}

/// Best-effort access tracking
pub trait AccessTrackingResource: Resource {
    fn last_accessed(&self) -> ResfsResult<DateTime<Utc>>;
}

pub trait LocatableResource: Resource {
    fn uri(&self) -> ResfsResult<Url>;
}

pub trait RenameableResource: Resource {
    /// Rename within the same container.
    fn rename(&self, name: &str) -> ResfsResult<()>;
}

/// A container whose child listing is cached in memory
pub trait CacheableResource: Resource {
    fn is_caching(&self) -> bool;

    /// Toggle caching. Does not load anything by itself.
    fn set_caching(&self, enabled: bool);

    /// Force a full reload regardless of the current state.
    fn reset_cache(&self) -> ResfsResult<()>;
}

pub trait DetachableResource: Resource {
    type Detached: Resource;

    /// A standalone handle for the same location that never resolves a parent.
    fn detach(&self) -> Self::Detached;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_disjoint_where_expected() {
        let leaf = ResourceCapabilities::leaf();
        let container = ResourceCapabilities::container();

        assert!(leaf.read && leaf.write && leaf.append);
        assert!(!leaf.list && !leaf.manage && !leaf.cache);

        assert!(container.list && container.manage && container.cache);
        assert!(!container.read && !container.write);

        assert!(leaf.rename && container.rename);
        assert!(leaf.detach && container.detach);
    }

    #[test]
    fn test_default_is_empty() {
        let caps = ResourceCapabilities::default();
        assert_eq!(caps, ResourceCapabilities { ..Default::default() });
        assert!(!caps.read && !caps.list && !caps.locate);
    }
}
