// SPDX-License-Identifier: AGPL-3.0-or-later
//! Filesystem resources for resfs
//!
//! Exposes local directories and files as resources. Directories keep a lazily
//! loaded, mutation-aware cache of their children so that repeated lookups do
//! not pay for a full directory listing.

mod config;
mod directory;
mod ignore;
mod item;
mod node;
mod resolver;
mod resource;

pub use config::FileConfig;
pub use directory::FileDirectory;
pub use ignore::IgnoreList;
pub use item::FileItem;
pub use resolver::FileResourceResolver;
pub use resource::FileResource;

use resfs_core::ResolverRegistry;
use std::sync::Arc;

/// Registry with the `file` scheme already registered.
pub fn default_registry(config: FileConfig) -> ResolverRegistry<FileResource> {
    let mut registry = ResolverRegistry::new();
    registry.register(Arc::new(FileResourceResolver::new(config)));
    registry
}
