// SPDX-License-Identifier: AGPL-3.0-or-later
//! resfs Core
//!
//! Capability traits, types, and abstractions shared by every resource backend.

pub mod error;
pub mod kind;
pub mod registry;
pub mod resource;
pub mod uri;

pub use error::{ResfsError, ResfsResult};
pub use kind::{ResourceKind, CONTENT_TYPE_DIRECTORY};
pub use registry::{ResolverRegistry, ResourceResolver};
pub use resource::ResourceCapabilities;

/// All capability traits, for glob import by backends and callers.
pub mod prelude {
    pub use crate::resource::{
        AccessTrackingResource, AppendableResource, CacheableResource, DetachableResource,
        FiniteResource, LocatableResource, ManageableContainer, ReadableResource,
        RenameableResource, Resource, ResourceContainer, TimestampedResource, WritableResource,
    };
    pub use crate::{ResfsError, ResfsResult, ResourceKind};
}
