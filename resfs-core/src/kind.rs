// SPDX-License-Identifier: AGPL-3.0-or-later
//! Resource kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Content type reported by every container resource.
pub const CONTENT_TYPE_DIRECTORY: &str = "application/directory";

/// Resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Content-bearing resource (a file)
    Leaf,
    /// Resource holding named children (a directory)
    Container,
}

impl ResourceKind {
    /// The directory content type creates a container, anything else a leaf.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type == CONTENT_TYPE_DIRECTORY {
            ResourceKind::Container
        } else {
            ResourceKind::Leaf
        }
    }

    pub fn is_leaf(&self) -> bool {
        *self == ResourceKind::Leaf
    }

    pub fn is_container(&self) -> bool {
        *self == ResourceKind::Container
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Leaf => write!(f, "leaf"),
            ResourceKind::Container => write!(f, "container"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_content_type() {
        assert_eq!(
            ResourceKind::from_content_type(CONTENT_TYPE_DIRECTORY),
            ResourceKind::Container
        );
        assert_eq!(ResourceKind::from_content_type("text/plain"), ResourceKind::Leaf);
        assert_eq!(ResourceKind::from_content_type(""), ResourceKind::Leaf);
    }

    #[test]
    fn test_display() {
        assert_eq!(ResourceKind::Leaf.to_string(), "leaf");
        assert_eq!(ResourceKind::Container.to_string(), "container");
        assert!(ResourceKind::Leaf.is_leaf());
        assert!(!ResourceKind::Leaf.is_container());
    }
}
