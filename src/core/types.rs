//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`TierKind`] - Which of the two tiers a request targets
//! - [`TreePath`] - Validated absolute path into the source tree
//!
//! # Validation
//!
//! Paths enforce validity at construction time. Child segments come from
//! tier listings and are checked before they are ever joined onto a path.
//!
//! # Examples
//!
//! ```
//! use tiercheck::core::types::{TierKind, TreePath};
//!
//! let root = TreePath::new("/source").unwrap();
//! let project = root.child("apache").unwrap();
//! assert_eq!(project.as_str(), "/source/apache");
//! assert_eq!(project.meta().as_str(), "/source/apache/_meta");
//! assert_eq!(TierKind::Backend.to_string(), "backend");
//!
//! assert!(TreePath::new("source").is_err());
//! assert!(root.child("a/b").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the metadata document below every node.
pub const META_SEGMENT: &str = "_meta";

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid tree path: {0}")]
    InvalidPath(String),

    #[error("invalid entry name: {0}")]
    InvalidName(String),
}

/// One of the two independently queried views of the metadata tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    /// The front-end API layer. Authoritative for traversal and round trips.
    Api,
    /// The backend storage layer.
    Backend,
}

impl TierKind {
    /// The tier on the other side of a comparison.
    pub fn other(self) -> Self {
        match self {
            TierKind::Api => TierKind::Backend,
            TierKind::Backend => TierKind::Api,
        }
    }
}

impl std::fmt::Display for TierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TierKind::Api => write!(f, "api"),
            TierKind::Backend => write!(f, "backend"),
        }
    }
}

/// A validated absolute path into the source tree.
///
/// Paths start with `/`, have no empty segments, and never end with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TreePath(String);

impl TreePath {
    /// Create a new validated path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPath` if the path is not absolute or
    /// contains empty segments.
    pub fn new(path: impl Into<String>) -> Result<Self, TypeError> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(TypeError::InvalidPath(format!(
                "'{}' must start with '/'",
                path
            )));
        }
        if path.len() > 1 && path.ends_with('/') {
            return Err(TypeError::InvalidPath(format!(
                "'{}' must not end with '/'",
                path
            )));
        }
        if path.len() > 1 && path[1..].split('/').any(str::is_empty) {
            return Err(TypeError::InvalidPath(format!(
                "'{}' contains an empty segment",
                path
            )));
        }
        Ok(Self(path))
    }

    /// Join a single child entry onto this path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidName` if `name` is not a single segment.
    pub fn child(&self, name: &str) -> Result<Self, TypeError> {
        validate_name(name)?;
        if self.0 == "/" {
            Ok(Self(format!("/{}", name)))
        } else {
            Ok(Self(format!("{}/{}", self.0, name)))
        }
    }

    /// The metadata document path below this node.
    pub fn meta(&self) -> Self {
        if self.0 == "/" {
            Self(format!("/{}", META_SEGMENT))
        } else {
            Self(format!("{}/{}", self.0, META_SEGMENT))
        }
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Check that a listing entry name is usable as a single path segment.
///
/// # Errors
///
/// Returns `TypeError::InvalidName` for empty names, names containing `/`,
/// and the relative segments `.` and `..`.
pub fn validate_name(name: &str) -> Result<(), TypeError> {
    if name.is_empty() {
        return Err(TypeError::InvalidName("entry name cannot be empty".into()));
    }
    if name.contains('/') {
        return Err(TypeError::InvalidName(format!(
            "'{}' cannot contain '/'",
            name
        )));
    }
    if name == "." || name == ".." {
        return Err(TypeError::InvalidName(format!(
            "'{}' is a relative segment",
            name
        )));
    }
    Ok(())
}

impl TryFrom<String> for TreePath {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TreePath> for String {
    fn from(path: TreePath) -> Self {
        path.0
    }
}

impl std::fmt::Display for TreePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TreePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
