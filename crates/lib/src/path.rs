//! Logical tree addresses for the field namespace.
//!
//! This module provides the path type used to address nodes in the logical
//! field tree. Paths are slash-separated, either absolute (`/header/len`) or
//! relative (`items/0`, `../peer`), and always held in normal form.
//!
//! # Normal form
//!
//! * Absolute paths start with `/`; the root itself is `/`.
//! * `.` segments are elided.
//! * `..` collapses against the preceding segment when one exists; leading
//!   `..` segments survive in relative paths and vanish at the root.
//! * An empty relative path becomes `.`.
//!
//! # Usage
//!
//! ```rust
//! use bitweave::path::NodePath;
//!
//! let header = NodePath::from("/header");
//! let len = header.combine(&NodePath::from("len"));
//! assert_eq!(len.to_string(), "/header/len");
//! assert_eq!(len.parent(), header);
//! assert_eq!(NodePath::from("/a/b/../c").to_string(), "/a/c");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for path operations that require matching path kinds.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The operation needs both paths to be absolute or both relative.
    #[error("path kinds do not match: '{left}' and '{right}'")]
    KindMismatch { left: String, right: String },
}

/// An immutable, normalized address into the logical field tree.
///
/// Equality and hashing operate on the normalized string form. Ordering is
/// lexicographic over segments with the separator ranking below any segment
/// character, so `/a/b` sorts before `/ab`. Comparing an absolute path with a
/// relative one is an error; [`NodePath::try_cmp`] surfaces it and the
/// `PartialOrd` impl yields `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NodePath {
    inner: String,
}

impl NodePath {
    /// The absolute root path `/`.
    pub fn root() -> Self {
        Self { inner: "/".into() }
    }

    /// The empty relative path `.`.
    pub fn current() -> Self {
        Self { inner: ".".into() }
    }

    /// Normalizes an arbitrary path string.
    ///
    /// Never fails: redundant separators and `.` segments are dropped, `..`
    /// collapses where a parent exists, and an empty relative result becomes
    /// `.`.
    pub fn parse(raw: impl AsRef<str>) -> Self {
        let raw = raw.as_ref();
        let absolute = raw.starts_with('/');
        let mut segments: Vec<&str> = Vec::new();

        for segment in raw.split('/') {
            match segment {
                "" | "." => {}
                ".." => match segments.last() {
                    Some(&last) if last != ".." => {
                        segments.pop();
                    }
                    Some(_) => segments.push(".."),
                    // The root has no parent to pop into.
                    None if absolute => {}
                    None => segments.push(".."),
                },
                segment => segments.push(segment),
            }
        }

        let inner = if absolute {
            format!("/{}", segments.join("/"))
        } else if segments.is_empty() {
            ".".to_string()
        } else {
            segments.join("/")
        };

        Self { inner }
    }

    /// Returns `true` if this path starts at the tree root.
    pub fn is_absolute(&self) -> bool {
        self.inner.starts_with('/')
    }

    /// Returns `true` if this path is exactly the root `/`.
    pub fn is_root(&self) -> bool {
        self.inner == "/"
    }

    /// Returns an iterator over the path segments.
    ///
    /// The root and the empty relative path yield no segments.
    pub fn segments(&self) -> impl DoubleEndedIterator<Item = &str> {
        let trimmed = match self.inner.as_str() {
            "/" | "." => "",
            s => s.strip_prefix('/').unwrap_or(s),
        };
        trimmed.split('/').filter(|s| !s.is_empty())
    }

    /// Returns the number of segments in the path.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Returns the last segment, or `None` for the root and for `.`.
    pub fn node_name(&self) -> Option<&str> {
        self.segments().next_back()
    }

    /// Returns the path as a string slice in normal form.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Joins `other` onto this path.
    ///
    /// An absolute `other` replaces this path entirely; a relative `other`
    /// is appended and the result re-normalized, so `..` segments in `other`
    /// walk up through `self`.
    pub fn combine(&self, other: &NodePath) -> NodePath {
        if other.is_absolute() {
            other.clone()
        } else {
            Self::parse(format!("{}/{}", self.inner, other.inner))
        }
    }

    /// Returns the parent path.
    ///
    /// The parent of the root is the root. For relative paths the parent
    /// walks upward, so the parent of `.` is `..`.
    pub fn parent(&self) -> NodePath {
        self.combine(&NodePath::parse(".."))
    }

    /// Returns the longest shared prefix of two paths of the same kind.
    ///
    /// For two absolute paths the result is at least `/`; for two relative
    /// paths it is at least `.`.
    pub fn common_prefix(&self, other: &NodePath) -> Result<NodePath, PathError> {
        self.require_same_kind(other)?;
        let shared: Vec<&str> = self
            .segments()
            .zip(other.segments())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a)
            .collect();

        Ok(if self.is_absolute() {
            Self::parse(format!("/{}", shared.join("/")))
        } else {
            Self::parse(shared.join("/"))
        })
    }

    /// Returns the relative path that leads from `self` to `target`.
    ///
    /// Both paths must be of the same kind. The result satisfies
    /// `self.combine(&self.relative_to(&target)?) == target`.
    pub fn relative_to(&self, target: &NodePath) -> Result<NodePath, PathError> {
        let common = self.common_prefix(target)?;
        let ups = self.depth() - common.depth();

        let mut segments: Vec<&str> = Vec::with_capacity(ups + target.depth());
        segments.extend(std::iter::repeat_n("..", ups));
        segments.extend(target.segments().skip(common.depth()));

        Ok(Self::parse(segments.join("/")))
    }

    /// Compares two paths of the same kind.
    ///
    /// Lexicographic over segments, separator lowest. Comparing across kinds
    /// fails with [`PathError::KindMismatch`].
    pub fn try_cmp(&self, other: &NodePath) -> Result<Ordering, PathError> {
        self.require_same_kind(other)?;
        Ok(self.segments().cmp(other.segments()))
    }

    fn require_same_kind(&self, other: &NodePath) -> Result<(), PathError> {
        if self.is_absolute() != other.is_absolute() {
            return Err(PathError::KindMismatch {
                left: self.inner.clone(),
                right: other.inner.clone(),
            });
        }
        Ok(())
    }
}

impl PartialOrd for NodePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NodePath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for NodePath {
    fn from(s: String) -> Self {
        Self::parse(s)
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.inner
    }
}

impl FromStr for NodePath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl AsRef<str> for NodePath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}
