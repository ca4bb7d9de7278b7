//! Tree paths: child-index sequences addressing a node from the root.
//!
//! A [`TreePath`] identifies a node by the sequence of zero-based child
//! positions walked from the root. The empty path is the root itself.
//! Ordering is lexicographic over the index sequence, so a parent always
//! sorts before its descendants.

use std::fmt;

/// A path from the root of a navigation tree to one of its nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TreePath(Vec<usize>);

impl TreePath {
    /// The root path (empty index sequence).
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Create a path from a sequence of child indices.
    #[must_use]
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// The child indices, root-first.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Number of indices (depth below the root).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The path of the parent node, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        match self.0.split_last() {
            Some((_, rest)) => Some(Self(rest.to_vec())),
            None => None,
        }
    }

    /// Extend the path by one child index.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Whether `prefix` is a (not necessarily strict) prefix of this path.
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// All strict prefixes, shortest first: the root path, then each
    /// ancestor down to (but excluding) the path itself.
    ///
    /// The root path yields nothing.
    pub fn strict_prefixes(&self) -> impl Iterator<Item = TreePath> + '_ {
        (0..self.0.len()).map(|len| Self(self.0[..len].to_vec()))
    }
}

impl From<Vec<usize>> for TreePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl From<&[usize]> for TreePath {
    fn from(indices: &[usize]) -> Self {
        Self(indices.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for TreePath {
    fn from(indices: [usize; N]) -> Self {
        Self(indices.to_vec())
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, idx) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{idx}")?;
        }
        Ok(())
    }
}
