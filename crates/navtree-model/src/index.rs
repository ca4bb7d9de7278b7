//! Flat URL→path index over a navigation tree.
//!
//! The index maps canonical URLs (page plus optional `#fragment`) to tree
//! paths. Entries are held sorted strictly increasing by URL so exact
//! lookup is a binary search and the resolver's page-prefix fallback is a
//! `partition_point`. Every path is cross-checked against the tree at
//! load time — a bad entry fails initialization, never a later lookup.

use std::fmt;

use crate::path::TreePath;
use crate::raw::RawIndex;
use crate::tree::{NavTree, PathOutOfRangeError};

/// Split a URL into its page portion and optional fragment.
///
/// Splits at the first `#`; the fragment excludes the `#` itself.
#[must_use]
pub fn split_fragment(url: &str) -> (&str, Option<&str>) {
    match url.split_once('#') {
        Some((page, fragment)) => (page, Some(fragment)),
        None => (url, None),
    }
}

// ---------------------------------------------------------------------------
// Load-time errors
// ---------------------------------------------------------------------------

/// Errors rejecting a malformed raw index table at load time.
///
/// These are fatal: duplicates and dangling paths indicate a build
/// inconsistency in the generated data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedIndexError {
    /// The raw data is not valid JSON.
    Json(String),
    /// The index value is neither a pair array nor an object.
    NotATable { found: String },
    /// An entry is not a `[url, path-array]` pair with integer indices.
    BadEntry { found: String },
    /// The same URL appears more than once.
    DuplicateUrl { url: String },
    /// An entry's path does not resolve against the supplied tree.
    InvalidPath {
        url: String,
        source: PathOutOfRangeError,
    },
    /// A shard boundary list is empty.
    EmptyBoundaries,
    /// Shard boundaries are not strictly increasing.
    UnsortedBoundaries { at: usize },
}

impl fmt::Display for MalformedIndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "index table is not valid JSON: {msg}"),
            Self::NotATable { found } => {
                write!(f, "expected an index table (pair array or object), found {found}")
            }
            Self::BadEntry { found } => {
                write!(f, "index entry is not a [url, path] pair: {found}")
            }
            Self::DuplicateUrl { url } => write!(f, "duplicate index url: {url:?}"),
            Self::InvalidPath { url, source } => {
                write!(f, "index entry {url:?} does not resolve: {source}")
            }
            Self::EmptyBoundaries => write!(f, "shard boundary list is empty"),
            Self::UnsortedBoundaries { at } => {
                write!(f, "shard boundaries not strictly increasing at position {at}")
            }
        }
    }
}

impl std::error::Error for MalformedIndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPath { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Entries and index
// ---------------------------------------------------------------------------

/// One URL→path mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct IndexEntry {
    url: String,
    path: TreePath,
}

impl IndexEntry {
    /// The canonical URL key (page plus optional fragment).
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The page portion of the key (fragment stripped).
    #[must_use]
    pub fn page(&self) -> &str {
        split_fragment(&self.url).0
    }

    /// The tree path this URL maps to.
    #[must_use]
    pub fn path(&self) -> &TreePath {
        &self.path
    }
}

/// Sorted, validated URL index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlIndex {
    entries: Vec<IndexEntry>,
}

impl UrlIndex {
    /// Build an index from a parsed raw table, cross-checking every path
    /// against `tree`.
    ///
    /// Input order is not trusted: entries are sorted here, then
    /// duplicates rejected as adjacent equal keys.
    pub fn load(raw: &RawIndex, tree: &NavTree) -> Result<Self, MalformedIndexError> {
        Self::from_pairs(raw.pairs.iter().cloned(), tree)
    }

    /// Build an index by concatenating raw shard tables.
    ///
    /// Same validation as [`UrlIndex::load`]; a URL duplicated across
    /// shards is rejected like any other duplicate.
    pub fn load_shards(shards: &[RawIndex], tree: &NavTree) -> Result<Self, MalformedIndexError> {
        Self::from_pairs(
            shards.iter().flat_map(|shard| shard.pairs.iter().cloned()),
            tree,
        )
    }

    fn from_pairs(
        pairs: impl Iterator<Item = (String, Vec<usize>)>,
        tree: &NavTree,
    ) -> Result<Self, MalformedIndexError> {
        let mut entries: Vec<IndexEntry> = pairs
            .map(|(url, indices)| IndexEntry {
                url,
                path: TreePath::new(indices),
            })
            .collect();
        entries.sort_by(|a, b| a.url.cmp(&b.url));

        for pair in entries.windows(2) {
            if pair[0].url == pair[1].url {
                return Err(MalformedIndexError::DuplicateUrl {
                    url: pair[0].url.clone(),
                });
            }
        }
        for entry in &entries {
            if let Err(source) = tree.node_at(&entry.path) {
                return Err(MalformedIndexError::InvalidPath {
                    url: entry.url.clone(),
                    source,
                });
            }
        }
        Ok(Self { entries })
    }

    /// Exact-match lookup of a full URL key.
    #[must_use]
    pub fn lookup(&self, url: &str) -> Option<&TreePath> {
        self.entries
            .binary_search_by(|entry| entry.url.as_str().cmp(url))
            .ok()
            .map(|i| &self.entries[i].path)
    }

    /// The entry with the smallest full key that is ≥ `page` and whose
    /// page portion equals `page`.
    ///
    /// This is the resolver's tie-break primitive: for a page with only
    /// anchored entries it deterministically picks the first one in key
    /// order.
    #[must_use]
    pub fn first_for_page(&self, page: &str) -> Option<&IndexEntry> {
        let start = self
            .entries
            .partition_point(|entry| entry.url.as_str() < page);
        if let Some(entry) = self.entries.get(start)
            && entry.url == page
        {
            return Some(entry);
        }
        // Keys sharing the page are either the bare page or `page#...`,
        // but unrelated keys with a byte below '#' after the page prefix
        // sort in between, so jump directly to the anchored range.
        let anchored = format!("{page}#");
        let start = self
            .entries
            .partition_point(|entry| entry.url.as_str() < anchored.as_str());
        let entry = self.entries.get(start)?;
        (entry.page() == page).then_some(entry)
    }

    /// All entries, sorted strictly increasing by URL.
    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Shard map
// ---------------------------------------------------------------------------

/// Boundary keys delimiting the chunks of a sharded index.
///
/// Boundary `i` is the first URL key stored in shard `i`; a URL lives in
/// the shard whose boundary is the largest one ≤ the URL (predecessor
/// search). Mirrors the top-level boundary array emitted next to chunked
/// index files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardMap {
    boundaries: Vec<String>,
}

impl ShardMap {
    /// Validate and wrap a boundary list.
    ///
    /// Must be non-empty and strictly increasing.
    pub fn load(boundaries: Vec<String>) -> Result<Self, MalformedIndexError> {
        if boundaries.is_empty() {
            return Err(MalformedIndexError::EmptyBoundaries);
        }
        for (i, pair) in boundaries.windows(2).enumerate() {
            if pair[0] >= pair[1] {
                return Err(MalformedIndexError::UnsortedBoundaries { at: i + 1 });
            }
        }
        Ok(Self { boundaries })
    }

    /// Index of the shard whose key range contains `url`, or `None` when
    /// `url` sorts before the first boundary.
    #[must_use]
    pub fn shard_for(&self, url: &str) -> Option<usize> {
        let after = self
            .boundaries
            .partition_point(|boundary| boundary.as_str() <= url);
        after.checked_sub(1)
    }

    /// Number of shards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    /// A loaded shard map is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// The boundary keys, strictly increasing.
    #[must_use]
    pub fn boundaries(&self) -> &[String] {
        &self.boundaries
    }
}
