//! Raw-table parsing for the generated navigation data format.
//!
//! The generator emits a nested tree table of `[label, url-or-null,
//! children]` triples, a flat index table (pair array or object form),
//! and a boundary-key array for sharded indexes. This module parses
//! those JSON-compatible shapes into dumb carrier structs; semantic
//! validation (target URLs, path cross-checks) happens when the typed
//! model is built from them.

use serde_json::Value;

use crate::index::MalformedIndexError;
use crate::tree::MalformedTreeError;

/// Longest JSON snippet quoted in error messages.
const SNIPPET_LEN: usize = 60;

fn snippet(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= SNIPPET_LEN {
        return text;
    }
    let mut out: String = text.chars().take(SNIPPET_LEN).collect();
    out.push_str("...");
    out
}

// ---------------------------------------------------------------------------
// Tree table
// ---------------------------------------------------------------------------

/// Children field of a raw node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawChildren {
    /// No children (`null`).
    Leaf,
    /// Inline child table.
    Nodes(Vec<RawNode>),
    /// Reference to an externally stored subtree (deferred loading).
    Ref(String),
}

/// One unvalidated `[label, target, children]` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNode {
    pub label: String,
    pub target: Option<String>,
    pub children: RawChildren,
}

/// The unvalidated tree table: exactly one root node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTree {
    pub root: RawNode,
}

impl RawTree {
    /// Wrap a hand-built root node.
    #[must_use]
    pub fn new(root: RawNode) -> Self {
        Self { root }
    }

    /// Parse the outer tree table from JSON text.
    pub fn from_json(text: &str) -> Result<Self, MalformedTreeError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| MalformedTreeError::Json(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Parse the outer tree table from a JSON value.
    ///
    /// The outer value must be an array holding exactly one root triple.
    pub fn from_value(value: &Value) -> Result<Self, MalformedTreeError> {
        let Value::Array(roots) = value else {
            return Err(MalformedTreeError::NotATable {
                found: snippet(value),
            });
        };
        match roots.as_slice() {
            [] => Err(MalformedTreeError::EmptyTable),
            [root] => Ok(Self {
                root: parse_node(root)?,
            }),
            _ => Err(MalformedTreeError::MultipleRoots { count: roots.len() }),
        }
    }
}

fn parse_node(value: &Value) -> Result<RawNode, MalformedTreeError> {
    let Value::Array(triple) = value else {
        return Err(MalformedTreeError::BadNode {
            found: snippet(value),
        });
    };
    let [label, target, children] = triple.as_slice() else {
        return Err(MalformedTreeError::BadNode {
            found: snippet(value),
        });
    };

    let Value::String(label) = label else {
        return Err(MalformedTreeError::BadLabel {
            found: snippet(label),
        });
    };
    let target = match target {
        Value::Null => None,
        Value::String(url) => Some(url.clone()),
        other => {
            return Err(MalformedTreeError::BadTarget {
                label: label.clone(),
                target: snippet(other),
            });
        }
    };
    let children = match children {
        Value::Null => RawChildren::Leaf,
        Value::String(name) => RawChildren::Ref(name.clone()),
        Value::Array(entries) => {
            let mut nodes = Vec::with_capacity(entries.len());
            for entry in entries {
                nodes.push(parse_node(entry)?);
            }
            RawChildren::Nodes(nodes)
        }
        other => {
            return Err(MalformedTreeError::BadChildren {
                label: label.clone(),
                found: snippet(other),
            });
        }
    };

    Ok(RawNode {
        label: label.clone(),
        target,
        children,
    })
}

// ---------------------------------------------------------------------------
// Index table
// ---------------------------------------------------------------------------

/// The unvalidated index table: URL keys with explicit path arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawIndex {
    pub pairs: Vec<(String, Vec<usize>)>,
}

impl RawIndex {
    /// Parse an index table from JSON text.
    pub fn from_json(text: &str) -> Result<Self, MalformedIndexError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| MalformedIndexError::Json(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Parse an index table from a JSON value.
    ///
    /// Accepts either an array of `[url, path-array]` pairs or an object
    /// mapping URL to path array; both round-trip to the same model.
    pub fn from_value(value: &Value) -> Result<Self, MalformedIndexError> {
        match value {
            Value::Array(entries) => {
                let mut pairs = Vec::with_capacity(entries.len());
                for entry in entries {
                    let Value::Array(pair) = entry else {
                        return Err(MalformedIndexError::BadEntry {
                            found: snippet(entry),
                        });
                    };
                    let [Value::String(url), path] = pair.as_slice() else {
                        return Err(MalformedIndexError::BadEntry {
                            found: snippet(entry),
                        });
                    };
                    pairs.push((url.clone(), parse_path(path)?));
                }
                Ok(Self { pairs })
            }
            Value::Object(map) => {
                let mut pairs = Vec::with_capacity(map.len());
                for (url, path) in map {
                    pairs.push((url.clone(), parse_path(path)?));
                }
                Ok(Self { pairs })
            }
            other => Err(MalformedIndexError::NotATable {
                found: snippet(other),
            }),
        }
    }
}

fn parse_path(value: &Value) -> Result<Vec<usize>, MalformedIndexError> {
    let Value::Array(indices) = value else {
        return Err(MalformedIndexError::BadEntry {
            found: snippet(value),
        });
    };
    let mut path = Vec::with_capacity(indices.len());
    for index in indices {
        let parsed = index.as_u64().and_then(|n| usize::try_from(n).ok());
        match parsed {
            Some(n) => path.push(n),
            None => {
                return Err(MalformedIndexError::BadEntry {
                    found: snippet(value),
                });
            }
        }
    }
    Ok(path)
}

/// Parse a shard boundary array (flat array of URL strings) from JSON
/// text. Ordering is validated by [`crate::index::ShardMap::load`].
pub fn boundaries_from_json(text: &str) -> Result<Vec<String>, MalformedIndexError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| MalformedIndexError::Json(e.to_string()))?;
    let Value::Array(entries) = &value else {
        return Err(MalformedIndexError::NotATable {
            found: snippet(&value),
        });
    };
    let mut boundaries = Vec::with_capacity(entries.len());
    for entry in entries {
        let Value::String(url) = entry else {
            return Err(MalformedIndexError::BadEntry {
                found: snippet(entry),
            });
        };
        boundaries.push(url.clone());
    }
    Ok(boundaries)
}
