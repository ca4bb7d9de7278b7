#![forbid(unsafe_code)]

//! Data model for a generated documentation site's navigation panel.
//!
//! This crate holds the static data layer: an immutable, arena-backed
//! navigation tree ([`NavTree`]), a sorted URL→path index ([`UrlIndex`])
//! with optional shard boundaries ([`ShardMap`]), and parsers for the
//! generator's raw JSON table format ([`raw`]).
//!
//! All validation is front-loaded: a tree or index that loads
//! successfully can be traversed and searched without further error
//! checks, and is `Send + Sync` for sharing across any number of
//! synchronized views. Selection and expansion state live in the
//! companion `navtree-sync` crate.
//!
//! # Example
//!
//! ```
//! use navtree_model::{NavTree, RawIndex, RawTree, TreePath, UrlIndex};
//!
//! let raw_tree = RawTree::from_json(
//!     r#"[["lib", "index.html", [["Annotated", "annotated.html", null]]]]"#,
//! )?;
//! let tree = NavTree::load(&raw_tree)?;
//!
//! let raw_index = RawIndex::from_json(r#"[["annotated.html", [0]]]"#)?;
//! let index = UrlIndex::load(&raw_index, &tree)?;
//!
//! assert_eq!(index.lookup("annotated.html"), Some(&TreePath::from([0])));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod index;
pub mod path;
pub mod raw;
pub mod tree;

pub use index::{IndexEntry, MalformedIndexError, ShardMap, UrlIndex, split_fragment};
pub use path::TreePath;
pub use raw::{RawChildren, RawIndex, RawNode, RawTree, boundaries_from_json};
pub use tree::{MalformedTreeError, NavNode, NavTree, NodeId, PathOutOfRangeError};
