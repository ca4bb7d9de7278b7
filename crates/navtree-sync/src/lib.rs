#![forbid(unsafe_code)]

//! Panel synchronization for a documentation navigation tree.
//!
//! Built on `navtree-model`, this crate maps content-frame URLs onto
//! tree paths ([`Resolver`]) and runs the selection state machine
//! ([`SyncController`]) that keeps a tree panel and a content view
//! consistent without feedback loops. Controller methods return
//! [`SyncCmd`] instructions for the embedding application to dispatch to
//! its renderer and content view.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use navtree_model::{NavTree, RawIndex, RawTree, TreePath, UrlIndex};
//! use navtree_sync::{SyncCmd, SyncController};
//!
//! let tree = Arc::new(NavTree::load(&RawTree::from_json(
//!     r#"[["lib", "index.html", [["Annotated", "annotated.html", null]]]]"#,
//! )?)?);
//! let index = Arc::new(UrlIndex::load(
//!     &RawIndex::from_json(r#"[["annotated.html", [0]], ["index.html", []]]"#)?,
//!     &tree,
//! )?);
//!
//! let mut controller = SyncController::new(tree, index);
//! let cmds = controller.on_content_navigated("annotated.html");
//! assert_eq!(cmds.last(), Some(&SyncCmd::Highlight(Some(TreePath::from([0])))));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod controller;
pub mod resolver;

pub use controller::{Selection, SyncCmd, SyncController, SyncState};
pub use resolver::{Resolver, UnresolvedUrlError};
