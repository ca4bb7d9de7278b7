//! Arena-backed navigation tree store.
//!
//! All nodes live in a flat arena inside [`NavTree`]; children reference
//! later-allocated slots by [`NodeId`], so the structure is acyclic by
//! construction. The tree is built once by [`NavTree::load`] and never
//! mutated afterwards — expansion and selection state live in the sync
//! layer, which keeps a single tree shareable across any number of views.

use std::fmt;

use url::Url;

use crate::path::TreePath;
use crate::raw::{RawChildren, RawNode, RawTree};

/// Base used only to exercise relative-URL joining during validation.
const VALIDATION_BASE: &str = "https://docs.invalid/";

/// Identifier of a node slot in a [`NavTree`] arena.
///
/// Only meaningful for the tree that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The arena slot index.
    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Load-time and traversal errors
// ---------------------------------------------------------------------------

/// Errors rejecting a malformed raw tree table at load time.
///
/// These are fatal: the component cannot initialize from bad data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedTreeError {
    /// The raw data is not valid JSON.
    Json(String),
    /// A value expected to be a node table is not an array.
    NotATable { found: String },
    /// The outer table contains no root node.
    EmptyTable,
    /// The outer table contains more than one root node.
    MultipleRoots { count: usize },
    /// A node entry is not a `[label, target, children]` triple.
    BadNode { found: String },
    /// A node label is missing or not a string.
    BadLabel { found: String },
    /// A node target is neither null nor a well-formed relative URL.
    BadTarget { label: String, target: String },
    /// A children field is not null, a table, or a reference string.
    BadChildren { label: String, found: String },
}

impl fmt::Display for MalformedTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "tree table is not valid JSON: {msg}"),
            Self::NotATable { found } => {
                write!(f, "expected a node table (array), found {found}")
            }
            Self::EmptyTable => write!(f, "tree table contains no root node"),
            Self::MultipleRoots { count } => {
                write!(f, "tree table contains {count} root nodes, expected 1")
            }
            Self::BadNode { found } => {
                write!(f, "node entry is not a [label, target, children] triple: {found}")
            }
            Self::BadLabel { found } => write!(f, "node label is not a string: {found}"),
            Self::BadTarget { label, target } => {
                write!(f, "node {label:?} has a malformed relative URL target: {target:?}")
            }
            Self::BadChildren { label, found } => {
                write!(f, "node {label:?} has malformed children: {found}")
            }
        }
    }
}

impl std::error::Error for MalformedTreeError {}

/// A tree path indexed past the children of some node along the walk.
///
/// This is an integration error: a correctly wired renderer only hands
/// back paths it was given, so hitting it means the caller and the tree
/// disagree about the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathOutOfRangeError {
    /// The full path that failed to resolve.
    pub path: TreePath,
    /// Depth at which the walk failed (0 = child of the root).
    pub depth: usize,
    /// The offending child index.
    pub index: usize,
    /// Number of children actually present at that level.
    pub len: usize,
}

impl fmt::Display for PathOutOfRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "path {} out of range at depth {}: child index {} but node has {} children",
            self.path, self.depth, self.index, self.len
        )
    }
}

impl std::error::Error for PathOutOfRangeError {}

// ---------------------------------------------------------------------------
// Nodes and tree
// ---------------------------------------------------------------------------

/// A single navigation entry: label, optional link target, children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavNode {
    label: String,
    target: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    children_ref: Option<String>,
}

impl NavNode {
    /// The display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The relative URL this node navigates to, or `None` for a pure
    /// grouping node.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Child node ids in document order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The parent node id; `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Name of an externally stored subtree standing in for children.
    ///
    /// Nodes carrying a reference are leaves until the embedding
    /// application loads the referenced table.
    #[must_use]
    pub fn children_ref(&self) -> Option<&str> {
        self.children_ref.as_deref()
    }

    /// Whether this node is non-navigable (no target).
    #[must_use]
    pub fn is_grouping(&self) -> bool {
        self.target.is_none()
    }
}

/// Immutable navigation tree over an arena of [`NavNode`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavTree {
    nodes: Vec<NavNode>,
}

impl NavTree {
    /// Build a tree from a parsed raw table.
    ///
    /// Rejects any node whose target is neither null nor a well-formed
    /// relative URL. Shape errors are caught earlier, when the raw table
    /// is parsed.
    pub fn load(raw: &RawTree) -> Result<Self, MalformedTreeError> {
        let mut nodes = Vec::new();
        Self::push_node(&mut nodes, &raw.root, None)?;
        Ok(Self { nodes })
    }

    fn push_node(
        nodes: &mut Vec<NavNode>,
        raw: &RawNode,
        parent: Option<NodeId>,
    ) -> Result<NodeId, MalformedTreeError> {
        if let Some(target) = &raw.target
            && !is_well_formed_relative(target)
        {
            return Err(MalformedTreeError::BadTarget {
                label: raw.label.clone(),
                target: target.clone(),
            });
        }

        let id = NodeId(nodes.len());
        let children_ref = match &raw.children {
            RawChildren::Ref(name) => Some(name.clone()),
            RawChildren::Leaf | RawChildren::Nodes(_) => None,
        };
        nodes.push(NavNode {
            label: raw.label.clone(),
            target: raw.target.clone(),
            parent,
            children: Vec::new(),
            children_ref,
        });

        if let RawChildren::Nodes(raw_children) = &raw.children {
            let mut children = Vec::with_capacity(raw_children.len());
            for child in raw_children {
                children.push(Self::push_node(nodes, child, Some(id))?);
            }
            nodes[id.0].children = children;
        }
        Ok(id)
    }

    /// The root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Look up a node by id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&NavNode> {
        self.nodes.get(id.0)
    }

    /// Total number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A loaded tree always holds at least the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Child ids of a node; empty for leaves and unknown ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id) {
            Some(node) => node.children(),
            None => &[],
        }
    }

    /// Parent id of a node; `None` for the root and unknown ids.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(NavNode::parent)
    }

    /// Whether a node has no children.
    #[must_use]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.children(id).is_empty()
    }

    /// Resolve a path to a node id by walking children from the root.
    pub fn node_id_at(&self, path: &TreePath) -> Result<NodeId, PathOutOfRangeError> {
        let mut current = self.root();
        for (depth, &index) in path.indices().iter().enumerate() {
            let children = self.children(current);
            match children.get(index) {
                Some(&child) => current = child,
                None => {
                    return Err(PathOutOfRangeError {
                        path: path.clone(),
                        depth,
                        index,
                        len: children.len(),
                    });
                }
            }
        }
        Ok(current)
    }

    /// Resolve a path to a node by walking children from the root.
    pub fn node_at(&self, path: &TreePath) -> Result<&NavNode, PathOutOfRangeError> {
        let id = self.node_id_at(path)?;
        Ok(&self.nodes[id.0])
    }

    /// Compute the path of a node by walking parent links to the root.
    ///
    /// Returns `None` for ids this tree did not mint.
    #[must_use]
    pub fn path_of(&self, id: NodeId) -> Option<TreePath> {
        self.get(id)?;
        let mut indices = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let position = self
                .children(parent)
                .iter()
                .position(|&child| child == current)?;
            indices.push(position);
            current = parent;
        }
        indices.reverse();
        Some(TreePath::new(indices))
    }
}

/// A target must join onto a base as a relative reference and must not
/// itself be an absolute URL.
fn is_well_formed_relative(target: &str) -> bool {
    if target.is_empty()
        || target
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
    {
        return false;
    }
    // Absolute URLs (anything with a scheme) are not relative targets.
    if Url::parse(target).is_ok() {
        return false;
    }
    let Ok(base) = Url::parse(VALIDATION_BASE) else {
        return false;
    };
    base.join(target).is_ok()
}
