//! Selection state machine synchronizing a tree panel with a content
//! frame.
//!
//! The controller owns the [`Selection`] and reacts to two event
//! sources: the content frame reporting where it navigated, and the
//! tree renderer reporting node activation and expand/collapse clicks.
//! It never calls collaborators back; every event method returns the
//! [`SyncCmd`] values the embedding application should dispatch, in
//! order.
//!
//! The central correctness property is feedback-loop suppression: a
//! `content navigated` event caused by our own `Navigate` command is
//! recognized as a confirmation and does nothing, so the two panels
//! cannot ping-pong.

use std::collections::HashSet;
use std::sync::Arc;

use navtree_model::{NavTree, PathOutOfRangeError, TreePath, UrlIndex};

use crate::resolver::Resolver;

/// Synchronization state of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No selection.
    Idle,
    /// Selection matches the last known content URL.
    Synced,
    /// The index is not attached yet; navigation events are coalesced.
    Pending,
}

/// Instruction for a collaborator, returned from controller methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCmd {
    /// Tree renderer: show the children of the node at this path.
    Expand(TreePath),
    /// Tree renderer: hide the children of the node at this path.
    Collapse(TreePath),
    /// Tree renderer: move the highlight, or clear it with `None`.
    Highlight(Option<TreePath>),
    /// Content view: navigate to this URL.
    Navigate(String),
}

/// Selection state: current highlight plus the set of expanded paths.
///
/// A path in `expanded` means the node it addresses shows its children.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Selection {
    current: Option<TreePath>,
    expanded: HashSet<TreePath>,
}

impl Selection {
    /// The highlighted path, if any.
    #[must_use]
    pub fn current(&self) -> Option<&TreePath> {
        self.current.as_ref()
    }

    /// All expanded paths.
    #[must_use]
    pub fn expanded(&self) -> &HashSet<TreePath> {
        &self.expanded
    }

    /// Whether the node at `path` is expanded.
    #[must_use]
    pub fn is_expanded(&self, path: &TreePath) -> bool {
        self.expanded.contains(path)
    }
}

/// Owner of the selection, driving one tree panel against one content
/// view.
///
/// Tree and index are immutable and shared; several controllers may
/// synchronize independent views of the same tree. All methods take
/// `&mut self`, so single-threaded event dispatch is the only locking
/// required.
#[derive(Debug, Clone)]
pub struct SyncController {
    tree: Arc<NavTree>,
    index: Option<Arc<UrlIndex>>,
    selection: Selection,
    state: SyncState,
    /// Last URL the content view is known to show. Matching incoming
    /// navigation events against it is what breaks the feedback loop.
    last_url: Option<String>,
    /// Newest URL seen while `Pending`; older ones are superseded.
    queued: Option<String>,
    auto_sync: bool,
}

impl SyncController {
    /// Create a controller with tree and index ready.
    #[must_use]
    pub fn new(tree: Arc<NavTree>, index: Arc<UrlIndex>) -> Self {
        Self {
            tree,
            index: Some(index),
            selection: Selection::default(),
            state: SyncState::Idle,
            last_url: None,
            queued: None,
            auto_sync: true,
        }
    }

    /// Create a controller whose index is still loading.
    ///
    /// Starts in [`SyncState::Pending`]; navigation events are coalesced
    /// until [`SyncController::attach_index`] is called.
    #[must_use]
    pub fn deferred(tree: Arc<NavTree>) -> Self {
        Self {
            tree,
            index: None,
            selection: Selection::default(),
            state: SyncState::Pending,
            last_url: None,
            queued: None,
            auto_sync: true,
        }
    }

    /// Current machine state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// The selection this controller owns.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Whether content navigation drives the highlight.
    #[must_use]
    pub fn auto_sync(&self) -> bool {
        self.auto_sync
    }

    /// Enable or disable highlight-follows-content. Node activation
    /// still emits `Navigate` while disabled.
    pub fn set_auto_sync(&mut self, enabled: bool) {
        self.auto_sync = enabled;
    }

    /// Attach a late-loaded index and replay the newest coalesced
    /// navigation event, if any.
    pub fn attach_index(&mut self, index: Arc<UrlIndex>) -> Vec<SyncCmd> {
        self.index = Some(index);
        if self.state == SyncState::Pending {
            self.state = SyncState::Idle;
        }
        match self.queued.take() {
            Some(url) => self.on_content_navigated(&url),
            None => Vec::new(),
        }
    }

    /// The content view navigated to `url`.
    ///
    /// Resolves the URL and expands/highlights the matching path. An
    /// unresolvable URL degrades to "nothing selected": the highlight is
    /// cleared, expanded paths stay as they are.
    pub fn on_content_navigated(&mut self, url: &str) -> Vec<SyncCmd> {
        if !self.auto_sync {
            return Vec::new();
        }
        let Some(index) = self.index.clone() else {
            // Pending: keep only the newest event for replay.
            self.queued = Some(url.to_owned());
            return Vec::new();
        };
        // Confirmation of our own Navigate command.
        if self.state == SyncState::Synced && self.last_url.as_deref() == Some(url) {
            return Vec::new();
        }

        match Resolver::new(&index).resolve(url) {
            Ok(path) => {
                if self.state == SyncState::Synced && self.selection.current.as_ref() == Some(&path)
                {
                    // Same node under a different URL, e.g. another
                    // anchor on the page already shown.
                    self.last_url = Some(url.to_owned());
                    return Vec::new();
                }
                let mut cmds = Vec::new();
                for prefix in path.strict_prefixes() {
                    if self.selection.expanded.insert(prefix.clone()) {
                        cmds.push(SyncCmd::Expand(prefix));
                    }
                }
                #[cfg(feature = "tracing")]
                tracing::debug!(message = "sync.navigated", url, path = %path);
                self.selection.current = Some(path.clone());
                self.last_url = Some(url.to_owned());
                self.state = SyncState::Synced;
                cmds.push(SyncCmd::Highlight(Some(path)));
                cmds
            }
            Err(_unresolved) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(message = "sync.unresolved", url);
                self.selection.current = None;
                self.last_url = None;
                self.state = SyncState::Idle;
                vec![SyncCmd::Highlight(None)]
            }
        }
    }

    /// The user activated the tree node at `path`.
    ///
    /// The user is the source of truth here: the selection is set
    /// directly, with no resolver round-trip. A `Navigate` command is
    /// emitted when the node has a target; grouping nodes just select.
    /// On an out-of-range path the selection is left untouched.
    pub fn on_node_activated(
        &mut self,
        path: &TreePath,
    ) -> Result<Vec<SyncCmd>, PathOutOfRangeError> {
        let node = self.tree.node_at(path)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "sync.activated",
            path = %path,
            target = node.target().unwrap_or("")
        );
        self.selection.current = Some(path.clone());
        self.state = SyncState::Synced;
        match node.target() {
            Some(target) => {
                self.last_url = Some(target.to_owned());
                Ok(vec![SyncCmd::Navigate(target.to_owned())])
            }
            None => {
                self.last_url = None;
                Ok(Vec::new())
            }
        }
    }

    /// The user clicked the expand/collapse control of the node at
    /// `path`.
    ///
    /// Pure UI state: flips membership in the expanded set, answers with
    /// the matching renderer instruction, and returns the new expanded
    /// state. The highlight and machine state are unaffected.
    pub fn on_node_toggled(&mut self, path: &TreePath) -> Result<Vec<SyncCmd>, PathOutOfRangeError> {
        self.tree.node_at(path)?;
        let expanded = if self.selection.expanded.remove(path) {
            false
        } else {
            self.selection.expanded.insert(path.clone());
            true
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "sync.toggle",
            path = %path,
            action = if expanded { "expand" } else { "collapse" }
        );
        let cmd = if expanded {
            SyncCmd::Expand(path.clone())
        } else {
            SyncCmd::Collapse(path.clone())
        };
        Ok(vec![cmd])
    }

    /// Reset on view teardown: drop the whole selection and clear the
    /// highlight. Does not detach the index.
    pub fn reset(&mut self) -> Vec<SyncCmd> {
        self.selection = Selection::default();
        self.last_url = None;
        self.queued = None;
        self.state = if self.index.is_some() {
            SyncState::Idle
        } else {
            SyncState::Pending
        };
        vec![SyncCmd::Highlight(None)]
    }
}
