// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree type: node lifetime, accessors, property updates, and traversal.

use kurbo::Affine;
use log::debug;
use smallvec::{SmallVec, smallvec};

use crate::group::{GroupSink, NoGroups};
use crate::list::{DisplayList, SubtreeView};
use crate::node::{Arena, Links, StageState};
use crate::types::{DisplayEntry, GroupId, LocalNode, NodeFlags, NodeId};

/// A scene graph of display nodes with a flattened display list.
///
/// Every node is owned by the tree and addressed by a generational
/// [`NodeId`]. Alongside the parent/children hierarchy the tree maintains a
/// doubly linked display list that visits every node of a subtree in render
/// (preorder) order, so renderers can walk a scene linearly. The structural
/// edits in this type repair both representations before returning.
///
/// The type parameter `S` receives batching-group membership changes. It
/// defaults to [`NoGroups`], so most callers can simply use [`Tree`] without
/// specifying `S`.
///
/// ## Example
///
/// ```rust
/// use understory_display_tree::{DisplayEntry, LocalNode, Tree};
///
/// let mut tree = Tree::new();
/// let stage = tree.create_stage(LocalNode::default());
/// let a = tree.create_node(LocalNode::default());
/// let b = tree.create_node(LocalNode::default());
/// tree.append_child(stage, a).unwrap();
/// tree.append_child(stage, b).unwrap();
///
/// let order: Vec<_> = tree.display_list(stage).nodes().collect();
/// assert_eq!(order, [stage, a, b]);
/// assert_eq!(tree.last_of(stage), Some(DisplayEntry::Node(b)));
/// assert_eq!(tree.stage_of(a), Some(stage));
/// ```
pub struct Tree<S: GroupSink = NoGroups> {
    pub(crate) arena: Arena,
    pub(crate) sink: S,
}

impl<S: GroupSink + core::fmt::Debug> core::fmt::Debug for Tree<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tree")
            .field("nodes_total", &self.arena.total())
            .field("nodes_alive", &self.arena.alive())
            .field("free_list", &self.arena.free_slots())
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}

impl<S> Default for Tree<S>
where
    S: GroupSink + Default,
{
    fn default() -> Self {
        Self::with_sink(S::default())
    }
}

impl Tree {
    /// Create a new empty tree that does not report group changes.
    pub fn new() -> Self {
        Self::with_sink(NoGroups)
    }
}

impl<S: GroupSink> Tree<S> {
    /// Create a new empty tree reporting group changes to `sink`.
    pub fn with_sink(sink: S) -> Self {
        Self {
            arena: Arena::default(),
            sink,
        }
    }

    /// The batching-group sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The batching-group sink, mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Create a detached node.
    ///
    /// The node has no parent and no stage, and its display-list range is
    /// the node itself (followed by its filter slot if `local.filter` is set).
    pub fn create_node(&mut self, local: LocalNode) -> NodeId {
        self.arena.alloc(local)
    }

    /// Create a stage: a root that nodes resolve into once attached beneath it.
    ///
    /// A stage is its own stage and can never be inserted as a child.
    pub fn create_stage(&mut self, local: LocalNode) -> NodeId {
        let id = self.arena.alloc(local);
        let node = self.arena.node_mut(id);
        node.stage = Some(id);
        node.stage_state = Some(StageState::default());
        id
    }

    /// Remove a node from its parent and free it together with its subtree.
    ///
    /// The subtree leaves its stage and batching group first; afterwards all
    /// of its identifiers are stale.
    pub fn destroy(&mut self, id: NodeId) {
        let Some(parent) = self.arena.get(id).map(|node| node.parent) else {
            return;
        };
        if let Some(parent) = parent {
            let index = self.arena.node(parent).children.iter().position(|&c| c == id);
            if let Some(index) = index {
                self.detach(parent, id, index);
            }
        } else {
            self.rehome_group(id, None);
        }
        let mut stack: SmallVec<[NodeId; 16]> = smallvec![id];
        while let Some(n) = stack.pop() {
            if let Some(node) = self.arena.free(n) {
                stack.extend(node.children);
            }
        }
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.arena.is_alive(id)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.arena.alive()
    }

    /// Returns `true` if the tree holds no live nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the parent of a node if live, or `None` for roots or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|node| node.parent)
    }

    /// Get the children of a node, or empty slice if node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.arena
            .get(id)
            .map_or(&[], |node| node.children.as_slice())
    }

    /// Returns the stage a node currently resolves into.
    pub fn stage_of(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|node| node.stage)
    }

    /// Returns `true` if `id` was created with [`Tree::create_stage`].
    pub fn is_stage(&self, id: NodeId) -> bool {
        self.arena
            .get(id)
            .is_some_and(|node| node.stage_state.is_some())
    }

    /// Returns the batching group a node belongs to.
    pub fn render_group_of(&self, id: NodeId) -> Option<GroupId> {
        self.arena.get(id).and_then(|node| node.group)
    }

    /// Returns the flags of a node if the identifier is live.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.arena.get(id).map(|node| node.local.flags)
    }

    /// Returns whether the node reserves a filter slot.
    pub fn has_filter(&self, id: NodeId) -> bool {
        self.arena.get(id).is_some_and(|node| node.has_filter())
    }

    /// Returns the local transform of a live node.
    pub fn local_transform(&self, id: NodeId) -> Option<Affine> {
        self.arena.get(id).map(|node| node.local.local_transform)
    }

    /// Return the world transform for a live node as of the last
    /// [`Tree::update_transforms`] that reached it.
    pub fn world_transform(&self, id: NodeId) -> Option<Affine> {
        self.arena.get(id).map(|node| node.world_transform)
    }

    /// First display-list entry of the node's subtree (the node itself).
    pub fn first_of(&self, id: NodeId) -> Option<DisplayEntry> {
        self.arena.get(id).map(|_| DisplayEntry::Node(id))
    }

    /// Last display-list entry of the node's subtree.
    pub fn last_of(&self, id: NodeId) -> Option<DisplayEntry> {
        self.arena.get(id).map(|node| node.last)
    }

    /// The entry following `entry` in the display list.
    ///
    /// Returns `None` at the end of the list or for stale entries.
    pub fn next_entry(&self, entry: DisplayEntry) -> Option<DisplayEntry> {
        self.entry_links(entry)?.next
    }

    /// The entry preceding `entry` in the display list.
    ///
    /// Returns `None` at the start of the list or for stale entries.
    pub fn prev_entry(&self, entry: DisplayEntry) -> Option<DisplayEntry> {
        self.entry_links(entry)?.prev
    }

    fn entry_links(&self, entry: DisplayEntry) -> Option<Links> {
        let node = self.arena.get(entry.node())?;
        match entry {
            DisplayEntry::Node(_) => Some(node.links),
            DisplayEntry::FilterEnd(_) => node.filter_links,
        }
    }

    /// Iterate the display list of the subtree rooted at `root`, in render order.
    ///
    /// Yields nothing for stale identifiers.
    pub fn display_list(&self, root: NodeId) -> DisplayList<'_> {
        DisplayList::new(&self.arena, root)
    }

    /// Read-only view of the subtree rooted at `root`.
    pub fn subtree(&self, root: NodeId) -> SubtreeView<'_> {
        SubtreeView::new(&self.arena, root)
    }

    /// Returns whether interactive nodes joined or left `stage` since the
    /// flag was last taken.
    pub fn needs_interaction_rescan(&self, stage: NodeId) -> bool {
        self.arena
            .get(stage)
            .and_then(|node| node.stage_state)
            .is_some_and(|state| state.interaction_dirty)
    }

    /// Returns and clears the interaction rescan flag of `stage`.
    pub fn take_interaction_rescan(&mut self, stage: NodeId) -> bool {
        self.arena
            .get_mut(stage)
            .and_then(|node| node.stage_state.as_mut())
            .is_some_and(|state| core::mem::take(&mut state.interaction_dirty))
    }

    /// Update local transform.
    ///
    /// World transforms pick it up on the next [`Tree::update_transforms`].
    pub fn set_local_transform(&mut self, id: NodeId, tf: Affine) {
        if let Some(node) = self.arena.get_mut(id) {
            node.local.local_transform = tf;
        }
    }

    /// Update node flags.
    ///
    /// Toggling [`NodeFlags::INTERACTIVE`] on a node attached to a stage
    /// requests an interaction rescan of that stage.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        let old = core::mem::replace(&mut node.local.flags, flags);
        if (old ^ flags).contains(NodeFlags::INTERACTIVE)
            && let Some(stage) = node.stage
        {
            self.request_interaction_rescan(stage);
        }
    }

    /// Show or hide a node and its subtree.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(mut flags) = self.flags(id) {
            flags.set(NodeFlags::VISIBLE, visible);
            self.set_flags(id, flags);
        }
    }

    /// Make a node (not) participate in interaction.
    pub fn set_interactive(&mut self, id: NodeId, interactive: bool) {
        if let Some(mut flags) = self.flags(id) {
            flags.set(NodeFlags::INTERACTIVE, interactive);
            self.set_flags(id, flags);
        }
    }

    /// Add or remove the filter slot trailing the node's subtree.
    ///
    /// Enabling places a [`DisplayEntry::FilterEnd`] right after the current
    /// end of the subtree; children added later are linked before it.
    pub fn set_filter(&mut self, id: NodeId, enabled: bool) {
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        if node.has_filter() == enabled {
            return;
        }
        node.local.filter = enabled;
        let end = DisplayEntry::FilterEnd(id);
        if enabled {
            let pred = node.last;
            node.filter_links = Some(Links::default());
            self.arena.splice_after(pred, end, end);
            self.arena.retarget_tails(id, pred, end);
        } else {
            let pred = self
                .arena
                .unlink_range(end, end)
                .expect("filter slot follows its own node");
            self.arena.retarget_tails(id, end, pred);
            self.arena.node_mut(id).filter_links = None;
        }
    }

    /// Move the subtree rooted at `id` into `group`, or out of any group.
    ///
    /// Every node of the subtree ends up in `group`, including nodes that
    /// were placed in other groups before. Each previous group is notified of
    /// the departure before the new one is notified of the arrival.
    ///
    /// Any live node may hold a group, even below a grouped ancestor. The
    /// subtree keeps it until attaching beneath a grouped parent moves it into
    /// the parent's group, or detaching from its parent takes it out of every
    /// group.
    pub fn set_render_group(&mut self, id: NodeId, group: Option<GroupId>) {
        if self.arena.is_alive(id) {
            self.rehome_group(id, group);
        }
    }

    /// Recompute world transforms for the subtree rooted at `root`.
    ///
    /// Nodes are visited parent before children, in child order, which is
    /// the order of the display list. An invisible node is skipped together
    /// with its whole subtree, leaving their world transforms untouched.
    pub fn update_transforms(&mut self, root: NodeId) {
        let Some(node) = self.arena.get(root) else {
            return;
        };
        let base = node
            .parent
            .map_or(Affine::IDENTITY, |p| self.arena.node(p).world_transform);
        let mut stack: SmallVec<[(NodeId, Affine); 16]> = smallvec![(root, base)];
        while let Some((id, parent_tf)) = stack.pop() {
            let node = self.arena.node_mut(id);
            if !node.local.flags.contains(NodeFlags::VISIBLE) {
                continue;
            }
            node.world_transform = parent_tf * node.local.local_transform;
            let tf = node.world_transform;
            // Reversed so children pop in child order.
            stack.extend(node.children.iter().rev().map(|&child| (child, tf)));
        }
    }

    // --- internals shared with edits ---

    pub(crate) fn request_interaction_rescan(&mut self, stage: NodeId) {
        if let Some(state) = self
            .arena
            .get_mut(stage)
            .and_then(|node| node.stage_state.as_mut())
        {
            if !state.interaction_dirty {
                debug!("stage {stage:?} needs an interaction rescan");
            }
            state.interaction_dirty = true;
        }
    }

    /// Sets `stage` on every node of the subtree, requesting a rescan of
    /// `stage` if the subtree holds interactive nodes.
    pub(crate) fn propagate_stage(&mut self, root: NodeId, stage: NodeId, attached: bool) {
        let end = self.arena.node(root).last;
        let mut cursor = Some(DisplayEntry::Node(root));
        let mut interactive = false;
        while let Some(entry) = cursor {
            if let DisplayEntry::Node(id) = entry {
                let node = self.arena.node_mut(id);
                interactive |= node.local.flags.contains(NodeFlags::INTERACTIVE);
                node.stage = attached.then_some(stage);
            }
            cursor = if entry == end {
                None
            } else {
                self.arena.next(entry)
            };
        }
        if interactive {
            self.request_interaction_rescan(stage);
        }
    }

    /// Moves the whole subtree into `group`, or out of every group.
    ///
    /// Each maximal sub-subtree that sits in some other group is detached
    /// from that group first, so the sink never keeps a node the tree no
    /// longer places in it.
    pub(crate) fn rehome_group(&mut self, root: NodeId, group: Option<GroupId>) {
        let mut owners: SmallVec<[(NodeId, GroupId); 4]> = SmallVec::new();
        let mut changed = false;
        for id in SubtreeView::new(&self.arena, root).nodes() {
            let node = self.arena.node(id);
            let inherited = match node.parent {
                Some(parent) if id != root => self.arena.node(parent).group,
                _ => None,
            };
            if let Some(old) = node.group
                && node.group != inherited
                && node.group != group
            {
                owners.push((id, old));
            }
            changed |= node.group != group;
        }
        if !changed {
            return;
        }

        for (owner, old) in owners {
            debug!("{owner:?} leaves batching group {old:?}");
            self.sink
                .detach_subtree(old, &SubtreeView::new(&self.arena, owner));
        }
        let end = self.arena.node(root).last;
        let mut cursor = Some(DisplayEntry::Node(root));
        while let Some(entry) = cursor {
            if let DisplayEntry::Node(id) = entry {
                self.arena.node_mut(id).group = group;
            }
            cursor = if entry == end {
                None
            } else {
                self.arena.next(entry)
            };
        }
        if let Some(new) = group {
            debug!("{root:?} joins batching group {new:?}");
            self.sink
                .attach_subtree(new, &SubtreeView::new(&self.arena, root));
        }
    }
}
