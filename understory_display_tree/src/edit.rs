// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural edits: insertion, removal, swapping, and indexed lookup.
//!
//! Each public edit validates all of its preconditions first and returns a
//! [`TreeError`] without touching the tree when one fails. Once validated, an
//! edit relinks the display list, repairs the cached `last` of the affected
//! ancestor chain, updates `children`/`parent`, and then propagates stage and
//! batching-group membership over the moved subtree.

use log::trace;

use crate::error::TreeError;
use crate::group::GroupSink;
use crate::node::Node;
use crate::tree::Tree;
use crate::types::{DisplayEntry, NodeId};

impl<S: GroupSink> Tree<S> {
    /// Append `child` as the last child of `parent`.
    ///
    /// If `child` already has a parent it is removed from it first, exactly
    /// as by [`Tree::remove_child`]. The child's subtree is linked into the
    /// display list after the current end of `parent`'s content (before
    /// `parent`'s filter slot, if it has one).
    ///
    /// # Errors
    ///
    /// - [`TreeError::StaleNode`] if either id is stale.
    /// - [`TreeError::StageAsChild`] if `child` is a stage.
    /// - [`TreeError::CycleDetected`] if `child` is `parent` or one of its ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let len = self.check_insert(parent, child)?;
        self.move_child(parent, child, len);
        Ok(())
    }

    /// Insert `child` into `parent`'s children at `index`.
    ///
    /// `index` refers to positions after `child` has left its current parent,
    /// so moving a node within the same parent counts it only once. Inserting
    /// at the end is identical to [`Tree::append_child`].
    ///
    /// # Errors
    ///
    /// - [`TreeError::IndexOutOfRange`] if `index` exceeds the number of children.
    /// - The errors of [`Tree::append_child`].
    pub fn insert_child_at(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<(), TreeError> {
        let len = self.check_insert(parent, child)?;
        if index > len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        self.move_child(parent, child, index);
        Ok(())
    }

    /// Remove `child` from `parent`.
    ///
    /// The child's subtree is cut out of the display list and keeps its own
    /// internal order; it leaves `parent`'s stage and its batching group.
    ///
    /// # Errors
    ///
    /// - [`TreeError::StaleNode`] if `parent` is stale.
    /// - [`TreeError::NotAChild`] if `child` is not a direct child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let index = self.child_index(parent, child)?;
        self.detach(parent, child, index);
        Ok(())
    }

    /// Remove and return the child of `parent` at `index`.
    ///
    /// # Errors
    ///
    /// - [`TreeError::StaleNode`] if `parent` is stale.
    /// - [`TreeError::IndexOutOfRange`] if there is no child at `index`.
    pub fn remove_child_at(&mut self, parent: NodeId, index: usize) -> Result<NodeId, TreeError> {
        let child = self.child_at(parent, index)?;
        self.detach(parent, child, index);
        Ok(child)
    }

    /// Remove `child` from its parent, if it has one.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        if let Some(parent) = self.parent_of(child) {
            let index = self
                .child_index(parent, child)
                .expect("parent lists its child");
            self.detach(parent, child, index);
        }
    }

    /// Swap the positions of two children of `parent`.
    ///
    /// Both subtrees trade places in the display list as well. Stage and
    /// batching-group membership are unaffected.
    ///
    /// # Errors
    ///
    /// - [`TreeError::StaleNode`] if `parent` is stale.
    /// - [`TreeError::NotAChild`] if `a` or `b` is not a direct child of `parent`.
    pub fn swap_children(&mut self, parent: NodeId, a: NodeId, b: NodeId) -> Result<(), TreeError> {
        let ia = self.child_index(parent, a)?;
        let ib = self.child_index(parent, b)?;
        if ia == ib {
            return Ok(());
        }
        let (i, j) = (ia.min(ib), ia.max(ib));
        let p = self.arena.node(parent);
        let (x, y) = (p.children[i], p.children[j]);
        let y_is_final = j + 1 == p.children.len();

        let (xf, xl) = (DisplayEntry::Node(x), self.arena.node(x).last);
        let (yf, yl) = (DisplayEntry::Node(y), self.arena.node(y).last);
        let before_x = self
            .arena
            .prev(xf)
            .expect("a child is always preceded by its parent's range");
        let after_y = self.arena.next(yl);

        if j == i + 1 {
            self.arena.link(before_x, Some(yf));
            self.arena.link(yl, Some(xf));
            self.arena.link(xl, after_y);
        } else {
            let after_x = self
                .arena
                .next(xl)
                .expect("a later sibling follows the earlier one");
            let before_y = self
                .arena
                .prev(yf)
                .expect("a child is always preceded by its parent's range");
            self.arena.link(before_x, Some(yf));
            self.arena.link(yl, Some(after_x));
            self.arena.link(before_y, Some(xf));
            self.arena.link(xl, after_y);
        }

        self.arena.node_mut(parent).children.swap(i, j);
        if y_is_final {
            self.arena.retarget_tails(parent, yl, xl);
        }
        trace!("swapped {a:?} and {b:?} in {parent:?}");
        Ok(())
    }

    /// Returns the child of `parent` at `index`.
    ///
    /// # Errors
    ///
    /// - [`TreeError::StaleNode`] if `parent` is stale.
    /// - [`TreeError::IndexOutOfRange`] if there is no child at `index`.
    pub fn child_at(&self, parent: NodeId, index: usize) -> Result<NodeId, TreeError> {
        let children = &self.live(parent)?.children;
        children
            .get(index)
            .copied()
            .ok_or(TreeError::IndexOutOfRange {
                index,
                len: children.len(),
            })
    }

    /// Returns the position of `child` among `parent`'s children.
    ///
    /// # Errors
    ///
    /// - [`TreeError::StaleNode`] if `parent` is stale.
    /// - [`TreeError::NotAChild`] if `child` is not a direct child of `parent`.
    pub fn child_index(&self, parent: NodeId, child: NodeId) -> Result<usize, TreeError> {
        self.live(parent)?
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(TreeError::NotAChild {
                node: child,
                container: parent,
            })
    }

    // --- internals ---

    fn live(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.arena.get(id).ok_or(TreeError::StaleNode(id))
    }

    /// Validates an insertion and returns the number of children `parent`
    /// will have once `child` has left its current parent.
    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<usize, TreeError> {
        let p = self.live(parent)?;
        let c = self.live(child)?;
        if c.stage_state.is_some() {
            return Err(TreeError::StageAsChild { node: child });
        }
        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == child {
                return Err(TreeError::CycleDetected {
                    node: child,
                    container: parent,
                });
            }
            ancestor = self.arena.node(id).parent;
        }
        Ok(p.children.len() - usize::from(c.parent == Some(parent)))
    }

    /// Moves a validated `child` to `index` under `parent`.
    fn move_child(&mut self, parent: NodeId, child: NodeId, index: usize) {
        if let Some(old) = self.arena.node(child).parent {
            let old_index = self
                .arena
                .node(old)
                .children
                .iter()
                .position(|&c| c == child)
                .expect("parent lists its child");
            self.detach(old, child, old_index);
        }
        self.attach(parent, child, index);
    }

    /// The entry new tail children are linked after.
    fn content_tail(&self, id: NodeId) -> DisplayEntry {
        let node = self.arena.node(id);
        if node.has_filter() {
            self.arena
                .prev(DisplayEntry::FilterEnd(id))
                .expect("filter slot follows its own node")
        } else {
            node.last
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, index: usize) {
        let first = DisplayEntry::Node(child);
        let last = self.arena.node(child).last;
        let len = self.arena.node(parent).children.len();

        let pred = if index == len {
            let tail = self.content_tail(parent);
            self.arena.retarget_tails(parent, tail, last);
            tail
        } else if index == 0 {
            DisplayEntry::Node(parent)
        } else {
            let before = self.arena.node(parent).children[index - 1];
            self.arena.node(before).last
        };
        self.arena.splice_after(pred, first, last);

        let p = self.arena.node_mut(parent);
        p.children.insert(index, child);
        let (stage, group) = (p.stage, p.group);
        self.arena.node_mut(child).parent = Some(parent);
        trace!("inserted {child:?} into {parent:?} at {index}");

        if let Some(stage) = stage {
            self.propagate_stage(child, stage, true);
        }
        if let Some(group) = group {
            self.rehome_group(child, Some(group));
        }
    }

    pub(crate) fn detach(&mut self, parent: NodeId, child: NodeId, index: usize) {
        let first = DisplayEntry::Node(child);
        let last = self.arena.node(child).last;
        let pred = self
            .arena
            .unlink_range(first, last)
            .expect("a child is always preceded by its parent's range");
        self.arena.retarget_tails(parent, last, pred);

        let p = self.arena.node_mut(parent);
        p.children.remove(index);
        let stage = p.stage;
        self.arena.node_mut(child).parent = None;
        trace!("removed {child:?} from {parent:?} at {index}");

        if let Some(stage) = stage {
            self.propagate_stage(child, stage, false);
        }
        self.rehome_group(child, None);
    }
}
