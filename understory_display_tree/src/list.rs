// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The flattened display list: range primitives and read-only iteration.
//!
//! Every node owns the inclusive range `Node(id)..=last` of the list. Edits
//! move whole ranges with [`Arena::splice_after`] and [`Arena::unlink_range`]
//! and then repair cached `last` boundaries with [`Arena::retarget_tails`].

use crate::node::Arena;
use crate::types::{DisplayEntry, NodeFlags, NodeId};

impl Arena {
    /// Splices the detached range `first..=last` in directly after `pred`.
    pub(crate) fn splice_after(
        &mut self,
        pred: DisplayEntry,
        first: DisplayEntry,
        last: DisplayEntry,
    ) {
        let next = self.next(pred);
        self.link(last, next);
        self.link(pred, Some(first));
    }

    /// Cuts `first..=last` out of the list and joins its neighbors.
    ///
    /// The cut range keeps its internal links; its outer seam is cleared.
    /// Returns the entry that preceded `first`.
    pub(crate) fn unlink_range(
        &mut self,
        first: DisplayEntry,
        last: DisplayEntry,
    ) -> Option<DisplayEntry> {
        let prev = self.prev(first);
        let next = self.next(last);
        match prev {
            Some(p) => self.link(p, next),
            None => {
                if let Some(n) = next {
                    self.set_prev(n, None);
                }
            }
        }
        self.set_prev(first, None);
        self.set_next(last, None);
        prev
    }

    /// Walks up from `from`, replacing a cached `last` equal to `old` with `new`.
    ///
    /// Stops at the first node whose `last` differs: no ancestor above it can
    /// end at `old` either.
    pub(crate) fn retarget_tails(&mut self, from: NodeId, old: DisplayEntry, new: DisplayEntry) {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = self.node_mut(id);
            if node.last != old {
                break;
            }
            node.last = new;
            current = node.parent;
        }
    }
}

/// Iterator over a range of the display list, in render order.
///
/// Created by [`Tree::display_list`](crate::Tree::display_list) and
/// [`SubtreeView::entries`].
#[derive(Clone, Debug)]
pub struct DisplayList<'a> {
    arena: &'a Arena,
    /// (cursor, inclusive end)
    range: Option<(DisplayEntry, DisplayEntry)>,
}

impl<'a> DisplayList<'a> {
    /// Range of the subtree rooted at `root`, or an empty iterator for stale ids.
    pub(crate) fn new(arena: &'a Arena, root: NodeId) -> Self {
        let range = arena
            .get(root)
            .map(|node| (DisplayEntry::Node(root), node.last));
        Self { arena, range }
    }

    /// Restricts the iterator to node entries, skipping filter sentinels.
    pub fn nodes(self) -> impl Iterator<Item = NodeId> + 'a {
        self.filter_map(|entry| match entry {
            DisplayEntry::Node(id) => Some(id),
            DisplayEntry::FilterEnd(_) => None,
        })
    }
}

impl Iterator for DisplayList<'_> {
    type Item = DisplayEntry;

    fn next(&mut self) -> Option<DisplayEntry> {
        let (current, end) = self.range?;
        self.range = if current == end {
            None
        } else {
            self.arena.next(current).map(|next| (next, end))
        };
        Some(current)
    }
}

/// Read-only view of a subtree handed to a [`GroupSink`](crate::GroupSink).
///
/// The view borrows the tree immutably, so a sink can inspect the subtree
/// but never edit the tree while it is being notified.
#[derive(Clone, Copy, Debug)]
pub struct SubtreeView<'a> {
    arena: &'a Arena,
    root: NodeId,
}

impl<'a> SubtreeView<'a> {
    pub(crate) fn new(arena: &'a Arena, root: NodeId) -> Self {
        Self { arena, root }
    }

    /// The root of the subtree.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Display-list entries of the subtree, including filter sentinels.
    pub fn entries(&self) -> DisplayList<'a> {
        DisplayList::new(self.arena, self.root)
    }

    /// Nodes of the subtree in render order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + 'a {
        self.entries().nodes()
    }

    /// Flags of a node in the tree, or `None` for stale ids.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.arena.get(id).map(|node| node.local.flags)
    }
}
