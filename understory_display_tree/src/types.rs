// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the display tree: identifiers, flags, local data, and display entries.

use kurbo::Affine;

/// Identifier for a node in the tree (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Identifier of an external batching group.
///
/// Groups are owned by the [`GroupSink`](crate::GroupSink) plugged into the
/// tree; the tree only records which group each node currently belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub u32);

bitflags::bitflags! {
    /// Node flags controlling visibility and interactivity.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is visible. Invisible nodes skip transform updates for their whole subtree.
        const VISIBLE     = 0b0000_0001;
        /// Node participates in interaction (hit testing, pointer events).
        const INTERACTIVE = 0b0000_0010;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

/// Local data for a node, supplied at creation.
#[derive(Clone, Debug)]
pub struct LocalNode {
    /// Local transform relative to parent space.
    pub local_transform: Affine,
    /// Visibility and interactivity flags.
    pub flags: NodeFlags,
    /// Whether the node applies a post-processing filter to its subtree.
    ///
    /// A filtered node reserves a [`DisplayEntry::FilterEnd`] slot directly
    /// after its subtree content in the display list.
    pub filter: bool,
}

impl Default for LocalNode {
    fn default() -> Self {
        Self {
            local_transform: Affine::IDENTITY,
            flags: NodeFlags::default(),
            filter: false,
        }
    }
}

/// One slot of the flattened display list.
///
/// The display list of a subtree starts at `Node(root)` and runs in preorder.
/// A filtered node's content is followed by its `FilterEnd` slot, where a
/// renderer pops the filter it pushed at `Node`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DisplayEntry {
    /// The node itself.
    Node(NodeId),
    /// The reserved slot trailing a filtered node's subtree.
    FilterEnd(NodeId),
}

impl DisplayEntry {
    /// Returns the node this entry belongs to.
    #[must_use]
    pub const fn node(self) -> NodeId {
        match self {
            Self::Node(id) | Self::FilterEnd(id) => id,
        }
    }

    /// Returns `true` for a filter sentinel slot.
    #[must_use]
    pub const fn is_filter_end(self) -> bool {
        matches!(self, Self::FilterEnd(_))
    }
}
