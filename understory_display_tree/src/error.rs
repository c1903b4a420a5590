// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by structural edits.

use crate::types::NodeId;

/// Caller misuse detected by a structural edit.
///
/// Every edit checks its preconditions before touching the tree, so a
/// returned error means the tree is exactly as it was before the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// An index was outside the valid range for the container's children.
    #[error("index {index} is out of bounds for a container with {len} children")]
    IndexOutOfRange {
        /// The index supplied by the caller.
        index: usize,
        /// The number of children at the time of the call.
        len: usize,
    },
    /// A node was not a direct child of the container.
    #[error("{node:?} is not a child of {container:?}")]
    NotAChild {
        /// The node supplied by the caller.
        node: NodeId,
        /// The container it was expected under.
        container: NodeId,
    },
    /// Inserting the node would make it its own ancestor.
    #[error("inserting {node:?} under {container:?} would create a cycle")]
    CycleDetected {
        /// The node being inserted.
        node: NodeId,
        /// The container that is the node itself or one of its descendants.
        container: NodeId,
    },
    /// Stage roots cannot be inserted under another node.
    #[error("{node:?} is a stage root and cannot become a child")]
    StageAsChild {
        /// The stage root supplied as a child.
        node: NodeId,
    },
    /// The identifier does not refer to a live node.
    #[error("{0:?} does not refer to a live node")]
    StaleNode(NodeId),
}
