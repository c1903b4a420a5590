// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_display_tree --heading-base-level=0

//! Understory Display Tree: a scene graph with a render-ordered display list.
//!
//! Understory Display Tree is a reusable building block for 2D renderers and retained-mode scenes.
//!
//! - Represents a hierarchy of display nodes with local transforms, visibility, and interactivity flags.
//! - Keeps a doubly linked *display list* over every subtree, in the same order a recursive
//!   render walk would visit it, so renderers and batchers can consume a scene linearly.
//! - Tracks which *stage* (scene root) each node is attached beneath, and which batching group
//!   it belongs to, as subtrees are moved around.
//!
//! ## Two views of one structure
//!
//! The tree view is the usual parent/children hierarchy. The display-list view assigns every
//! node the inclusive range `first..=last` of the list covering its subtree: `first` is the node
//! itself and `last` is the final entry of its last descendant. A node that applies a filter
//! reserves one extra [`DisplayEntry::FilterEnd`] slot after its content, which then becomes its
//! `last`; renderers push the filter at the node and pop it at that slot.
//!
//! Every structural edit ([`Tree::append_child`], [`Tree::insert_child_at`],
//! [`Tree::remove_child`], [`Tree::swap_children`]) moves whole ranges with O(1) splices and
//! repairs the cached `last` of the ancestor chain before returning. There is no deferred
//! relinking: both views agree at every call boundary.
//!
//! ## Stages, interactivity, and batching
//!
//! A stage is created with [`Tree::create_stage`]. Nodes attached beneath it report it from
//! [`Tree::stage_of`]; detaching clears it over the whole subtree. Whenever an interactive node
//! joins or leaves a stage, the stage is flagged for an interaction rescan
//! ([`Tree::take_interaction_rescan`]).
//!
//! Batching groups are external. [`Tree`] is generic over a [`GroupSink`] that is told when a
//! subtree joins or leaves a group; it receives a read-only [`SubtreeView`], so it cannot edit
//! the tree while being notified. [`NoGroups`] ignores these calls and [`BatchGroups`] records
//! membership sets.
//!
//! ## API overview
//!
//! - [`Tree`]: container managing nodes, the display list, stages, and groups.
//! - [`LocalNode`]: per-node local data (transform, flags, filter).
//! - [`NodeFlags`]: visibility and interactivity controls.
//! - [`NodeId`]: generational handle of a node.
//! - [`DisplayEntry`]: one slot of the display list.
//! - [`TreeError`]: caller misuse reported by structural edits.
//!
//! Key operations:
//! - [`Tree::create_node`] / [`Tree::create_stage`] → [`NodeId`]
//! - [`Tree::append_child`], [`Tree::insert_child_at`], [`Tree::remove_child`],
//!   [`Tree::swap_children`], [`Tree::child_at`]
//! - [`Tree::display_list`] iterates a subtree in render order.
//! - [`Tree::update_transforms`] recomputes world transforms, skipping invisible subtrees.
//! - [`Tree::set_filter`] and [`Tree::set_render_group`] reshape the display list and batching.
//!
//! ## Example
//!
//! ```rust
//! use understory_display_tree::{DisplayEntry, LocalNode, Tree};
//!
//! let mut tree = Tree::new();
//! let stage = tree.create_stage(LocalNode::default());
//! let [a, b, c] = [(); 3].map(|()| tree.create_node(LocalNode::default()));
//! tree.append_child(stage, a).unwrap();
//! tree.append_child(stage, c).unwrap();
//! tree.insert_child_at(stage, b, 1).unwrap();
//!
//! let order: Vec<_> = tree.display_list(stage).nodes().collect();
//! assert_eq!(order, [stage, a, b, c]);
//!
//! tree.swap_children(stage, a, c).unwrap();
//! let order: Vec<_> = tree.display_list(stage).nodes().collect();
//! assert_eq!(order, [stage, c, b, a]);
//! assert_eq!(tree.last_of(stage), Some(DisplayEntry::Node(a)));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod edit;
mod error;
mod group;
mod list;
mod node;
mod tree;
mod types;

#[cfg(test)]
mod testing;

pub use error::TreeError;
pub use group::{BatchGroups, GroupSink, NoGroups};
pub use list::{DisplayList, SubtreeView};
pub use tree::Tree;
pub use types::{DisplayEntry, GroupId, LocalNode, NodeFlags, NodeId};
