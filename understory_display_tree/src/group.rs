// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batching groups: the collaborator notified when subtrees change group.

use hashbrown::{HashMap, HashSet};

use crate::list::SubtreeView;
use crate::types::{GroupId, NodeId};

/// Receiver of batching-group membership changes.
///
/// The tree calls [`attach_subtree`](Self::attach_subtree) after a subtree
/// joins a group and [`detach_subtree`](Self::detach_subtree) after it leaves
/// one. Both calls happen once the structural edit is complete, and both must
/// tolerate a subtree that is already in (or already out of) the group.
pub trait GroupSink {
    /// The subtree rooted at `subtree.root()` joined `group`.
    fn attach_subtree(&mut self, group: GroupId, subtree: &SubtreeView<'_>);

    /// The subtree rooted at `subtree.root()` left `group`.
    fn detach_subtree(&mut self, group: GroupId, subtree: &SubtreeView<'_>);
}

/// A sink that ignores group changes.
///
/// This is the default for [`Tree`](crate::Tree); group ids are still tracked
/// per node and can be read with
/// [`Tree::render_group_of`](crate::Tree::render_group_of).
#[derive(Clone, Copy, Debug, Default)]
pub struct NoGroups;

impl GroupSink for NoGroups {
    fn attach_subtree(&mut self, _group: GroupId, _subtree: &SubtreeView<'_>) {}

    fn detach_subtree(&mut self, _group: GroupId, _subtree: &SubtreeView<'_>) {}
}

/// A sink that records the member set of every group.
#[derive(Clone, Debug, Default)]
pub struct BatchGroups {
    members: HashMap<GroupId, HashSet<NodeId>>,
}

impl BatchGroups {
    /// Create an empty set of groups.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `node` is currently a member of `group`.
    pub fn contains(&self, group: GroupId, node: NodeId) -> bool {
        self.members
            .get(&group)
            .is_some_and(|set| set.contains(&node))
    }

    /// Number of nodes in `group`.
    pub fn len(&self, group: GroupId) -> usize {
        self.members.get(&group).map_or(0, HashSet::len)
    }

    /// Returns `true` if `group` has no members.
    pub fn is_empty(&self, group: GroupId) -> bool {
        self.len(group) == 0
    }

    /// Members of `group` in unspecified order.
    pub fn members(&self, group: GroupId) -> impl Iterator<Item = NodeId> + '_ {
        self.members.get(&group).into_iter().flatten().copied()
    }
}

impl GroupSink for BatchGroups {
    fn attach_subtree(&mut self, group: GroupId, subtree: &SubtreeView<'_>) {
        self.members.entry(group).or_default().extend(subtree.nodes());
    }

    fn detach_subtree(&mut self, group: GroupId, subtree: &SubtreeView<'_>) {
        if let Some(set) = self.members.get_mut(&group) {
            for node in subtree.nodes() {
                set.remove(&node);
            }
            if set.is_empty() {
                self.members.remove(&group);
            }
        }
    }
}
