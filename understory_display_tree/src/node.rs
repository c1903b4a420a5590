// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node slots and the generational arena that owns them.

use alloc::vec::Vec;
use kurbo::Affine;

use crate::types::{DisplayEntry, GroupId, LocalNode, NodeId};

/// Display-list neighbors of one entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Links {
    pub(crate) prev: Option<DisplayEntry>,
    pub(crate) next: Option<DisplayEntry>,
}

/// State carried only by stage roots.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct StageState {
    /// Set when interactive nodes join or leave the stage.
    pub(crate) interaction_dirty: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    generation: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) local: LocalNode,
    pub(crate) world_transform: Affine,
    pub(crate) stage: Option<NodeId>,
    pub(crate) stage_state: Option<StageState>,
    pub(crate) group: Option<GroupId>,
    /// Links of `DisplayEntry::Node(self)`.
    pub(crate) links: Links,
    /// Links of `DisplayEntry::FilterEnd(self)`; present iff the node is filtered.
    pub(crate) filter_links: Option<Links>,
    /// Last entry of this node's range in the display list.
    pub(crate) last: DisplayEntry,
}

impl Node {
    /// A detached node: its range is itself, plus its sentinel when filtered.
    fn new(id: NodeId, local: LocalNode) -> Self {
        let (links, filter_links, last) = if local.filter {
            (
                Links {
                    prev: None,
                    next: Some(DisplayEntry::FilterEnd(id)),
                },
                Some(Links {
                    prev: Some(DisplayEntry::Node(id)),
                    next: None,
                }),
                DisplayEntry::FilterEnd(id),
            )
        } else {
            (Links::default(), None, DisplayEntry::Node(id))
        };
        Self {
            generation: id.1,
            parent: None,
            children: Vec::new(),
            local,
            world_transform: Affine::IDENTITY,
            stage: None,
            stage_state: None,
            group: None,
            links,
            filter_links,
            last,
        }
    }

    pub(crate) fn has_filter(&self) -> bool {
        self.filter_links.is_some()
    }
}

/// Slot storage for every node of a tree.
#[derive(Clone, Debug, Default)]
pub(crate) struct Arena {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl Arena {
    pub(crate) fn alloc(&mut self, local: LocalNode) -> NodeId {
        if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            let id = NodeId::new(idx as u32, generation);
            self.nodes[idx] = Some(Node::new(id, local));
            id
        } else {
            let generation = 1_u32;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            let id = NodeId::new(self.nodes.len() as u32, generation);
            self.nodes.push(Some(Node::new(id, local)));
            self.generations.push(generation);
            id
        }
    }

    /// Empties the slot of a live node and returns its contents.
    pub(crate) fn free(&mut self, id: NodeId) -> Option<Node> {
        if !self.is_alive(id) {
            return None;
        }
        let node = self.nodes[id.idx()].take();
        self.free_list.push(id.idx());
        node
    }

    pub(crate) fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .filter(|n| n.generation == id.1)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.idx())
            .and_then(|n| n.as_mut())
            .filter(|n| n.generation == id.1)
    }

    /// Access a live node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.get(id).expect("dangling NodeId")
    }

    /// Access a live node mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.get_mut(id).expect("dangling NodeId")
    }

    pub(crate) fn total(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn alive(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    pub(crate) fn free_slots(&self) -> usize {
        self.free_list.len()
    }

    pub(crate) fn links(&self, entry: DisplayEntry) -> Links {
        match entry {
            DisplayEntry::Node(id) => self.node(id).links,
            DisplayEntry::FilterEnd(id) => self
                .node(id)
                .filter_links
                .expect("filter sentinel of an unfiltered node"),
        }
    }

    fn links_mut(&mut self, entry: DisplayEntry) -> &mut Links {
        match entry {
            DisplayEntry::Node(id) => &mut self.node_mut(id).links,
            DisplayEntry::FilterEnd(id) => self
                .node_mut(id)
                .filter_links
                .as_mut()
                .expect("filter sentinel of an unfiltered node"),
        }
    }

    pub(crate) fn next(&self, entry: DisplayEntry) -> Option<DisplayEntry> {
        self.links(entry).next
    }

    pub(crate) fn prev(&self, entry: DisplayEntry) -> Option<DisplayEntry> {
        self.links(entry).prev
    }

    pub(crate) fn set_next(&mut self, entry: DisplayEntry, next: Option<DisplayEntry>) {
        self.links_mut(entry).next = next;
    }

    pub(crate) fn set_prev(&mut self, entry: DisplayEntry, prev: Option<DisplayEntry>) {
        self.links_mut(entry).prev = prev;
    }

    /// Makes `b` follow `a`. `None` terminates the list after `a`.
    pub(crate) fn link(&mut self, a: DisplayEntry, b: Option<DisplayEntry>) {
        self.set_next(a, b);
        if let Some(b) = b {
            self.set_prev(b, Some(a));
        }
    }
}
