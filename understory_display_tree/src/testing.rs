// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Consistency checks shared by the unit tests.

use alloc::vec::Vec;

use crate::group::GroupSink;
use crate::tree::Tree;
use crate::types::{DisplayEntry, GroupId, NodeId};

/// Everything an edit may touch on one node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NodeSnapshot {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    prev: Option<DisplayEntry>,
    next: Option<DisplayEntry>,
    last: Option<DisplayEntry>,
    filter_prev: Option<DisplayEntry>,
    filter_next: Option<DisplayEntry>,
    stage: Option<NodeId>,
    group: Option<GroupId>,
}

pub(crate) fn snapshot<S: GroupSink>(tree: &Tree<S>, ids: &[NodeId]) -> Vec<NodeSnapshot> {
    ids.iter()
        .map(|&id| NodeSnapshot {
            parent: tree.parent_of(id),
            children: tree.children_of(id).to_vec(),
            prev: tree.prev_entry(DisplayEntry::Node(id)),
            next: tree.next_entry(DisplayEntry::Node(id)),
            last: tree.last_of(id),
            filter_prev: tree.prev_entry(DisplayEntry::FilterEnd(id)),
            filter_next: tree.next_entry(DisplayEntry::FilterEnd(id)),
            stage: tree.stage_of(id),
            group: tree.render_group_of(id),
        })
        .collect()
}

fn preorder<S: GroupSink>(tree: &Tree<S>, id: NodeId, out: &mut Vec<DisplayEntry>) {
    out.push(DisplayEntry::Node(id));
    for &child in tree.children_of(id) {
        preorder(tree, child, out);
    }
    if tree.has_filter(id) {
        out.push(DisplayEntry::FilterEnd(id));
    }
}

fn expected_last<S: GroupSink>(tree: &Tree<S>, id: NodeId) -> DisplayEntry {
    if tree.has_filter(id) {
        return DisplayEntry::FilterEnd(id);
    }
    match tree.children_of(id).last() {
        Some(&child) => expected_last(tree, child),
        None => DisplayEntry::Node(id),
    }
}

/// Checks the display list, cached tails, back links, and stages under `root`.
pub(crate) fn assert_consistent<S: GroupSink>(tree: &Tree<S>, root: NodeId) {
    let mut expected = Vec::new();
    preorder(tree, root, &mut expected);
    let actual: Vec<_> = tree.display_list(root).collect();
    assert_eq!(
        actual, expected,
        "display list diverges from preorder under {root:?}"
    );

    for pair in actual.windows(2) {
        assert_eq!(
            tree.next_entry(pair[0]),
            Some(pair[1]),
            "broken next link at {:?}",
            pair[0]
        );
        assert_eq!(
            tree.prev_entry(pair[1]),
            Some(pair[0]),
            "broken prev link at {:?}",
            pair[1]
        );
    }
    if tree.parent_of(root).is_none() {
        assert_eq!(tree.prev_entry(DisplayEntry::Node(root)), None);
        let tail = actual.last().copied().expect("range holds its root");
        assert_eq!(tree.next_entry(tail), None, "list runs past {root:?}");
    }

    let stage = tree.stage_of(root);
    for entry in actual {
        let DisplayEntry::Node(id) = entry else {
            continue;
        };
        assert_eq!(
            tree.last_of(id),
            Some(expected_last(tree, id)),
            "stale cached last on {id:?}"
        );
        assert_eq!(tree.stage_of(id), stage, "stage of {id:?}");
        for &child in tree.children_of(id) {
            assert_eq!(tree.parent_of(child), Some(id), "parent of {child:?}");
        }
    }
}
