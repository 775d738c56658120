//! Title-group merging.
//!
//! After container elision, siblings often share a title: a directory's
//! `.navigation.yml` shows up next to the directory's index page, and the same
//! section can come from two collections. [`merge_by_title`] folds each group
//! of same-titled siblings into one node.
//!
//! ## Choosing the main node
//!
//! The group member that supplies `path`, `children` and flags is picked by:
//!
//! 1. not a metadata overlay,
//! 2. more children,
//! 3. longer description,
//!
//! with ties going to the earlier sibling. The description-length rule is a
//! heuristic; only the first two are load-bearing.
//!
//! ## Metadata overlay
//!
//! If the group contains a metadata overlay, the first one's `title`,
//! `description`, `icon` and `order` replace the main node's (when set). The
//! overlay never contributes `path` or visibility flags.
//!
//! Children of every member are concatenated and merged the same way, so the
//! whole pass is recursive and idempotent.

use crate::types::{NavNode, NodeKind};
use std::collections::HashMap;

/// Merge same-titled siblings at every level of the forest.
///
/// Group order follows the first occurrence of each title. Untitled nodes are
/// never grouped; each keeps its own slot.
pub fn merge_by_title(nodes: Vec<NavNode>) -> Vec<NavNode> {
    group_by_title(nodes)
        .into_iter()
        .map(|mut group| {
            if group.len() == 1 {
                merge_children(group.remove(0))
            } else {
                merge_group(group)
            }
        })
        .collect()
}

fn group_by_title(nodes: Vec<NavNode>) -> Vec<Vec<NavNode>> {
    let mut groups: Vec<Vec<NavNode>> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for node in nodes {
        if node.title.is_empty() {
            groups.push(vec![node]);
            continue;
        }
        match slots.get(&node.title) {
            Some(&slot) => groups[slot].push(node),
            None => {
                slots.insert(node.title.clone(), groups.len());
                groups.push(vec![node]);
            }
        }
    }
    groups
}

/// Recurse into a single node's children.
fn merge_children(mut node: NavNode) -> NavNode {
    if !node.children.is_empty() {
        node.children = merge_by_title(std::mem::take(&mut node.children));
    }
    node
}

fn merge_group(mut group: Vec<NavNode>) -> NavNode {
    tracing::debug!(
        title = %group[0].title,
        members = group.len(),
        "merging same-titled navigation nodes"
    );

    let main_idx = select_main(&group);
    let overlay = group
        .iter()
        .find(|n| n.kind() == NodeKind::MetadataOverlay)
        .map(|n| (n.title.clone(), n.description.clone(), n.icon.clone(), n.order));

    let all_children: Vec<NavNode> = group
        .iter_mut()
        .flat_map(|n| std::mem::take(&mut n.children))
        .collect();

    let mut merged = group.swap_remove(main_idx);
    merged.children = merge_by_title(all_children);

    if let Some((title, description, icon, order)) = overlay {
        if !title.is_empty() {
            merged.title = title;
        }
        merged.description = description.or(merged.description);
        merged.icon = icon.or(merged.icon);
        merged.order = order.or(merged.order);
    }
    merged
}

/// Index of the group member that supplies structure. Strict ordering with
/// ties resolved toward the lower index.
fn select_main(group: &[NavNode]) -> usize {
    let rank = |n: &NavNode| {
        (
            n.kind() != NodeKind::MetadataOverlay,
            n.children.len(),
            n.description.as_deref().map_or(0, |d| d.chars().count()),
        )
    };

    let mut best = 0;
    for (idx, candidate) in group.iter().enumerate().skip(1) {
        if rank(candidate) > rank(&group[best]) {
            best = idx;
        }
    }
    best
}
