//! Active-path marking.
//!
//! Given a finalized forest and the route being viewed, [`mark_active`]
//! returns a copy where the matching node carries `active: true` and every
//! ancestor of a match carries `defaultOpen: true`, so the menu opens down to
//! the current page. The input is never mutated.
//!
//! Paths are compared after [`normalize`](crate::path::normalize), so
//! `/guides/` and `/guides#intro` both match a node at `/guides`. Module
//! containers are never marked active; they still open when a page below
//! them matches.

use crate::path::{NormalizeOptions, normalize};
use crate::types::NavNode;

/// Result of [`mark_active`].
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveMarking {
    pub nodes: Vec<NavNode>,
    /// Some node matched the current path.
    pub matched: bool,
}

/// Mark the node(s) at `current_path` active and open their ancestors.
pub fn mark_active(nodes: &[NavNode], current_path: &str) -> ActiveMarking {
    let current = normalize(current_path, NormalizeOptions::default());
    let (nodes, matched) = mark_level(nodes, &current);
    ActiveMarking { nodes, matched }
}

fn mark_level(nodes: &[NavNode], current: &str) -> (Vec<NavNode>, bool) {
    let mut any = false;
    let marked = nodes
        .iter()
        .map(|node| {
            let (children, child_matched) = mark_level(&node.children, current);
            let is_current = !node.module && path_matches(node, current);
            any |= is_current || child_matched;
            NavNode {
                active: is_current,
                default_open: child_matched || node.default_open,
                children,
                ..node.clone_shallow()
            }
        })
        .collect();
    (marked, any)
}

fn path_matches(node: &NavNode, current: &str) -> bool {
    node.path
        .as_deref()
        .is_some_and(|p| normalize(p, NormalizeOptions::default()) == current)
}

/// Titles from the top level down to the first node at `current_path`.
/// Empty when nothing matches.
pub fn breadcrumb_trail(nodes: &[NavNode], current_path: &str) -> Vec<String> {
    let current = normalize(current_path, NormalizeOptions::default());
    let mut trail = Vec::new();
    if find_trail(nodes, &current, &mut trail) {
        trail
    } else {
        Vec::new()
    }
}

fn find_trail(nodes: &[NavNode], current: &str, trail: &mut Vec<String>) -> bool {
    for node in nodes {
        trail.push(node.title.clone());
        if path_matches(node, current) || find_trail(&node.children, current, trail) {
            return true;
        }
        trail.pop();
    }
    false
}

impl NavNode {
    /// Copy every field except `children`.
    fn clone_shallow(&self) -> NavNode {
        NavNode {
            title: self.title.clone(),
            path: self.path.clone(),
            children: Vec::new(),
            order: self.order,
            icon: self.icon.clone(),
            description: self.description.clone(),
            draft: self.draft,
            module: self.module,
            active: self.active,
            default_open: self.default_open,
            extra: self.extra.clone(),
        }
    }
}
