//! Shared test utilities for the docnav test suite.
//!
//! Provides node builders and navigation tree assertions so tests read as
//! tree literals instead of struct soup.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let raw = vec![group("En", vec![
//!     page("Overview", "/en/payments/v1/overview"),
//!     marker("Guides", "/en/payments/v1/guides/.navigation"),
//! ])];
//!
//! assert_nav_shape(&out, &[
//!     ("Overview", &[]),
//!     ("Guides", &["Checkout", "Refunds"]),
//! ]);
//! ```

use crate::cache::{CacheStats, NavCache};
use crate::types::NavNode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =========================================================================
// Builders
// =========================================================================

/// A concrete page.
pub fn page(title: &str, path: &str) -> NavNode {
    NavNode {
        path: Some(path.to_string()),
        ..NavNode::new(title)
    }
}

/// A pathless grouping node.
pub fn group(title: &str, children: Vec<NavNode>) -> NavNode {
    NavNode {
        children,
        ..NavNode::new(title)
    }
}

/// A grouping node with a path.
pub fn section(title: &str, path: &str, children: Vec<NavNode>) -> NavNode {
    NavNode {
        path: Some(path.to_string()),
        children,
        ..NavNode::new(title)
    }
}

/// A directory metadata declaration.
pub fn marker(title: &str, path: &str) -> NavNode {
    page(title, path)
}

/// A module container (`module: true`).
pub fn module_container(title: &str, path: &str, children: Vec<NavNode>) -> NavNode {
    NavNode {
        module: true,
        ..section(title, path, children)
    }
}

/// Set the description on a node.
pub fn described(mut node: NavNode, description: &str) -> NavNode {
    node.description = Some(description.to_string());
    node
}

// =========================================================================
// Lookups and extractors
// =========================================================================

/// Titles of a forest's top level, in order.
pub fn titles(nodes: &[NavNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.title.as_str()).collect()
}

/// Find a top-level node by title. Panics if not found.
pub fn find_node<'a>(nodes: &'a [NavNode], title: &str) -> &'a NavNode {
    nodes.iter().find(|n| n.title == title).unwrap_or_else(|| {
        let available = titles(nodes);
        panic!("node '{title}' not found. Available: {available:?}")
    })
}

/// Find a node anywhere in the tree by path. Panics if not found.
pub fn find_by_path<'a>(nodes: &'a [NavNode], path: &str) -> &'a NavNode {
    fn walk<'a>(nodes: &'a [NavNode], path: &str) -> Option<&'a NavNode> {
        nodes.iter().find_map(|n| {
            if n.path.as_deref() == Some(path) {
                Some(n)
            } else {
                walk(&n.children, path)
            }
        })
    }
    walk(nodes, path).unwrap_or_else(|| panic!("no node with path '{path}'"))
}

/// Every path in the tree, depth first.
pub fn all_paths(nodes: &[NavNode]) -> Vec<String> {
    let mut out = Vec::new();
    for n in nodes {
        if let Some(p) = &n.path {
            out.push(p.clone());
        }
        out.extend(all_paths(&n.children));
    }
    out
}

/// Wrap a finalized forest in language/module/version containers so it looks
/// like raw content-layer output again.
pub fn rewrap(nodes: Vec<NavNode>) -> Vec<NavNode> {
    vec![group("en", vec![group("Payments", vec![group("V1", nodes)])])]
}

// =========================================================================
// Navigation assertions
// =========================================================================

/// Assert that a navigation forest matches an expected two-level shape.
///
/// Each entry is `(title, children)`. Use `&[]` for leaf nodes.
///
/// ```rust
/// assert_nav_shape(&nodes, &[
///     ("Overview", &[]),
///     ("Guides", &["Checkout", "Refunds"]),
/// ]);
/// ```
pub fn assert_nav_shape(nodes: &[NavNode], expected: &[(&str, &[&str])]) {
    let expected_titles: Vec<&str> = expected.iter().map(|(t, _)| *t).collect();
    assert_eq!(titles(nodes), expected_titles, "nav top-level titles mismatch");

    for (node, (title, children)) in nodes.iter().zip(expected) {
        assert_eq!(
            titles(&node.children),
            children.to_vec(),
            "nav children of '{title}' mismatch"
        );
    }
}

// =========================================================================
// Caching
// =========================================================================

/// A millisecond clock that only moves when told to.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// [`NavCache`] whose entries expire on a [`ManualClock`], so TTL behavior
/// can be asserted without sleeping.
pub struct ClockedCache {
    ttl_millis: u64,
    clock: ManualClock,
    entries: Mutex<HashMap<String, (u64, Vec<NavNode>)>>,
    stats: Mutex<CacheStats>,
}

impl ClockedCache {
    pub fn new(ttl: Duration, clock: ManualClock) -> Self {
        Self {
            ttl_millis: ttl.as_millis() as u64,
            clock,
            entries: Mutex::default(),
            stats: Mutex::default(),
        }
    }
}

impl NavCache for ClockedCache {
    fn get(&self, key: &str) -> Option<Vec<NavNode>> {
        let now = self.clock.now_millis();
        let found = self
            .entries
            .lock()
            .unwrap()
            .get(key)
            .filter(|(stored_at, _)| now - stored_at < self.ttl_millis)
            .map(|(_, nodes)| nodes.clone());
        let mut stats = self.stats.lock().unwrap();
        if found.is_some() {
            stats.hit();
        } else {
            stats.miss();
        }
        found
    }

    fn insert(&self, key: &str, nodes: Vec<NavNode>) {
        let now = self.clock.now_millis();
        self.entries.lock().unwrap().insert(key.to_string(), (now, nodes));
    }

    fn stats(&self) -> CacheStats {
        self.stats.lock().unwrap().clone()
    }
}
