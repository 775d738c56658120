//! Shared types used by every navigation pass.
//!
//! [`NavNode`] is the wire shape the content layer hands us and the shape we
//! hand back to renderers. It is deliberately loose (every field optional,
//! unknown keys preserved in [`NavNode::extra`]) because the content layer
//! attaches whatever front-matter it likes.
//!
//! The passes never sniff optional fields to decide what a node *is*. They ask
//! [`classify`], which returns an exhaustive [`NodeKind`]. That function is the
//! only place that knows about the directory metadata file convention.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Last path segment of a directory-level metadata declaration
/// (`guides/.navigation.yml` surfaces as `/en/payments/v1/guides/.navigation`).
pub const METADATA_FILE: &str = ".navigation";

/// Navigation tree node.
///
/// `children` is never `Some(vec![])`: an empty list and an absent list are the
/// same thing, and both serialize as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavNode {
    #[serde(default, deserialize_with = "lenient_title")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "lenient_children"
    )]
    pub children: Vec<NavNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub draft: bool,
    /// Marks a top-level module container. Never rendered as active.
    #[serde(default, skip_serializing_if = "is_false")]
    pub module: bool,
    /// Set by the active-path marker only.
    #[serde(default, skip_serializing_if = "is_false")]
    pub active: bool,
    /// Set by the active-path marker on ancestors of the active node.
    #[serde(default, rename = "defaultOpen", skip_serializing_if = "is_false")]
    pub default_open: bool,
    /// Front-matter the content layer attached that we don't interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What a node represents, decided once by [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A synthetic directory metadata declaration (title/icon/order only).
    MetadataOverlay,
    /// A structural node: has children, or is flagged as a module container.
    GroupContainer,
    /// A concrete page.
    LeafPage,
}

/// Classify a node. Metadata wins over structure: a `.navigation` entry that
/// somehow carries children is still an overlay.
pub fn classify(node: &NavNode) -> NodeKind {
    if node.path.as_deref().is_some_and(is_metadata_path) {
        NodeKind::MetadataOverlay
    } else if node.module || !node.children.is_empty() {
        NodeKind::GroupContainer
    } else {
        NodeKind::LeafPage
    }
}

/// True when the last segment of `path` is the directory metadata file,
/// with or without its extension.
pub fn is_metadata_path(path: &str) -> bool {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .is_some_and(|seg| {
            seg == METADATA_FILE
                || seg
                    .strip_prefix(METADATA_FILE)
                    .is_some_and(|ext| ext.starts_with('.'))
        })
}

/// Remove a trailing `/.navigation` segment, leaving the directory path.
pub fn strip_metadata_suffix(path: &str) -> String {
    if !is_metadata_path(path) {
        return path.to_string();
    }
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(pos) => trimmed[..pos].to_string(),
    }
}

impl NavNode {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn kind(&self) -> NodeKind {
        classify(self)
    }

    /// Number of childless nodes in this subtree, this node included.
    pub fn leaf_count(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            self.children.iter().map(NavNode::leaf_count).sum()
        }
    }
}

/// Leaf count across a forest.
pub fn leaf_count(nodes: &[NavNode]) -> usize {
    nodes.iter().map(NavNode::leaf_count).sum()
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Titles are strings in practice, but front-matter sometimes yields numbers.
fn lenient_title<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Accept anything for `children`: non-arrays become empty, non-object
/// elements are dropped.
fn lenient_children<'de, D>(deserializer: D) -> Result<Vec<NavNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(nodes_from_values(Value::deserialize(deserializer)?))
}

/// Convert a JSON array into nodes, dropping elements that are not objects
/// (or that fail to deserialize). Anything other than an array yields nothing.
pub(crate) fn nodes_from_values(value: Value) -> Vec<NavNode> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| {
                if !item.is_object() {
                    tracing::debug!(value = %item, "dropping non-object navigation node");
                    return None;
                }
                serde_json::from_value(item).ok()
            })
            .collect(),
        _ => Vec::new(),
    }
}
