//! Container elision.
//!
//! Raw trees from the content layer are wrapped in structural levels nobody
//! wants in a menu:
//!
//! ```text
//! En                        ← language container   (depth 0)
//! └── Payments              ← module container     (depth 1)
//!     └── V1                ← version container    (depth 2)
//!         ├── Overview
//!         └── Guides
//!             └── Checkout
//! ```
//!
//! [`skip_containers`] removes those levels and splices their children into
//! the parent's place, so the example above becomes `[Overview, Guides]`.
//!
//! A node is elided when it matches any [`SkipRule`], either because it sits
//! at the rule's depth or because its title is one of the rule's
//! identifiers. Only nodes with children are candidates: a childless node is
//! content, and eliding it would silently drop a page. Unmatched nodes are
//! kept as-is with their subtree untouched.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::types::NavNode;

/// Default recursion limit.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Elide containers at `depth`, or whose title is in `identifiers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipRule {
    pub identifiers: BTreeSet<String>,
    pub depth: usize,
    /// Shown in logs and part of the cache key.
    pub label: String,
}

impl SkipRule {
    pub fn new<I, S>(identifiers: I, depth: usize, label: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identifiers: identifiers.into_iter().map(Into::into).collect(),
            depth,
            label: label.into(),
        }
    }

    pub fn matches(&self, node: &NavNode, depth: usize) -> bool {
        self.depth == depth || self.identifiers.contains(&node.title)
    }
}

impl fmt::Display for SkipRule {
    /// `label-depth-id1,id2` (or `none` when there are no identifiers).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids = if self.identifiers.is_empty() {
            "none".to_string()
        } else {
            self.identifiers.iter().cloned().collect::<Vec<_>>().join(",")
        };
        write!(f, "{}-{}-{}", self.label, self.depth, ids)
    }
}

/// Named rule sets built from a full default set (language, module, version).
pub struct SkipPresets;

impl SkipPresets {
    pub fn language_only(defaults: &[SkipRule]) -> Vec<SkipRule> {
        defaults.iter().take(1).cloned().collect()
    }

    pub fn module_only(defaults: &[SkipRule]) -> Vec<SkipRule> {
        defaults.iter().skip(1).take(1).cloned().collect()
    }

    pub fn all_default(defaults: &[SkipRule]) -> Vec<SkipRule> {
        defaults.to_vec()
    }

    pub fn none() -> Vec<SkipRule> {
        Vec::new()
    }
}

/// Options for [`skip_containers`].
#[derive(Debug, Clone, Copy)]
pub struct SkipOptions<'a> {
    /// Depth of the nodes being passed in.
    pub depth: usize,
    pub rules: &'a [SkipRule],
    pub max_depth: usize,
}

impl<'a> SkipOptions<'a> {
    pub fn new(rules: &'a [SkipRule]) -> Self {
        Self {
            depth: 0,
            rules,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Remove container levels matched by `opts.rules`, promoting their children.
///
/// Past `opts.max_depth` the remaining nodes are returned unmodified with a
/// warning.
pub fn skip_containers(nodes: Vec<NavNode>, opts: SkipOptions<'_>) -> Vec<NavNode> {
    if opts.depth > opts.max_depth {
        tracing::warn!(
            depth = opts.depth,
            max_depth = opts.max_depth,
            "container skipping exceeded depth limit, keeping remainder as-is"
        );
        return nodes;
    }

    nodes
        .into_iter()
        .flat_map(|node| {
            let rule = if node.children.is_empty() {
                None
            } else {
                opts.rules.iter().find(|r| r.matches(&node, opts.depth))
            };
            match rule {
                Some(rule) => {
                    tracing::debug!(
                        rule = %rule.label,
                        title = %node.title,
                        depth = opts.depth,
                        "skipping container"
                    );
                    skip_containers(
                        node.children,
                        SkipOptions {
                            depth: opts.depth + 1,
                            ..opts
                        },
                    )
                }
                None => vec![node],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::test_helpers::*;
    use crate::types::leaf_count;

    fn defaults() -> Vec<SkipRule> {
        Registry::default().default_skip_rules()
    }

    #[test]
    fn removes_three_wrapper_levels() {
        let raw = vec![group(
            "En",
            vec![group(
                "Payments",
                vec![group(
                    "V1",
                    vec![
                        page("Overview", "/en/payments/v1/overview"),
                        group("Guides", vec![page("Checkout", "/en/payments/v1/guides/checkout")]),
                    ],
                )],
            )],
        )];

        let rules = defaults();
        let out = skip_containers(raw, SkipOptions::new(&rules));
        assert_nav_shape(&out, &[("Overview", &[]), ("Guides", &["Checkout"])]);
    }

    #[test]
    fn identifier_match_elides_at_any_depth() {
        let rules = vec![SkipRule::new(["Wrapper"], 99, "custom")];
        let raw = vec![
            page("Intro", "/intro"),
            group("Wrapper", vec![page("A", "/a"), page("B", "/b")]),
        ];
        let out = skip_containers(raw, SkipOptions::new(&rules));
        assert_eq!(titles(&out), vec!["Intro", "A", "B"]);
    }

    #[test]
    fn unmatched_nodes_keep_their_subtree() {
        let rules = vec![SkipRule::new(["Inner"], 99, "custom")];
        let raw = vec![group("Outer", vec![group("Inner", vec![page("A", "/a")])])];
        let out = skip_containers(raw.clone(), SkipOptions::new(&rules));
        assert_eq!(out, raw);
    }

    #[test]
    fn childless_nodes_are_never_elided() {
        let rules = defaults();
        let raw = vec![page("Standalone", "/en/standalone")];
        let out = skip_containers(raw.clone(), SkipOptions::new(&rules));
        assert_eq!(out, raw);
    }

    #[test]
    fn no_rules_is_identity() {
        let raw = vec![group("En", vec![page("A", "/a")])];
        let out = skip_containers(raw.clone(), SkipOptions::new(&SkipPresets::none()));
        assert_eq!(out, raw);
    }

    #[test]
    fn depth_limit_stops_without_dropping() {
        // Every level matches by identifier; with max_depth 1 the third level
        // is returned untouched.
        let rules = vec![SkipRule::new(["W"], 99, "w")];
        let raw = vec![group("W", vec![group("W", vec![group("W", vec![page("A", "/a")])])])];
        let out = skip_containers(raw, SkipOptions::new(&rules).with_max_depth(1));
        assert_eq!(titles(&out), vec!["W"]);
        assert_eq!(leaf_count(&out), 1);
    }

    #[test]
    fn presets_select_rules() {
        let d = defaults();
        assert_eq!(SkipPresets::language_only(&d), vec![d[0].clone()]);
        assert_eq!(SkipPresets::module_only(&d), vec![d[1].clone()]);
        assert_eq!(SkipPresets::all_default(&d).len(), 3);
        assert!(SkipPresets::none().is_empty());
    }

    #[test]
    fn rule_display_is_stable() {
        let rule = SkipRule::new(["b", "a"], 1, "module");
        assert_eq!(rule.to_string(), "module-1-a,b");
        let empty = SkipRule::new(Vec::<String>::new(), 2, "version");
        assert_eq!(empty.to_string(), "version-2-none");
    }

    #[test]
    fn preserves_leaf_count() {
        let raw = vec![group(
            "zh-cn",
            vec![group(
                "支付",
                vec![group(
                    "V1",
                    vec![
                        page("概览", "/zh-cn/payments/v1/overview"),
                        group(
                            "指南",
                            vec![page("收银台", "/a"), page("退款", "/b")],
                        ),
                    ],
                )],
            )],
        )];
        let before = leaf_count(&raw);
        let rules = defaults();
        let out = skip_containers(raw, SkipOptions::new(&rules));
        assert_eq!(leaf_count(&out), before);
    }
}
