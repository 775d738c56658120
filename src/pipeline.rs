//! Navigation reconciliation pipeline.
//!
//! Turns a raw collection forest into the tree renderers consume. Six
//! stages, each a pure function of the previous stage's output:
//!
//! ```text
//! 0. Drafts     drop unpublished nodes at every level      prune_drafts
//! 1. Skip       elide language/module/version wrappers     skip::skip_containers
//! 2. Merge      fold same-titled siblings                  merge::merge_by_title
//! 3. Filter     drop top-level nodes of other modules      filter_by_module
//! 4. Clean      trailing title digits, .navigation suffix  clean
//! 5. Simplify   /en/payments/v1/guides → /guides           simplify_paths
//! ```
//!
//! Drafts go first so an unpublished sibling never takes part in title
//! merging. Stage 5 only runs when both a content locale and a version are supplied.
//! With a target module the module segment is dropped too, so node paths are
//! relative to the module root and compare directly against
//! [`PathDescriptor::module_relative_path`](crate::path::PathDescriptor::module_relative_path).
//!
//! The [`Reconciler`] wraps the stages with a [`NavCache`] keyed by the full
//! argument set, see [`cache`](crate::cache).

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::cache::{self, CacheStats, NavCache, TtlCache};
use crate::config::ConfigError;
use crate::merge::merge_by_title;
use crate::path::segments;
use crate::registry::Registry;
use crate::skip::{SkipOptions, SkipRule, skip_containers};
use crate::types::{NavNode, strip_metadata_suffix};

#[derive(Error, Debug)]
pub enum NavError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Collections input must be a JSON object keyed by collection name")]
    NotAnObject,
    #[error("Collection '{0}' is not an array of navigation nodes")]
    NotAnArray(String),
}

/// Per-call reconciliation options. Every field is optional; see the module
/// docs for what each one enables.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions<'a> {
    /// Keep only this module's top-level nodes and make paths module-relative.
    pub target_module: Option<&'a str>,
    pub content_locale: Option<&'a str>,
    pub default_version: Option<&'a str>,
    /// `None` uses the registry's default rules; `Some(&[])` skips nothing.
    pub skip_rules: Option<&'a [SkipRule]>,
}

/// Runs the pipeline and memoizes its results.
pub struct Reconciler {
    registry: Arc<Registry>,
    cache: Box<dyn NavCache>,
}

impl Reconciler {
    /// A reconciler with a [`TtlCache`] using the registry's TTL.
    pub fn new(registry: Arc<Registry>) -> Self {
        let ttl = Duration::from_secs(registry.cache_ttl_secs());
        Self::with_cache(registry, Box::new(TtlCache::new(ttl)))
    }

    pub fn with_cache(registry: Arc<Registry>, cache: Box<dyn NavCache>) -> Self {
        Self { registry, cache }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Reconcile a raw forest. Identical inputs give identical output.
    pub fn reconcile(
        &self,
        raw: &[NavNode],
        opts: ReconcileOptions<'_>,
    ) -> Result<Vec<NavNode>, NavError> {
        let key = cache::cache_key(
            raw,
            opts.target_module,
            opts.content_locale,
            opts.default_version,
            opts.skip_rules,
        )?;

        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(key = %key, "using cached navigation");
            return Ok(hit);
        }

        tracing::debug!(
            nodes = raw.len(),
            target_module = opts.target_module.unwrap_or("all"),
            custom_rules = opts.skip_rules.is_some(),
            "reconciling navigation"
        );

        let result = run_stages(raw.to_vec(), opts, &self.registry);

        tracing::debug!(nodes = result.len(), key = %key, "navigation reconciled");
        self.cache.insert(&key, result.clone());
        Ok(result)
    }
}

/// The six stages without caching.
pub fn run_stages(raw: Vec<NavNode>, opts: ReconcileOptions<'_>, registry: &Registry) -> Vec<NavNode> {
    let default_rules;
    let rules: &[SkipRule] = match opts.skip_rules {
        Some(rules) => rules,
        None => {
            default_rules = registry.default_skip_rules();
            &default_rules
        }
    };

    let published = prune_drafts(raw);
    let skipped = skip_containers(
        published,
        SkipOptions::new(rules).with_max_depth(registry.max_skip_depth()),
    );
    let merged = merge_by_title(skipped);
    let filtered = filter_by_module(merged, opts.target_module, registry);
    let cleaned = clean(filtered);

    match (opts.content_locale, opts.default_version) {
        (Some(locale), Some(version)) => {
            simplify_paths(cleaned, locale, version, opts.target_module, registry)
        }
        _ => cleaned,
    }
}

/// Drop top-level nodes whose path names a module other than `target`.
///
/// A leading content-locale segment is skipped, and the segment after it is
/// the module. Content-form paths (`/{locale}/{module}/...`) must name the
/// target exactly. Locale-less paths are dropped only when their first
/// segment is another registered module, so module-relative routes such as
/// `/guides/refunds` survive a second pass. Pathless nodes are always kept.
pub fn filter_by_module(
    nodes: Vec<NavNode>,
    target: Option<&str>,
    registry: &Registry,
) -> Vec<NavNode> {
    let Some(target) = target else {
        return nodes;
    };
    let target = registry.normalize_module_name(target);

    nodes
        .into_iter()
        .filter(|node| {
            let Some(path) = node.path.as_deref() else {
                return true;
            };
            match path_module(path, registry) {
                Some(module) if registry.normalize_module_name(module) != target => {
                    tracing::debug!(title = %node.title, module, "skipping node of another module");
                    false
                }
                _ => true,
            }
        })
        .collect()
}

/// The module segment of `path`, if it names one.
fn path_module<'a>(path: &'a str, registry: &Registry) -> Option<&'a str> {
    match segments(path).as_slice() {
        [locale, module, ..] if registry.is_content_locale(locale) => Some(*module),
        [first, ..] if registry.has_module(first) => Some(*first),
        _ => None,
    }
}

/// Strip trailing digits from titles and the metadata file segment from
/// paths, recursively.
pub fn clean(nodes: Vec<NavNode>) -> Vec<NavNode> {
    nodes.into_iter().map(clean_node).collect()
}

fn clean_node(mut node: NavNode) -> NavNode {
    node.title = node
        .title
        .trim_end_matches(|c: char| c.is_ascii_digit())
        .trim()
        .to_string();
    node.path = node.path.as_deref().map(strip_metadata_suffix);
    node.children = clean(std::mem::take(&mut node.children));
    node
}

/// Rewrite content paths into site routes, recursively.
///
/// Removes a leading `locale` segment, then (with a target) a leading module
/// segment naming the target, then the first `version` segment. Pathless
/// nodes are left alone.
pub fn simplify_paths(
    nodes: Vec<NavNode>,
    locale: &str,
    version: &str,
    target_module: Option<&str>,
    registry: &Registry,
) -> Vec<NavNode> {
    nodes
        .into_iter()
        .map(|mut node| {
            node.path = node
                .path
                .as_deref()
                .map(|p| simplify_path(p, locale, version, target_module, registry));
            node.children = simplify_paths(
                std::mem::take(&mut node.children),
                locale,
                version,
                target_module,
                registry,
            );
            node
        })
        .collect()
}

fn simplify_path(
    path: &str,
    locale: &str,
    version: &str,
    target_module: Option<&str>,
    registry: &Registry,
) -> String {
    let mut segs = segments(path);

    if segs.first() == Some(&locale) {
        segs.remove(0);
    }
    if let Some(target) = target_module
        && let Some(first) = segs.first()
        && registry.normalize_module_name(first) == registry.normalize_module_name(target)
    {
        segs.remove(0);
    }
    if let Some(pos) = segs.iter().position(|s| *s == version) {
        segs.remove(pos);
    }

    format!("/{}", segs.join("/"))
}

/// Remove draft nodes at every level.
pub fn prune_drafts(nodes: Vec<NavNode>) -> Vec<NavNode> {
    nodes
        .into_iter()
        .filter(|n| !n.draft)
        .map(|mut n| {
            n.children = prune_drafts(std::mem::take(&mut n.children));
            n
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::NullCache;
    use crate::skip::SkipPresets;
    use crate::test_helpers::*;
    use crate::types::leaf_count;

    fn registry() -> Arc<Registry> {
        Arc::new(Registry::default())
    }

    fn uncached() -> Reconciler {
        Reconciler::with_cache(registry(), Box::new(NullCache))
    }

    fn module_opts(module: &str) -> ReconcileOptions<'_> {
        ReconcileOptions {
            target_module: Some(module),
            content_locale: Some("en"),
            default_version: Some("v1"),
            skip_rules: None,
        }
    }

    fn payments_raw() -> Vec<NavNode> {
        vec![group(
            "en",
            vec![module_container(
                "Payments",
                "/en/payments",
                vec![group(
                    "V1",
                    vec![
                        described(marker("Overview", "/en/payments/v1/overview/.navigation"), "Module intro"),
                        page("Overview", "/en/payments/v1/overview"),
                        group(
                            "Guides2",
                            vec![
                                page("Checkout", "/en/payments/v1/guides/checkout"),
                                page("Refunds", "/en/payments/v1/guides/refunds"),
                            ],
                        ),
                        section(
                            "Payout Guides",
                            "/en/transfers/v1/overview",
                            vec![page("Payouts", "/en/transfers/v1/payouts")],
                        ),
                    ],
                )],
            )],
        )]
    }

    // =========================================================================
    // End-to-end scenarios
    // =========================================================================

    #[test]
    fn module_container_collapses_to_relative_pages() {
        let raw = vec![module_container(
            "Guides",
            "/en/get-started",
            vec![page("Quick Start", "/en/get-started/v1/quickstart")],
        )];
        let out = uncached().reconcile(&raw, module_opts("get-started")).unwrap();
        assert_eq!(out, vec![page("Quick Start", "/quickstart")]);
    }

    #[test]
    fn metadata_and_page_fold_into_one_overview() {
        let out = uncached().reconcile(&payments_raw(), module_opts("payments")).unwrap();
        assert_nav_shape(&out, &[("Overview", &[]), ("Guides", &["Checkout", "Refunds"])]);

        let overview = find_node(&out, "Overview");
        assert_eq!(overview.path.as_deref(), Some("/overview"));
        assert_eq!(overview.description.as_deref(), Some("Module intro"));
        assert_eq!(find_by_path(&out, "/guides/refunds").title, "Refunds");
    }

    #[test]
    fn no_target_keeps_every_module() {
        let opts = ReconcileOptions {
            content_locale: Some("en"),
            default_version: Some("v1"),
            ..Default::default()
        };
        let out = uncached().reconcile(&payments_raw(), opts).unwrap();
        assert!(titles(&out).contains(&"Payout Guides"));
        assert_eq!(
            find_node(&out, "Payout Guides").path.as_deref(),
            Some("/transfers/overview")
        );
    }

    #[test]
    fn without_locale_paths_stay_in_content_form() {
        let opts = ReconcileOptions {
            target_module: Some("payments"),
            ..Default::default()
        };
        let out = uncached().reconcile(&payments_raw(), opts).unwrap();
        assert_eq!(
            find_node(&out, "Overview").path.as_deref(),
            Some("/en/payments/v1/overview")
        );
    }

    #[test]
    fn alias_target_module() {
        let out = uncached().reconcile(&payments_raw(), module_opts("payment")).unwrap();
        assert!(!titles(&out).contains(&"Payout Guides"));
        assert_eq!(find_node(&out, "Overview").path.as_deref(), Some("/overview"));
    }

    #[test]
    fn empty_rule_set_skips_nothing() {
        let none = SkipPresets::none();
        let opts = ReconcileOptions {
            skip_rules: Some(&none),
            ..Default::default()
        };
        let out = uncached().reconcile(&payments_raw(), opts).unwrap();
        assert_eq!(titles(&out), vec!["en"]);
    }

    // =========================================================================
    // Properties
    // =========================================================================

    #[test]
    fn reconcile_is_idempotent_after_rewrapping() {
        let reconciler = uncached();
        let opts = module_opts("payments");
        let once = reconciler.reconcile(&payments_raw(), opts).unwrap();
        let twice = reconciler.reconcile(&rewrap(once.clone()), opts).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn reconcile_is_deterministic() {
        let a = uncached().reconcile(&payments_raw(), module_opts("payments")).unwrap();
        let b = uncached().reconcile(&payments_raw(), module_opts("payments")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unique_titles_keep_leaf_count() {
        let raw = vec![group(
            "en",
            vec![group(
                "Payments",
                vec![group(
                    "V1",
                    vec![
                        page("A", "/en/payments/v1/a"),
                        group("G", vec![page("B", "/en/payments/v1/g/b"), page("C", "/en/payments/v1/g/c")]),
                    ],
                )],
            )],
        )];
        let out = uncached().reconcile(&raw, module_opts("payments")).unwrap();
        assert_eq!(leaf_count(&out), 3);
    }

    // =========================================================================
    // Stages
    // =========================================================================

    #[test]
    fn clean_strips_title_digits_and_metadata_suffix() {
        let out = clean(vec![section(
            "Guides 02",
            "/en/guides/.navigation",
            vec![page("Step3", "/en/guides/step")],
        )]);
        assert_eq!(out[0].title, "Guides");
        assert_eq!(out[0].path.as_deref(), Some("/en/guides"));
        assert_eq!(out[0].children[0].title, "Step");
    }

    #[test]
    fn simplify_handles_edge_paths() {
        let registry = Registry::default();
        let out = simplify_paths(
            vec![page("Root", "/en/v1"), page("Other", "/zh-cn/payments/v1/x"), NavNode::new("Label")],
            "en",
            "v1",
            Some("payments"),
            &registry,
        );
        assert_eq!(out[0].path.as_deref(), Some("/"));
        assert_eq!(out[1].path.as_deref(), Some("/zh-cn/payments/x"));
        assert_eq!(out[2].path, None);
    }

    #[test]
    fn filter_drops_other_modules_with_or_without_locale() {
        let registry = Registry::default();
        let nodes = vec![
            NavNode::new("Label"),
            page("Simple", "/transfers/overview"),
            page("Other", "/en/transfers/v1/overview"),
            page("Legacy", "/en/legacy/v1/overview"),
            page("Mine", "/en/payments/v1/overview"),
            page("Aliased", "/payment/overview"),
        ];
        let out = filter_by_module(nodes, Some("payments"), &registry);
        assert_eq!(titles(&out), vec!["Label", "Mine", "Aliased"]);
    }

    #[test]
    fn filter_keeps_module_relative_routes() {
        let registry = Registry::default();
        let nodes = vec![
            page("Overview", "/overview"),
            page("Refunds", "/guides/refunds"),
            page("Home", "/en"),
        ];
        let out = filter_by_module(nodes, Some("payments"), &registry);
        assert_eq!(titles(&out), vec!["Overview", "Refunds", "Home"]);
    }

    #[test]
    fn other_module_without_locale_is_dropped_by_reconcile() {
        let none = SkipPresets::none();
        let raw = vec![
            page("Payout", "/transfers/overview"),
            page("Mine", "/en/payments/v1/overview"),
        ];
        let opts = ReconcileOptions {
            target_module: Some("payments"),
            skip_rules: Some(&none),
            ..Default::default()
        };
        let out = uncached().reconcile(&raw, opts).unwrap();
        assert_eq!(titles(&out), vec!["Mine"]);
    }

    #[test]
    fn draft_sibling_never_displaces_published_page() {
        let mut wip = described(
            page("Refunds", "/en/payments/v1/refunds-wip"),
            "work in progress rewrite",
        );
        wip.draft = true;
        let raw = vec![group(
            "en",
            vec![group(
                "Payments",
                vec![group(
                    "V1",
                    vec![page("Refunds", "/en/payments/v1/refunds"), wip],
                )],
            )],
        )];

        let out = uncached().reconcile(&raw, module_opts("payments")).unwrap();
        assert_eq!(out, vec![page("Refunds", "/refunds")]);
    }

    #[test]
    fn drafts_are_gone_before_merging() {
        let mut draft_guides = section(
            "Guides",
            "/en/payments/v1/guides-next",
            vec![page("Next", "/en/payments/v1/guides-next/a"), page("More", "/en/payments/v1/guides-next/b")],
        );
        draft_guides.draft = true;
        let raw = vec![
            section("Guides", "/en/payments/v1/guides", vec![page("Checkout", "/en/payments/v1/guides/checkout")]),
            draft_guides,
        ];
        let out = uncached().reconcile(&raw, module_opts("payments")).unwrap();
        assert_nav_shape(&out, &[("Guides", &["Checkout"])]);
        assert_eq!(out[0].path.as_deref(), Some("/guides"));
    }

    #[test]
    fn prune_drafts_recurses() {
        let mut hidden = page("Hidden", "/h");
        hidden.draft = true;
        let nodes = vec![group("G", vec![hidden.clone(), page("Shown", "/s")]), hidden];
        let out = prune_drafts(nodes);
        assert_nav_shape(&out, &[("G", &["Shown"])]);
    }

    // =========================================================================
    // Caching
    // =========================================================================

    #[test]
    fn second_call_hits_cache_until_ttl() {
        let clock = ManualClock::default();
        let cache = ClockedCache::new(Duration::from_secs(300), clock.clone());
        let reconciler = Reconciler::with_cache(registry(), Box::new(cache));
        let raw = payments_raw();

        let first = reconciler.reconcile(&raw, module_opts("payments")).unwrap();
        let second = reconciler.reconcile(&raw, module_opts("payments")).unwrap();
        assert_eq!(first, second);
        assert_eq!(reconciler.cache_stats().hits, 1);

        clock.advance(Duration::from_secs(301));
        let third = reconciler.reconcile(&raw, module_opts("payments")).unwrap();
        assert_eq!(first, third);
        let stats = reconciler.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn different_options_do_not_share_entries() {
        let reconciler = Reconciler::new(registry());
        let raw = payments_raw();
        let scoped = reconciler.reconcile(&raw, module_opts("payments")).unwrap();
        let all = reconciler.reconcile(&raw, ReconcileOptions::default()).unwrap();
        assert_ne!(scoped, all);
        assert_eq!(reconciler.cache_stats().hits, 0);
    }
}
