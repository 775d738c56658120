//! Reconciliation result cache.
//!
//! Reconciling a large collection is cheap but not free, and renderers ask for
//! the same tree on every request. The [`Reconciler`](crate::pipeline::Reconciler)
//! memoizes finished forests behind the [`NavCache`] trait so the host decides
//! the storage: [`TtlCache`] for a long-running process, [`NullCache`] for
//! one-shot CLI runs and tests that want every call to recompute.
//!
//! ## Cache keys
//!
//! Keys are **content-addressed**. [`cache_key`] hashes the full input forest
//! (SHA-256 over its JSON form) and appends every option that changes the
//! output:
//!
//! ```text
//! {tree_hash}-{module|all}-{locale}-{version}-{rules}
//! ```
//!
//! `rules` is `default` when the caller did not pass a rule set and `none`
//! when it passed an empty one. Those two produce different trees, so they
//! must never share a key. For the same reason a `-raw` suffix marks runs
//! that skip path simplification (locale or version unset), which would
//! otherwise collide with an explicit `zh-cn`/`v1` run.
//!
//! ## Expiry
//!
//! [`TtlCache`] is a bounded `moka` cache whose entries live for the
//! registry's `cache_ttl_secs` (five minutes stock). Expired entries are
//! never returned and are evicted by moka's own housekeeping.

use moka::sync::Cache;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use crate::skip::SkipRule;
use crate::types::NavNode;

/// Locale and version used in keys when the caller leaves them unset.
const DEFAULT_KEY_LOCALE: &str = "zh-cn";
const DEFAULT_KEY_VERSION: &str = "v1";

/// Upper bound on memoized forests; one per (collection, options) pair.
const MAX_ENTRIES: u64 = 1_000;

// =========================================================================
// Cache trait and implementations
// =========================================================================

/// Storage for reconciled forests. Lookups return an owned copy; callers may
/// mutate it freely.
pub trait NavCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<NavNode>>;
    fn insert(&self, key: &str, nodes: Vec<NavNode>);

    /// Counters since construction. Implementations that don't count report
    /// zeros.
    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
}

/// Never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCache;

impl NavCache for NullCache {
    fn get(&self, _key: &str) -> Option<Vec<NavNode>> {
        None
    }

    fn insert(&self, _key: &str, _nodes: Vec<NavNode>) {}
}

/// In-memory cache with a fixed time-to-live.
pub struct TtlCache {
    entries: Cache<String, Vec<NavNode>>,
    hits: AtomicU32,
    misses: AtomicU32,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .time_to_live(ttl)
            .build();

        Self {
            entries,
            hits: AtomicU32::new(0),
            misses: AtomicU32::new(0),
        }
    }
}

impl NavCache for TtlCache {
    fn get(&self, key: &str) -> Option<Vec<NavNode>> {
        let found = self.entries.get(key);
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    fn insert(&self, key: &str, nodes: Vec<NavNode>) {
        self.entries.insert(key.to_string(), nodes);
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

// =========================================================================
// Keys
// =========================================================================

/// SHA-256 of a forest's JSON form, as hex.
pub fn hash_tree(nodes: &[NavNode]) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(nodes)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Cache key for one reconciliation.
pub fn cache_key(
    nodes: &[NavNode],
    target_module: Option<&str>,
    content_locale: Option<&str>,
    version: Option<&str>,
    skip_rules: Option<&[SkipRule]>,
) -> Result<String, serde_json::Error> {
    let rules = match skip_rules {
        None => "default".to_string(),
        Some([]) => "none".to_string(),
        Some(rules) => rules
            .iter()
            .map(SkipRule::to_string)
            .collect::<Vec<_>>()
            .join("|"),
    };
    let raw = if content_locale.is_some() && version.is_some() {
        ""
    } else {
        "-raw"
    };
    Ok(format!(
        "{}-{}-{}-{}-{}{}",
        hash_tree(nodes)?,
        target_module.unwrap_or("all"),
        content_locale.unwrap_or(DEFAULT_KEY_LOCALE),
        version.unwrap_or(DEFAULT_KEY_VERSION),
        rules,
        raw
    ))
}

// =========================================================================
// Stats
// =========================================================================

/// Cache counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} reconciled ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} reconciled", self.misses)
        }
    }
}
