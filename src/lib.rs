//! # docnav
//!
//! Navigation reconciliation for a multi-module, multi-locale documentation
//! site. The content layer hands us one raw navigation forest per collection
//! (a module × locale pair, e.g. `payments_zh_cn`); we hand back a single
//! canonical, de-duplicated, path-normalized tree for menus, breadcrumbs and
//! route prefetching.
//!
//! # Architecture: Reconciliation Pipeline
//!
//! ```text
//! collections.json ─→ Drafts ─→ Skip ─→ Merge ─→ Filter ─→ Clean ─→ Simplify ─→ Mark active
//!                     (unpublished) (wrappers) (titles) (module) (digits) (routes) (current page)
//! ```
//!
//! Every stage is a pure function from forest to forest, so each is unit
//! tested on tree literals without any I/O. The [`pipeline::Reconciler`]
//! composes them and memoizes results behind an injected
//! [`cache::NavCache`]; the [`navigation::Navigation`] facade adds path
//! parsing and active marking on top.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | `NavNode` wire shape and the exhaustive `NodeKind` classification |
//! | [`config`] | `docnav.toml` loading, merging over stock defaults, validation |
//! | [`registry`] | Validated module/locale/alias lookups and collection naming |
//! | [`path`] | Request path normalization, parsing and canonical serialization |
//! | [`skip`] | Container elision (language, module, version wrappers) |
//! | [`merge`] | Same-title sibling merging with metadata overlays |
//! | [`pipeline`] | Stage composition, module filter, cleanup, path simplification |
//! | [`cache`] | Content-addressed TTL cache and injectable clock |
//! | [`active`] | Active-page marking and breadcrumbs |
//! | [`navigation`] | Collections input and the renderer-facing facade |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Node Kinds Over Field Sniffing
//!
//! The content layer surfaces a directory's `.navigation.yml` as a sibling
//! node whose path ends in `/.navigation`. Instead of every pass checking that
//! suffix, [`types::classify`] maps each node to a [`types::NodeKind`] once,
//! and passes match on the enum.
//!
//! ## Module-Relative Routes
//!
//! When a target module is given, simplified paths drop the locale, module
//! and version segments: `/en/payments/v1/guides/refunds` becomes
//! `/guides/refunds`. The facade compares them against
//! [`path::PathDescriptor::module_relative_path`], so active marking needs no
//! further rewriting.
//!
//! ## Injected Cache
//!
//! The reconciler never reaches for a global. The host picks a
//! [`cache::TtlCache`] (a `moka` cache with the registry's time-to-live) or
//! a [`cache::NullCache`], which keeps tests deterministic and lets a
//! `Reconciler` be shared across threads.

pub mod active;
pub mod cache;
pub mod config;
pub mod merge;
pub mod navigation;
pub mod output;
pub mod path;
pub mod pipeline;
pub mod registry;
pub mod skip;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
