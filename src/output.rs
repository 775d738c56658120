//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not path-centric**. The primary display
//! for every node is its semantic identity (positional index and title) with
//! the route shown after an arrow. Descriptions and icons follow as indented
//! context lines, so the output reads as a menu inventory while still letting
//! users trace each entry to a route.
//!
//! # Output Format
//!
//! ## Navigation tree
//!
//! ```text
//! 001 Overview → /overview
//!     Description: Start accepting payments in minutes
//! 002 Quick Start → /quickstart [active]
//! 003 Concepts → /concepts (open)
//!     001 Accounts → /concepts/accounts
//!     002 API Keys → /concepts/api-keys
//!
//! 4 pages
//! ```
//!
//! ## Parsed path
//!
//! ```text
//! /payments/guides/refunds
//!     Module: payments
//!     Form: simplified
//!     Version: v1
//!     Sub-path: guides/refunds
//!     Canonical: /zh-cn/payments/v1/guides/refunds
//!     Collection: payments_zh_cn
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::cache::CacheStats;
use crate::navigation::ModuleMenuEntry;
use crate::path::PathDescriptor;
use crate::registry::Registry;
use crate::types::{NavNode, leaf_count};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

/// Header line of one node.
///
/// ```text
/// 002 Quick Start → /quickstart [active]
/// 003 (untitled)
/// ```
fn node_header(index: usize, node: &NavNode) -> String {
    let title = if node.title.is_empty() {
        "(untitled)"
    } else {
        node.title.as_str()
    };
    let mut line = format!("{} {}", format_index(index), title);
    if let Some(path) = &node.path {
        line.push_str(&format!(" \u{2192} {}", path));
    }
    if node.active {
        line.push_str(" [active]");
    } else if node.default_open {
        line.push_str(" (open)");
    }
    if node.draft {
        line.push_str(" (draft)");
    }
    line
}

// ============================================================================
// Navigation tree
// ============================================================================

/// Format a navigation forest, one header per node plus context lines, and a
/// trailing page count.
pub fn format_navigation(nodes: &[NavNode]) -> Vec<String> {
    let mut lines = Vec::new();
    format_level(nodes, 0, &mut lines);
    if !lines.is_empty() {
        lines.push(String::new());
    }
    let pages = leaf_count(nodes);
    lines.push(format!(
        "{} page{}",
        pages,
        if pages == 1 { "" } else { "s" }
    ));
    lines
}

fn format_level(nodes: &[NavNode], depth: usize, lines: &mut Vec<String>) {
    let base_indent = indent(depth);
    for (i, node) in nodes.iter().enumerate() {
        lines.push(format!("{}{}", base_indent, node_header(i + 1, node)));

        if let Some(desc) = &node.description {
            let truncated = truncate_desc(desc.trim(), 60);
            if !truncated.is_empty() {
                lines.push(format!("{}    Description: {}", base_indent, truncated));
            }
        }
        if let Some(icon) = &node.icon {
            lines.push(format!("{}    Icon: {}", base_indent, icon));
        }

        format_level(&node.children, depth + 1, lines);
    }
}

/// Print a navigation forest to stdout.
pub fn print_navigation(nodes: &[NavNode]) {
    for line in format_navigation(nodes) {
        println!("{}", line);
    }
}

/// Breadcrumb line: `Guides › Refunds`.
pub fn format_breadcrumbs(trail: &[String]) -> String {
    trail.join(" \u{203a} ")
}

// ============================================================================
// Path descriptor
// ============================================================================

/// Format a parsed request path.
pub fn format_descriptor(input: &str, d: &PathDescriptor) -> Vec<String> {
    let mut lines = vec![input.to_string()];
    if d.is_root {
        lines.push("    Root".to_string());
        return lines;
    }

    let module = match (&d.module, d.has_module) {
        (Some(m), true) => m.clone(),
        (Some(m), false) => format!("{} (not found)", m),
        (None, _) => "(none)".to_string(),
    };
    lines.push(format!("    Module: {}", module));
    lines.push(format!(
        "    Form: {}",
        if d.is_simplified_form { "simplified" } else { "full" }
    ));
    lines.push(format!("    Version: {}", d.version));
    lines.push(format!("    Sub-path: {}", d.sub_path));
    lines.push(format!("    Canonical: {}", d.canonical_content_path));
    if !d.collection_name.is_empty() {
        lines.push(format!("    Collection: {}", d.collection_name));
    }
    lines
}

pub fn print_descriptor(input: &str, d: &PathDescriptor) {
    for line in format_descriptor(input, d) {
        println!("{}", line);
    }
}

// ============================================================================
// Modules and collections
// ============================================================================

/// Format the module switcher.
///
/// ```text
/// 001 get-started → /get-started/overview
/// 002 payments → /payments/overview [active]
/// ```
pub fn format_module_menu(entries: &[ModuleMenuEntry]) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let marker = if e.active { " [active]" } else { "" };
            format!("{} {} \u{2192} {}{}", format_index(i + 1), e.key, e.to, marker)
        })
        .collect()
}

pub fn print_module_menu(entries: &[ModuleMenuEntry]) {
    for line in format_module_menu(entries) {
        println!("{}", line);
    }
}

/// Format collection names with the module and locale each resolves to.
///
/// ```text
/// payments_zh_cn → payments (zh-cn)
/// legacy_stuff → (unrecognized)
/// ```
pub fn format_collections<'a>(
    names: impl IntoIterator<Item = &'a str>,
    registry: &Registry,
) -> Vec<String> {
    names
        .into_iter()
        .map(|name| match registry.parse_collection_name(name) {
            Some((module, locale)) if registry.has_module(&module) => {
                format!("{} \u{2192} {} ({})", name, module, locale)
            }
            Some((module, locale)) => {
                format!("{} \u{2192} {} ({}, unregistered)", name, module, locale)
            }
            None => format!("{} \u{2192} (unrecognized)", name),
        })
        .collect()
}

pub fn print_collections<'a>(names: impl IntoIterator<Item = &'a str>, registry: &Registry) {
    for line in format_collections(names, registry) {
        println!("{}", line);
    }
}

/// One-line cache summary for verbose runs.
pub fn format_cache_stats(stats: &CacheStats) -> String {
    format!("Cache: {}", stats)
}
