//! Request path normalization and parsing.
//!
//! The site accepts two route forms:
//!
//! ```text
//! full        /{locale}/{module}/{version}/{sub/path}   /zh-cn/payments/v1/guides/checkout
//! simplified  /{module}/{sub/path}                      /payments/guides/checkout
//! ```
//!
//! A path is in full form when its first segment is a registered content
//! locale. Anything missing is filled from the registry: the module's current
//! version, and the module's default sub-path (the tail of its `route_root`,
//! usually `overview`). Module names go through the alias table first.
//!
//! [`parse`] is pure. For a canonical full-form path `p`,
//! `parse(p).canonical_content_path == p`, and
//! `parse(serialize(parse(p))) == parse(p)`.

use serde::Serialize;

use crate::config::is_version;
use crate::registry::Registry;

/// Options for [`normalize`].
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    /// Collapse trailing slashes (the root `/` is left alone).
    pub trim_trailing_slash: bool,
    /// Keep the `#fragment`.
    pub include_hash: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            trim_trailing_slash: true,
            include_hash: false,
        }
    }
}

/// Strip the fragment (unless asked not to) and trailing slashes.
pub fn normalize(path: &str, opts: NormalizeOptions) -> String {
    let mut result = path;
    if !opts.include_hash
        && let Some(idx) = result.find('#')
    {
        result = &result[..idx];
    }
    if opts.trim_trailing_slash && result.len() > 1 && result.ends_with('/') {
        result = result.trim_end_matches('/');
        if result.is_empty() {
            return "/".to_string();
        }
    }
    result.to_string()
}

/// Compare two routes after normalizing both the same way.
pub fn are_same_page(a: &str, b: &str, opts: NormalizeOptions) -> bool {
    normalize(a, opts) == normalize(b, opts)
}

/// `/{module}/overview`, the landing page of a module in simplified form.
pub fn is_canonical_overview_path(path: &str) -> bool {
    let mut segments = path.strip_prefix('/').unwrap_or("").split('/');
    let (Some(module), Some("overview"), None) = (segments.next(), segments.next(), segments.next())
    else {
        return false;
    };
    !module.is_empty()
        && module
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

/// Human title from the last path segment: `/payments/quick-start` →
/// `Quick Start`.
pub fn title_from_path(path: &str) -> String {
    let segs = segments(path);
    let Some(last) = segs.last() else {
        return "Unknown Page".to_string();
    };
    last.split('-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Non-empty `/`-separated segments of a path, query string excluded.
pub fn segments(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or("");
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Structured view of a request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathDescriptor {
    pub is_root: bool,
    /// Locale segment omitted from the request.
    pub is_simplified_form: bool,
    /// Canonical module key; `Some("root")` for `/`, `None` when the path
    /// names no module (the `root` alias).
    pub module: Option<String>,
    pub version: String,
    pub sub_path: String,
    /// `/{locale}/{module}/{version}/{sub_path}`, or `/` for the root.
    pub canonical_content_path: String,
    /// Empty unless `has_module`.
    pub collection_name: String,
    /// The module exists in the registry. `false` means "not found".
    pub has_module: bool,
}

impl PathDescriptor {
    fn root() -> Self {
        Self {
            is_root: true,
            is_simplified_form: false,
            module: Some("root".to_string()),
            version: String::new(),
            sub_path: String::new(),
            canonical_content_path: "/".to_string(),
            collection_name: String::new(),
            has_module: false,
        }
    }

    /// `/{module}/{sub_path}`, the route form users see.
    pub fn simplified_path(&self) -> String {
        match (&self.module, self.is_root) {
            (Some(module), false) => format!("/{module}/{}", self.sub_path),
            _ => "/".to_string(),
        }
    }

    /// `/{sub_path}`. Matches node paths of a module-targeted reconciliation.
    pub fn module_relative_path(&self) -> String {
        format!("/{}", self.sub_path)
    }
}

/// Parse a request path. `content_locale` fills the locale of a simplified
/// path; a full-form path carries its own.
pub fn parse(path: &str, content_locale: &str, registry: &Registry) -> PathDescriptor {
    let normalized = normalize(path, NormalizeOptions::default());
    let segs = segments(&normalized);
    if segs.is_empty() {
        return PathDescriptor::root();
    }

    let is_simplified_form = !registry.is_content_locale(segs[0]);
    let (locale, raw_module, version, rest) = if is_simplified_form {
        (content_locale, segs[0], None, &segs[1..])
    } else {
        let raw_module = segs.get(1).copied().unwrap_or("");
        match segs.get(2) {
            Some(v) if is_version(v) => (segs[0], raw_module, Some(*v), &segs[3..]),
            _ => (segs[0], raw_module, None, segs.get(2..).unwrap_or(&[])),
        }
    };

    let module = registry.normalize_module_name(raw_module);
    let version = version
        .map(str::to_string)
        .unwrap_or_else(|| registry.default_version_for(module).to_string());
    let sub_path = if rest.is_empty() {
        registry.default_sub_path(module)
    } else {
        rest.join("/")
    };

    let has_module = registry.has_module(module);
    let collection_name = if has_module {
        registry.collection_name(module, locale)
    } else {
        String::new()
    };

    PathDescriptor {
        is_root: false,
        is_simplified_form,
        module: (!module.is_empty()).then(|| module.to_string()),
        canonical_content_path: format!("/{locale}/{module}/{version}/{sub_path}"),
        version,
        sub_path,
        collection_name,
        has_module,
    }
}

/// The canonical full-form path of a descriptor.
pub fn serialize(descriptor: &PathDescriptor) -> String {
    descriptor.canonical_content_path.clone()
}
