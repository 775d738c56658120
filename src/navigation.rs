//! Collections input and the navigation facade.
//!
//! The content layer delivers one raw forest per collection
//! (`{module_base}_{locale_suffix}`, see [`registry`](crate::registry)).
//! [`Collections`] holds them; [`Navigation`] binds them to a [`Reconciler`]
//! and answers the questions a page renderer asks:
//!
//! - [`Navigation::navigation_items`]: the side menu for the page being
//!   viewed, with the current page marked and its ancestors opened.
//! - [`Navigation::module_navigation`]: the menu of any module, on demand.
//! - [`Navigation::module_menu`]: the top-level module switcher.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::active::{breadcrumb_trail, mark_active};
use crate::path::{PathDescriptor, parse};
use crate::pipeline::{NavError, ReconcileOptions, Reconciler};
use crate::registry::Registry;
use crate::skip::SkipRule;
use crate::types::{NavNode, nodes_from_values};

// =========================================================================
// Collections
// =========================================================================

/// Raw navigation forests keyed by collection name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    collections: BTreeMap<String, Vec<NavNode>>,
}

impl Collections {
    /// Parse `{"payments_en": [node, ...], ...}`.
    ///
    /// The top level must be an object and every value an array. Array
    /// elements that are not objects are dropped.
    pub fn from_json(input: &str) -> Result<Self, NavError> {
        let Value::Object(map) = serde_json::from_str::<Value>(input)? else {
            return Err(NavError::NotAnObject);
        };

        let mut collections = BTreeMap::new();
        for (name, nodes) in map {
            if !nodes.is_array() {
                return Err(NavError::NotAnArray(name));
            }
            collections.insert(name, nodes_from_values(nodes));
        }
        Ok(Self { collections })
    }

    /// Read and parse a collections file.
    pub fn load(path: &Path) -> Result<Self, NavError> {
        let content = std::fs::read_to_string(path)?;
        let collections = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.display(),
            collections = collections.len(),
            "loaded navigation collections"
        );
        Ok(collections)
    }

    pub fn insert(&mut self, name: impl Into<String>, nodes: Vec<NavNode>) {
        self.collections.insert(name.into(), nodes);
    }

    pub fn get(&self, name: &str) -> Option<&[NavNode]> {
        self.collections.get(name).map(Vec::as_slice)
    }

    /// Collection names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

// =========================================================================
// Facade
// =========================================================================

/// Everything a page needs to render its side menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationView {
    pub descriptor: PathDescriptor,
    pub items: Vec<NavNode>,
    /// Titles from the menu root to the current page.
    pub breadcrumbs: Vec<String>,
    /// A menu entry matched the current page.
    pub matched: bool,
}

impl NavigationView {
    fn empty(descriptor: PathDescriptor) -> Self {
        Self {
            descriptor,
            items: Vec::new(),
            breadcrumbs: Vec::new(),
            matched: false,
        }
    }
}

/// One entry of the module switcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleMenuEntry {
    pub key: String,
    pub i18n_key: String,
    /// Route of the module's landing page.
    pub to: String,
    pub active: bool,
}

pub struct Navigation {
    reconciler: Reconciler,
    collections: Collections,
}

impl Navigation {
    pub fn new(reconciler: Reconciler, collections: Collections) -> Self {
        Self {
            reconciler,
            collections,
        }
    }

    pub fn registry(&self) -> &Registry {
        self.reconciler.registry()
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    /// Side menu for `current_path` in `ui_locale`.
    ///
    /// Only the current module's collection is reconciled. Node paths in the
    /// result are module-relative (`/guides/refunds`), drafts are removed,
    /// and the node at the current page is marked active. Unknown modules
    /// and missing collections yield an empty view.
    pub fn navigation_items(
        &self,
        current_path: &str,
        ui_locale: &str,
    ) -> Result<NavigationView, NavError> {
        let registry = self.registry();
        let descriptor = parse(current_path, registry.content_locale(ui_locale), registry);

        let Some(module) = descriptor.module.clone().filter(|_| descriptor.has_module) else {
            tracing::debug!(path = current_path, "no module for path, empty navigation");
            return Ok(NavigationView::empty(descriptor));
        };
        let Some(raw) = self.collections.get(&descriptor.collection_name) else {
            tracing::warn!(
                collection = %descriptor.collection_name,
                "navigation collection not loaded"
            );
            return Ok(NavigationView::empty(descriptor));
        };
        let content_locale = registry
            .parse_collection_name(&descriptor.collection_name)
            .map(|(_, locale)| locale)
            .unwrap_or_else(|| registry.default_content_locale().to_string());

        let items = self.reconciler.reconcile(
            raw,
            ReconcileOptions {
                target_module: Some(module.as_str()),
                content_locale: Some(content_locale.as_str()),
                default_version: Some(descriptor.version.as_str()),
                skip_rules: None,
            },
        )?;

        let relative = descriptor.module_relative_path();
        let marking = mark_active(&items, &relative);
        let breadcrumbs = breadcrumb_trail(&marking.nodes, &relative);
        if !marking.matched {
            tracing::debug!(path = %relative, module = %module, "no menu entry for current page");
        }

        Ok(NavigationView {
            descriptor,
            items: marking.nodes,
            breadcrumbs,
            matched: marking.matched,
        })
    }

    /// Menu of `module` in `ui_locale`, reconciled on demand with the
    /// module's current version. Empty (with a warning) for unknown modules
    /// or missing collections.
    pub fn module_navigation(
        &self,
        module: &str,
        ui_locale: &str,
        skip_rules: Option<&[SkipRule]>,
    ) -> Result<Vec<NavNode>, NavError> {
        let registry = self.registry();
        let Some(descriptor) = registry.module(module) else {
            tracing::warn!(module, "unknown module, empty navigation");
            return Ok(Vec::new());
        };

        let content_locale = registry.content_locale(ui_locale);
        let collection = registry.collection_name(&descriptor.key, content_locale);
        let Some(raw) = self.collections.get(&collection) else {
            tracing::warn!(module, collection = %collection, "navigation collection not loaded");
            return Ok(Vec::new());
        };

        let items = self.reconciler.reconcile(
            raw,
            ReconcileOptions {
                target_module: Some(descriptor.key.as_str()),
                content_locale: Some(content_locale),
                default_version: Some(descriptor.current_version.as_str()),
                skip_rules,
            },
        )?;
        Ok(items)
    }

    /// Module switcher entries in menu order. The module of `current_path`
    /// is marked active.
    pub fn module_menu(&self, current_path: &str) -> Vec<ModuleMenuEntry> {
        let registry = self.registry();
        let current = parse(current_path, registry.default_content_locale(), registry).module;

        registry
            .modules()
            .iter()
            .map(|m| ModuleMenuEntry {
                key: m.key.clone(),
                i18n_key: m.i18n_key.clone(),
                to: m.route_root.clone(),
                active: current.as_deref() == Some(m.key.as_str()),
            })
            .collect()
    }
}
