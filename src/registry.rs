//! Module and locale registry.
//!
//! The registry is the validated, lookup-friendly form of [`NavConfig`]. It is
//! built once at startup and shared (behind an `Arc`) by every component that
//! needs to know which modules exist, which locales are content locales, and
//! how collection names are spelled.
//!
//! ## Collection names
//!
//! The content layer stores one collection per module × locale pair, named
//! `{collection_base}_{locale_suffix}`:
//!
//! ```text
//! get_started_en      → ("get-started", "en")
//! payments_zh_cn      → ("payments", "zh-cn")
//! development_resources_zh_tw → ("development-resources", "zh-tw")
//! ```
//!
//! The locale suffix is the content locale with dashes turned into
//! underscores. Parsing strips the longest registered suffix.

use crate::config::{ConfigError, NavConfig};
use crate::skip::SkipRule;
use std::collections::BTreeMap;

/// One content module, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub key: String,
    pub collection_base_name: String,
    /// Never empty; contains `current_version` and `latest_version`.
    pub supported_versions: Vec<String>,
    pub current_version: String,
    pub latest_version: String,
    pub order: u32,
    pub route_root: String,
    pub i18n_key: String,
}

impl ModuleDescriptor {
    /// Sub-path a bare module route lands on: the tail of `route_root` when it
    /// lives under the module, otherwise `"overview"`.
    pub fn default_sub_path(&self) -> String {
        let prefix = format!("/{}/", self.key);
        self.route_root
            .strip_prefix(&prefix)
            .map(|tail| tail.trim_end_matches('/'))
            .filter(|tail| !tail.is_empty())
            .unwrap_or(DEFAULT_SUB_PATH)
            .to_string()
    }

    pub fn supports_version(&self, version: &str) -> bool {
        self.supported_versions.iter().any(|v| v == version)
    }
}

/// Sub-path used when nothing more specific is configured.
pub const DEFAULT_SUB_PATH: &str = "overview";

/// A UI locale and the content locale it reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleEntry {
    pub ui_locale: String,
    pub content_locale: String,
}

impl LocaleEntry {
    /// `_zh_cn` for `zh-cn`.
    pub fn collection_suffix(&self) -> String {
        collection_suffix(&self.content_locale)
    }
}

fn collection_suffix(content_locale: &str) -> String {
    format!("_{}", content_locale.replace('-', "_"))
}

/// Process-wide module/locale configuration.
#[derive(Debug, Clone)]
pub struct Registry {
    /// Sorted by `order`, then key.
    modules: Vec<ModuleDescriptor>,
    locales: Vec<LocaleEntry>,
    aliases: BTreeMap<String, String>,
    default_version: String,
    default_content_locale: String,
    language_containers: Vec<String>,
    module_containers: Vec<String>,
    max_skip_depth: usize,
    cache_ttl_secs: u64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::from_config(&NavConfig::default()).expect("stock config must be valid")
    }
}

impl Registry {
    /// Validate `config` and build the registry from it.
    pub fn from_config(config: &NavConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut modules: Vec<ModuleDescriptor> = config
            .modules
            .iter()
            .map(|(key, m)| ModuleDescriptor {
                key: key.clone(),
                collection_base_name: m.collection.clone(),
                supported_versions: m.versions.supported.clone(),
                current_version: m.versions.current.clone(),
                latest_version: m.versions.latest.clone(),
                order: m.order,
                route_root: m.route_path.clone(),
                i18n_key: if m.i18n_key.is_empty() {
                    key.clone()
                } else {
                    m.i18n_key.clone()
                },
            })
            .collect();
        modules.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.key.cmp(&b.key)));

        let locales = config
            .locales
            .iter()
            .map(|(ui, l)| LocaleEntry {
                ui_locale: ui.clone(),
                content_locale: l.content.clone(),
            })
            .collect();

        Ok(Self {
            modules,
            locales,
            aliases: config.aliases.clone(),
            default_version: config.navigation.default_version.clone(),
            default_content_locale: config.navigation.default_content_locale.clone(),
            language_containers: config.navigation.language_containers.clone(),
            module_containers: config.navigation.module_containers.clone(),
            max_skip_depth: config.navigation.max_skip_depth,
            cache_ttl_secs: config.navigation.cache_ttl_secs,
        })
    }

    // =========================================================================
    // Modules
    // =========================================================================

    /// Resolve aliases. Unknown names pass through unchanged; the `root`
    /// alias resolves to the empty string.
    pub fn normalize_module_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Look up a module by key or alias.
    pub fn module(&self, name: &str) -> Option<&ModuleDescriptor> {
        let key = self.normalize_module_name(name);
        self.modules.iter().find(|m| m.key == key)
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.module(name).is_some()
    }

    /// All modules in menu order.
    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    /// Version a module serves by default, falling back to the registry
    /// default for unknown modules.
    pub fn default_version_for(&self, module: &str) -> &str {
        self.module(module)
            .map(|m| m.current_version.as_str())
            .unwrap_or(&self.default_version)
    }

    /// Supported versions of a module; unknown modules report only the
    /// registry default.
    pub fn supported_versions_for(&self, module: &str) -> Vec<String> {
        self.module(module)
            .map(|m| m.supported_versions.clone())
            .unwrap_or_else(|| vec![self.default_version.clone()])
    }

    pub fn is_version_supported(&self, module: &str, version: &str) -> bool {
        self.module(module).is_some_and(|m| m.supports_version(version))
    }

    /// Default sub-path for a module, `"overview"` for unknown modules.
    pub fn default_sub_path(&self, module: &str) -> String {
        self.module(module)
            .map(ModuleDescriptor::default_sub_path)
            .unwrap_or_else(|| DEFAULT_SUB_PATH.to_string())
    }

    pub fn default_version(&self) -> &str {
        &self.default_version
    }

    // =========================================================================
    // Locales
    // =========================================================================

    pub fn locales(&self) -> &[LocaleEntry] {
        &self.locales
    }

    pub fn default_content_locale(&self) -> &str {
        &self.default_content_locale
    }

    /// Map a UI locale (`"zh-CN"`) to its content locale (`"zh-cn"`).
    /// Content locales map to themselves; anything else gets the default.
    pub fn content_locale(&self, locale: &str) -> &str {
        self.locales
            .iter()
            .find(|l| l.ui_locale == locale || l.content_locale == locale)
            .map(|l| l.content_locale.as_str())
            .unwrap_or(&self.default_content_locale)
    }

    /// Map a content locale back to its UI locale.
    pub fn ui_locale(&self, content_locale: &str) -> Option<&str> {
        self.locales
            .iter()
            .find(|l| l.content_locale == content_locale)
            .map(|l| l.ui_locale.as_str())
    }

    /// True when `segment` is a registered content locale (a full-form path
    /// starts with one).
    pub fn is_content_locale(&self, segment: &str) -> bool {
        self.locales.iter().any(|l| l.content_locale == segment)
    }

    /// Collection suffix for a UI or content locale; unknown locales get the
    /// English suffix.
    pub fn collection_suffix(&self, locale: &str) -> String {
        self.locales
            .iter()
            .find(|l| l.ui_locale == locale || l.content_locale == locale)
            .map(LocaleEntry::collection_suffix)
            .unwrap_or_else(|| "_en".to_string())
    }

    // =========================================================================
    // Collections
    // =========================================================================

    /// `payments` + `zh-cn` → `payments_zh_cn`. Unknown modules fall back to
    /// the first module's collection, matching what the content layer does.
    pub fn collection_name(&self, module: &str, content_locale: &str) -> String {
        let base = self
            .module(module)
            .or_else(|| self.modules.first())
            .map(|m| m.collection_base_name.as_str())
            .unwrap_or_default();
        format!("{base}{}", collection_suffix(content_locale))
    }

    /// Every module × content locale collection, in module order.
    pub fn all_collection_names(&self) -> Vec<String> {
        self.modules
            .iter()
            .flat_map(|m| {
                self.locales.iter().map(move |l| {
                    format!("{}{}", m.collection_base_name, l.collection_suffix())
                })
            })
            .collect()
    }

    /// Split a collection name into `(module_key, content_locale)`.
    ///
    /// Returns `None` when no registered locale suffix matches. The module
    /// key is looked up by collection base name; unregistered bases are
    /// returned with underscores turned into dashes.
    pub fn parse_collection_name(&self, collection: &str) -> Option<(String, String)> {
        let (base, locale) = self
            .locales
            .iter()
            .filter_map(|l| {
                collection
                    .strip_suffix(&l.collection_suffix())
                    .filter(|base| !base.is_empty())
                    .map(|base| (base, l))
            })
            .min_by_key(|(base, _)| base.len())?;

        let module = self
            .modules
            .iter()
            .find(|m| m.collection_base_name == base)
            .map(|m| m.key.clone())
            .unwrap_or_else(|| base.replace('_', "-"));
        Some((module, locale.content_locale.clone()))
    }

    // =========================================================================
    // Skip rules
    // =========================================================================

    /// Language wrappers at depth 0, module wrappers at depth 1, the version
    /// wrapper at depth 2.
    pub fn default_skip_rules(&self) -> Vec<SkipRule> {
        vec![
            SkipRule::new(self.language_containers.iter().cloned(), 0, "language"),
            SkipRule::new(self.module_containers.iter().cloned(), 1, "module"),
            SkipRule::new(std::iter::empty::<String>(), 2, "version"),
        ]
    }

    pub fn max_skip_depth(&self) -> usize {
        self.max_skip_depth
    }

    pub fn cache_ttl_secs(&self) -> u64 {
        self.cache_ttl_secs
    }
}
