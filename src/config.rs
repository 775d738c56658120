//! Navigation configuration.
//!
//! Handles loading, validating, and merging `docnav.toml`. Stock defaults
//! describe the documentation site this crate was built for (five modules,
//! three locales); a user file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! [navigation]
//! default_version = "v1"
//! default_content_locale = "zh-cn"
//! max_skip_depth = 10
//! cache_ttl_secs = 300
//! language_containers = ["en", "zh-cn", "zh-tw", "En", "Zh", "Zh Cn", "Zh Tw"]
//! module_containers = ["Get Started", "Payments", ...]
//!
//! [modules.payments]
//! collection = "payments"
//! order = 2
//! route_path = "/payments/overview"
//! i18n_key = "payments"
//!
//! [modules.payments.versions]
//! current = "v1"
//! supported = ["v1"]
//! latest = "v1"
//!
//! [locales."zh-CN"]
//! content = "zh-cn"
//!
//! [aliases]
//! payment = "payments"
//! ```
//!
//! ## Partial Configuration
//!
//! Tables merge key by key, so adding a module is just another
//! `[modules.<key>]` table; overriding one field of an existing module only
//! needs that field. Arrays replace wholesale. Unknown keys are rejected.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

/// File name looked up in the config directory.
pub const CONFIG_FILENAME: &str = "docnav.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration loaded from `docnav.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavConfig {
    /// Pipeline-wide defaults.
    pub navigation: NavigationConfig,
    /// Module registry, keyed by module key (`"get-started"`).
    pub modules: BTreeMap<String, ModuleConfig>,
    /// Locale registry, keyed by UI locale (`"zh-CN"`).
    pub locales: BTreeMap<String, LocaleConfig>,
    /// Module name aliases (`"payment"` → `"payments"`). An empty target
    /// means "no module" (`"root"` → `""`).
    pub aliases: BTreeMap<String, String>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            navigation: NavigationConfig::default(),
            modules: default_modules(),
            locales: default_locales(),
            aliases: default_aliases(),
        }
    }
}

/// Pipeline-wide defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationConfig {
    /// Version used when a path doesn't name one and the module is unknown.
    pub default_version: String,
    /// Content locale used when a UI locale isn't registered.
    pub default_content_locale: String,
    /// Recursion limit for container skipping.
    pub max_skip_depth: usize,
    /// Lifetime of a memoized reconciliation result.
    pub cache_ttl_secs: u64,
    /// Titles of language-level wrapper nodes.
    pub language_containers: Vec<String>,
    /// Titles of module-level wrapper nodes, in every locale.
    pub module_containers: Vec<String>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            default_version: "v1".to_string(),
            default_content_locale: "zh-cn".to_string(),
            max_skip_depth: 10,
            cache_ttl_secs: 300,
            language_containers: ["en", "zh-cn", "zh-tw", "En", "Zh", "Zh Cn", "Zh Tw"]
                .map(String::from)
                .to_vec(),
            module_containers: [
                "Get Started",
                "Payments",
                "Transfers",
                "Development Resources",
                "Revenue",
                "快速开始",
                "支付",
                "转账",
                "开发资源",
                "营收",
                "快速開始",
                "轉帳",
                "開發資源",
                "營收",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

/// One content module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    /// Collection base name (`"get_started"`); the locale suffix is appended.
    pub collection: String,
    pub versions: VersionsConfig,
    /// Menu position, ascending.
    pub order: u32,
    /// Landing route for the module (`"/payments/overview"`).
    pub route_path: String,
    /// Translation key for the module label.
    #[serde(default)]
    pub i18n_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionsConfig {
    pub current: String,
    pub supported: Vec<String>,
    pub latest: String,
}

/// Mapping from a UI locale to the locale used in content paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocaleConfig {
    /// Content locale (`"zh-cn"`).
    pub content: String,
}

fn module(collection: &str, order: u32, route_path: &str, i18n_key: &str) -> ModuleConfig {
    ModuleConfig {
        collection: collection.to_string(),
        versions: VersionsConfig {
            current: "v1".to_string(),
            supported: vec!["v1".to_string()],
            latest: "v1".to_string(),
        },
        order,
        route_path: route_path.to_string(),
        i18n_key: i18n_key.to_string(),
    }
}

fn default_modules() -> BTreeMap<String, ModuleConfig> {
    BTreeMap::from([
        (
            "get-started".to_string(),
            module("get_started", 1, "/get-started/overview", "getStarted"),
        ),
        (
            "payments".to_string(),
            module("payments", 2, "/payments/overview", "payments"),
        ),
        (
            "transfers".to_string(),
            module("transfers", 3, "/transfers/overview", "transfers"),
        ),
        (
            "development-resources".to_string(),
            module(
                "development_resources",
                4,
                "/development-resources/overview",
                "developmentResources",
            ),
        ),
        (
            "revenue".to_string(),
            module("revenue", 5, "/revenue/overview", "revenue"),
        ),
    ])
}

fn default_locales() -> BTreeMap<String, LocaleConfig> {
    [("en", "en"), ("zh-CN", "zh-cn"), ("zh-TW", "zh-tw")]
        .into_iter()
        .map(|(ui, content)| {
            (
                ui.to_string(),
                LocaleConfig {
                    content: content.to_string(),
                },
            )
        })
        .collect()
}

fn default_aliases() -> BTreeMap<String, String> {
    [
        ("transfer", "transfers"),
        ("payment", "payments"),
        ("root", ""),
        ("getting-started", "get-started"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

impl NavConfig {
    /// Validate cross-field invariants the type system can't express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.modules.is_empty() {
            return Err(ConfigError::Validation(
                "at least one module must be configured".into(),
            ));
        }
        if self.locales.is_empty() {
            return Err(ConfigError::Validation(
                "at least one locale must be configured".into(),
            ));
        }
        if !is_version(&self.navigation.default_version) {
            return Err(ConfigError::Validation(format!(
                "navigation.default_version {:?} must look like v1, v2.1",
                self.navigation.default_version
            )));
        }
        if !self
            .locales
            .values()
            .any(|l| l.content == self.navigation.default_content_locale)
        {
            return Err(ConfigError::Validation(format!(
                "navigation.default_content_locale {:?} is not a configured content locale",
                self.navigation.default_content_locale
            )));
        }
        for (key, module) in &self.modules {
            let versions = &module.versions;
            if versions.supported.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "modules.{key}.versions.supported must not be empty"
                )));
            }
            if let Some(bad) = versions.supported.iter().find(|v| !is_version(v)) {
                return Err(ConfigError::Validation(format!(
                    "modules.{key}.versions.supported contains {bad:?}, expected v<number>"
                )));
            }
            for (field, value) in [("current", &versions.current), ("latest", &versions.latest)] {
                if !versions.supported.contains(value) {
                    return Err(ConfigError::Validation(format!(
                        "modules.{key}.versions.{field} {value:?} is not in supported"
                    )));
                }
            }
            if module.collection.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "modules.{key}.collection must not be empty"
                )));
            }
        }
        for (alias, target) in &self.aliases {
            if !target.is_empty() && !self.modules.contains_key(target) {
                return Err(ConfigError::Validation(format!(
                    "aliases.{alias} points at unknown module {target:?}"
                )));
            }
        }
        Ok(())
    }
}

static VERSION_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v[0-9]+(\.[0-9]+)*$").expect("valid regex literal"));

/// `v` followed by dot-separated digit groups: `v1`, `v2.10`.
pub fn is_version(segment: &str) -> bool {
    VERSION_SEGMENT.is_match(segment)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(NavConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `docnav.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<NavConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: NavConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `docnav.toml` in the given directory, on top of the
/// stock defaults.
pub fn load_config(dir: &Path) -> Result<NavConfig, ConfigError> {
    let config = resolve_config(stock_defaults_value(), load_raw_config(dir)?)?;
    tracing::debug!(
        dir = %dir.display(),
        modules = config.modules.len(),
        locales = config.locales.len(),
        "loaded navigation config"
    );
    Ok(config)
}

/// Returns a fully-commented stock `docnav.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# docnav configuration
# ====================
# All settings are optional. Values shown below are the defaults.
# Tables merge key by key with the defaults; arrays replace them.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Pipeline defaults
# ---------------------------------------------------------------------------
[navigation]
# Version assumed when a path doesn't name one.
default_version = "v1"

# Content locale used when the UI locale isn't registered below.
default_content_locale = "zh-cn"

# Recursion limit when eliding container levels.
max_skip_depth = 10

# How long a reconciled tree stays memoized, in seconds.
cache_ttl_secs = 300

# Titles of language wrapper nodes (elided at depth 0).
language_containers = ["en", "zh-cn", "zh-tw", "En", "Zh", "Zh Cn", "Zh Tw"]

# Titles of module wrapper nodes in every locale (elided at depth 1).
module_containers = [
    "Get Started", "Payments", "Transfers", "Development Resources", "Revenue",
    "快速开始", "支付", "转账", "开发资源", "营收",
    "快速開始", "轉帳", "開發資源", "營收",
]

# ---------------------------------------------------------------------------
# Modules
# ---------------------------------------------------------------------------
# collection: collection base name, the locale suffix (_en, _zh_cn) is appended
# order:      menu position
# route_path: landing route; its tail is the default sub-path ("overview")
[modules.get-started]
collection = "get_started"
order = 1
route_path = "/get-started/overview"
i18n_key = "getStarted"
versions = { current = "v1", supported = ["v1"], latest = "v1" }

[modules.payments]
collection = "payments"
order = 2
route_path = "/payments/overview"
i18n_key = "payments"
versions = { current = "v1", supported = ["v1"], latest = "v1" }

[modules.transfers]
collection = "transfers"
order = 3
route_path = "/transfers/overview"
i18n_key = "transfers"
versions = { current = "v1", supported = ["v1"], latest = "v1" }

[modules.development-resources]
collection = "development_resources"
order = 4
route_path = "/development-resources/overview"
i18n_key = "developmentResources"
versions = { current = "v1", supported = ["v1"], latest = "v1" }

[modules.revenue]
collection = "revenue"
order = 5
route_path = "/revenue/overview"
i18n_key = "revenue"
versions = { current = "v1", supported = ["v1"], latest = "v1" }

# ---------------------------------------------------------------------------
# Locales: UI locale -> content locale
# ---------------------------------------------------------------------------
[locales.en]
content = "en"

[locales.zh-CN]
content = "zh-cn"

[locales.zh-TW]
content = "zh-tw"

# ---------------------------------------------------------------------------
# Module aliases accepted in request paths. "" means "no module".
# ---------------------------------------------------------------------------
[aliases]
transfer = "transfers"
payment = "payments"
root = ""
getting-started = "get-started"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        NavConfig::default().validate().unwrap();
    }

    #[test]
    fn default_config_has_five_modules() {
        let config = NavConfig::default();
        assert_eq!(config.modules.len(), 5);
        assert_eq!(config.modules["get-started"].collection, "get_started");
        assert_eq!(config.locales["zh-CN"].content, "zh-cn");
        assert_eq!(config.navigation.cache_ttl_secs, 300);
    }

    #[test]
    fn stock_toml_matches_defaults() {
        let parsed: NavConfig = toml::from_str(stock_config_toml()).unwrap();
        let stock = NavConfig::default();
        assert_eq!(
            toml::Value::try_from(parsed).unwrap(),
            toml::Value::try_from(stock).unwrap()
        );
    }

    #[test]
    fn is_version_accepts_dotted_numbers() {
        assert!(is_version("v1"));
        assert!(is_version("v2.10"));
        assert!(!is_version("v"));
        assert!(!is_version("v1."));
        assert!(!is_version("version"));
        assert!(!is_version("1"));
        assert!(!is_version("guides"));
        assert!(!is_version("v1.2-beta"));
        assert!(!is_version("v\u{0661}"));
    }

    // =========================================================================
    // Merging
    // =========================================================================

    #[test]
    fn partial_override_keeps_other_fields() {
        let overlay: toml::Value = toml::from_str(
            r#"
[modules.payments]
order = 9
"#,
        )
        .unwrap();
        let config = resolve_config(stock_defaults_value(), Some(overlay)).unwrap();
        assert_eq!(config.modules["payments"].order, 9);
        assert_eq!(config.modules["payments"].collection, "payments");
        assert_eq!(config.modules.len(), 5);
    }

    #[test]
    fn new_module_can_be_added() {
        let overlay: toml::Value = toml::from_str(
            r#"
[modules.risk]
collection = "risk"
order = 6
route_path = "/risk/overview"
versions = { current = "v2", supported = ["v1", "v2"], latest = "v2" }
"#,
        )
        .unwrap();
        let config = resolve_config(stock_defaults_value(), Some(overlay)).unwrap();
        assert_eq!(config.modules["risk"].versions.current, "v2");
        assert_eq!(config.modules["risk"].i18n_key, "");
    }

    #[test]
    fn arrays_replace_wholesale() {
        let overlay: toml::Value = toml::from_str(
            r#"
[navigation]
language_containers = ["English"]
"#,
        )
        .unwrap();
        let config = resolve_config(stock_defaults_value(), Some(overlay)).unwrap();
        assert_eq!(config.navigation.language_containers, vec!["English"]);
    }

    #[test]
    fn unknown_key_rejected() {
        let overlay: toml::Value = toml::from_str("[navigation]\nbogus = 1\n").unwrap();
        assert!(matches!(
            resolve_config(stock_defaults_value(), Some(overlay)),
            Err(ConfigError::Toml(_))
        ));
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn current_version_must_be_supported() {
        let mut config = NavConfig::default();
        config.modules.get_mut("payments").unwrap().versions.current = "v3".into();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("modules.payments.versions.current"), "{err}");
    }

    #[test]
    fn empty_supported_versions_rejected() {
        let mut config = NavConfig::default();
        config.modules.get_mut("revenue").unwrap().versions.supported.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn alias_to_unknown_module_rejected() {
        let mut config = NavConfig::default();
        config.aliases.insert("pay".into(), "payouts".into());
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn default_content_locale_must_exist() {
        let mut config = NavConfig::default();
        config.navigation.default_content_locale = "fr".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // load_config
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.navigation.default_version, "v1");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "[navigation]\ncache_ttl_secs = 60\n",
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.navigation.cache_ttl_secs, 60);
        assert_eq!(config.navigation.max_skip_depth, 10);
    }

    #[test]
    fn load_config_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[[[ nope").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }
}
