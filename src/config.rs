//! Module and field configuration.
//!
//! Handles loading, validating, and merging `seo.toml`. Stock defaults are
//! serialized to a TOML value, the user file is merged on top, and the result
//! is deserialized and validated.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [module]
//! base_url = ""                # Prefix for canonical, Open Graph and sitemap URLs
//! default_language = "en"      # hreflang code of the default language
//! generator = "SeoMaestro"     # Content of <meta name="generator">
//!
//! [sitemap]
//! enable = true
//! path = "sitemap.seomaestro.xml"   # Relative to the site root
//! cache_minutes = 120               # Regenerate when older than this
//!
//! [fields.seo]
//! title_format = "{meta_title} | acme.com"
//! image_width = 1200
//!
//! [fields.seo.title_formats]
//! 1012 = "{meta_title} | acme.de"
//!
//! [fields.seo.defaults]
//! meta_description = "{summary}"
//! opengraph_image = "{images}"
//! sitemap_priority = 0.8
//!
//! [fields.seo.templates.blog-post.defaults]
//! opengraph_type = "article"
//! ```
//!
//! Keys under `defaults` use the flat `group_name[languageId]` form and must
//! name a catalog entry. A `templates.<name>` table overrides the field's base
//! configuration when the field is used on that template; overlays cannot nest.
//!
//! Unknown keys are rejected to catch typos early.

use crate::catalog::{self, Group};
use crate::data::{DataError, SeoKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid key in fields.{field}: {source}")]
    Key {
        field: String,
        #[source]
        source: DataError,
    },
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Settings loaded from `seo.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeoConfig {
    pub module: ModuleConfig,
    pub sitemap: SitemapConfig,
    /// Per SEO field, keyed by field name.
    pub fields: BTreeMap<String, FieldSettings>,
}

impl SeoConfig {
    /// Validate config values and normalize the base URL.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.module.base_url = self.module.base_url.trim_end_matches('/').to_string();
        if self.module.default_language.trim().is_empty() {
            return Err(ConfigError::Validation(
                "module.default_language must not be empty".into(),
            ));
        }
        if self.sitemap.enable && self.sitemap.path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "sitemap.path must not be empty when the sitemap is enabled".into(),
            ));
        }
        for (name, field) in &self.fields {
            field.validate(name)?;
            for (template, overlay) in &field.templates {
                if !overlay.templates.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "fields.{name}.templates.{template} cannot define templates of its own"
                    )));
                }
                overlay.validate(&format!("{name}.templates.{template}"))?;
            }
        }
        Ok(())
    }
}

/// Settings shared by every SEO field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleConfig {
    /// Prefix for generated absolute URLs. Empty means "use the host's URLs".
    pub base_url: String,
    /// hreflang code emitted for the default language.
    pub default_language: String,
    /// Content of the generator meta tag.
    pub generator: String,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            default_language: "en".to_string(),
            generator: "SeoMaestro".to_string(),
        }
    }
}

/// Sitemap file settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SitemapConfig {
    pub enable: bool,
    /// Output path relative to the site root.
    pub path: String,
    /// A sitemap younger than this many minutes is not regenerated.
    pub cache_minutes: u64,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            enable: true,
            path: "sitemap.seomaestro.xml".to_string(),
            cache_minutes: 120,
        }
    }
}

/// Configuration of one SEO field, or of a template-context overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldSettings {
    /// Applied to the resolved meta title; `{meta_title}` is the title itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_format: Option<String>,
    /// Title formats for non-default languages, keyed by language id.
    pub title_formats: BTreeMap<String, String>,
    /// Resize Open Graph images from image fields to this width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_height: Option<u32>,
    /// Default values, keyed by `group_name[languageId]`.
    pub defaults: BTreeMap<String, ConfigScalar>,
    /// Overlays applied when the field is used on a given template.
    pub templates: BTreeMap<String, FieldSettings>,
}

impl FieldSettings {
    fn validate(&self, path: &str) -> Result<(), ConfigError> {
        for id in self.title_formats.keys() {
            if id.parse::<u32>().is_err() {
                return Err(ConfigError::Validation(format!(
                    "fields.{path}.title_formats: \"{id}\" is not a language id"
                )));
            }
        }
        if self.image_width == Some(0) || self.image_height == Some(0) {
            return Err(ConfigError::Validation(format!(
                "fields.{path}: image dimensions must be non-zero"
            )));
        }
        for (raw, value) in &self.defaults {
            let key = SeoKey::parse(raw).map_err(|source| ConfigError::Key {
                field: path.to_string(),
                source,
            })?;
            if key.group == Group::Sitemap && key.name == "priority" {
                let priority = value.to_string().parse::<f64>().ok();
                if !priority.is_some_and(|p| (0.0..=1.0).contains(&p)) {
                    return Err(ConfigError::Validation(format!(
                        "fields.{path}.defaults.{raw} must be between 0.0 and 1.0"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A default value as written in TOML. Numbers and booleans are accepted
/// for convenience and stored in their string form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigScalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ConfigScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigScalar::Text(s) => f.write_str(s),
            ConfigScalar::Integer(n) => write!(f, "{n}"),
            ConfigScalar::Float(n) => write!(f, "{n}"),
            ConfigScalar::Bool(b) => f.write_str(if *b { "1" } else { "0" }),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a TOML value, the base layer for merging.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SeoConfig::default())?)
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

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SeoConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let mut config: SeoConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `seo.toml` from `path`, falling back to stock defaults when absent.
pub fn load_config(path: &Path) -> Result<SeoConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    let config = resolve_config(base, overlay)?;
    log::debug!(
        "Loaded config from {} ({} field(s))",
        path.display(),
        config.fields.len()
    );
    Ok(config)
}

/// Returns a fully-commented stock `seo.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> String {
    let mut out = String::from(
        r##"# SEO Maestro Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Module
# ---------------------------------------------------------------------------
[module]
# Prefix for canonical, Open Graph and sitemap URLs, e.g. "https://acme.com".
# Leave empty to use the absolute URLs of the site itself.
base_url = ""

# hreflang code of the default language.
default_language = "en"

# Content of <meta name="generator">.
generator = "SeoMaestro"

# ---------------------------------------------------------------------------
# Sitemap
# ---------------------------------------------------------------------------
[sitemap]
enable = true

# Output path, relative to the site root.
path = "sitemap.seomaestro.xml"

# Minutes before an existing sitemap is considered stale.
cache_minutes = 120

# ---------------------------------------------------------------------------
# SEO fields
# ---------------------------------------------------------------------------
# One table per SEO field. Every value below is optional; the built-in
# defaults are shown commented out.
#
# [fields.seo]
# title_format = "{meta_title} | acme.com"
# image_width = 1200
# image_height = 630
#
# [fields.seo.title_formats]
# 1012 = "{meta_title} | acme.de"
#
# [fields.seo.defaults]
"##,
    );
    for def in catalog::CATALOG {
        let value = catalog::module_default(def.group, def.name, "seo").unwrap_or_default();
        out.push_str(&format!("# {} = \"{}\"\n", def.key(), value));
    }
    out.push_str(
        r##"#
# Template-context overrides use the same keys:
#
# [fields.seo.templates.blog-post.defaults]
# opengraph_type = "article"
"##,
    );
    out
}
