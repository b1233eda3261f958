//! Field configuration with template-context overlays.
//!
//! Each SEO field has a base [`FieldConfig`] and optional per-template
//! overlays. [`FieldInContext`] is the view a page sees: overlay values shadow
//! base values key by key.

use crate::config::{ConfigError, FieldSettings, SeoConfig};
use crate::data::{LanguageId, SeoKey};
use std::collections::BTreeMap;

/// Typed configuration of one SEO field (or one template overlay).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldConfig {
    pub title_format: Option<String>,
    pub title_formats: BTreeMap<LanguageId, String>,
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
    pub values: BTreeMap<SeoKey, String>,
}

impl FieldConfig {
    /// Convert settings from the config file. Keys are validated here as well,
    /// so a registry can be built from a config that skipped `validate`.
    pub fn from_settings(field: &str, settings: &FieldSettings) -> Result<Self, ConfigError> {
        let mut values = BTreeMap::new();
        for (raw, value) in &settings.defaults {
            let key = SeoKey::parse(raw).map_err(|source| ConfigError::Key {
                field: field.to_string(),
                source,
            })?;
            values.insert(key, value.to_string());
        }
        let mut title_formats = BTreeMap::new();
        for (id, format) in &settings.title_formats {
            let id = id.parse::<u32>().map_err(|_| {
                ConfigError::Validation(format!(
                    "fields.{field}.title_formats: \"{id}\" is not a language id"
                ))
            })?;
            title_formats.insert(LanguageId(id), format.clone());
        }
        Ok(Self {
            title_format: settings.title_format.clone(),
            title_formats,
            image_width: settings.image_width,
            image_height: settings.image_height,
            values,
        })
    }

    pub fn set(&mut self, key: SeoKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }
}

/// A field's base configuration plus its template overlays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldEntry {
    pub base: FieldConfig,
    pub templates: BTreeMap<String, FieldConfig>,
}

static EMPTY: FieldConfig = FieldConfig {
    title_format: None,
    title_formats: BTreeMap::new(),
    image_width: None,
    image_height: None,
    values: BTreeMap::new(),
};

/// All configured SEO fields, by name.
///
/// Fields without an entry behave as if configured with nothing, so every
/// lookup falls through to the module defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRegistry {
    fields: BTreeMap<String, FieldEntry>,
}

impl FieldRegistry {
    pub fn from_config(config: &SeoConfig) -> Result<Self, ConfigError> {
        let mut fields = BTreeMap::new();
        for (name, settings) in &config.fields {
            let base = FieldConfig::from_settings(name, settings)?;
            let mut templates = BTreeMap::new();
            for (template, overlay) in &settings.templates {
                let path = format!("{name}.templates.{template}");
                templates.insert(template.clone(), FieldConfig::from_settings(&path, overlay)?);
            }
            fields.insert(name.clone(), FieldEntry { base, templates });
        }
        Ok(Self { fields })
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: FieldEntry) {
        self.fields.insert(name.into(), entry);
    }

    pub fn entry_mut(&mut self, name: &str) -> &mut FieldEntry {
        self.fields.entry(name.to_string()).or_default()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// The configuration of `field` as seen from a page using `template`.
    pub fn in_context<'a>(&'a self, field: &'a str, template: &str) -> FieldInContext<'a> {
        let entry = self.fields.get(field);
        FieldInContext {
            name: field,
            base: entry.map(|e| &e.base).unwrap_or(&EMPTY),
            overlay: entry.and_then(|e| e.templates.get(template)),
        }
    }
}

/// A field configuration resolved against one template.
#[derive(Debug, Clone, Copy)]
pub struct FieldInContext<'a> {
    name: &'a str,
    base: &'a FieldConfig,
    overlay: Option<&'a FieldConfig>,
}

impl<'a> FieldInContext<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    fn layers(&self) -> impl Iterator<Item = &'a FieldConfig> {
        self.overlay.into_iter().chain(std::iter::once(self.base))
    }

    /// Configured value for exactly `key`, overlay first.
    pub fn get(&self, key: &SeoKey) -> Option<&'a str> {
        self.layers()
            .find_map(|layer| layer.values.get(key))
            .map(String::as_str)
    }

    /// Title format for `language`, falling back to the default-language format.
    pub fn title_format(&self, language: Option<LanguageId>) -> Option<&'a str> {
        let localized = language.and_then(|id| {
            self.layers()
                .find_map(|layer| layer.title_formats.get(&id))
        });
        localized
            .or_else(|| self.layers().find_map(|layer| layer.title_format.as_ref()))
            .map(String::as_str)
    }

    pub fn image_width(&self) -> Option<u32> {
        self.layers().find_map(|layer| layer.image_width)
    }

    pub fn image_height(&self) -> Option<u32> {
        self.layers().find_map(|layer| layer.image_height)
    }
}
