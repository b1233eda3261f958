//! Per-page stored SEO values.
//!
//! A page holding an SEO field stores one raw value per catalog entry, plus
//! separate values per language for translatable entries. Raw values are either
//! an explicit override or the inherit sentinel, which defers to the field
//! configuration.
//!
//! Keys are structured as `(group, name, language)` ([`SeoKey`]). The flat
//! string form `group_name[languageId]`, e.g. `meta_title` or `meta_title1012`,
//! only exists at the persistence boundary ([`PageSeoData::to_json`] /
//! [`PageSeoData::from_json`]) and in config files.
//!
//! ## Persisted record
//!
//! ```text
//! data                    JSON blob of all keys
//! meta_inherit            1 if every meta value is "inherit"
//! opengraph_inherit       ...one flag per group
//! sitemap_include         resolved sitemap.include
//! ```
//!
//! The flags let a host filter pages without deserializing the blob.

use crate::catalog::{self, CATALOG, Group};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Stored marker meaning "no page-level override".
pub const INHERIT: &str = "inherit";

#[derive(Error, Debug)]
pub enum DataError {
    #[error("\"{0}\" is not a valid SEO data key")]
    UnknownKey(String),
    #[error("{0} is not translatable and cannot hold a per-language value")]
    NotTranslatable(String),
    #[error("Unsupported value for \"{0}\": expected a string, number or boolean")]
    InvalidValue(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Host identifier of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LanguageId(pub u32);

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structured key of a single SEO value.
///
/// `language` is `None` for the default language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeoKey {
    pub group: Group,
    pub name: &'static str,
    pub language: Option<LanguageId>,
}

impl SeoKey {
    /// Build a key for a catalog entry. Returns `None` for unknown names.
    pub fn new(group: Group, name: &str, language: Option<LanguageId>) -> Option<SeoKey> {
        let def = catalog::definition(group, name)?;
        Some(SeoKey {
            group,
            name: def.name,
            language,
        })
    }

    /// Parse the flat `group_name[languageId]` form.
    pub fn parse(raw: &str) -> Result<SeoKey, DataError> {
        for def in CATALOG {
            let base = def.key();
            let Some(suffix) = raw.strip_prefix(base.as_str()) else {
                continue;
            };
            if suffix.is_empty() {
                return Ok(SeoKey {
                    group: def.group,
                    name: def.name,
                    language: None,
                });
            }
            if !suffix.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            let id = suffix
                .parse::<u32>()
                .map_err(|_| DataError::UnknownKey(raw.to_string()))?;
            if !def.translatable {
                return Err(DataError::NotTranslatable(base));
            }
            return Ok(SeoKey {
                group: def.group,
                name: def.name,
                language: Some(LanguageId(id)),
            });
        }
        Err(DataError::UnknownKey(raw.to_string()))
    }

    /// The same entry in the default language.
    pub fn default_language(self) -> SeoKey {
        SeoKey {
            language: None,
            ..self
        }
    }
}

impl fmt::Display for SeoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.group, self.name)?;
        if let Some(language) = self.language {
            write!(f, "{language}")?;
        }
        Ok(())
    }
}

/// A stored value: an explicit override or the inherit sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Inherit,
    Value(String),
}

impl RawValue {
    pub fn from_stored(value: &str) -> RawValue {
        if value == INHERIT {
            RawValue::Inherit
        } else {
            RawValue::Value(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RawValue::Inherit => INHERIT,
            RawValue::Value(v) => v,
        }
    }

    pub fn is_inherit(&self) -> bool {
        matches!(self, RawValue::Inherit)
    }
}

/// Raw stored values of one SEO field on one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSeoData {
    values: BTreeMap<SeoKey, RawValue>,
}

impl Default for PageSeoData {
    fn default() -> Self {
        Self::blank()
    }
}

impl PageSeoData {
    /// Every catalog entry set to inherit, in the default language only.
    pub fn blank() -> Self {
        let values = CATALOG
            .iter()
            .map(|def| {
                let key = SeoKey {
                    group: def.group,
                    name: def.name,
                    language: None,
                };
                (key, RawValue::Inherit)
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &SeoKey) -> Option<&RawValue> {
        self.values.get(key)
    }

    /// Store a value, returning whether the stored bytes changed.
    pub fn insert(&mut self, key: SeoKey, value: RawValue) -> Result<bool, DataError> {
        if key.language.is_some() {
            let translatable = catalog::definition(key.group, key.name)
                .map(|def| def.translatable)
                .unwrap_or(false);
            if !translatable {
                return Err(DataError::NotTranslatable(key.default_language().to_string()));
            }
        }
        let changed = self.values.get(&key) != Some(&value);
        self.values.insert(key, value);
        Ok(changed)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SeoKey, &RawValue)> {
        self.values.iter()
    }

    /// True if every stored value of `group`, in every language, is the
    /// inherit sentinel.
    pub fn group_inherits(&self, group: Group) -> bool {
        self.values
            .iter()
            .filter(|(key, _)| key.group == group)
            .all(|(_, value)| value.is_inherit())
    }

    /// Restore from the persisted JSON blob.
    ///
    /// Missing keys default to inherit. Unknown keys are rejected.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        if json.trim().is_empty() {
            return Ok(Self::blank());
        }
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        Self::from_map(&map)
    }

    /// Restore from an already-parsed JSON object.
    pub fn from_map(map: &serde_json::Map<String, serde_json::Value>) -> Result<Self, DataError> {
        let mut data = Self::blank();
        for (raw_key, value) in map {
            let key = SeoKey::parse(raw_key)?;
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
                serde_json::Value::Null => INHERIT.to_string(),
                _ => return Err(DataError::InvalidValue(raw_key.clone())),
            };
            data.insert(key, RawValue::from_stored(&value))?;
        }
        Ok(data)
    }

    /// Serialize to the flat-key JSON blob.
    pub fn to_json(&self) -> String {
        let map: serde_json::Map<String, serde_json::Value> = self
            .values
            .iter()
            .map(|(key, value)| {
                (
                    key.to_string(),
                    serde_json::Value::String(value.as_str().to_string()),
                )
            })
            .collect();
        serde_json::Value::Object(map).to_string()
    }
}

/// What a host persists for one page and field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub data: String,
    /// Group name → whether every value of the group is inherited.
    pub inherit_flags: BTreeMap<String, bool>,
    pub sitemap_include: bool,
}

impl StoredRecord {
    pub fn inherits(&self, group: Group) -> bool {
        self.inherit_flags
            .get(group.as_str())
            .copied()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(group: Group, name: &str, language: Option<u32>) -> SeoKey {
        SeoKey::new(group, name, language.map(LanguageId)).unwrap()
    }

    #[test]
    fn parse_default_language_key() {
        assert_eq!(
            SeoKey::parse("meta_title").unwrap(),
            key(Group::Meta, "title", None)
        );
        assert_eq!(
            SeoKey::parse("structuredData_breadcrumb").unwrap(),
            key(Group::StructuredData, "breadcrumb", None)
        );
    }

    #[test]
    fn parse_language_key() {
        assert_eq!(
            SeoKey::parse("meta_title1012").unwrap(),
            key(Group::Meta, "title", Some(1012))
        );
    }

    #[test]
    fn parse_rejects_unknown_keys() {
        assert!(matches!(
            SeoKey::parse("meta_author"),
            Err(DataError::UnknownKey(_))
        ));
        assert!(matches!(
            SeoKey::parse("meta_titleX"),
            Err(DataError::UnknownKey(_))
        ));
        assert!(matches!(SeoKey::parse(""), Err(DataError::UnknownKey(_))));
    }

    #[test]
    fn parse_rejects_language_variant_of_untranslatable_key() {
        assert!(matches!(
            SeoKey::parse("twitter_card1012"),
            Err(DataError::NotTranslatable(_))
        ));
    }

    #[test]
    fn key_display_matches_flat_form() {
        assert_eq!(key(Group::Opengraph, "imageAlt", None).to_string(), "opengraph_imageAlt");
        assert_eq!(key(Group::Meta, "description", Some(7)).to_string(), "meta_description7");
    }

    #[test]
    fn blank_data_inherits_everything() {
        let data = PageSeoData::blank();
        for group in Group::ALL {
            assert!(data.group_inherits(group));
        }
        assert_eq!(data.iter().count(), CATALOG.len());
        assert!(data.iter().all(|(k, _)| k.language.is_none()));
    }

    #[test]
    fn insert_reports_changes() {
        let mut data = PageSeoData::blank();
        let title = key(Group::Meta, "title", None);
        assert!(data.insert(title, RawValue::Value("Hi".into())).unwrap());
        assert!(!data.insert(title, RawValue::Value("Hi".into())).unwrap());
        assert!(data.insert(title, RawValue::Inherit).unwrap());
    }

    #[test]
    fn language_value_breaks_group_inheritance() {
        let mut data = PageSeoData::blank();
        data.insert(key(Group::Meta, "title", Some(1012)), RawValue::Value("Hallo".into()))
            .unwrap();
        assert!(!data.group_inherits(Group::Meta));
        assert!(data.group_inherits(Group::Opengraph));
    }

    #[test]
    fn json_blob_round_trip() {
        let mut data = PageSeoData::blank();
        data.insert(key(Group::Meta, "title", Some(1012)), RawValue::Value("Hallo".into()))
            .unwrap();
        data.insert(key(Group::Robots, "noIndex", None), RawValue::Value("1".into()))
            .unwrap();
        let restored = PageSeoData::from_json(&data.to_json()).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn from_json_accepts_numbers_and_fills_missing_keys() {
        let data = PageSeoData::from_json(r#"{"robots_noIndex": 1, "sitemap_priority": 0.8}"#)
            .unwrap();
        assert_eq!(
            data.get(&key(Group::Robots, "noIndex", None)),
            Some(&RawValue::Value("1".into()))
        );
        assert_eq!(
            data.get(&key(Group::Sitemap, "priority", None)),
            Some(&RawValue::Value("0.8".into()))
        );
        assert_eq!(
            data.get(&key(Group::Meta, "title", None)),
            Some(&RawValue::Inherit)
        );
    }

    #[test]
    fn from_json_rejects_unknown_keys() {
        let result = PageSeoData::from_json(r#"{"meta_author": "me"}"#);
        assert!(matches!(result, Err(DataError::UnknownKey(k)) if k == "meta_author"));
    }

    #[test]
    fn from_json_empty_is_blank() {
        assert_eq!(PageSeoData::from_json("").unwrap(), PageSeoData::blank());
    }
}
