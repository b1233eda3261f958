//! Raw value resolution.
//!
//! Turns stored page data plus field configuration into the effective raw
//! value of one catalog entry, before any group-specific rendering:
//!
//! ```text
//! page value (current language)
//!   └─ page value (default language)
//!        └─ "inherit" or absent
//!             └─ field config in template context (current language)
//!                  └─ field config in template context (default language)
//!                       └─ module default
//!                            └─ None
//! ```
//!
//! A template overlay always shadows the field's base configuration, which
//! always shadows the module default.

use crate::catalog::{self, Group};
use crate::data::{LanguageId, PageSeoData, RawValue, SeoKey};
use crate::field::FieldInContext;

fn key(group: Group, name: &str, language: Option<LanguageId>) -> Option<SeoKey> {
    SeoKey::new(group, name, language)
}

/// Effective raw value of `group.name` on a page.
///
/// Page overrides win. The inherit sentinel, or no stored value at all,
/// defers to [`resolve_inherited`].
pub fn resolve_raw(
    data: &PageSeoData,
    field: &FieldInContext<'_>,
    group: Group,
    name: &str,
    language: Option<LanguageId>,
) -> Option<String> {
    let default_key = key(group, name, None)?;
    let stored = language
        .and_then(|id| data.get(&SeoKey { language: Some(id), ..default_key }))
        .or_else(|| data.get(&default_key));

    match stored {
        Some(RawValue::Value(value)) => Some(value.clone()),
        Some(RawValue::Inherit) | None => resolve_inherited(field, group, name, language),
    }
}

/// Value `group.name` inherits from the field configuration, ignoring any
/// page override.
pub fn resolve_inherited(
    field: &FieldInContext<'_>,
    group: Group,
    name: &str,
    language: Option<LanguageId>,
) -> Option<String> {
    let default_key = key(group, name, None)?;
    language
        .and_then(|id| field.get(&SeoKey { language: Some(id), ..default_key }))
        .or_else(|| field.get(&default_key))
        .map(str::to_string)
        .or_else(|| catalog::module_default(group, name, field.name()))
}
