//! Sitemap settings. No page-level markup; the values feed the sitemap builder.

use super::{GroupRenderer, PageScope};
use crate::catalog::{self, Group, is_truthy};
use crate::host::Tag;

pub struct SitemapRenderer;

impl GroupRenderer for SitemapRenderer {
    fn group(&self) -> Group {
        Group::Sitemap
    }

    fn render_value(
        &self,
        scope: &PageScope<'_, '_>,
        name: &str,
        raw: Option<String>,
    ) -> Option<String> {
        let def = catalog::definition(Group::Sitemap, name)?;
        let value = match name {
            "include" => match raw.as_deref().is_some_and(is_truthy) {
                true => "1".to_string(),
                false => "0".to_string(),
            },
            // Stored values were sanitized on write; configured ones may not be
            _ => match raw {
                Some(raw) => catalog::sanitize_kind(def, &raw),
                None => catalog::module_default(Group::Sitemap, name, scope.field)?,
            },
        };
        Some(value)
    }

    fn render_metatags(&self, _scope: &PageScope<'_, '_>, _names: &[&'static str]) -> Vec<Tag> {
        Vec::new()
    }
}
