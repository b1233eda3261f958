//! Twitter card `twitter:*` tags.

use super::{GroupRenderer, PageScope, encode_text};
use crate::catalog::Group;
use crate::host::Tag;
use maud::{PreEscaped, html};

pub struct TwitterRenderer;

impl GroupRenderer for TwitterRenderer {
    fn group(&self) -> Group {
        Group::Twitter
    }

    fn render_value(
        &self,
        scope: &PageScope<'_, '_>,
        _name: &str,
        raw: Option<String>,
    ) -> Option<String> {
        Some(encode_text(&scope.expand(&raw.unwrap_or_default())))
    }

    fn render_metatags(&self, scope: &PageScope<'_, '_>, names: &[&'static str]) -> Vec<Tag> {
        names
            .iter()
            .filter_map(|&name| {
                let value = scope.get(Group::Twitter, name).filter(|v| !v.is_empty())?;
                let markup = html! {
                    meta name=(format!("twitter:{name}")) content=(PreEscaped(value));
                };
                Some(Tag::new(name, markup.into_string()))
            })
            .collect()
    }
}
