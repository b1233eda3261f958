//! JSON-LD structured data. Currently only a `BreadcrumbList`.

use super::{GroupRenderer, PageScope};
use crate::catalog::{Group, is_truthy};
use crate::host::Tag;
use maud::{PreEscaped, html};
use serde::Serialize;

pub struct StructuredDataRenderer;

#[derive(Debug, Serialize)]
struct BreadcrumbList {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    kind: &'static str,
    #[serde(rename = "itemListElement")]
    items: Vec<ListItem>,
}

#[derive(Debug, Serialize)]
struct ListItem {
    #[serde(rename = "@type")]
    kind: &'static str,
    position: usize,
    name: String,
    item: String,
}

/// Viewable ancestors (site root excluded), then the page itself.
fn breadcrumb_items(scope: &PageScope<'_, '_>) -> Vec<ListItem> {
    let ctx = scope.ctx;
    let language = scope.language();
    let ancestors = ctx
        .store
        .ancestors(scope.page.id)
        .into_iter()
        .filter(|&id| ctx.viewable(id, language));

    ancestors
        .chain(std::iter::once(scope.page.id))
        .filter_map(|id| {
            let page = ctx.page(id)?;
            let url = ctx.absolute_url(id, language)?;
            Some((page.title, url))
        })
        .enumerate()
        .map(|(index, (name, item))| ListItem {
            kind: "ListItem",
            position: index + 1,
            name,
            item,
        })
        .collect()
}

fn render_breadcrumb(scope: &PageScope<'_, '_>) -> Option<String> {
    let list = BreadcrumbList {
        context: "https://schema.org",
        kind: "BreadcrumbList",
        items: breadcrumb_items(scope),
    };
    let json = match serde_json::to_string(&list) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Failed to serialize breadcrumb of page {}: {e}", scope.page.id);
            return None;
        }
    };
    // Keep the script element closed only by its own end tag
    let json = json.replace("</", "<\\/");
    let markup = html! { script type="application/ld+json" { (PreEscaped(json)) } };
    Some(markup.into_string())
}

impl GroupRenderer for StructuredDataRenderer {
    fn group(&self) -> Group {
        Group::StructuredData
    }

    fn render_value(
        &self,
        scope: &PageScope<'_, '_>,
        name: &str,
        raw: Option<String>,
    ) -> Option<String> {
        let enabled = raw.as_deref().is_some_and(is_truthy);
        match name {
            "breadcrumb" if enabled => render_breadcrumb(scope),
            _ => None,
        }
    }

    fn render_metatags(&self, scope: &PageScope<'_, '_>, names: &[&'static str]) -> Vec<Tag> {
        names
            .iter()
            .filter_map(|&name| {
                let markup = scope
                    .get(Group::StructuredData, name)
                    .filter(|v| !v.is_empty())?;
                Some(Tag::new(name, markup))
            })
            .collect()
    }
}
