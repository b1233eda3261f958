//! Open Graph `og:*` properties.
//!
//! The image may be a literal URL or a `{field}` placeholder naming an image
//! field. Either way the image tag is followed by `og:image:type`, `:width`
//! and `:height` when those are known. `og:url` is always emitted last.

use super::{GroupRenderer, PageScope, encode, encode_text};
use crate::catalog::Group;
use crate::host::Tag;
use crate::imaging::{ProbeError, ProbedImage};
use crate::placeholder;
use maud::{PreEscaped, html};

pub struct OpengraphRenderer;

/// Property name of a catalog entry, without the `og:` prefix.
fn property_name(name: &str) -> &str {
    match name {
        "imageAlt" => "image:alt",
        "siteName" => "site_name",
        other => other,
    }
}

fn og_tag(key: &str, property: &str, content: &str) -> Tag {
    let property = format!("og:{property}");
    let markup = html! { meta property=(property) content=(PreEscaped(content)); };
    Tag::new(key, markup.into_string())
}

impl OpengraphRenderer {
    /// Type and size of the configured image, from the image field or by
    /// probing the literal URL.
    fn image_details(scope: &PageScope<'_, '_>) -> Option<ProbedImage> {
        let raw = scope.raw(Group::Opengraph, "image")?;
        if let Some(image_field) = placeholder::whole_placeholder(&raw) {
            let image = scope.page_image(image_field)?;
            return Some(ProbedImage {
                mime_type: image.mime_type(),
                width: image.width,
                height: image.height,
            });
        }

        match scope.ctx.probe.probe(raw.trim()) {
            Ok(probed) => Some(probed),
            Err(ProbeError::Unmapped(url)) => {
                log::debug!("Not probing external image {url}");
                None
            }
            Err(e) => {
                log::warn!("Could not inspect Open Graph image: {e}");
                None
            }
        }
    }
}

impl GroupRenderer for OpengraphRenderer {
    fn group(&self) -> Group {
        Group::Opengraph
    }

    fn render_value(
        &self,
        scope: &PageScope<'_, '_>,
        name: &str,
        raw: Option<String>,
    ) -> Option<String> {
        let raw = raw.unwrap_or_default();
        if name == "image" {
            return match placeholder::whole_placeholder(&raw) {
                Some(image_field) => Some(
                    scope
                        .page_image(image_field)
                        .map(|image| encode(&image.url))
                        .unwrap_or_default(),
                ),
                None => Some(encode_text(&raw)),
            };
        }
        Some(encode_text(&scope.expand(&raw)))
    }

    fn render_metatags(&self, scope: &PageScope<'_, '_>, names: &[&'static str]) -> Vec<Tag> {
        let mut tags = Vec::new();
        for &name in names {
            let Some(value) = scope.get(Group::Opengraph, name).filter(|v| !v.is_empty()) else {
                continue;
            };
            tags.push(og_tag(name, property_name(name), &value));

            if name != "image" {
                continue;
            }
            if let Some(details) = Self::image_details(scope) {
                tags.push(og_tag("imageType", "image:type", &details.mime_type));
                tags.push(og_tag("imageWidth", "image:width", &details.width.to_string()));
                tags.push(og_tag("imageHeight", "image:height", &details.height.to_string()));
            }
        }

        let url = scope
            .render(Group::Meta, "canonicalUrl")
            .or_else(|| scope.page_url().map(|url| encode(&url)))
            .unwrap_or_default();
        tags.push(og_tag("url", "url", &url));
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PageSeoData;
    use crate::imaging::probe::tests::MockProbe;
    use crate::store::MemoryStore;
    use crate::test_helpers::*;

    #[test]
    fn property_names_are_mapped() {
        assert_eq!(property_name("imageAlt"), "image:alt");
        assert_eq!(property_name("siteName"), "site_name");
        assert_eq!(property_name("title"), "title");
    }

    #[test]
    fn title_mirrors_meta_title() {
        let mut site = load_fixture_site();
        site.fields.entry_mut("seo").base.title_format = Some("{meta_title} | Acme & Co".into());
        let ctx = site.context();
        let data = PageSeoData::blank();
        let scope = scope_for(&site, &ctx, "about", &data);
        // Already encoded by the meta renderer; not encoded twice
        assert_eq!(
            scope.get(Group::Opengraph, "title").as_deref(),
            Some("About us | Acme &amp; Co")
        );
    }

    #[test]
    fn render_with_image_field() {
        let site = load_fixture_site();
        let ctx = site.context();
        let mut data = PageSeoData::blank();
        set_raw(&mut data, Group::Opengraph, "image", "{images}");
        let scope = scope_for(&site, &ctx, "home", &data);
        assert_eq!(
            render_group_tags(&scope, Group::Opengraph),
            "<meta property=\"og:title\" content=\"Home\">\n\
             <meta property=\"og:image\" content=\"http://localhost/site/assets/files/1/share.jpg\">\n\
             <meta property=\"og:image:type\" content=\"image/jpeg\">\n\
             <meta property=\"og:image:width\" content=\"1024\">\n\
             <meta property=\"og:image:height\" content=\"768\">\n\
             <meta property=\"og:type\" content=\"website\">\n\
             <meta property=\"og:url\" content=\"http://localhost/en/\">"
        );
    }

    #[test]
    fn image_field_url_is_encoded() {
        let mut site = load_fixture_site();
        let json = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/site.json"))
            .unwrap();
        site.store = MemoryStore::from_json(&json.replace("share.jpg", "share&co.jpg")).unwrap();
        let ctx = site.context();
        let mut data = PageSeoData::blank();
        set_raw(&mut data, Group::Opengraph, "image", "{images}");
        let scope = scope_for(&site, &ctx, "home", &data);
        let tags = render_group_tags(&scope, Group::Opengraph);
        assert!(
            tags.contains("<meta property=\"og:image\" content=\"http://localhost/site/assets/files/1/share&amp;co.jpg\">"),
            "{tags}"
        );
    }

    #[test]
    fn image_is_resized_to_configured_width() {
        let mut site = load_fixture_site();
        site.fields.entry_mut("seo").base.image_width = Some(800);
        let ctx = site.context();
        let mut data = PageSeoData::blank();
        set_raw(&mut data, Group::Opengraph, "image", "{images}");
        let scope = scope_for(&site, &ctx, "home", &data);
        let tags = render_group_tags(&scope, Group::Opengraph);
        assert!(tags.contains("/site/assets/files/1/share.800x0.jpg\""), "{tags}");
        assert!(tags.contains("og:image:width\" content=\"800\""));
        assert!(tags.contains("og:image:height\" content=\"600\""));
    }

    #[test]
    fn literal_image_is_probed() {
        let site = load_fixture_site();
        let probe = MockProbe::with("https://cdn.test/card.png", "image/png", 1200, 630);
        let ctx = site.context().with_probe(&probe);
        let mut data = PageSeoData::blank();
        set_raw(&mut data, Group::Opengraph, "image", "https://cdn.test/card.png");
        let scope = scope_for(&site, &ctx, "about", &data);
        let tags = render_group_tags(&scope, Group::Opengraph);
        assert!(tags.contains("<meta property=\"og:image\" content=\"https://cdn.test/card.png\">"));
        assert!(tags.contains("<meta property=\"og:image:type\" content=\"image/png\">"));
        assert!(tags.contains("<meta property=\"og:image:width\" content=\"1200\">"));
        assert_eq!(probe.get_probed(), ["https://cdn.test/card.png"]);
    }

    #[test]
    fn unknown_literal_image_has_no_details() {
        let site = load_fixture_site();
        let ctx = site.context();
        let mut data = PageSeoData::blank();
        set_raw(&mut data, Group::Opengraph, "image", "https://elsewhere.test/a.jpg");
        let scope = scope_for(&site, &ctx, "about", &data);
        let tags = render_group_tags(&scope, Group::Opengraph);
        assert!(tags.contains("og:image\""));
        assert!(!tags.contains("og:image:type"));
    }

    #[test]
    fn url_is_always_emitted() {
        let site = load_fixture_site();
        let ctx = site.context();
        let mut data = PageSeoData::blank();
        for name in ["title", "description", "type"] {
            set_raw(&mut data, Group::Opengraph, name, "");
        }
        let scope = scope_for(&site, &ctx, "about", &data);
        assert_eq!(
            render_group_tags(&scope, Group::Opengraph),
            "<meta property=\"og:url\" content=\"http://localhost/en/about/\">"
        );
    }

    #[test]
    fn image_alt_and_site_name_properties() {
        let site = load_fixture_site();
        let ctx = site.context();
        let mut data = PageSeoData::blank();
        set_raw(&mut data, Group::Opengraph, "imageAlt", "A mountain");
        set_raw(&mut data, Group::Opengraph, "siteName", "Acme");
        let scope = scope_for(&site, &ctx, "about", &data);
        let tags = render_group_tags(&scope, Group::Opengraph);
        assert!(tags.contains("<meta property=\"og:image:alt\" content=\"A mountain\">"));
        assert!(tags.contains("<meta property=\"og:site_name\" content=\"Acme\">"));
    }
}
