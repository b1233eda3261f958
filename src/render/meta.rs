//! `<title>`, meta name tags and the canonical link.

use super::{GroupRenderer, PageScope, encode, encode_text};
use crate::catalog::Group;
use crate::host::Tag;
use crate::placeholder;
use maud::{PreEscaped, html};

pub struct MetaRenderer;

impl MetaRenderer {
    /// An explicit URL is used as is if absolute, else prefixed with the base
    /// URL. Without one, the page's own absolute URL is used.
    fn canonical_url(scope: &PageScope<'_, '_>, raw: Option<String>) -> Option<String> {
        let base_url = &scope.ctx.module.base_url;
        let url = match raw.filter(|v| !v.is_empty()) {
            Some(value) if value.starts_with("http") => value,
            Some(value) => format!("{base_url}{value}"),
            None => scope.page_url()?,
        };
        Some(encode(&url))
    }
}

impl GroupRenderer for MetaRenderer {
    fn group(&self) -> Group {
        Group::Meta
    }

    fn render_value(
        &self,
        scope: &PageScope<'_, '_>,
        name: &str,
        raw: Option<String>,
    ) -> Option<String> {
        if name == "canonicalUrl" {
            return Self::canonical_url(scope, raw);
        }

        let mut value = scope.expand(&raw.unwrap_or_default());
        if name == "title" {
            let config = scope.field_config();
            if let Some(format) = config
                .title_format(scope.language_id())
                .filter(|f| !f.is_empty())
            {
                value = placeholder::apply_title_format(format, &value);
            }
        }
        Some(encode_text(&value))
    }

    fn render_metatags(&self, scope: &PageScope<'_, '_>, names: &[&'static str]) -> Vec<Tag> {
        let mut tags = Vec::new();
        for &name in names {
            let Some(value) = scope.get(Group::Meta, name).filter(|v| !v.is_empty()) else {
                continue;
            };
            let value = PreEscaped(value);
            let markup = match name {
                "title" => html! { title { (value) } },
                "canonicalUrl" => html! { link rel="canonical" href=(value); },
                _ => html! { meta name=(name) content=(value); },
            };
            tags.push(Tag::new(name, markup.into_string()));
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::Group;
    use crate::config::ModuleConfig;
    use crate::context::SeoContext;
    use crate::data::PageSeoData;
    use crate::test_helpers::*;

    #[test]
    fn title_defaults_to_page_title() {
        let site = load_fixture_site();
        let ctx = site.context();
        let data = PageSeoData::blank();
        let scope = scope_for(&site, &ctx, "about", &data);
        assert_eq!(scope.get(Group::Meta, "title").as_deref(), Some("About us"));
    }

    #[test]
    fn title_format_wraps_title() {
        let mut site = load_fixture_site();
        site.fields.entry_mut("seo").base.title_format = Some("{meta_title} | acme.com".into());
        let ctx = site.context();
        let data = PageSeoData::blank();
        let scope = scope_for(&site, &ctx, "about", &data);
        assert_eq!(
            scope.get(Group::Meta, "title").as_deref(),
            Some("About us | acme.com")
        );
    }

    #[test]
    fn title_with_placeholders_in_override() {
        let site = load_fixture_site();
        let ctx = site.context();
        let mut data = PageSeoData::blank();
        set_raw(&mut data, Group::Meta, "title", "{title} & {summary}");
        let scope = scope_for(&site, &ctx, "about", &data);
        assert_eq!(
            scope.get(Group::Meta, "title").as_deref(),
            Some("About us &amp; Who we are")
        );
    }

    #[test]
    fn canonical_url_defaults_to_page_url() {
        let site = load_fixture_site();
        let ctx = site.context();
        let data = PageSeoData::blank();
        let scope = scope_for(&site, &ctx, "about", &data);
        assert_eq!(
            scope.get(Group::Meta, "canonicalUrl").as_deref(),
            Some("http://localhost/en/about/")
        );
    }

    #[test]
    fn canonical_url_relative_uses_base_url() {
        let site = load_fixture_site();
        let module = ModuleConfig {
            base_url: "https://mydomain.com".into(),
            ..ModuleConfig::default()
        };
        let ctx = SeoContext::new(&site.store, &module, &site.fields);
        let mut data = PageSeoData::blank();
        set_raw(&mut data, Group::Meta, "canonicalUrl", "/en/custom/");
        let scope = scope_for(&site, &ctx, "about", &data);
        assert_eq!(
            scope.get(Group::Meta, "canonicalUrl").as_deref(),
            Some("https://mydomain.com/en/custom/")
        );

        set_raw(&mut data, Group::Meta, "canonicalUrl", "http://localhost/en/custom/");
        let scope = scope_for(&site, &ctx, "about", &data);
        assert_eq!(
            scope.get(Group::Meta, "canonicalUrl").as_deref(),
            Some("http://localhost/en/custom/")
        );
    }

    #[test]
    fn render_skips_empty_values() {
        let site = load_fixture_site();
        let ctx = site.context();
        let mut data = PageSeoData::blank();
        set_raw(&mut data, Group::Meta, "description", "A meta description");
        let scope = scope_for(&site, &ctx, "about", &data);
        assert_eq!(
            render_group_tags(&scope, Group::Meta),
            "<title>About us</title>\n\
             <meta name=\"description\" content=\"A meta description\">\n\
             <link rel=\"canonical\" href=\"http://localhost/en/about/\">"
        );
    }
}
