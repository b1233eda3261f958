//! Group renderers.
//!
//! Each SEO group has a renderer implementing [`GroupRenderer`]: how raw input
//! is sanitized on write, how a resolved raw value becomes its rendered form,
//! and which tags the group contributes to a page's head.
//!
//! | Group | Renders |
//! |---|---|
//! | meta | `<title>`, `<meta name>`, `<link rel="canonical">` |
//! | opengraph | `<meta property="og:*">` incl. derived image tags and `og:url` |
//! | twitter | `<meta name="twitter:*">` |
//! | robots | one combined `<meta name="robots">` |
//! | structuredData | JSON-LD `BreadcrumbList` |
//! | sitemap | nothing; consumed by the sitemap builder |
//!
//! Dispatch is static: [`renderer_for`] maps the closed [`Group`] enum onto one
//! renderer per group.
//!
//! All rendering runs against a [`PageScope`]: one page, one SEO field, the
//! page's stored data and the [`SeoContext`]. The scope is also the
//! placeholder source for text values.

mod meta;
mod opengraph;
mod robots;
mod sitemap;
mod structured_data;
mod twitter;

use crate::catalog::{self, FieldDefinition, Group};
use crate::context::SeoContext;
use crate::data::{LanguageId, PageSeoData};
use crate::field::FieldInContext;
use crate::host::{Language, PageImage, PageInfo, Tag};
use crate::placeholder::{self, PlaceholderSource};
use crate::resolve;
use std::cell::RefCell;

pub use meta::MetaRenderer;
pub use opengraph::OpengraphRenderer;
pub use robots::RobotsRenderer;
pub use sitemap::SitemapRenderer;
pub use structured_data::StructuredDataRenderer;
pub use twitter::TwitterRenderer;

/// Rendering rules of one SEO group.
pub trait GroupRenderer: Sync {
    fn group(&self) -> Group;

    /// Normalize raw input before it is stored.
    fn sanitize(&self, def: &FieldDefinition, value: &str) -> String {
        sanitize_text(&catalog::sanitize_kind(def, value))
    }

    /// Rendered form of a resolved raw value. `None` means "no value".
    fn render_value(&self, scope: &PageScope<'_, '_>, name: &str, raw: Option<String>)
    -> Option<String>;

    /// Tags of this group, in catalog order, without hooks applied.
    fn render_metatags(&self, scope: &PageScope<'_, '_>, names: &[&'static str]) -> Vec<Tag>;
}

static META: MetaRenderer = MetaRenderer;
static OPENGRAPH: OpengraphRenderer = OpengraphRenderer;
static TWITTER: TwitterRenderer = TwitterRenderer;
static ROBOTS: RobotsRenderer = RobotsRenderer;
static STRUCTURED_DATA: StructuredDataRenderer = StructuredDataRenderer;
static SITEMAP: SitemapRenderer = SitemapRenderer;

pub fn renderer_for(group: Group) -> &'static dyn GroupRenderer {
    match group {
        Group::Meta => &META,
        Group::Opengraph => &OPENGRAPH,
        Group::Twitter => &TWITTER,
        Group::Robots => &ROBOTS,
        Group::StructuredData => &STRUCTURED_DATA,
        Group::Sitemap => &SITEMAP,
    }
}

/// Tags of `group` for the scope's page, in catalog order, without hooks.
pub fn group_tags(scope: &PageScope<'_, '_>, group: Group) -> Vec<Tag> {
    let names: Vec<&'static str> = group.fields().map(|def| def.name).collect();
    renderer_for(group).render_metatags(scope, &names)
}

/// One page and one SEO field, ready to resolve and render values.
pub struct PageScope<'c, 'a> {
    pub ctx: &'c SeoContext<'a>,
    pub page: PageInfo,
    pub field: &'c str,
    pub data: &'c PageSeoData,
    /// Values currently being rendered, to break placeholder cycles.
    rendering: RefCell<Vec<(Group, &'static str)>>,
}

impl<'c, 'a> PageScope<'c, 'a> {
    pub fn new(ctx: &'c SeoContext<'a>, page: PageInfo, field: &'c str, data: &'c PageSeoData) -> Self {
        Self {
            ctx,
            page,
            field,
            data,
            rendering: RefCell::new(Vec::new()),
        }
    }

    pub fn language(&self) -> Option<&Language> {
        self.ctx.language.as_ref()
    }

    pub fn language_id(&self) -> Option<LanguageId> {
        self.ctx.language_id()
    }

    pub fn field_config(&self) -> FieldInContext<'_> {
        self.ctx.fields.in_context(self.field, &self.page.template)
    }

    /// Resolved raw value, page override first.
    pub fn raw(&self, group: Group, name: &str) -> Option<String> {
        resolve::resolve_raw(
            self.data,
            &self.field_config(),
            group,
            name,
            self.language_id(),
        )
    }

    /// Raw value from the field configuration, ignoring page overrides.
    pub fn inherited(&self, group: Group, name: &str) -> Option<String> {
        resolve::resolve_inherited(&self.field_config(), group, name, self.language_id())
    }

    /// Render `raw` as the value of `group.name`. Returns `None` if the value
    /// is already being rendered further up (a placeholder cycle).
    pub fn render_raw(&self, group: Group, name: &str, raw: Option<String>) -> Option<String> {
        let def = catalog::definition(group, name)?;
        let entry = (group, def.name);
        if self.rendering.borrow().contains(&entry) {
            log::debug!(
                "Placeholder cycle at {}.{}.{} on page {}",
                self.field,
                group,
                name,
                self.page.id
            );
            return None;
        }
        self.rendering.borrow_mut().push(entry);
        let rendered = renderer_for(group).render_value(self, name, raw);
        self.rendering.borrow_mut().pop();
        rendered
    }

    /// Resolved and rendered value, without hooks.
    pub fn render(&self, group: Group, name: &str) -> Option<String> {
        self.render_raw(group, name, self.raw(group, name))
    }

    /// Resolved and rendered value, passed through the value hook.
    pub fn get(&self, group: Group, name: &str) -> Option<String> {
        self.render(group, name)
            .map(|value| self.ctx.hooks.transform_value(group, name, value))
    }

    /// Substitute placeholders in `value`.
    pub fn expand(&self, value: &str) -> String {
        if placeholder::contains_placeholder(value) {
            placeholder::populate(value, self)
        } else {
            value.to_string()
        }
    }

    /// Parse `<field>.<group>.<name>` referencing a value of this SEO field.
    fn own_value_ref(&self, ident: &str) -> Option<(Group, &'static str)> {
        let (field, rest) = ident.split_once('.')?;
        if field != self.field {
            return None;
        }
        let (group, name) = rest.split_once('.')?;
        let def = catalog::definition(Group::from_name(group)?, name)?;
        Some((def.group, def.name))
    }

    /// Absolute URL of this page in the current language.
    pub fn page_url(&self) -> Option<String> {
        self.ctx.absolute_url(self.page.id, self.language())
    }

    /// First image of an image field, falling back to the field's fallback
    /// page, resized to the configured Open Graph size.
    pub fn page_image(&self, image_field: &str) -> Option<PageImage> {
        let store = self.ctx.store;
        let Some(images) = store.images(self.page.id, image_field) else {
            log::debug!("{image_field} is not an image field of page {}", self.page.id);
            return None;
        };
        let image = match images.into_iter().next() {
            Some(image) => image,
            None => {
                let fallback = store
                    .image_fallback_page(image_field)
                    .filter(|id| *id != self.page.id)?;
                let first = store.images(fallback, image_field)?.into_iter().next();
                if first.is_none() {
                    log::debug!("No image in {image_field} on page {} or its fallback", self.page.id);
                }
                first?
            }
        };

        let config = self.field_config();
        match (config.image_width(), config.image_height()) {
            (None, None) => Some(image),
            (width, height) => Some(store.resize_image(&image, width, height)),
        }
    }
}

impl PlaceholderSource for PageScope<'_, '_> {
    fn lookup(&self, ident: &str) -> Option<String> {
        // {<seo field>.<group>.<name>} resolves through this engine
        if let Some((group, name)) = self.own_value_ref(ident) {
            return Some(self.get(group, name).unwrap_or_default());
        }
        self.ctx
            .store
            .field_value(self.page.id, ident, self.language())
    }
}

/// Strip tags and newlines from user input.
pub fn sanitize_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '<' if chars
                .peek()
                .is_some_and(|n| n.is_ascii_alphabetic() || matches!(n, '/' | '!' | '?')) =>
            {
                // Drop everything up to and including the closing '>'
                for skipped in chars.by_ref() {
                    if skipped == '>' {
                        break;
                    }
                }
            }
            '\r' | '\n' => {
                if !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            _ => out.push(c),
        }
    }
    out.trim().to_string()
}

/// Entity-encode a value for use in markup, leaving existing entities alone.
pub fn encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.char_indices() {
        match c {
            '&' if is_entity(&value[i..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Longest entity body considered, e.g. `#x10FFFF` or `thetasym`.
const MAX_ENTITY_LEN: usize = 8;

/// Named entities left alone by [`encode`].
const NAMED_ENTITIES: &[&str] = &[
    "amp", "lt", "gt", "quot", "apos", "nbsp", "copy", "reg", "trade", "hellip", "ndash",
    "mdash", "lsquo", "rsquo", "sbquo", "ldquo", "rdquo", "bdquo", "laquo", "raquo", "euro",
    "pound", "yen", "cent", "sect", "deg", "middot", "bull", "times", "divide", "auml", "ouml",
    "uuml", "Auml", "Ouml", "Uuml", "szlig", "aacute", "eacute", "iacute", "oacute", "uacute",
    "agrave", "egrave", "igrave", "ograve", "ugrave", "acirc", "ecirc", "icirc", "ocirc",
    "ucirc", "atilde", "ntilde", "otilde", "ccedil", "Eacute", "aring", "oslash", "aelig",
];

/// True if `s` starts with a known `&name;`, `&#123;` or `&#x1F;`.
fn is_entity(s: &str) -> bool {
    let rest = &s[1..];
    let Some(end) = rest
        .bytes()
        .take(MAX_ENTITY_LEN + 1)
        .position(|b| b == b';')
    else {
        return false;
    };
    let body = &rest[..end];
    if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit())
    } else if let Some(dec) = body.strip_prefix('#') {
        !dec.is_empty() && dec.chars().all(|c| c.is_ascii_digit())
    } else {
        NAMED_ENTITIES.contains(&body)
    }
}

/// Sanitize, then encode: the path every rendered text value takes.
pub(crate) fn encode_text(value: &str) -> String {
    encode(&sanitize_text(value))
}

/// Join rendered tags into a fragment.
pub fn join_tags(tags: &[Tag]) -> String {
    tags.iter()
        .map(|tag| tag.markup.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    // =========================================================================
    // Text sanitization and encoding
    // =========================================================================

    #[test]
    fn sanitize_strips_tags_and_newlines() {
        assert_eq!(
            sanitize_text(
                "This <a href='/foo'>string</a> <b>should</b><br> be sanitized and encode'd correctly\n"
            ),
            "This string should be sanitized and encode'd correctly"
        );
    }

    #[test]
    fn sanitize_keeps_lone_angle_brackets() {
        assert_eq!(sanitize_text("1 < 2 and 3 > 2"), "1 < 2 and 3 > 2");
    }

    #[test]
    fn sanitize_collapses_line_breaks() {
        assert_eq!(sanitize_text("one\r\ntwo\n\nthree"), "one two three");
    }

    #[test]
    fn encode_escapes_markup_characters() {
        assert_eq!(
            encode(r#"Tom & "Jerry" <3 'n'"#),
            "Tom &amp; &quot;Jerry&quot; &lt;3 &#039;n&#039;"
        );
    }

    #[test]
    fn encode_does_not_double_encode() {
        assert_eq!(encode("encode&#039;d &amp; &eacute; &#x27;"), "encode&#039;d &amp; &eacute; &#x27;");
        assert_eq!(encode("AT&T; & co"), "AT&amp;T; &amp; co");
        assert_eq!(encode("a &b c;"), "a &amp;b c;");
        assert_eq!(encode("&word; &#12a;"), "&amp;word; &amp;#12a;");
    }

    #[test]
    fn encode_only_looks_a_few_bytes_ahead_for_entities() {
        assert_eq!(encode("&amp"), "&amp;amp");
        assert_eq!(encode("&averylongword;"), "&amp;averylongword;");
        let long = "&".repeat(10_000) + ";";
        let encoded = encode(&long);
        assert_eq!(encoded.matches("&amp;").count(), 10_000);
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    #[test]
    fn renderer_for_matches_group() {
        for group in Group::ALL {
            assert_eq!(renderer_for(group).group(), group);
        }
    }

    // =========================================================================
    // PageScope
    // =========================================================================

    #[test]
    fn placeholders_resolve_page_fields() {
        let site = load_fixture_site();
        let ctx = site.context();
        let data = PageSeoData::blank();
        let scope = scope_for(&site, &ctx, "about", &data);
        assert_eq!(scope.expand("{title} | {missing}"), "About us | {missing}");
    }

    #[test]
    fn placeholders_resolve_own_seo_values() {
        let site = load_fixture_site();
        let ctx = site.context();
        let data = PageSeoData::blank();
        let scope = scope_for(&site, &ctx, "about", &data);
        assert_eq!(scope.expand("{seo.meta.title}"), "About us");
        assert_eq!(scope.expand("{seo.og.type}"), "website");
        assert_eq!(scope.expand("{seo.meta.description}"), "");
        assert_eq!(scope.expand("{seo.meta.author}"), "{seo.meta.author}");
    }

    #[test]
    fn placeholder_cycles_render_empty() {
        let site = load_fixture_site();
        let ctx = site.context();
        let mut data = PageSeoData::blank();
        set_raw(&mut data, Group::Meta, "description", "{seo.twitter.site}");
        set_raw(&mut data, Group::Twitter, "site", "{seo.meta.description}");
        let scope = scope_for(&site, &ctx, "about", &data);
        assert_eq!(scope.render(Group::Meta, "description").as_deref(), Some(""));
    }

    #[test]
    fn page_image_falls_back_to_fallback_page() {
        let site = load_fixture_site();
        let ctx = site.context();
        let data = PageSeoData::blank();
        let scope = scope_for(&site, &ctx, "about", &data);
        let image = scope.page_image("images").unwrap();
        assert!(image.url.ends_with("/site/assets/files/1/share.jpg"), "{}", image.url);
        assert_eq!(scope.page_image("summary"), None);
    }
}
