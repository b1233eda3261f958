//! Collaborators provided by the hosting CMS.
//!
//! The engine never reaches into global state. Everything it needs from the
//! content store, the user system and extension code comes through the traits
//! in this module, passed in via [`SeoContext`](crate::context::SeoContext).

use crate::catalog::Group;
use crate::data::{LanguageId, PageSeoData};
use crate::sitemap::SitemapItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Host identifier of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageId(pub u32);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A language installed on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: LanguageId,
    /// Language name, used as hreflang code for non-default languages.
    pub name: String,
    #[serde(default)]
    pub default: bool,
}

impl Language {
    /// The id used for per-language stored keys; `None` for the default language.
    pub fn key_id(&self) -> Option<LanguageId> {
        if self.default { None } else { Some(self.id) }
    }

    /// hreflang code. The default language uses the configured code.
    pub fn code<'a>(&'a self, default_code: &'a str) -> &'a str {
        if self.default { default_code } else { &self.name }
    }
}

/// Who a request runs as. Viewability is always checked against an identity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Guest,
    User { name: String, superuser: bool },
}

impl Identity {
    pub fn is_guest(&self) -> bool {
        matches!(self, Identity::Guest)
    }
}

/// The page attributes the engine reads, localized to one language.
#[derive(Debug, Clone, PartialEq)]
pub struct PageInfo {
    pub id: PageId,
    pub template: String,
    pub title: String,
    /// Last modification, seconds since the epoch.
    pub modified: Option<i64>,
}

/// One image of an image-collection field (possibly a resized variation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// Absolute URL.
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// File extension, lowercase, e.g. `jpg`.
    pub ext: String,
}

impl PageImage {
    /// MIME type derived from the extension (`jpg` is reported as `image/jpeg`).
    pub fn mime_type(&self) -> String {
        match self.ext.as_str() {
            "jpg" => "image/jpeg".to_string(),
            ext => format!("image/{ext}"),
        }
    }
}

/// A template and the SEO fields attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateInfo {
    pub name: String,
    #[serde(default)]
    pub seo_fields: Vec<String>,
    /// Administrative templates are never part of the sitemap.
    #[serde(default)]
    pub admin: bool,
}

/// Page selection for sitemap generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageQuery {
    pub templates: Vec<String>,
    pub exclude: BTreeSet<PageId>,
    pub include_hidden: bool,
    pub exclude_admin: bool,
}

/// Content store of the hosting CMS.
///
/// `language` arguments are `None` when the host has no language support or
/// the default language is meant.
pub trait ContentStore {
    fn page(&self, id: PageId, language: Option<&Language>) -> Option<PageInfo>;

    /// Installed languages; empty for single-language sites.
    fn languages(&self) -> Vec<Language>;

    /// Whether pages have per-language names (and thus per-language URLs).
    fn language_page_names(&self) -> bool;

    fn viewable(&self, page: PageId, identity: &Identity, language: Option<&Language>) -> bool;

    /// Site-relative URL, e.g. `/en/about/`.
    fn local_url(&self, page: PageId, language: Option<&Language>) -> Option<String>;

    /// Absolute URL including scheme and host.
    fn http_url(&self, page: PageId, language: Option<&Language>) -> Option<String>;

    /// Ancestors from the top down, excluding the site root.
    fn ancestors(&self, page: PageId) -> Vec<PageId>;

    /// Formatted value of a regular page field, addressed by a possibly
    /// dotted identifier (`title`, `images.0`, `parent.title`).
    fn field_value(&self, page: PageId, ident: &str, language: Option<&Language>)
    -> Option<String>;

    /// Images of an image-collection field. `None` if `field` is not one.
    fn images(&self, page: PageId, field: &str) -> Option<Vec<PageImage>>;

    /// Page whose images are used when `field` is empty on a page.
    fn image_fallback_page(&self, field: &str) -> Option<PageId>;

    /// A resized variation of `image`. Both dimensions given means an exact
    /// size; one dimension keeps the aspect ratio.
    fn resize_image(&self, image: &PageImage, width: Option<u32>, height: Option<u32>)
    -> PageImage;

    fn templates(&self) -> Vec<TemplateInfo>;

    fn find_pages(&self, query: &PageQuery) -> Vec<PageId>;

    fn not_found_page(&self) -> Option<PageId>;

    /// Stored SEO data of `field` on `page`, if the page has been saved with it.
    fn seo_data(&self, page: PageId, field: &str) -> Option<PageSeoData>;
}

/// Extension points called during rendering and sitemap generation.
///
/// Every method defaults to returning its input unchanged.
pub trait SeoHooks {
    /// Called with every rendered value returned from a group accessor.
    fn transform_value(&self, _group: Group, _name: &str, value: String) -> String {
        value
    }

    /// Called with the tags of each group, and once with the common tags
    /// (`group` is `None`).
    fn transform_tags(&self, tags: Vec<Tag>, _group: Option<Group>) -> Vec<Tag> {
        tags
    }

    fn transform_sitemap_items(&self, items: Vec<SitemapItem>) -> Vec<SitemapItem> {
        items
    }

    /// Pages never included in the sitemap. Starts with the 404 page.
    fn exclude_pages(&self, pages: BTreeSet<PageId>) -> BTreeSet<PageId> {
        pages
    }
}

/// Hooks that change nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl SeoHooks for NoHooks {}

/// A rendered tag, keyed so hooks can find and replace individual tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Stable key, e.g. `title`, `imageWidth`, `link_rel_de`.
    pub name: String,
    pub markup: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markup: markup.into(),
        }
    }
}
