//! The static catalog of SEO data items.
//!
//! Every value a page can carry is declared here once: its [`Group`], its name
//! within the group, the kind of value it holds, and whether it may differ per
//! language. Everything else in the crate (stored page data, field defaults,
//! renderers) is keyed against this catalog and rejects names it doesn't know.
//!
//! ```text
//! meta            title, description, keywords, canonicalUrl
//! opengraph       title, description, image, imageAlt, type, locale, siteName
//! twitter         card, site, creator
//! robots          noIndex, noFollow
//! structuredData  breadcrumb
//! sitemap         include, priority, changeFrequency
//! ```
//!
//! Declaration order matters: renderers emit tags in this order.

use std::fmt;

/// Allowed values for `twitter.card`.
pub const TWITTER_CARDS: &[&str] = &["summary", "summary_large_image", "app", "player"];

/// Allowed values for `sitemap.changeFrequency`.
pub const CHANGE_FREQUENCIES: &[&str] = &["never", "hourly", "daily", "weekly", "monthly", "yearly"];

/// One of the six SEO data categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Group {
    Meta,
    Opengraph,
    Twitter,
    Robots,
    StructuredData,
    Sitemap,
}

impl Group {
    /// All groups in render order.
    pub const ALL: [Group; 6] = [
        Group::Meta,
        Group::Opengraph,
        Group::Twitter,
        Group::Robots,
        Group::StructuredData,
        Group::Sitemap,
    ];

    /// Name used in stored keys, placeholders and config files.
    pub fn as_str(self) -> &'static str {
        match self {
            Group::Meta => "meta",
            Group::Opengraph => "opengraph",
            Group::Twitter => "twitter",
            Group::Robots => "robots",
            Group::StructuredData => "structuredData",
            Group::Sitemap => "sitemap",
        }
    }

    /// Parse a group name. `og` is accepted as a shorthand for `opengraph`.
    pub fn from_name(name: &str) -> Option<Group> {
        match name {
            "og" => Some(Group::Opengraph),
            _ => Group::ALL.into_iter().find(|g| g.as_str() == name),
        }
    }

    /// Catalog entries of this group, in declaration order.
    pub fn fields(self) -> impl Iterator<Item = &'static FieldDefinition> {
        CATALOG.iter().filter(move |def| def.group == self)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of value a catalog entry holds. Drives sanitization on write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueKind {
    Text,
    Url,
    Bool,
    /// Decimal number clamped to `min..=max`.
    Number { min: f64, max: f64 },
    /// One of `choices`; anything else is coerced to `fallback`.
    Enum {
        choices: &'static [&'static str],
        fallback: &'static str,
    },
}

/// Static description of a single SEO data item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDefinition {
    pub group: Group,
    pub name: &'static str,
    pub kind: ValueKind,
    /// Translatable entries may hold a separate value per non-default language.
    pub translatable: bool,
    pub label: &'static str,
    pub description: &'static str,
}

impl FieldDefinition {
    /// The flat `group_name` key, e.g. `meta_title`.
    pub fn key(&self) -> String {
        format!("{}_{}", self.group.as_str(), self.name)
    }
}

const fn def(
    group: Group,
    name: &'static str,
    kind: ValueKind,
    translatable: bool,
    label: &'static str,
    description: &'static str,
) -> FieldDefinition {
    FieldDefinition {
        group,
        name,
        kind,
        translatable,
        label,
        description,
    }
}

/// Every SEO data item, grouped and in render order.
pub static CATALOG: &[FieldDefinition] = &[
    def(
        Group::Meta,
        "title",
        ValueKind::Text,
        true,
        "Title",
        "Every page should have a unique meta title, ideally less than 60 characters long.",
    ),
    def(
        Group::Meta,
        "description",
        ValueKind::Text,
        true,
        "Description",
        "Every page should have a unique meta description, ideally less than 320 characters long.",
    ),
    def(
        Group::Meta,
        "keywords",
        ValueKind::Text,
        true,
        "Keywords",
        "A comma-separated list of keywords about the page. No longer supported by most search engines.",
    ),
    def(
        Group::Meta,
        "canonicalUrl",
        ValueKind::Url,
        true,
        "Canonical URL",
        "The URL a search engine should treat as most representative from a set of duplicate pages.",
    ),
    def(Group::Opengraph, "title", ValueKind::Text, true, "Title", ""),
    def(Group::Opengraph, "description", ValueKind::Text, true, "Description", ""),
    def(
        Group::Opengraph,
        "image",
        ValueKind::Url,
        false,
        "Image",
        "Absolute URL of a preview image, or a placeholder for an image field such as `{image}`. The first image of the field is used.",
    ),
    def(
        Group::Opengraph,
        "imageAlt",
        ValueKind::Text,
        true,
        "Image Alt",
        "A description of what is in the image (not a caption).",
    ),
    def(
        Group::Opengraph,
        "type",
        ValueKind::Text,
        false,
        "Type",
        "The type of your object, e.g. `website` or `article`.",
    ),
    def(
        Group::Opengraph,
        "locale",
        ValueKind::Text,
        true,
        "Locale",
        "The locale these tags are marked up in, of the format `language_TERRITORY`.",
    ),
    def(
        Group::Opengraph,
        "siteName",
        ValueKind::Text,
        false,
        "Site Name",
        "The name which should be displayed for the overall site.",
    ),
    def(
        Group::Twitter,
        "card",
        ValueKind::Enum {
            choices: TWITTER_CARDS,
            fallback: "summary",
        },
        false,
        "Card",
        "The card type: `summary`, `summary_large_image`, `app` or `player`.",
    ),
    def(
        Group::Twitter,
        "site",
        ValueKind::Text,
        false,
        "Site",
        "@username for the website used in the card footer.",
    ),
    def(
        Group::Twitter,
        "creator",
        ValueKind::Text,
        false,
        "Creator",
        "@username for the content creator/author.",
    ),
    def(
        Group::Robots,
        "noIndex",
        ValueKind::Bool,
        false,
        "Prevent search engines from indexing this page",
        "",
    ),
    def(
        Group::Robots,
        "noFollow",
        ValueKind::Bool,
        false,
        "Prevent search engines from following links on this page",
        "",
    ),
    def(
        Group::StructuredData,
        "breadcrumb",
        ValueKind::Bool,
        false,
        "Breadcrumb",
        "Breadcrumb markup helps search engines categorize the page in search results.",
    ),
    def(Group::Sitemap, "include", ValueKind::Bool, false, "Include in Sitemap", ""),
    def(
        Group::Sitemap,
        "priority",
        ValueKind::Number { min: 0.0, max: 1.0 },
        false,
        "Priority",
        "Priority of this URL relative to other URLs on the site, from `0.0` to `1.0`.",
    ),
    def(
        Group::Sitemap,
        "changeFrequency",
        ValueKind::Enum {
            choices: CHANGE_FREQUENCIES,
            fallback: "monthly",
        },
        false,
        "Change Frequency",
        "A hint to search engines on how frequently the page is likely to change.",
    ),
];

/// Look up the catalog entry for `group.name`.
pub fn definition(group: Group, name: &str) -> Option<&'static FieldDefinition> {
    CATALOG
        .iter()
        .find(|def| def.group == group && def.name == name)
}

/// Built-in default for an entry, used when neither the template context nor
/// the field configures a value.
///
/// Open Graph title and description mirror the meta values of the same SEO
/// field, so the field name is needed to build the placeholder.
pub fn module_default(group: Group, name: &str, field_name: &str) -> Option<String> {
    let value = match (group, name) {
        (Group::Meta, "title") => "{title}".to_string(),
        (Group::Opengraph, "title") => format!("{{{field_name}.meta.title}}"),
        (Group::Opengraph, "description") => format!("{{{field_name}.meta.description}}"),
        (Group::Opengraph, "type") => "website".to_string(),
        (Group::Twitter, "card") => "summary".to_string(),
        (Group::StructuredData, "breadcrumb") => "1".to_string(),
        (Group::Sitemap, "include") => "1".to_string(),
        (Group::Sitemap, "priority") => "0.5".to_string(),
        (Group::Sitemap, "changeFrequency") => "monthly".to_string(),
        _ => return None,
    };
    Some(value)
}

/// Interpret a raw value as a boolean flag.
///
/// Empty strings, `0` and `false` are false; anything else is true.
pub fn is_truthy(value: &str) -> bool {
    !matches!(value.trim(), "" | "0" | "false")
}

/// Coerce a raw value into the shape its kind allows.
///
/// Invalid enum choices and unparseable numbers fall back to a safe value
/// instead of failing.
pub fn sanitize_kind(def: &FieldDefinition, value: &str) -> String {
    match def.kind {
        ValueKind::Text | ValueKind::Url => value.to_string(),
        ValueKind::Bool => {
            if is_truthy(value) {
                "1".to_string()
            } else {
                "0".to_string()
            }
        }
        ValueKind::Enum { choices, fallback } => {
            let value = value.trim();
            if choices.contains(&value) {
                value.to_string()
            } else {
                log::debug!(
                    "{}.{}: coercing invalid value {value:?} to {fallback:?}",
                    def.group,
                    def.name
                );
                fallback.to_string()
            }
        }
        ValueKind::Number { min, max } => match value.trim().parse::<f64>() {
            Ok(n) if (min..=max).contains(&n) => value.trim().to_string(),
            Ok(n) if n.is_finite() => n.clamp(min, max).to_string(),
            _ => {
                let fallback = module_default(def.group, def.name, "").unwrap_or_default();
                log::debug!(
                    "{}.{}: coercing invalid number {value:?} to {fallback:?}",
                    def.group,
                    def.name
                );
                fallback
            }
        },
    }
}
