//! XML sitemap generation.
//!
//! [`SitemapBuilder`] selects every page whose template carries an SEO field,
//! keeps the ones a guest may view and whose `sitemap.include` resolves true,
//! and writes them in the sitemaps.org format:
//!
//! ```text
//! templates with SEO field ─► page query ─► guest viewable? include? ─► items
//!                                                                       │
//!                        transform_sitemap_items hook ◄─────────────────┘
//!                                    │
//!                                    ▼
//!                  <urlset> ─► temp file ─► rename onto target
//! ```
//!
//! With per-language page names, every page yields one item per language it
//! is viewable in. Each of those items lists all viewable languages as
//! alternates, plus `x-default` for the default language.
//!
//! Regeneration is throttled by [`should_generate`]: an existing sitemap
//! younger than the configured window is left alone. There is no lock across
//! processes, so two workers may regenerate concurrently; the atomic rename
//! keeps the file itself consistent.

use crate::catalog::Group;
use crate::config::SitemapConfig;
use crate::context::SeoContext;
use crate::host::{Identity, Language, PageId, PageInfo, PageQuery};
use crate::render::PageScope;
use chrono::{DateTime, SecondsFormat};
use maud::{Markup, PreEscaped, html};
use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

const DEFAULT_PRIORITY: f64 = 0.5;

#[derive(Error, Debug)]
pub enum SitemapError {
    #[error("Failed to write sitemap {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An alternate-language URL of a sitemap entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Alternate {
    pub hreflang: String,
    pub href: String,
}

/// One `<url>` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapItem {
    pub loc: String,
    /// ISO 8601 timestamp. Omitted from the output when `None`.
    pub lastmod: Option<String>,
    pub priority: f64,
    pub changefreq: String,
    pub alternates: Vec<Alternate>,
}

impl SitemapItem {
    pub fn new(loc: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            lastmod: None,
            priority: DEFAULT_PRIORITY,
            changefreq: "monthly".to_string(),
            alternates: Vec::new(),
        }
    }

    /// Add an alternate, replacing any existing one with the same hreflang.
    pub fn add_alternate(&mut self, hreflang: impl Into<String>, href: impl Into<String>) {
        let hreflang = hreflang.into();
        let href = href.into();
        match self.alternates.iter_mut().find(|a| a.hreflang == hreflang) {
            Some(existing) => existing.href = href,
            None => self.alternates.push(Alternate { hreflang, href }),
        }
    }
}

/// Collects sitemap items from the content store and writes the sitemap.
pub struct SitemapBuilder<'c, 'a> {
    ctx: &'c SeoContext<'a>,
}

impl<'c, 'a> SitemapBuilder<'c, 'a> {
    pub fn new(ctx: &'c SeoContext<'a>) -> Self {
        Self { ctx }
    }

    /// Build the items and write them to `path`.
    ///
    /// Returns `Ok(false)` without touching `path` when there is nothing to
    /// list. The file is replaced atomically; a failed write leaves any
    /// previous sitemap in place.
    pub fn generate(&self, path: &Path) -> Result<bool, SitemapError> {
        self.write(&self.items(), path)
    }

    /// Write already collected items to `path`, as [`generate`](Self::generate) does.
    pub fn write(&self, items: &[SitemapItem], path: &Path) -> Result<bool, SitemapError> {
        if items.is_empty() {
            log::info!("Sitemap not written, no pages to list");
            return Ok(false);
        }
        let xml = render_xml(items);
        write_atomic(path, xml.as_bytes()).map_err(|source| SitemapError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Sitemap written to {} ({} entries)", path.display(), items.len());
        Ok(true)
    }

    /// All items, after the item hook. Viewability is always checked as a
    /// guest, whoever runs the generation.
    pub fn items(&self) -> Vec<SitemapItem> {
        let items = self
            .ctx
            .as_identity(Identity::Guest, collect_items);
        self.ctx.hooks.transform_sitemap_items(items)
    }
}

/// First SEO field of every non-admin template that has one.
fn seo_templates(ctx: &SeoContext<'_>) -> BTreeMap<String, String> {
    ctx.store
        .templates()
        .into_iter()
        .filter(|t| !t.admin)
        .filter_map(|t| {
            let field = t.seo_fields.into_iter().next()?;
            Some((t.name, field))
        })
        .collect()
}

/// Pages using `templates`, minus the 404 page and hook exclusions, hidden
/// pages included.
fn page_query(ctx: &SeoContext<'_>, templates: &BTreeMap<String, String>) -> PageQuery {
    let not_found = ctx.store.not_found_page().into_iter().collect();
    PageQuery {
        templates: templates.keys().cloned().collect(),
        exclude: ctx.hooks.exclude_pages(not_found),
        include_hidden: true,
        exclude_admin: true,
    }
}

fn collect_items(ctx: &SeoContext<'_>) -> Vec<SitemapItem> {
    let templates = seo_templates(ctx);
    if templates.is_empty() {
        log::debug!("No template carries an SEO field");
        return Vec::new();
    }

    let mut items = Vec::new();
    for id in ctx.store.find_pages(&page_query(ctx, &templates)) {
        let Some(page) = ctx.page(id) else {
            continue;
        };
        let Some(field) = templates.get(&page.template) else {
            continue;
        };
        if !ctx.viewable(id, ctx.language.as_ref()) {
            log::debug!("Page {id} is not viewable by guests, skipped");
            continue;
        }
        items.extend(page_items(ctx, page, field));
    }
    items
}

fn page_items(ctx: &SeoContext<'_>, page: PageInfo, field: &str) -> Vec<SitemapItem> {
    let data = ctx.store.seo_data(page.id, field).unwrap_or_default();
    let scope = PageScope::new(ctx, page, field, &data);

    if scope.get(Group::Sitemap, "include").as_deref() != Some("1") {
        log::debug!("Page {} is excluded from the sitemap", scope.page.id);
        return Vec::new();
    }

    let priority = scope
        .get(Group::Sitemap, "priority")
        .and_then(|p| p.parse::<f64>().ok())
        .unwrap_or(DEFAULT_PRIORITY);
    let changefreq = scope
        .get(Group::Sitemap, "changeFrequency")
        .unwrap_or_else(|| "monthly".to_string());
    let lastmod = scope.page.modified.and_then(format_lastmod);

    let item = |loc: String| SitemapItem {
        loc,
        lastmod: lastmod.clone(),
        priority,
        changefreq: changefreq.clone(),
        alternates: Vec::new(),
    };

    let languages = ctx.store.languages();
    if !ctx.store.language_page_names() || languages.is_empty() {
        return ctx
            .absolute_url(scope.page.id, None)
            .map(item)
            .into_iter()
            .collect();
    }

    let viewable: Vec<(&Language, String)> = languages
        .iter()
        .filter(|l| ctx.viewable(scope.page.id, Some(*l)))
        .filter_map(|l| Some((l, ctx.absolute_url(scope.page.id, Some(l))?)))
        .collect();

    viewable
        .iter()
        .map(|(_, loc)| {
            let mut entry = item(loc.clone());
            add_alternates(ctx, &mut entry, &viewable);
            entry
        })
        .collect()
}

fn add_alternates(ctx: &SeoContext<'_>, item: &mut SitemapItem, languages: &[(&Language, String)]) {
    for (language, url) in languages {
        item.add_alternate(language.code(&ctx.module.default_language), url.as_str());
        if language.default {
            item.add_alternate("x-default", url.as_str());
        }
    }
}

/// Seconds since the epoch as an RFC 3339 timestamp in UTC.
fn format_lastmod(timestamp: i64) -> Option<String> {
    DateTime::from_timestamp(timestamp, 0).map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, false))
}

const XML_PROLOG: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

/// Priority with at most three decimals and at least one, clamped to [0, 1].
fn format_priority(priority: f64) -> String {
    let priority = if priority.is_nan() {
        DEFAULT_PRIORITY
    } else {
        priority.clamp(0.0, 1.0)
    };
    let formatted = format!("{priority:.3}");
    let trimmed = formatted.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}

/// Child elements of one `<url>`, in document order.
fn url_children(item: &SitemapItem) -> Vec<Markup> {
    let mut children = vec![html! { loc { (item.loc) } }];
    if let Some(lastmod) = &item.lastmod {
        children.push(html! { lastmod { (lastmod) } });
    }
    children.push(html! { changefreq { (item.changefreq) } });
    children.push(html! { priority { (format_priority(item.priority)) } });
    for alternate in &item.alternates {
        children.push(html! {
            xhtml:link rel="alternate" hreflang=(alternate.hreflang) href=(alternate.href) {}
        });
    }
    children
}

/// Serialize items to the sitemaps.org XML format.
pub fn render_xml(items: &[SitemapItem]) -> String {
    html! {
        (PreEscaped(XML_PROLOG))
        urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:xhtml="http://www.w3.org/1999/xhtml" {
            @for item in items {
                "\n  "
                url {
                    @for child in url_children(item) {
                        "\n    " (child)
                    }
                    "\n  "
                }
            }
            "\n"
        }
        "\n"
    }
    .into_string()
}

fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Location of the sitemap below the site root.
pub fn sitemap_path(config: &SitemapConfig, root: &Path) -> PathBuf {
    root.join(config.path.trim_start_matches('/'))
}

/// Whether the sitemap is due: generation is enabled, a path is configured
/// and the existing file, if any, is at least `cache_minutes` old.
pub fn should_generate(config: &SitemapConfig, root: &Path, now: SystemTime) -> bool {
    if !config.enable || config.path.is_empty() {
        return false;
    }
    let path = sitemap_path(config, root);
    let Ok(modified) = std::fs::metadata(&path).and_then(|m| m.modified()) else {
        return true;
    };
    let age_minutes = now
        .duration_since(modified)
        .map(|age| age.as_secs_f64() / 60.0)
        .unwrap_or(0.0);
    if age_minutes < config.cache_minutes as f64 {
        log::debug!("Sitemap {} is {age_minutes:.1} minutes old, still fresh", path.display());
        return false;
    }
    true
}

/// Pages the sitemap considers before viewability and include checks.
pub fn candidate_pages(ctx: &SeoContext<'_>) -> Vec<PageId> {
    let templates = seo_templates(ctx);
    if templates.is_empty() {
        return Vec::new();
    }
    ctx.store.find_pages(&page_query(ctx, &templates))
}
