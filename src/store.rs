//! A JSON-backed content store.
//!
//! [`MemoryStore`] implements [`ContentStore`] over a site description loaded
//! from a JSON file. The CLI uses it to render and build sitemaps for an
//! exported site; the test suite uses it through `fixtures/site.json`.
//!
//! ## URLs
//!
//! Page URLs are built from page names down the parent chain. With per-language
//! page names, the root URL is the language's root segment (`/en/`, `/de/`)
//! and non-default languages use the page's localized name where one exists.
//! Absolute URLs prepend `host`.
//!
//! Image URLs follow the host's file layout:
//! `{host}/site/assets/files/{page id}/{file}`.
//!
//! ## Viewability
//!
//! Superusers can view every page. Everyone else needs the page to be
//! viewable and, for a non-default language, the language to be active on
//! the page.

use crate::data::{DataError, LanguageId, PageSeoData};
use crate::host::{ContentStore, Identity, Language, PageId, PageImage, PageInfo, PageQuery, TemplateInfo};
use crate::imaging::{fit_dimensions, variation_file_name};
use crate::page_value::PageSeoValue;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid SEO data of field {field} on page {page}: {source}")]
    SeoData {
        page: PageId,
        field: String,
        #[source]
        source: DataError,
    },
    #[error("Site validation error: {0}")]
    Validation(String),
}

/// The site file as written on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct SiteFile {
    host: String,
    #[serde(default)]
    languages: Vec<Language>,
    #[serde(default)]
    language_page_names: bool,
    /// Root URL segment per language name.
    #[serde(default)]
    language_roots: BTreeMap<String, String>,
    #[serde(default)]
    templates: Vec<TemplateInfo>,
    #[serde(default)]
    image_fields: BTreeMap<String, ImageFieldSettings>,
    #[serde(default)]
    not_found_page: Option<PageId>,
    pages: Vec<PageFile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ImageFieldSettings {
    /// Page whose images stand in when the field is empty.
    #[serde(default)]
    default_page: Option<PageId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct PageFile {
    id: PageId,
    #[serde(default)]
    parent: Option<PageId>,
    template: String,
    name: String,
    title: String,
    #[serde(default)]
    modified: Option<i64>,
    #[serde(default)]
    hidden: bool,
    #[serde(default = "default_true")]
    viewable: bool,
    #[serde(default)]
    fields: BTreeMap<String, String>,
    #[serde(default)]
    images: BTreeMap<String, Vec<ImageFile>>,
    /// Translations keyed by language name. A non-default language is only
    /// active on the page if it has an entry here.
    #[serde(default)]
    localized: BTreeMap<String, LocalizedPage>,
    /// Stored SEO data per SEO field, in the persisted flat key format.
    #[serde(default)]
    seo: BTreeMap<String, serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LocalizedPage {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default = "default_true")]
    active: bool,
    #[serde(default)]
    fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ImageFile {
    file: String,
    width: u32,
    height: u32,
}

fn default_true() -> bool {
    true
}

/// In-memory content store.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    site: SiteFile,
    pages: BTreeMap<PageId, PageFile>,
    seo: BTreeMap<(PageId, String), PageSeoData>,
}

impl MemoryStore {
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let mut site: SiteFile = serde_json::from_str(json)?;
        site.host = site.host.trim_end_matches('/').to_string();

        let mut pages = BTreeMap::new();
        let mut seo = BTreeMap::new();
        for mut page in std::mem::take(&mut site.pages) {
            for (field, map) in std::mem::take(&mut page.seo) {
                let data = PageSeoData::from_map(&map).map_err(|source| StoreError::SeoData {
                    page: page.id,
                    field: field.clone(),
                    source,
                })?;
                seo.insert((page.id, field), data);
            }
            if pages.insert(page.id, page).is_some() {
                return Err(StoreError::Validation("duplicate page id".into()));
            }
        }

        for page in pages.values() {
            if let Some(parent) = page.parent {
                if !pages.contains_key(&parent) {
                    return Err(StoreError::Validation(format!(
                        "page {} has unknown parent {parent}",
                        page.id
                    )));
                }
            }
            if !site.templates.iter().any(|t| t.name == page.template) {
                return Err(StoreError::Validation(format!(
                    "page {} uses unknown template \"{}\"",
                    page.id, page.template
                )));
            }
        }
        if pages.values().filter(|p| p.parent.is_none()).count() != 1 {
            return Err(StoreError::Validation("exactly one root page is required".into()));
        }
        for page in pages.values() {
            let mut seen = BTreeSet::from([page.id]);
            let mut current = page.parent;
            while let Some(id) = current {
                if !seen.insert(id) {
                    return Err(StoreError::Validation(format!(
                        "page {} has a cyclic parent chain",
                        page.id
                    )));
                }
                current = pages.get(&id).and_then(|p| p.parent);
            }
        }

        Ok(Self { site, pages, seo })
    }

    /// Id of the page named `name` in the default language.
    pub fn find_by_name(&self, name: &str) -> Option<PageId> {
        self.pages.values().find(|p| p.name == name).map(|p| p.id)
    }

    /// Look up a page by numeric id or by name.
    pub fn resolve_page(&self, reference: &str) -> Option<PageId> {
        match reference.parse::<u32>() {
            Ok(id) if self.pages.contains_key(&PageId(id)) => Some(PageId(id)),
            _ => self.find_by_name(reference),
        }
    }

    /// Names of all pages, in id order.
    pub fn page_names(&self) -> Vec<&str> {
        self.pages.values().map(|p| p.name.as_str()).collect()
    }

    pub fn set_seo_data(&mut self, page: PageId, field: &str, data: PageSeoData) {
        self.seo.insert((page, field.to_string()), data);
    }

    /// Persist a page value, as the host does on page save.
    pub fn save(&mut self, value: &mut PageSeoValue) {
        self.set_seo_data(value.page(), value.field(), value.data().clone());
        value.mark_saved();
    }

    pub fn set_viewable(&mut self, page: PageId, viewable: bool) {
        if let Some(page) = self.pages.get_mut(&page) {
            page.viewable = viewable;
        }
    }

    pub fn set_title(&mut self, page: PageId, title: &str) {
        if let Some(page) = self.pages.get_mut(&page) {
            page.title = title.to_string();
        }
    }

    /// Activate or deactivate a non-default language on a page.
    pub fn set_language_active(&mut self, page: PageId, language: LanguageId, active: bool) {
        let Some(name) = self
            .site
            .languages
            .iter()
            .find(|l| l.id == language && !l.default)
            .map(|l| l.name.clone())
        else {
            return;
        };
        if let Some(page) = self.pages.get_mut(&page) {
            page.localized.entry(name).or_default().active = active;
        }
    }

    /// Translation of `page` for a non-default language.
    fn localized<'s>(&'s self, page: &'s PageFile, language: Option<&Language>) -> Option<&'s LocalizedPage> {
        let language = language.filter(|l| !l.default)?;
        page.localized.get(&language.name)
    }

    fn language_active(&self, page: &PageFile, language: Option<&Language>) -> bool {
        match language {
            None => true,
            Some(l) if l.default => true,
            Some(_) => self.localized(page, language).is_some_and(|t| t.active),
        }
    }

    fn localized_name<'s>(&'s self, page: &'s PageFile, language: Option<&Language>) -> &'s str {
        self.localized(page, language)
            .and_then(|t| t.name.as_deref())
            .unwrap_or(&page.name)
    }

    fn root_url(&self, language: Option<&Language>) -> String {
        if !self.site.language_page_names {
            return "/".to_string();
        }
        let key = match language {
            Some(l) if !l.default => l.name.as_str(),
            _ => "default",
        };
        match self.site.language_roots.get(key) {
            Some(segment) if !segment.is_empty() => format!("/{segment}/"),
            _ => "/".to_string(),
        }
    }

    fn image_url(&self, page: PageId, file: &str) -> String {
        format!("{}/site/assets/files/{page}/{file}", self.site.host)
    }

    /// Value of a single, undotted page field.
    fn plain_field(&self, page: &PageFile, name: &str, language: Option<&Language>) -> Option<String> {
        match name {
            "id" => Some(page.id.to_string()),
            "name" => Some(self.localized_name(page, language).to_string()),
            "template" => Some(page.template.clone()),
            "title" => Some(self.title(page, language).to_string()),
            "url" => self.local_url(page.id, language),
            "httpUrl" => self.http_url(page.id, language),
            _ => self
                .localized(page, language)
                .and_then(|t| t.fields.get(name))
                .or_else(|| page.fields.get(name))
                .cloned(),
        }
    }

    fn title<'s>(&'s self, page: &'s PageFile, language: Option<&Language>) -> &'s str {
        self.localized(page, language)
            .and_then(|t| t.title.as_deref())
            .unwrap_or(&page.title)
    }
}

impl ContentStore for MemoryStore {
    fn page(&self, id: PageId, language: Option<&Language>) -> Option<PageInfo> {
        let page = self.pages.get(&id)?;
        Some(PageInfo {
            id,
            template: page.template.clone(),
            title: self.title(page, language).to_string(),
            modified: page.modified,
        })
    }

    fn languages(&self) -> Vec<Language> {
        self.site.languages.clone()
    }

    fn language_page_names(&self) -> bool {
        self.site.language_page_names && !self.site.languages.is_empty()
    }

    fn viewable(&self, page: PageId, identity: &Identity, language: Option<&Language>) -> bool {
        let Some(page) = self.pages.get(&page) else {
            return false;
        };
        if matches!(identity, Identity::User { superuser: true, .. }) {
            return true;
        }
        page.viewable && self.language_active(page, language)
    }

    fn local_url(&self, page: PageId, language: Option<&Language>) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = self.pages.get(&page)?;
        while let Some(parent) = current.parent {
            segments.push(self.localized_name(current, language));
            current = self.pages.get(&parent)?;
        }
        let mut url = self.root_url(language);
        for segment in segments.iter().rev() {
            url.push_str(segment);
            url.push('/');
        }
        Some(url)
    }

    fn http_url(&self, page: PageId, language: Option<&Language>) -> Option<String> {
        let local = self.local_url(page, language)?;
        Some(format!("{}{local}", self.site.host))
    }

    fn ancestors(&self, page: PageId) -> Vec<PageId> {
        let mut ancestors = Vec::new();
        let mut current = self.pages.get(&page).and_then(|p| p.parent);
        while let Some(id) = current {
            let Some(parent) = self.pages.get(&id) else {
                break;
            };
            // The root is not an ancestor for breadcrumb purposes
            if parent.parent.is_none() {
                break;
            }
            ancestors.push(id);
            current = parent.parent;
        }
        ancestors.reverse();
        ancestors
    }

    fn field_value(&self, page: PageId, ident: &str, language: Option<&Language>) -> Option<String> {
        let page = self.pages.get(&page)?;
        let (head, rest) = match ident.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (ident, None),
        };

        if head == "parent" {
            let parent = page.parent?;
            return match rest {
                Some(rest) => self.field_value(parent, rest, language),
                None => Some(parent.to_string()),
            };
        }

        if self.site.image_fields.contains_key(head) {
            let index = match rest {
                Some(index) => index.parse::<usize>().ok()?,
                None => 0,
            };
            let image = page.images.get(head)?.get(index)?;
            return Some(self.image_url(page.id, &image.file));
        }

        match rest {
            None => self.plain_field(page, head, language),
            Some(_) => None,
        }
    }

    fn images(&self, page: PageId, field: &str) -> Option<Vec<PageImage>> {
        if !self.site.image_fields.contains_key(field) {
            return None;
        }
        let page = self.pages.get(&page)?;
        let images = page
            .images
            .get(field)
            .map(|files| {
                files
                    .iter()
                    .map(|img| PageImage {
                        url: self.image_url(page.id, &img.file),
                        width: img.width,
                        height: img.height,
                        ext: Path::new(&img.file)
                            .extension()
                            .map(|e| e.to_string_lossy().to_lowercase())
                            .unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Some(images)
    }

    fn image_fallback_page(&self, field: &str) -> Option<PageId> {
        self.site.image_fields.get(field)?.default_page
    }

    fn resize_image(&self, image: &PageImage, width: Option<u32>, height: Option<u32>) -> PageImage {
        let (w, h) = fit_dimensions((image.width, image.height), width, height);
        let url = match image.url.rsplit_once('/') {
            Some((dir, file)) => format!("{dir}/{}", variation_file_name(file, width, height)),
            None => variation_file_name(&image.url, width, height),
        };
        PageImage {
            url,
            width: w,
            height: h,
            ext: image.ext.clone(),
        }
    }

    fn templates(&self) -> Vec<TemplateInfo> {
        self.site.templates.clone()
    }

    fn find_pages(&self, query: &PageQuery) -> Vec<PageId> {
        let admin = |template: &str| {
            self.site
                .templates
                .iter()
                .any(|t| t.name == template && t.admin)
        };
        self.pages
            .values()
            .filter(|p| query.templates.contains(&p.template))
            .filter(|p| !query.exclude.contains(&p.id))
            .filter(|p| query.include_hidden || !p.hidden)
            .filter(|p| !(query.exclude_admin && admin(&p.template)))
            .map(|p| p.id)
            .collect()
    }

    fn not_found_page(&self) -> Option<PageId> {
        self.site.not_found_page
    }

    fn seo_data(&self, page: PageId, field: &str) -> Option<PageSeoData> {
        self.seo.get(&(page, field.to_string())).cloned()
    }
}
