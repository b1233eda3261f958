//! Shared test utilities for the seo-maestro test suite.
//!
//! Loads the fixture site (`fixtures/site.json` + `fixtures/seo.toml`) and
//! provides lookups that panic with a clear message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = load_fixture_site();
//! let ctx = site.context();
//! let mut data = PageSeoData::blank();
//! set_raw(&mut data, Group::Robots, "noIndex", "1");
//!
//! let scope = scope_for(&site, &ctx, "about", &data);
//! assert_eq!(
//!     render_group_tags(&scope, Group::Robots),
//!     "<meta name=\"robots\" content=\"noindex\">"
//! );
//! ```

use std::path::Path;

use crate::catalog::Group;
use crate::config::{self, SeoConfig};
use crate::context::SeoContext;
use crate::data::{PageSeoData, RawValue, SeoKey};
use crate::field::FieldRegistry;
use crate::host::{ContentStore, Language, PageId};
use crate::render::{self, PageScope};
use crate::store::MemoryStore;

/// Name of the SEO field every fixture template carries.
pub const SEO_FIELD: &str = "seo";

/// The fixture site, owned so tests can mutate it before building a context.
pub struct TestSite {
    pub store: MemoryStore,
    pub config: SeoConfig,
    pub fields: FieldRegistry,
}

impl TestSite {
    /// A guest context in the default language.
    pub fn context(&self) -> SeoContext<'_> {
        SeoContext::new(&self.store, &self.config.module, &self.fields)
    }
}

// =========================================================================
// Fixture setup
// =========================================================================

pub fn load_fixture_site() -> TestSite {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    let store = MemoryStore::load(&fixtures.join("site.json")).unwrap();
    let config = config::load_config(&fixtures.join("seo.toml")).unwrap();
    let fields = FieldRegistry::from_config(&config).unwrap();
    TestSite {
        store,
        config,
        fields,
    }
}

// =========================================================================
// Lookups — panics with a clear message on miss
// =========================================================================

/// Id of a fixture page by its default-language name. Panics if not found.
pub fn page_id(site: &TestSite, name: &str) -> PageId {
    site.store.find_by_name(name).unwrap_or_else(|| {
        let names = site.store.page_names();
        panic!("page '{name}' not found. Available: {names:?}")
    })
}

/// A fixture language by name. Panics if not found.
pub fn language(site: &TestSite, name: &str) -> Language {
    let languages = site.store.languages();
    languages
        .iter()
        .find(|l| l.name == name)
        .cloned()
        .unwrap_or_else(|| {
            let names: Vec<&str> = languages.iter().map(|l| l.name.as_str()).collect();
            panic!("language '{name}' not found. Available: {names:?}")
        })
}

// =========================================================================
// Rendering helpers
// =========================================================================

/// Scope of the `seo` field on a named fixture page, over `data`.
pub fn scope_for<'c, 'a>(
    site: &TestSite,
    ctx: &'c SeoContext<'a>,
    name: &str,
    data: &'c PageSeoData,
) -> PageScope<'c, 'a> {
    let id = page_id(site, name);
    let page = ctx
        .page(id)
        .unwrap_or_else(|| panic!("page '{name}' has no info in the current language"));
    PageScope::new(ctx, page, SEO_FIELD, data)
}

/// Store a raw value in the default language, bypassing sanitization.
pub fn set_raw(data: &mut PageSeoData, group: Group, name: &str, value: &str) {
    let key = SeoKey::new(group, name, None)
        .unwrap_or_else(|| panic!("'{group}.{name}' is not in the catalog"));
    data.insert(key, RawValue::from_stored(value)).unwrap();
}

/// Tags of one group joined into a fragment, without hooks.
pub fn render_group_tags(scope: &PageScope<'_, '_>, group: Group) -> String {
    render::join_tags(&render::group_tags(scope, group))
}
