//! The per-page, per-field SEO value.
//!
//! [`PageSeoValue`] owns the raw stored data of one SEO field on one page. It
//! hands out [`SeoGroup`] accessors for reading and writing single values,
//! renders the complete tag block for the page, and produces the record a
//! host persists.
//!
//! ```text
//! value.group(&ctx, Group::Meta).get("title")     resolved + rendered + hook
//! value.group(&ctx, Group::Meta).set("title", ..) sanitized, marks changed
//! value.render(&ctx)                              all groups + common tags
//! value.to_record(&ctx)                           blob + denormalized flags
//! ```
//!
//! Writes apply to the context's current language for translatable entries
//! and to the default language otherwise. Writing [`INHERIT`] clears the page
//! override.

use crate::catalog::{self, Group};
use crate::context::SeoContext;
use crate::data::{DataError, INHERIT, PageSeoData, RawValue, SeoKey, StoredRecord};
use crate::host::{ContentStore, PageId, Tag};
use crate::render::{self, PageScope, renderer_for};
use maud::html;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValueError {
    #[error("Unable to set \"{name}\" for group \"{group}\"")]
    UnknownField { group: Group, name: String },
    #[error("Unknown SEO group \"{0}\"")]
    UnknownGroup(String),
    #[error("Page {0} does not exist")]
    UnknownPage(PageId),
    #[error(transparent)]
    Data(#[from] DataError),
}

/// SEO data of one field on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSeoValue {
    page: PageId,
    field: String,
    data: PageSeoData,
    changed: bool,
}

impl PageSeoValue {
    pub fn new(page: PageId, field: impl Into<String>, data: PageSeoData) -> Self {
        Self {
            page,
            field: field.into(),
            data,
            changed: false,
        }
    }

    /// A value with every entry inheriting.
    pub fn blank(page: PageId, field: impl Into<String>) -> Self {
        Self::new(page, field, PageSeoData::blank())
    }

    /// The stored value of `field` on `page`, or a blank one if never saved.
    pub fn load(store: &dyn ContentStore, page: PageId, field: &str) -> Self {
        let data = store.seo_data(page, field).unwrap_or_default();
        Self::new(page, field, data)
    }

    /// Restore from a persisted record.
    pub fn from_record(
        page: PageId,
        field: impl Into<String>,
        record: &StoredRecord,
    ) -> Result<Self, ValueError> {
        Ok(Self::new(page, field, PageSeoData::from_json(&record.data)?))
    }

    pub fn page(&self) -> PageId {
        self.page
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn data(&self) -> &PageSeoData {
        &self.data
    }

    /// True if any `set` changed the stored bytes since creation or the last
    /// [`mark_saved`](Self::mark_saved).
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn mark_saved(&mut self) {
        self.changed = false;
    }

    fn scope<'c, 'a>(&'c self, ctx: &'c SeoContext<'a>) -> Result<PageScope<'c, 'a>, ValueError> {
        let page = ctx.page(self.page).ok_or(ValueError::UnknownPage(self.page))?;
        Ok(PageScope::new(ctx, page, &self.field, &self.data))
    }

    /// Accessor for one group.
    pub fn group<'v, 'c, 'a>(
        &'v mut self,
        ctx: &'c SeoContext<'a>,
        group: Group,
    ) -> SeoGroup<'v, 'c, 'a> {
        SeoGroup {
            value: self,
            ctx,
            group,
        }
    }

    /// Accessor for a group by name; `og` is accepted for `opengraph`.
    pub fn group_named<'v, 'c, 'a>(
        &'v mut self,
        ctx: &'c SeoContext<'a>,
        name: &str,
    ) -> Result<SeoGroup<'v, 'c, 'a>, ValueError> {
        let group = Group::from_name(name).ok_or_else(|| ValueError::UnknownGroup(name.into()))?;
        Ok(self.group(ctx, group))
    }

    /// Tags of one group, after the tag hook, joined by newlines.
    pub fn render_group(&self, ctx: &SeoContext<'_>, group: Group) -> Result<String, ValueError> {
        let scope = self.scope(ctx)?;
        let tags = ctx.hooks.transform_tags(render::group_tags(&scope, group), Some(group));
        Ok(render::join_tags(&tags))
    }

    /// The complete tag block: every group in order, then the generator and
    /// alternate-language tags. Empty groups are left out.
    pub fn render(&self, ctx: &SeoContext<'_>) -> Result<String, ValueError> {
        let scope = self.scope(ctx)?;
        let mut blocks: Vec<String> = Group::ALL
            .into_iter()
            .map(|group| {
                let tags = ctx.hooks.transform_tags(render::group_tags(&scope, group), Some(group));
                render::join_tags(&tags)
            })
            .collect();

        let common = ctx.hooks.transform_tags(common_tags(&scope), None);
        blocks.push(render::join_tags(&common));

        blocks.retain(|block| !block.is_empty());
        Ok(blocks.join("\n"))
    }

    /// What the host persists: the JSON blob, one "fully inherited" flag per
    /// group, and the resolved sitemap include flag.
    pub fn to_record(&self, ctx: &SeoContext<'_>) -> Result<StoredRecord, ValueError> {
        let scope = self.scope(ctx)?;
        let inherit_flags = Group::ALL
            .into_iter()
            .map(|group| (group.as_str().to_string(), self.data.group_inherits(group)))
            .collect();
        let sitemap_include = scope.render(Group::Sitemap, "include").as_deref() == Some("1");
        Ok(StoredRecord {
            data: self.data.to_json(),
            inherit_flags,
            sitemap_include,
        })
    }
}

/// Generator tag plus, with per-language page names, one alternate link per
/// viewable language and an `x-default` link to the default language.
fn common_tags(scope: &PageScope<'_, '_>) -> Vec<Tag> {
    let ctx = scope.ctx;
    let mut tags = Vec::new();

    if !ctx.module.generator.is_empty() {
        let markup = html! { meta name="generator" content=(ctx.module.generator); };
        tags.push(Tag::new("meta_generator", markup.into_string()));
    }

    if !ctx.store.language_page_names() {
        return tags;
    }
    for language in ctx.store.languages() {
        if !ctx.viewable(scope.page.id, Some(&language)) {
            continue;
        }
        let Some(url) = ctx.absolute_url(scope.page.id, Some(&language)) else {
            continue;
        };
        let code = language.code(&ctx.module.default_language);
        let markup = html! { link rel="alternate" href=(url) hreflang=(code); };
        tags.push(Tag::new(format!("link_rel_{code}"), markup.into_string()));

        if language.default {
            let markup = html! { link rel="alternate" href=(url) hreflang="x-default"; };
            tags.push(Tag::new("link_rel_default", markup.into_string()));
        }
    }
    tags
}

/// One group of a [`PageSeoValue`], in one context.
pub struct SeoGroup<'v, 'c, 'a> {
    value: &'v mut PageSeoValue,
    ctx: &'c SeoContext<'a>,
    group: Group,
}

impl SeoGroup<'_, '_, '_> {
    fn check(&self, name: &str) -> Result<&'static catalog::FieldDefinition, ValueError> {
        catalog::definition(self.group, name).ok_or_else(|| ValueError::UnknownField {
            group: self.group,
            name: name.to_string(),
        })
    }

    /// Resolved, rendered value, passed through the value hook.
    pub fn get(&self, name: &str) -> Result<Option<String>, ValueError> {
        self.check(name)?;
        Ok(self.value.scope(self.ctx)?.get(self.group, name))
    }

    /// The value the field configuration provides, rendered, ignoring any
    /// page override.
    pub fn get_inherited(&self, name: &str) -> Result<Option<String>, ValueError> {
        self.check(name)?;
        let scope = self.value.scope(self.ctx)?;
        Ok(scope.render_raw(self.group, name, scope.inherited(self.group, name)))
    }

    /// The resolved raw value, not rendered.
    pub fn get_unformatted(&self, name: &str) -> Result<Option<String>, ValueError> {
        self.check(name)?;
        Ok(self.value.scope(self.ctx)?.raw(self.group, name))
    }

    /// Sanitize and store a value. Returns whether the stored data changed.
    ///
    /// Unknown names are rejected without touching the stored data.
    pub fn set(&mut self, name: &str, value: &str) -> Result<bool, ValueError> {
        let def = self.check(name)?;
        let stored = if value == INHERIT {
            RawValue::Inherit
        } else {
            RawValue::Value(renderer_for(self.group).sanitize(def, value))
        };
        let language = if def.translatable {
            self.ctx.language_id()
        } else {
            None
        };
        let key = SeoKey {
            group: self.group,
            name: def.name,
            language,
        };
        let changed = self.value.data.insert(key, stored)?;
        self.value.changed |= changed;
        Ok(changed)
    }

    /// Tags of this group, after the tag hook.
    pub fn render(&self) -> Result<String, ValueError> {
        self.value.render_group(self.ctx, self.group)
    }
}
