//! The explicit context every resolution and render call runs in.
//!
//! Instead of reading the current language, current user and module settings
//! from process-wide state, callers build a [`SeoContext`] and pass it down.
//! Switching identity or language produces a derived context for the duration
//! of a closure; the caller's context is never mutated, so nothing has to be
//! restored afterwards, on any exit path.

use crate::config::ModuleConfig;
use crate::data::LanguageId;
use crate::field::FieldRegistry;
use crate::host::{ContentStore, Identity, Language, NoHooks, PageId, PageInfo, SeoHooks};
use crate::imaging::{ImageProbe, NoProbe};

static NO_HOOKS: NoHooks = NoHooks;
static NO_PROBE: NoProbe = NoProbe;

#[derive(Clone)]
pub struct SeoContext<'a> {
    pub store: &'a dyn ContentStore,
    pub module: &'a ModuleConfig,
    pub fields: &'a FieldRegistry,
    pub probe: &'a dyn ImageProbe,
    pub hooks: &'a dyn SeoHooks,
    /// Current language. `None` on single-language sites.
    pub language: Option<Language>,
    pub identity: Identity,
}

impl<'a> SeoContext<'a> {
    /// A guest context in the default language, without hooks or image probing.
    pub fn new(
        store: &'a dyn ContentStore,
        module: &'a ModuleConfig,
        fields: &'a FieldRegistry,
    ) -> Self {
        let language = store.languages().into_iter().find(|l| l.default);
        Self {
            store,
            module,
            fields,
            probe: &NO_PROBE,
            hooks: &NO_HOOKS,
            language,
            identity: Identity::Guest,
        }
    }

    pub fn with_probe(mut self, probe: &'a dyn ImageProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_hooks(mut self, hooks: &'a dyn SeoHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_language(mut self, language: Option<Language>) -> Self {
        self.language = language;
        self
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    /// Run `f` as `identity`. The derived context only lives inside `f`.
    pub fn as_identity<R>(&self, identity: Identity, f: impl FnOnce(&SeoContext<'a>) -> R) -> R {
        let scoped = self.clone().with_identity(identity);
        f(&scoped)
    }

    /// Run `f` in `language`.
    pub fn in_language<R>(
        &self,
        language: Option<Language>,
        f: impl FnOnce(&SeoContext<'a>) -> R,
    ) -> R {
        let scoped = self.clone().with_language(language);
        f(&scoped)
    }

    /// Language id used for per-language keys; `None` in the default language.
    pub fn language_id(&self) -> Option<LanguageId> {
        self.language.as_ref().and_then(Language::key_id)
    }

    /// Current page attributes, localized to the current language.
    pub fn page(&self, id: PageId) -> Option<PageInfo> {
        self.store.page(id, self.language.as_ref())
    }

    /// Absolute URL of a page: the base URL plus its local URL, or the host's
    /// own absolute URL when no base URL is configured.
    pub fn absolute_url(&self, page: PageId, language: Option<&Language>) -> Option<String> {
        if self.module.base_url.is_empty() {
            self.store.http_url(page, language)
        } else {
            let local = self.store.local_url(page, language)?;
            Some(format!("{}{}", self.module.base_url, local))
        }
    }

    pub fn viewable(&self, page: PageId, language: Option<&Language>) -> bool {
        self.store.viewable(page, &self.identity, language)
    }
}
