//! # SEO Maestro
//!
//! SEO metadata for CMS pages: meta tags, Open Graph, Twitter cards, robots
//! directives, JSON-LD breadcrumbs and an XML sitemap, all driven by one SEO
//! field attached to the page's template.
//!
//! # Architecture: Resolve, Then Render
//!
//! Every value a page emits goes through the same two steps:
//!
//! ```text
//! 1. Resolve   page override → template context → field config → module default
//! 2. Render    placeholders → group rules → encoding → transform_value hook
//! ```
//!
//! A page stores only what an editor overrode; everything else stays the
//! inherit sentinel and is resolved at render time. Changing a field's
//! configuration therefore changes every page that did not override it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | The fixed set of SEO entries per group, their kinds and module defaults |
//! | [`data`] | Stored page data keyed by (group, name, language), the inherit sentinel |
//! | [`config`] | `seo.toml` loading, merging and validation |
//! | [`field`] | Field configuration with template-context overlays |
//! | [`host`] | Traits the hosting CMS implements: content store, hooks |
//! | [`context`] | The explicit context every call runs in: language, identity, settings |
//! | [`placeholder`] | `{field}` substitution in text values |
//! | [`resolve`] | The value resolution chain |
//! | [`render`] | One renderer per group |
//! | [`page_value`] | The per-page value: group accessors, full tag block, persistence |
//! | [`sitemap`] | Sitemap items, XML output, regeneration policy |
//! | [`imaging`] | Resize math and image probing for Open Graph details |
//! | [`store`] | JSON-backed content store used by the CLI |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## No Ambient State
//!
//! The current language, the current user and the module settings are passed
//! in through [`context::SeoContext`]. Sitemap generation runs as a guest by
//! deriving a guest context for its duration, so the caller's context is
//! never mutated and nothing needs restoring.
//!
//! ## Closed Group Set
//!
//! The six groups are a closed enum with a static renderer per variant.
//! Adding a group is a compile-time change, not a lookup by name.
//!
//! ## Maud for Markup
//!
//! Tags are produced with [Maud](https://maud.lambda.xyz/), so attribute
//! values are escaped by construction. Values that are already entity-encoded
//! by the group rules are passed through unescaped.

pub mod catalog;
pub mod config;
pub mod context;
pub mod data;
pub mod field;
pub mod host;
pub mod imaging;
pub mod output;
pub mod page_value;
pub mod placeholder;
pub mod render;
pub mod resolve;
pub mod sitemap;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
