//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Fields
//!
//! ```text
//! meta
//!     001 title (text, translatable)
//!         Every page should have a unique meta title, ideally less than 60...
//!     002 description (text, translatable)
//! opengraph
//!     001 title (text, translatable)
//! ```
//!
//! ## Sitemap
//!
//! ```text
//! 001 http://localhost/en/about/
//!     monthly, priority 0.5, modified 2023-11-14T23:13:20+00:00
//!     de → http://localhost/de/ueber-uns/
//! Listed 6 entries → sitemap.seomaestro.xml
//! ```
//!
//! ## Check
//!
//! ```text
//! Fields
//!     seo (templates: home)
//! Templates
//!     basic-page → seo
//! Sitemap
//!     6 candidate pages
//!     sitemap.seomaestro.xml: due
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::catalog::{CATALOG, FieldDefinition, Group, ValueKind};
use crate::config::SeoConfig;
use crate::host::TemplateInfo;
use crate::sitemap::SitemapItem;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn kind_label(kind: &ValueKind) -> &'static str {
    match kind {
        ValueKind::Text => "text",
        ValueKind::Url => "url",
        ValueKind::Bool => "checkbox",
        ValueKind::Enum { .. } => "choice",
        ValueKind::Number { .. } => "number",
    }
}

/// `001 title (text, translatable)`
fn field_line(index: usize, def: &FieldDefinition) -> String {
    let mut detail = kind_label(&def.kind).to_string();
    if def.translatable {
        detail.push_str(", translatable");
    }
    format!("{} {} ({})", format_index(index), def.name, detail)
}

// ============================================================================
// Fields
// ============================================================================

/// The catalog, grouped in render order.
pub fn format_fields() -> Vec<String> {
    let mut lines = Vec::new();
    for group in Group::ALL {
        lines.push(group.to_string());
        for (i, def) in CATALOG.iter().filter(|d| d.group == group).enumerate() {
            lines.push(format!("{}{}", indent(1), field_line(i + 1, def)));
            if !def.description.is_empty() {
                lines.push(format!("{}{}", indent(2), truncate_desc(def.description, 72)));
            }
        }
    }
    lines
}

pub fn print_fields() {
    for line in format_fields() {
        println!("{}", line);
    }
}

// ============================================================================
// Sitemap
// ============================================================================

/// Entries of a generated sitemap, then a summary line. `written` is the path
/// the sitemap went to, or `None` for a dry run.
pub fn format_sitemap_output(items: &[SitemapItem], written: Option<&Path>) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, item) in items.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), item.loc));
        let mut detail = format!("{}, priority {}", item.changefreq, item.priority);
        if let Some(lastmod) = &item.lastmod {
            detail.push_str(&format!(", modified {lastmod}"));
        }
        lines.push(format!("{}{}", indent(1), detail));
        for alternate in &item.alternates {
            lines.push(format!(
                "{}{} → {}",
                indent(1),
                alternate.hreflang,
                alternate.href
            ));
        }
    }

    let noun = if items.len() == 1 { "entry" } else { "entries" };
    match written {
        Some(path) => lines.push(format!("Listed {} {} → {}", items.len(), noun, path.display())),
        None if items.is_empty() => lines.push("Nothing to list, sitemap not written".to_string()),
        None => lines.push(format!("Listed {} {}", items.len(), noun)),
    }
    lines
}

pub fn print_sitemap_output(items: &[SitemapItem], written: Option<&Path>) {
    for line in format_sitemap_output(items, written) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Summary of a configuration check against a site.
pub struct CheckSummary<'a> {
    pub config: &'a SeoConfig,
    pub templates: &'a [TemplateInfo],
    pub candidate_pages: usize,
    pub sitemap_path: &'a Path,
    pub sitemap_due: bool,
}

pub fn format_check_output(summary: &CheckSummary<'_>) -> Vec<String> {
    let mut lines = vec!["Fields".to_string()];
    if summary.config.fields.is_empty() {
        lines.push(format!("{}(none configured, module defaults apply)", indent(1)));
    }
    for (name, settings) in &summary.config.fields {
        if settings.templates.is_empty() {
            lines.push(format!("{}{}", indent(1), name));
        } else {
            let templates: Vec<&str> = settings.templates.keys().map(String::as_str).collect();
            lines.push(format!("{}{} (templates: {})", indent(1), name, templates.join(", ")));
        }
    }

    lines.push("Templates".to_string());
    let with_seo: Vec<&TemplateInfo> = summary
        .templates
        .iter()
        .filter(|t| !t.seo_fields.is_empty())
        .collect();
    if with_seo.is_empty() {
        lines.push(format!("{}(no template carries an SEO field)", indent(1)));
    }
    for template in with_seo {
        let admin = if template.admin { " (admin)" } else { "" };
        lines.push(format!(
            "{}{}{} → {}",
            indent(1),
            template.name,
            admin,
            template.seo_fields.join(", ")
        ));
    }

    lines.push("Sitemap".to_string());
    if !summary.config.sitemap.enable {
        lines.push(format!("{}disabled", indent(1)));
        return lines;
    }
    let noun = if summary.candidate_pages == 1 { "page" } else { "pages" };
    lines.push(format!("{}{} candidate {}", indent(1), summary.candidate_pages, noun));
    let state = if summary.sitemap_due { "due" } else { "fresh" };
    lines.push(format!("{}{}: {}", indent(1), summary.sitemap_path.display(), state));
    lines
}

pub fn print_check_output(summary: &CheckSummary<'_>) {
    for line in format_check_output(summary) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldSettings;
    use crate::sitemap::Alternate;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn truncate_desc_short() {
        assert_eq!(truncate_desc("Short text", 40), "Short text");
    }

    #[test]
    fn truncate_desc_exact() {
        let text = "a".repeat(40);
        assert_eq!(truncate_desc(&text, 40), text);
    }

    #[test]
    fn truncate_desc_long() {
        let text = "a".repeat(50);
        let expected = format!("{}...", "a".repeat(40));
        assert_eq!(truncate_desc(&text, 40), expected);
    }

    #[test]
    fn truncate_desc_multibyte() {
        assert_eq!(truncate_desc("Über uns", 2), "Üb...");
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
    }

    // =========================================================================
    // Fields
    // =========================================================================

    #[test]
    fn fields_are_grouped_in_render_order() {
        let lines = format_fields();
        let groups: Vec<&str> = lines
            .iter()
            .filter(|l| !l.starts_with(' '))
            .map(String::as_str)
            .collect();
        assert_eq!(
            groups,
            ["meta", "opengraph", "twitter", "robots", "structuredData", "sitemap"]
        );
        assert_eq!(lines[1], "    001 title (text, translatable)");
        assert!(lines.contains(&"    001 include (checkbox)".to_string()));
    }

    // =========================================================================
    // Sitemap
    // =========================================================================

    #[test]
    fn sitemap_output_lists_entries() {
        let item = SitemapItem {
            loc: "http://localhost/en/about/".into(),
            lastmod: Some("2023-11-14T22:13:20+00:00".into()),
            priority: 0.5,
            changefreq: "monthly".into(),
            alternates: vec![Alternate {
                hreflang: "de".into(),
                href: "http://localhost/de/ueber-uns/".into(),
            }],
        };
        let lines = format_sitemap_output(&[item], Some(Path::new("sitemap.xml")));
        assert_eq!(
            lines,
            [
                "001 http://localhost/en/about/",
                "    monthly, priority 0.5, modified 2023-11-14T22:13:20+00:00",
                "    de → http://localhost/de/ueber-uns/",
                "Listed 1 entry → sitemap.xml",
            ]
        );
    }

    #[test]
    fn empty_sitemap_output() {
        assert_eq!(
            format_sitemap_output(&[], None),
            ["Nothing to list, sitemap not written"]
        );
    }

    // =========================================================================
    // Check
    // =========================================================================

    #[test]
    fn check_output() {
        let mut config = SeoConfig::default();
        let mut seo = FieldSettings::default();
        seo.templates.insert("home".into(), FieldSettings::default());
        config.fields.insert("seo".into(), seo);
        let templates = vec![
            TemplateInfo {
                name: "basic-page".into(),
                seo_fields: vec!["seo".into()],
                admin: false,
            },
            TemplateInfo {
                name: "admin".into(),
                seo_fields: vec![],
                admin: true,
            },
        ];
        let summary = CheckSummary {
            config: &config,
            templates: &templates,
            candidate_pages: 6,
            sitemap_path: Path::new("sitemap.seomaestro.xml"),
            sitemap_due: true,
        };
        assert_eq!(
            format_check_output(&summary),
            [
                "Fields",
                "    seo (templates: home)",
                "Templates",
                "    basic-page → seo",
                "Sitemap",
                "    6 candidate pages",
                "    sitemap.seomaestro.xml: due",
            ]
        );
    }
}
