//! `{identifier}` substitution in text values.
//!
//! An identifier is a field name, optionally dotted to reach nested values:
//! `{title}`, `{images.0}`, `{seo.meta.title}`. Each placeholder is replaced by
//! whatever the [`PlaceholderSource`] returns for it. Substituted text is final
//! and never scanned again. Placeholders the source cannot resolve stay in the
//! output verbatim.

/// Token in a title format that stands for the resolved title.
pub const TITLE_TOKEN: &str = "{meta_title}";

/// Something that can answer placeholder lookups.
pub trait PlaceholderSource {
    fn lookup(&self, ident: &str) -> Option<String>;
}

impl<F> PlaceholderSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn lookup(&self, ident: &str) -> Option<String> {
        self(ident)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn is_ident(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_ident_char)
}

/// True if `value` contains anything shaped like a placeholder.
pub fn contains_placeholder(value: &str) -> bool {
    value
        .find('{')
        .is_some_and(|open| value[open..].contains('}'))
}

/// If the whole value is a single `{identifier}`, return the identifier.
pub fn whole_placeholder(value: &str) -> Option<&str> {
    value
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|ident| is_ident(ident))
}

/// Replace every `{identifier}` in `raw` with its value from `source`.
pub fn populate(raw: &str, source: &(impl PlaceholderSource + ?Sized)) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let ident_len = after.find(|c: char| !is_ident_char(c)).unwrap_or(after.len());
        let ident = &after[..ident_len];

        if ident.is_empty() || !after[ident_len..].starts_with('}') {
            // Not a placeholder; keep the brace and scan on from the next char
            out.push('{');
            rest = after;
            continue;
        }

        match source.lookup(ident) {
            Some(value) => out.push_str(&value),
            None => {
                log::debug!("Unresolved placeholder {{{ident}}} left as is");
                out.push('{');
                out.push_str(ident);
                out.push('}');
            }
        }
        rest = &after[ident_len + 1..];
    }
    out.push_str(rest);
    out
}

/// Apply a title format: every `{meta_title}` becomes `title`.
pub fn apply_title_format(format: &str, title: &str) -> String {
    format.replace(TITLE_TOKEN, title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |ident: &str| map.get(ident).cloned()
    }

    #[test]
    fn populate_replaces_known_fields() {
        let src = source(&[("title", "Seo Maestro"), ("summary", "All about SEO")]);
        assert_eq!(populate("{title}", &src), "Seo Maestro");
        assert_eq!(
            populate("{title}: {summary}!", &src),
            "Seo Maestro: All about SEO!"
        );
    }

    #[test]
    fn populate_keeps_unknown_placeholders() {
        let src = source(&[("title", "Seo Maestro")]);
        assert_eq!(populate("{title} {missing}", &src), "Seo Maestro {missing}");
    }

    #[test]
    fn populate_supports_dotted_identifiers() {
        let src = source(&[("images.0", "a.jpg"), ("seo.meta.title", "T")]);
        assert_eq!(populate("{images.0}|{seo.meta.title}", &src), "a.jpg|T");
    }

    #[test]
    fn populate_does_not_expand_substituted_values() {
        let src = source(&[("a", "{b}"), ("b", "nope")]);
        assert_eq!(populate("{a}", &src), "{b}");
    }

    #[test]
    fn populate_ignores_non_placeholders() {
        let src = source(&[("title", "T")]);
        assert_eq!(populate("a {} b", &src), "a {} b");
        assert_eq!(populate("{not valid}", &src), "{not valid}");
        assert_eq!(populate("{{title}}", &src), "{T}");
        assert_eq!(populate("open { only", &src), "open { only");
        assert_eq!(populate("trailing {title", &src), "trailing {title");
    }

    #[test]
    fn populate_handles_multibyte_text() {
        let src = source(&[("title", "Zürich")]);
        assert_eq!(populate("Grüezi {title} – ✓", &src), "Grüezi Zürich – ✓");
    }

    #[test]
    fn whole_placeholder_detection() {
        assert_eq!(whole_placeholder("{images}"), Some("images"));
        assert_eq!(whole_placeholder("{images} "), None);
        assert_eq!(whole_placeholder("https://a.test/x.jpg"), None);
        assert_eq!(whole_placeholder("{}"), None);
    }

    #[test]
    fn contains_placeholder_detection() {
        assert!(contains_placeholder("x {title} y"));
        assert!(!contains_placeholder("} {"));
        assert!(!contains_placeholder("plain"));
    }

    #[test]
    fn title_format_replaces_token() {
        assert_eq!(
            apply_title_format("{meta_title} | acme.com", "Seo Maestro"),
            "Seo Maestro | acme.com"
        );
        assert_eq!(apply_title_format("acme.com", "Seo Maestro"), "acme.com");
    }
}
