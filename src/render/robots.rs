//! The combined robots directive.

use super::{GroupRenderer, PageScope};
use crate::catalog::{Group, is_truthy};
use crate::host::Tag;
use maud::html;

pub struct RobotsRenderer;

impl GroupRenderer for RobotsRenderer {
    fn group(&self) -> Group {
        Group::Robots
    }

    fn render_value(
        &self,
        _scope: &PageScope<'_, '_>,
        _name: &str,
        raw: Option<String>,
    ) -> Option<String> {
        let on = raw.as_deref().is_some_and(is_truthy);
        Some(if on { "1" } else { "0" }.to_string())
    }

    /// One tag listing every enabled directive, e.g. `noindex, nofollow`.
    /// Flags are read through the value hook like any other rendered value.
    fn render_metatags(&self, scope: &PageScope<'_, '_>, names: &[&'static str]) -> Vec<Tag> {
        let directives: Vec<String> = names
            .iter()
            .filter(|&&name| scope.get(Group::Robots, name).as_deref().is_some_and(is_truthy))
            .map(|name| name.to_lowercase())
            .collect();
        if directives.is_empty() {
            return Vec::new();
        }
        let markup = html! { meta name="robots" content=(directives.join(", ")); };
        vec![Tag::new("robots", markup.into_string())]
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::Group;
    use crate::data::PageSeoData;
    use crate::host::SeoHooks;
    use crate::test_helpers::*;

    fn render(no_index: &str, no_follow: &str) -> String {
        let site = load_fixture_site();
        let ctx = site.context();
        let mut data = PageSeoData::blank();
        set_raw(&mut data, Group::Robots, "noIndex", no_index);
        set_raw(&mut data, Group::Robots, "noFollow", no_follow);
        let scope = scope_for(&site, &ctx, "about", &data);
        render_group_tags(&scope, Group::Robots)
    }

    #[test]
    fn no_flags_render_nothing() {
        assert_eq!(render("0", "0"), "");
    }

    #[test]
    fn no_index_only() {
        assert_eq!(render("1", "0"), "<meta name=\"robots\" content=\"noindex\">");
    }

    #[test]
    fn no_follow_only() {
        assert_eq!(render("0", "1"), "<meta name=\"robots\" content=\"nofollow\">");
    }

    #[test]
    fn both_flags_in_declaration_order() {
        assert_eq!(
            render("1", "1"),
            "<meta name=\"robots\" content=\"noindex, nofollow\">"
        );
    }

    #[test]
    fn values_render_as_digits() {
        let site = load_fixture_site();
        let ctx = site.context();
        let data = PageSeoData::blank();
        let scope = scope_for(&site, &ctx, "about", &data);
        assert_eq!(scope.get(Group::Robots, "noIndex").as_deref(), Some("0"));
    }

    struct HideEverything;

    impl SeoHooks for HideEverything {
        fn transform_value(&self, group: Group, name: &str, value: String) -> String {
            if group == Group::Robots && name == "noIndex" {
                "1".to_string()
            } else {
                value
            }
        }
    }

    #[test]
    fn value_hook_sees_robots_flags() {
        let site = load_fixture_site();
        let hooks = HideEverything;
        let ctx = site.context().with_hooks(&hooks);
        let data = PageSeoData::blank();
        let scope = scope_for(&site, &ctx, "about", &data);
        assert_eq!(
            render_group_tags(&scope, Group::Robots),
            "<meta name=\"robots\" content=\"noindex\">"
        );
    }
}
