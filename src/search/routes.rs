//! Translate resource locators from the search service into console routes.

use crate::model::types::{ResultAction, ResultItem};

/// Locator fragment → console route prefix. One entry per entity category.
const ROUTE_TABLE: &[(&str, &str)] = &[
    ("/api/hardware-inputs/", "/manage/hardware-inputs"),
    ("/api/hardware-outputs/", "/manage/hardware-outputs"),
    ("/api/hardware-panels/", "/manage/hardware-panels"),
    ("/api/aircraft-models/", "/manage/aircraft-models"),
    ("/api/hardware-boards/", "/manage/hardware-boards"),
    ("/api/hardware-input-types/", "/manage/hardware-input-types"),
    ("/api/hardware-output-types/", "/manage/hardware-output-types"),
];

/// Map a resource locator to an internal route.
///
/// A locator containing a recognised fragment becomes
/// `<route prefix>/<trailing path segment>`. Anything else is returned
/// unchanged: a visible odd-looking link beats a silently dropped result.
pub fn resolve_route(locator: &str) -> String {
    for (fragment, prefix) in ROUTE_TABLE {
        if locator.contains(fragment) {
            let id = locator.rsplit('/').next().unwrap_or_default();
            return format!("{prefix}/{id}");
        }
    }
    locator.to_string()
}

/// The action a commit should follow: the one named `view`, else the first.
pub fn primary_action(item: &ResultItem) -> Option<&ResultAction> {
    item.actions
        .iter()
        .find(|action| action.name.eq_ignore_ascii_case("view"))
        .or_else(|| item.actions.first())
}

/// Console route for an item, if it carries any action.
pub fn item_route(item: &ResultItem) -> Option<String> {
    primary_action(item).map(|action| resolve_route(&action.url))
}
