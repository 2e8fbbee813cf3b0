use hwconsole_search::model::types::ResultItem;
use hwconsole_search::search::fallback::canned_matches;
use hwconsole_search::search::routes::{item_route, primary_action, resolve_route};

#[test]
fn hardware_panel_locator_resolves_to_manage_route() {
    assert_eq!(
        resolve_route("https://api.local/api/hardware-panels/42"),
        "/manage/hardware-panels/42"
    );
}

#[test]
fn unknown_locator_is_returned_unchanged() {
    for locator in [
        "/view/hardware-panel-details?id=1",
        "https://elsewhere.example/docs/7",
        "",
    ] {
        assert_eq!(resolve_route(locator), locator);
    }
}

#[test]
fn input_and_input_type_locators_do_not_collide() {
    assert_eq!(resolve_route("/api/hardware-inputs/3"), "/manage/hardware-inputs/3");
    assert_eq!(
        resolve_route("/api/hardware-input-types/3"),
        "/manage/hardware-input-types/3"
    );
}

#[test]
fn view_action_wins_over_earlier_actions() {
    let item = ResultItem::new("9", "HardwareBoard", "Main board", 0.7)
        .with_action("edit", "/api/hardware-boards/9/edit")
        .with_action("View", "/api/hardware-boards/9");
    assert_eq!(primary_action(&item).map(|a| a.name.as_str()), Some("View"));
    assert_eq!(item_route(&item).as_deref(), Some("/manage/hardware-boards/9"));
}

#[test]
fn first_action_used_without_view() {
    let item = ResultItem::new("4", "AircraftModel", "A320", 0.7)
        .with_action("open", "/api/aircraft-models/4");
    assert_eq!(item_route(&item).as_deref(), Some("/manage/aircraft-models/4"));
}

#[test]
fn item_without_actions_has_no_route() {
    let item = ResultItem::new("5", "SimulatorEvent", "Gear down", 0.4);
    assert_eq!(item_route(&item), None);
}

#[test]
fn canned_items_keep_their_console_routes() {
    let routes: Vec<String> = canned_matches("")
        .iter()
        .filter_map(item_route)
        .collect();
    assert_eq!(
        routes,
        vec![
            "/view/hardware-panel-details?id=1",
            "/manage/hardware-output-types",
            "/manage/hardware-input-types",
        ]
    );
}
