//! Integration tests for query resolution over a hub device catalog.

use hubquick::commands::{EXECUTION_CATALOG, RESOLUTION_CATALOG};
use hubquick::devices::Device;
use hubquick::resolve::resolve;
use pretty_assertions::assert_eq;
use serde_json::json;

/// A catalog in the shape `devices/all` returns it.
fn catalog() -> Vec<Device> {
    serde_json::from_value(json!([
        {"id": "1", "label": "Kitchen Light", "type": "Generic Zigbee Dimmer",
         "capabilities": ["Switch", "SwitchLevel"], "attributes": {"switch": "off"}},
        {"id": "2", "label": "Kitchen Light 2", "type": "Generic Zigbee Outlet",
         "capabilities": ["Switch"]},
        {"id": "3", "label": "Front Door", "type": "Generic Z-Wave Lock",
         "capabilities": ["Lock"]},
        {"id": "4", "label": "Movie Time", "type": "Scene Activator",
         "capabilities": ["Switch"]},
        {"id": 5, "label": "Porch Bulb", "type": "Generic Zigbee RGB Bulb",
         "capabilities": ["Switch", "ColorControl"]},
        {"id": "6", "label": "Garage Sensor", "type": "Generic Zigbee Contact Sensor",
         "capabilities": ["ContactSensor"]}
    ]))
    .unwrap()
}

fn device_id<'a>(device: Option<&'a Device>) -> Option<&'a str> {
    device.map(|d| d.id.as_str())
}

#[test]
fn test_label_command_and_parameter() {
    let devices = catalog();
    let resolved = resolve("Kitchen Light dim 40", &devices, &RESOLUTION_CATALOG);

    assert_eq!(device_id(resolved.device), Some("1"));
    assert_eq!(resolved.command_keyword, "dim");
    assert_eq!(resolved.params, vec!["40"]);
}

#[test]
fn test_label_match_ignores_case() {
    let devices = catalog();
    let resolved = resolve("KITCHEN LIGHT dim 40", &devices, &RESOLUTION_CATALOG);

    assert_eq!(device_id(resolved.device), Some("1"));
    assert_eq!(resolved.command_keyword, "dim");
    assert_eq!(resolved.params, vec!["40"]);
    assert_eq!(resolved.query, "Kitchen Light");
}

#[test]
fn test_ambiguous_prefix_lists_candidates() {
    let devices = catalog();
    let resolved = resolve("kitchen", &devices, &RESOLUTION_CATALOG);

    assert!(resolved.is_ambiguous());
    let labels: Vec<_> = resolved.candidates.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["Kitchen Light", "Kitchen Light 2"]);
}

#[test]
fn test_numeric_id_is_kept_as_text() {
    let devices = catalog();
    let resolved = resolve("porch bulb color red", &devices, &RESOLUTION_CATALOG);

    assert_eq!(device_id(resolved.device), Some("5"));
    assert_eq!(resolved.command_keyword, "color");
    assert_eq!(resolved.params, vec!["red"]);
}

#[test]
fn test_catalog_decides_which_devices_are_searchable() {
    let devices = catalog();

    let resolved = resolve("Garage Sensor", &devices, &RESOLUTION_CATALOG);
    assert_eq!(device_id(resolved.device), Some("6"));

    // Contact sensors have no command in the execution catalog.
    let resolved = resolve("Garage Sensor", &devices, &EXECUTION_CATALOG);
    assert!(resolved.device.is_none());
    assert!(resolved.candidates.is_empty());
}

#[test]
fn test_unknown_query() {
    let devices = catalog();
    let resolved = resolve("zzz qqq", &devices, &RESOLUTION_CATALOG);

    assert!(resolved.device.is_none());
    assert!(!resolved.is_ambiguous());
    assert_eq!(resolved.query, "zzz qqq");
}
