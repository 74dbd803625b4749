//! Which commands a device offers right now.
//!
//! Enumerates a device's commands in suggestion order, narrows them by what
//! the user has typed, and resolves the state-dependent `toggle` and
//! `togglock` keywords against live device status.

use tracing::{debug, warn};

use super::definitions::{Catalog, GLOBAL};
use crate::config::DisplayConfig;
use crate::devices::{colors, value_text, Attributes, ColorTable, Device};
use crate::hub::{self, HubClient};

/// Keywords moved to the front of the list, applied in this order so the
/// last one listed ends up first.
const FRONT_LOADED: &[&str] = &["off", "on", "toggle", "togglock"];

/// Values offered for the thermostat `mode` command.
const THERMOSTAT_MODES: &[&str] = &["auto", "heat", "cool", "off"];

/// Lists the commands `device` supports that start with `typed_prefix`.
///
/// Scenes only offer `on`. The `status` command is offered when statuses
/// are not already shown alongside the device.
pub fn available_commands(
    device: &Device,
    typed_prefix: &str,
    catalog: &Catalog,
    display: &DisplayConfig,
) -> Vec<&'static str> {
    let mut commands: Vec<&'static str> = if device.is_scene() {
        vec!["on"]
    } else {
        catalog
            .commands()
            .iter()
            .filter(|cmd| {
                device.has_capability(cmd.capability)
                    || (cmd.capability == GLOBAL && !display.show_status)
            })
            .map(|cmd| cmd.keyword)
            .collect()
    };

    for keyword in FRONT_LOADED {
        if let Some(pos) = commands.iter().position(|k| k == keyword) {
            let kw = commands.remove(pos);
            commands.insert(0, kw);
        }
    }

    commands.retain(|k| k.starts_with(typed_prefix));
    commands
}

/// Replaces `toggle`/`togglock` with the concrete command for the given
/// live status. Other keywords, and toggles whose state attribute is
/// unknown, pass through unchanged.
pub fn resolve_toggle<'a>(keyword: &'a str, status: Option<&Attributes>) -> &'a str {
    let state = |attribute: &str| {
        status
            .and_then(|s| s.get(attribute))
            .map(value_text)
    };

    match keyword {
        "toggle" => match state("switch").as_deref() {
            Some("on") => "off",
            Some(_) => "on",
            None => keyword,
        },
        "togglock" => match state("lock").as_deref() {
            Some("locked") => "unlock",
            Some(_) => "lock",
            None => keyword,
        },
        _ => keyword,
    }
}

/// Fetches live status when `keyword` is state-dependent and resolves it.
///
/// A failed status fetch leaves the keyword unresolved.
pub async fn resolve_toggle_live(
    client: &dyn HubClient,
    device_id: &str,
    keyword: &str,
) -> String {
    if keyword != "toggle" && keyword != "togglock" {
        return keyword.to_string();
    }

    let status = match hub::device_status(client, device_id).await {
        Ok(status) => Some(status),
        Err(e) => {
            warn!("Could not fetch status of device {device_id} for {keyword}: {e}");
            None
        }
    };
    let resolved = resolve_toggle(keyword, status.as_ref());
    debug!(device_id, keyword, resolved, "resolved state-dependent command");
    resolved.to_string()
}

/// A suggested parameter value for a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSuggestion {
    pub value: String,
    /// False when the value was echoed back without being recognized.
    pub valid: bool,
}

/// Returns true if `keyword` has parameter suggestions.
pub fn has_param_suggestions(keyword: &str) -> bool {
    matches!(keyword, "color" | "mode")
}

/// Suggests parameter values for `keyword` that start with `typed`.
///
/// Color names come from the color table. When no name matches, the typed
/// text itself is offered and is valid only as a 6-digit hex code.
pub fn suggest_params(keyword: &str, typed: &str, colors: &ColorTable) -> Vec<ParamSuggestion> {
    match keyword {
        "color" => {
            let mut names: Vec<ParamSuggestion> = colors
                .names()
                .filter(|name| name.starts_with(typed))
                .map(|name| ParamSuggestion {
                    value: name.to_string(),
                    valid: true,
                })
                .collect();
            if names.is_empty() && !typed.is_empty() {
                let value = typed.to_lowercase();
                names.push(ParamSuggestion {
                    valid: colors::is_hex_code(&value),
                    value,
                });
            }
            names
        }
        "mode" => THERMOSTAT_MODES
            .iter()
            .filter(|m| m.starts_with(typed))
            .map(|m| ParamSuggestion {
                value: m.to_string(),
                valid: true,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::definitions::{EXECUTION_CATALOG, RESOLUTION_CATALOG};
    use crate::devices::SCENE_ACTIVATOR;
    use crate::hub::MockHubClient;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn hidden_status() -> DisplayConfig {
        DisplayConfig { show_status: false }
    }

    fn shown_status() -> DisplayConfig {
        DisplayConfig { show_status: true }
    }

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    #[test]
    fn test_priority_order() {
        let device = Device::new("1", "Dimmer", &["SwitchLevel", "Switch"]);
        let commands = available_commands(&device, "", &RESOLUTION_CATALOG, &hidden_status());
        assert_eq!(commands, vec!["toggle", "on", "off", "status", "dim"]);
    }

    #[test]
    fn test_togglock_precedes_toggle() {
        let device = Device::new("1", "Lockable Switch", &["Switch", "Lock"]);
        let commands = available_commands(&device, "", &RESOLUTION_CATALOG, &shown_status());
        assert_eq!(
            commands,
            vec!["togglock", "toggle", "on", "off", "lock", "unlock"]
        );
    }

    #[test]
    fn test_status_only_when_not_shown() {
        let device = Device::new("1", "Plug", &["Switch"]);
        assert!(available_commands(&device, "", &RESOLUTION_CATALOG, &hidden_status())
            .contains(&"status"));
        assert!(!available_commands(&device, "", &RESOLUTION_CATALOG, &shown_status())
            .contains(&"status"));
    }

    #[test]
    fn test_scene_only_offers_on() {
        let scene = Device::new("9", "Movie Time", &["Switch", "Lock"]).with_type(SCENE_ACTIVATOR);
        assert_eq!(
            available_commands(&scene, "", &RESOLUTION_CATALOG, &hidden_status()),
            vec!["on"]
        );
    }

    #[test]
    fn test_never_offers_missing_capability() {
        let devices = [
            Device::new("1", "A", &["Switch"]),
            Device::new("2", "B", &["Lock", "Battery"]),
            Device::new("3", "C", &["ColorControl", "SwitchLevel"]),
            Device::new("4", "D", &["Thermostat"]),
            Device::new("5", "E", &[]),
        ];
        for catalog in [&RESOLUTION_CATALOG, &EXECUTION_CATALOG] {
            for device in &devices {
                for keyword in available_commands(device, "", catalog, &hidden_status()) {
                    let cmd = catalog.get(keyword).unwrap();
                    assert!(
                        device.has_capability(cmd.capability) || cmd.capability == GLOBAL,
                        "{} offered {keyword}",
                        device.label
                    );
                }
            }
        }
    }

    #[test]
    fn test_prefix_filter() {
        let device = Device::new("1", "Lamp", &["Switch", "SwitchLevel"]);
        assert_eq!(
            available_commands(&device, "o", &RESOLUTION_CATALOG, &hidden_status()),
            vec!["on", "off"]
        );
        assert!(available_commands(&device, "xyz", &RESOLUTION_CATALOG, &hidden_status())
            .is_empty());
    }

    #[test]
    fn test_resolve_toggle_switch() {
        assert_eq!(resolve_toggle("toggle", Some(&attrs(&[("switch", "on")]))), "off");
        assert_eq!(resolve_toggle("toggle", Some(&attrs(&[("switch", "off")]))), "on");
        assert_eq!(resolve_toggle("toggle", Some(&attrs(&[("level", "5")]))), "toggle");
        assert_eq!(resolve_toggle("toggle", None), "toggle");
    }

    #[test]
    fn test_resolve_toggle_lock() {
        assert_eq!(
            resolve_toggle("togglock", Some(&attrs(&[("lock", "locked")]))),
            "unlock"
        );
        assert_eq!(
            resolve_toggle("togglock", Some(&attrs(&[("lock", "unlocked")]))),
            "lock"
        );
        assert_eq!(resolve_toggle("dim", Some(&attrs(&[("lock", "locked")]))), "dim");
    }

    #[tokio::test]
    async fn test_resolve_toggle_live_fetches_status() {
        let client = MockHubClient::new().with_status("7", json!({"switch": "on"}));
        assert_eq!(resolve_toggle_live(&client, "7", "toggle").await, "off");
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_toggle_live_skips_fetch_for_plain_commands() {
        let client = MockHubClient::new();
        assert_eq!(resolve_toggle_live(&client, "7", "on").await, "on");
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_toggle_live_passes_through_on_failure() {
        let client = MockHubClient::new().failing();
        assert_eq!(resolve_toggle_live(&client, "7", "togglock").await, "togglock");
    }

    #[test]
    fn test_suggest_color_names() {
        let colors = ColorTable::from_pairs([("Red", "#FF0000"), ("Rebecca Purple", "#663399")]);
        let values: Vec<_> = suggest_params("color", "re", &colors)
            .into_iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, vec!["rebeccapurple", "red"]);
    }

    #[test]
    fn test_suggest_color_echoes_hex() {
        let colors = ColorTable::default();
        assert_eq!(
            suggest_params("color", "00FF7F", &colors),
            vec![ParamSuggestion {
                value: "00ff7f".to_string(),
                valid: true
            }]
        );
        assert!(!suggest_params("color", "nope", &colors)[0].valid);
        assert!(suggest_params("color", "", &colors).is_empty());
    }

    #[test]
    fn test_suggest_modes() {
        let values: Vec<_> = suggest_params("mode", "", &ColorTable::default())
            .into_iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, vec!["auto", "heat", "cool", "off"]);
        assert!(suggest_params("dim", "", &ColorTable::default()).is_empty());
        assert!(has_param_suggestions("color"));
        assert!(!has_param_suggestions("on"));
    }
}
