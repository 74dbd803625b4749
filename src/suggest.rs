//! Chooser suggestions.
//!
//! `hb query` prints a JSON list of items for an interactive chooser: one
//! item per matching device, per available command, or per parameter value,
//! plus setting items when the query starts with a setting keyword. Each
//! item's `arg` is the `hb` command line that carries out the choice.

use serde::Serialize;
use tracing::warn;

use crate::commands::{
    available_commands, has_param_suggestions, suggest_params, RESOLUTION_CATALOG,
};
use crate::config::DisplayConfig;
use crate::devices::{status, ColorTable, Device};
use crate::hub::{self, LazyHubClient};
use crate::resolve::{matcher, resolve};

/// One chooser item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub title: String,
    pub subtitle: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub arg: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub autocomplete: String,
    pub valid: bool,
    pub icon: Icon,
}

/// Item icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Icon {
    pub path: String,
}

impl Icon {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

/// The document printed for the chooser.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuggestionList {
    pub items: Vec<Suggestion>,
}

impl SuggestionList {
    pub fn push(&mut self, item: Suggestion) {
        self.items.push(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = Suggestion>) {
        self.items.extend(items);
    }

    pub fn to_json(&self) -> String {
        // Plain strings and bools only; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| String::from(r#"{"items":[]}"#))
    }
}

const ICON_INFO: &str = "icons/info.png";
const ICON_SETTINGS: &str = "icons/settings.png";
const ICON_UPDATE: &str = "icons/update.png";
const ICON_REINIT: &str = "icons/reinit.png";

/// A setting command offered when the query starts with its keyword.
struct Setting {
    keyword: &'static str,
    title: &'static str,
    subtitle: &'static str,
    icon: &'static str,
    /// Accepted values of the argument. `None` for settings without one,
    /// an empty slice for free-form values.
    values: Option<&'static [&'static str]>,
}

const SETTINGS: &[Setting] = &[
    Setting {
        keyword: "update",
        title: "Update Devices",
        subtitle: "Update the devices and colors from Hubitat",
        icon: ICON_UPDATE,
        values: None,
    },
    Setting {
        keyword: "apikey",
        title: "Set API Key",
        subtitle: "Set the Maker API access token",
        icon: ICON_SETTINGS,
        values: Some(&[]),
    },
    Setting {
        keyword: "hubid",
        title: "Set hub ID",
        subtitle: "Set the hub id used for cloud access",
        icon: ICON_SETTINGS,
        values: Some(&[]),
    },
    Setting {
        keyword: "ip",
        title: "Set hub IP",
        subtitle: "Set the local IP address of the hub",
        icon: ICON_SETTINGS,
        values: Some(&[]),
    },
    Setting {
        keyword: "mode",
        title: "Set access mode",
        subtitle: "Set access mode to local, cloud or auto",
        icon: ICON_SETTINGS,
        values: Some(&["local", "cloud", "auto"]),
    },
    Setting {
        keyword: "showstatus",
        title: "Turn on/off showing of status when single device",
        subtitle: "Adds latency. When off, can still get info via status command",
        icon: ICON_INFO,
        values: Some(&["on", "off"]),
    },
    Setting {
        keyword: "reinit",
        title: "Reinitialize",
        subtitle: "CAUTION: this deletes all devices, colors and keys",
        icon: ICON_REINIT,
        values: None,
    },
];

/// Setting items matching the first word of `query`. An empty query lists
/// every setting.
pub fn setting_items(query: &str) -> Vec<Suggestion> {
    let mut words = query.split_whitespace();
    let first = words.next().unwrap_or_default().to_lowercase();
    let value = words.next();

    SETTINGS
        .iter()
        .filter(|s| {
            first.is_empty()
                || matcher::score_fragment(&matcher::WordScorer, s.keyword, &first)
                    > matcher::MIN_SCORE
        })
        .map(|s| {
            let (arg, valid) = match (s.values, value) {
                (None, _) => (s.keyword.to_string(), true),
                (Some(_), None) => (s.keyword.to_string(), false),
                (Some(allowed), Some(v)) => (
                    format!("{} {v}", s.keyword),
                    allowed.is_empty() || allowed.contains(&v),
                ),
            };
            Suggestion {
                title: s.title.to_string(),
                subtitle: s.subtitle.to_string(),
                arg,
                autocomplete: s.keyword.to_string(),
                valid,
                icon: Icon::new(s.icon),
            }
        })
        .collect()
}

/// An informational item telling the user what to set up.
pub fn guidance_item(title: &str, subtitle: &str) -> Suggestion {
    Suggestion {
        title: title.to_string(),
        subtitle: subtitle.to_string(),
        arg: String::new(),
        autocomplete: String::new(),
        valid: false,
        icon: Icon::new(ICON_INFO),
    }
}

/// Inputs for device suggestions.
#[derive(Debug, Clone, Copy)]
pub struct SuggestContext<'a> {
    pub devices: &'a [Device],
    pub colors: &'a ColorTable,
    pub display: DisplayConfig,
}

/// Device, command and parameter items for `query`.
///
/// `client` is connected only to fetch live status for a status line.
pub async fn device_items(
    query: &str,
    ctx: &SuggestContext<'_>,
    client: &LazyHubClient<'_>,
) -> Vec<Suggestion> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let resolved = resolve(query, ctx.devices, &RESOLUTION_CATALOG);
    let candidates = &resolved.candidates;
    let params = &resolved.params;

    let single = match candidates.as_slice() {
        [device] => Some(*device),
        _ => None,
    };
    let keyword = match single {
        Some(device) if device.is_scene() => "on",
        _ => resolved.command_keyword.as_str(),
    };
    let complete = RESOLUTION_CATALOG.get(keyword);

    let mut items = Vec::new();

    let Some(device) = single else {
        for device in candidates {
            let command = if device.is_scene() { "on" } else { keyword };
            items.push(device_item(
                device,
                command,
                params,
                device.label.clone(),
                RESOLUTION_CATALOG.contains(command),
            ));
        }
        return items;
    };

    if ctx.display.show_status {
        items.push(status_item(device, keyword, ctx.colors, client).await);
    }

    match complete {
        None => {
            for command in available_commands(device, keyword, &RESOLUTION_CATALOG, &ctx.display) {
                let takes_arguments = RESOLUTION_CATALOG
                    .get(command)
                    .is_some_and(|cmd| cmd.takes_arguments());
                let valid = command != "status" && (!takes_arguments || !params.is_empty());
                items.push(device_item(
                    device,
                    command,
                    params,
                    format!("{} {command}", device.label),
                    valid,
                ));
            }
        }
        Some(cmd) if has_param_suggestions(cmd.keyword) => {
            let typed = params.first().map(String::as_str).unwrap_or_default();
            for param in suggest_params(cmd.keyword, typed, ctx.colors) {
                items.push(device_item(
                    device,
                    cmd.keyword,
                    std::slice::from_ref(&param.value),
                    format!("{} {}", device.label, cmd.keyword),
                    param.valid,
                ));
            }
        }
        Some(cmd) if cmd.keyword == "status" => {
            if !ctx.display.show_status {
                items.push(status_item(device, keyword, ctx.colors, client).await);
            }
        }
        Some(_) => {
            items.push(device_item(
                device,
                keyword,
                params,
                device.label.clone(),
                true,
            ));
        }
    }

    items
}

fn device_item(
    device: &Device,
    command: &str,
    params: &[String],
    autocomplete: String,
    valid: bool,
) -> Suggestion {
    let subtitle = format!("Turn {} {command} {}", device.label, params.join(" "));
    Suggestion {
        title: device.label.clone(),
        subtitle: subtitle.trim_end().to_string(),
        arg: run_arg(device, command, params),
        autocomplete,
        valid,
        icon: Icon::new(device.kind().icon()),
    }
}

async fn status_item(
    device: &Device,
    command: &str,
    colors: &ColorTable,
    client: &LazyHubClient<'_>,
) -> Suggestion {
    let fetched = match client.get().await {
        Ok(client) => hub::device_status(client, &device.id).await,
        Err(e) => Err(e),
    };
    let subtitle = match fetched {
        Ok(attributes) => status::summarize(&attributes, colors),
        Err(e) if e.is_guidance() => e.to_string(),
        Err(e) => {
            warn!("Could not fetch status of {}: {e}", device.label);
            String::new()
        }
    };
    Suggestion {
        title: device.label.clone(),
        subtitle,
        arg: run_arg(device, command, &[]),
        autocomplete: format!("{} {command}", device.label).trim_end().to_string(),
        valid: false,
        icon: Icon::new(device.kind().icon()),
    }
}

/// The `hb run` command line for a device command.
pub fn run_arg(device: &Device, command: &str, params: &[String]) -> String {
    let mut arg = format!("run --device-uid {}", device.id);
    if !command.is_empty() {
        arg.push_str(" --device-command ");
        arg.push_str(command);
    }
    if !params.is_empty() {
        arg.push_str(" --device-params ");
        arg.push_str(&params.join(" "));
    }
    arg
}
