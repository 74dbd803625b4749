//! Device records as returned by the Maker API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Device type tag used by scene activators.
pub const SCENE_ACTIVATOR: &str = "Scene Activator";

/// Attribute name to last-known value.
pub type Attributes = BTreeMap<String, Value>;

/// A device from the hub's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Opaque identifier, unique within one catalog snapshot.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Display name, also the fuzzy-match search key.
    #[serde(default)]
    pub label: String,

    /// Category tag, e.g. "Generic Zigbee Bulb" or "Scene Activator".
    #[serde(rename = "type", default)]
    pub device_type: String,

    /// Capability tags such as `Switch` or `Lock`.
    #[serde(default, deserialize_with = "capability_tags")]
    pub capabilities: Vec<String>,

    /// Last-known attribute values.
    #[serde(default, deserialize_with = "attribute_values")]
    pub attributes: Attributes,
}

/// Broad device category, used to pick an icon for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceKind {
    Thermostat,
    Lock,
    ColorLight,
    Light,
    Shade,
    Contact,
    Scene,
    Switch,
}

impl DeviceKind {
    /// Returns the icon file for this kind.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Thermostat => "icons/thermostat.png",
            Self::Lock => "icons/lock.png",
            Self::ColorLight => "icons/color-light.png",
            Self::Light => "icons/light.png",
            Self::Shade => "icons/shade.png",
            Self::Contact => "icons/contact.png",
            Self::Scene => "icons/scene.png",
            Self::Switch => "icons/switch.png",
        }
    }
}

impl Device {
    /// Creates a device with the given id, label and capabilities.
    pub fn new(id: impl Into<String>, label: impl Into<String>, capabilities: &[&str]) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            device_type: String::new(),
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
            attributes: Attributes::new(),
        }
    }

    /// Sets the device type.
    pub fn with_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = device_type.into();
        self
    }

    /// Returns true if this device is a scene activator.
    pub fn is_scene(&self) -> bool {
        self.device_type == SCENE_ACTIVATOR
    }

    /// Returns true if the device exposes the given capability tag.
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }

    /// Classifies the device for display.
    pub fn kind(&self) -> DeviceKind {
        if self.has_capability("Thermostat") {
            DeviceKind::Thermostat
        } else if self.has_capability("Lock") {
            DeviceKind::Lock
        } else if self.has_capability("ColorControl") {
            DeviceKind::ColorLight
        } else if self.has_capability("SwitchLevel") || self.has_capability("Light") {
            DeviceKind::Light
        } else if self.has_capability("WindowShade") {
            DeviceKind::Shade
        } else if self.has_capability("ContactSensor") {
            DeviceKind::Contact
        } else if self.is_scene() {
            DeviceKind::Scene
        } else {
            DeviceKind::Switch
        }
    }
}

/// Extracts an attribute map from a Maker API response.
///
/// Device detail responses carry an `attributes` list (or map); anything else
/// that is a JSON object is read as a flat attribute map.
pub fn attributes_from_response(response: &Value) -> Attributes {
    match response.get("attributes") {
        Some(attributes) => parse_attributes(attributes),
        None => match response {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            _ => Attributes::new(),
        },
    }
}

/// Renders an attribute or argument value the way it is compared during
/// verification: strings verbatim, everything else as JSON text.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_attributes(value: &Value) -> Attributes {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Value::Array(records) => records
            .iter()
            .filter_map(|record| {
                let name = record.get("name")?.as_str()?;
                let current = record.get("currentValue").cloned().unwrap_or(Value::Null);
                Some((name.to_string(), current))
            })
            .collect(),
        _ => Attributes::new(),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected device id, found {other}"
        ))),
    }
}

fn capability_tags<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|c| match c {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

fn attribute_values<'de, D>(deserializer: D) -> std::result::Result<Attributes, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().map(parse_attributes).unwrap_or_default())
}
