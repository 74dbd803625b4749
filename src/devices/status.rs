//! One-line device status summaries.

use serde_json::Value;

use super::colors::ColorTable;
use super::types::{value_text, Attributes};

/// Attributes shown in a status summary, in display order, with their icons.
const STATUS_FIELDS: &[(&str, &str)] = &[
    ("switch", "🎚"),
    ("level", "💡"),
    ("lock", "🔒"),
    ("battery", "🔋"),
    ("colorTemperature", "🎨"),
    ("windowShade", "🪟"),
    ("shadeLevel", "🌒"),
    ("contact", "🔓"),
    ("heatingSetpoint", "🔥"),
    ("coolingSetpoint", "❄️"),
    ("thermostatOperatingState", "🏃"),
    ("temperature", "🌡"),
    ("thermostatFanMode", "💨"),
    ("thermostatMode", "😰"),
];

/// Renders the known attributes of a device as `"  🎚 on  💡 40"`.
///
/// The color slot shows the device's current color by name when it can be
/// derived from the attributes.
pub fn summarize(attributes: &Attributes, colors: &ColorTable) -> String {
    let mut summary = String::new();
    for (tag, icon) in STATUS_FIELDS {
        let Some(value) = attributes.get(*tag) else {
            continue;
        };
        let text = if *tag == "colorTemperature" {
            device_color(attributes, colors).unwrap_or_else(|| value_text(value))
        } else {
            value_text(value)
        };
        summary.push_str(&format!("  {icon} {text}"));
    }
    summary
}

/// Derives a display color for a device.
///
/// Tries, in order: the `RGB` attribute, `colorName`, hue/saturation/level,
/// then `colorTemperature`. A derived code is reported by name when the
/// color table knows it.
pub fn device_color(attributes: &Attributes, colors: &ColorTable) -> Option<String> {
    let mut rgb = attributes
        .get("RGB")
        .map(value_text)
        .filter(|s| !s.is_empty() && s != "null");

    if rgb.is_none() {
        if let Some(name) = attributes
            .get("colorName")
            .map(value_text)
            .filter(|s| !s.is_empty() && s != "null")
        {
            return Some(name);
        }
    }

    if rgb.is_none() {
        let hue = attributes.get("hue").and_then(number);
        let saturation = attributes.get("saturation").and_then(number);
        let level = attributes.get("level").and_then(number);
        if let (Some(h), Some(s), Some(l)) = (hue, saturation, level) {
            rgb = Some(hsl_to_hex(h / 100.0, s / 100.0, l / 100.0));
        }
    }

    if rgb.is_none() {
        rgb = attributes
            .get("colorTemperature")
            .and_then(number)
            .filter(|k| *k > 0.0)
            .map(color_temperature_to_hex);
    }

    rgb.map(|code| {
        colors
            .name_for(&code)
            .map(str::to_string)
            .unwrap_or(code)
    })
}

/// Approximates the RGB color of a black body at `kelvin` degrees.
pub fn color_temperature_to_hex(kelvin: f64) -> String {
    let temp = kelvin / 100.0;

    let (red, green, blue) = if temp <= 66.0 {
        let green = 99.470_802_586_1 * temp.ln() - 161.119_568_166_1;
        let blue = if temp <= 19.0 {
            0.0
        } else {
            138.517_731_223_1 * (temp - 10.0).ln() - 305.044_792_730_7
        };
        (255.0, green, blue)
    } else {
        let red = 329.698_727_446 * (temp - 60.0).powf(-0.133_204_759_2);
        let green = 288.122_169_528_3 * (temp - 60.0).powf(-0.075_514_849_2);
        (red, green, 255.0)
    };

    format!("{:02X}{:02X}{:02X}", clamp(red), clamp(green), clamp(blue))
}

fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    };
    format!(
        "{:02X}{:02X}{:02X}",
        clamp(r * 255.0),
        clamp(g * 255.0),
        clamp(b * 255.0)
    )
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn clamp(channel: f64) -> u8 {
    channel.round().clamp(0.0, 255.0) as u8
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
