//! Command catalogs.
//!
//! Each catalog is a static table describing every supported command
//! keyword: the capability a device needs for it, the Maker API command it
//! sends, the attribute that proves it took effect, and its arguments.
//!
//! Two catalogs exist. [`RESOLUTION_CATALOG`] drives interactive suggestions
//! and [`EXECUTION_CATALOG`] drives dispatch. They differ in a few entries
//! (capability tags for thermostats, the `view` keyword, the wire command
//! behind `toggle`, and the attribute `color` is verified against), so the
//! verification attribute is always read from the catalog being used.

use std::collections::BTreeSet;

use super::arguments::ArgumentSpec;

/// Capability sentinel for commands every device offers.
pub const GLOBAL: &str = "global";

/// Definition of a command keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandDef {
    /// Word the user types (`on`, `dim`, `color`, ...).
    pub keyword: &'static str,
    /// Capability tag a device needs, or [`GLOBAL`].
    pub capability: &'static str,
    /// Command name sent to the Maker API. Empty for display-only commands.
    pub wire_command: &'static str,
    /// Attribute whose value must match the intended effect after sending.
    pub verify_attribute: &'static str,
    /// Arguments, materialized from the trailing parameters at dispatch.
    pub arguments: &'static [ArgumentSpec],
    /// Short description shown in suggestions.
    pub description: &'static str,
}

impl CommandDef {
    /// Returns true if this command needs parameters from the user.
    pub fn takes_arguments(&self) -> bool {
        !self.arguments.is_empty()
    }
}

/// An ordered, immutable table of command definitions.
#[derive(Debug)]
pub struct Catalog {
    name: &'static str,
    commands: &'static [CommandDef],
}

impl Catalog {
    /// Returns the catalog name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Looks up a command by keyword.
    pub fn get(&self, keyword: &str) -> Option<&'static CommandDef> {
        self.commands.iter().find(|c| c.keyword == keyword)
    }

    /// Returns true if the keyword is in this catalog.
    pub fn contains(&self, keyword: &str) -> bool {
        self.get(keyword).is_some()
    }

    /// All commands in catalog order.
    pub fn commands(&self) -> &'static [CommandDef] {
        self.commands
    }

    /// Commands gated by the given capability, in catalog order.
    pub fn for_capability<'a>(
        &'a self,
        capability: &'a str,
    ) -> impl Iterator<Item = &'static CommandDef> + 'a {
        self.commands
            .iter()
            .filter(move |c| c.capability == capability)
    }

    /// Every capability tag referenced by the catalog, [`GLOBAL`] included.
    pub fn capabilities(&self) -> BTreeSet<&'static str> {
        self.commands.iter().map(|c| c.capability).collect()
    }
}

const fn command(
    keyword: &'static str,
    capability: &'static str,
    wire_command: &'static str,
    verify_attribute: &'static str,
    description: &'static str,
) -> CommandDef {
    CommandDef {
        keyword,
        capability,
        wire_command,
        verify_attribute,
        arguments: &[],
        description,
    }
}

const fn command_with_args(
    keyword: &'static str,
    capability: &'static str,
    wire_command: &'static str,
    verify_attribute: &'static str,
    arguments: &'static [ArgumentSpec],
    description: &'static str,
) -> CommandDef {
    CommandDef {
        keyword,
        capability,
        wire_command,
        verify_attribute,
        arguments,
        description,
    }
}

const LEVEL_ARG: &[ArgumentSpec] = &[ArgumentSpec::Integer(0)];
const TEXT_ARG: &[ArgumentSpec] = &[ArgumentSpec::Text(0)];
const COLOR_ARG: &[ArgumentSpec] = &[ArgumentSpec::Map(&[("hex", ArgumentSpec::ColorLookup(0))])];

/// Catalog used while resolving and suggesting commands.
///
/// Its verify attributes are advisory; dispatch verifies against
/// [`EXECUTION_CATALOG`] unless a caller opts into this catalog.
pub static RESOLUTION_CATALOG: Catalog = Catalog {
    name: "resolution",
    commands: &[
        command("status", GLOBAL, "", "", "Show device status"),
        command("on", "Switch", "on", "switch", "Turn on"),
        command("off", "Switch", "off", "switch", "Turn off"),
        command("toggle", "Switch", "off", "switch", "Toggle on/off"),
        command_with_args("dim", "SwitchLevel", "setLevel", "level", LEVEL_ARG, "Set level"),
        command_with_args(
            "slevel",
            "WindowShadeLevel",
            "setShadeLevel",
            "shadeLevel",
            LEVEL_ARG,
            "Set shade level",
        ),
        command("open", "WindowShade", "open", "windowShade", "Open shade"),
        command("close", "WindowShade", "close", "windowShade", "Close shade"),
        command("lock", "Lock", "lock", "lock", "Lock"),
        command("unlock", "Lock", "unlock", "lock", "Unlock"),
        command("togglock", "Lock", "unlock", "lock", "Toggle lock"),
        command("view", "ContactSensor", "view", "contact", "View contact state"),
        command_with_args("color", "ColorControl", "setColor", "color", COLOR_ARG, "Set color"),
        command_with_args(
            "mode",
            "Thermostat",
            "setThermostatMode",
            "thermostatMode",
            TEXT_ARG,
            "Set thermostat mode",
        ),
        command_with_args(
            "heat",
            "Thermostat",
            "setHeatingSetpoint",
            "thermostatHeatingSetpoint",
            LEVEL_ARG,
            "Set heating setpoint",
        ),
        command_with_args(
            "cool",
            "Thermostat",
            "setCoolingSetpoint",
            "thermostatCoolingSetpoint",
            LEVEL_ARG,
            "Set cooling setpoint",
        ),
    ],
};

/// Catalog used when dispatching a command to the hub.
pub static EXECUTION_CATALOG: Catalog = Catalog {
    name: "execution",
    commands: &[
        command("status", GLOBAL, "", "", "Show device status"),
        command("on", "Switch", "on", "switch", "Turn on"),
        command("toggle", "Switch", "on", "switch", "Toggle on/off"),
        command("off", "Switch", "off", "switch", "Turn off"),
        command_with_args("dim", "SwitchLevel", "setLevel", "level", LEVEL_ARG, "Set level"),
        command_with_args(
            "slevel",
            "WindowShadeLevel",
            "setShadeLevel",
            "shadeLevel",
            LEVEL_ARG,
            "Set shade level",
        ),
        command("open", "WindowShade", "open", "windowShade", "Open shade"),
        command("close", "WindowShade", "close", "windowShade", "Close shade"),
        command("lock", "Lock", "lock", "lock", "Lock"),
        command("unlock", "Lock", "unlock", "lock", "Unlock"),
        command("togglock", "Lock", "unlock", "lock", "Toggle lock"),
        command_with_args(
            "color",
            "ColorControl",
            "setColor",
            "colorTemperature",
            COLOR_ARG,
            "Set color",
        ),
        command_with_args(
            "mode",
            "ThermostatMode",
            "setThermostatMode",
            "thermostatMode",
            TEXT_ARG,
            "Set thermostat mode",
        ),
        command_with_args(
            "heat",
            "ThermostatHeatingSetpoint",
            "setHeatingSetpoint",
            "thermostatHeatingSetpoint",
            LEVEL_ARG,
            "Set heating setpoint",
        ),
        command_with_args(
            "cool",
            "ThermostatCoolingSetpoint",
            "setCoolingSetpoint",
            "thermostatCoolingSetpoint",
            LEVEL_ARG,
            "Set cooling setpoint",
        ),
    ],
};
