//! Device commands.
//!
//! Static command catalogs, deferred argument specs, and the rules for which
//! commands a device offers.

pub mod arguments;
pub mod availability;
pub mod definitions;

pub use arguments::{materialize, ArgumentSpec};
pub use availability::{
    available_commands, has_param_suggestions, resolve_toggle, resolve_toggle_live,
    suggest_params, ParamSuggestion,
};
pub use definitions::{Catalog, CommandDef, EXECUTION_CATALOG, GLOBAL, RESOLUTION_CATALOG};
