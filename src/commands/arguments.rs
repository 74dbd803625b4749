//! Command argument specs and their materialization.
//!
//! Catalog entries describe their arguments as data. Concrete values are
//! produced only at dispatch time, once the trailing parameters and the
//! color table are final.

use serde_json::{Map, Value};

use crate::devices::ColorTable;
use crate::error::{HubError, Result};

/// How to produce one command argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentSpec {
    /// A fixed value.
    Literal(&'static str),
    /// The parameter at this index, parsed as an integer.
    Integer(usize),
    /// The parameter at this index, verbatim.
    Text(usize),
    /// The parameter at this index, resolved to a hex code via the color table.
    ColorLookup(usize),
    /// A JSON object whose values are themselves specs.
    Map(&'static [(&'static str, ArgumentSpec)]),
}

/// Resolves argument specs against the final parameters, in order.
pub fn materialize(
    specs: &[ArgumentSpec],
    params: &[String],
    colors: &ColorTable,
) -> Result<Vec<Value>> {
    specs
        .iter()
        .map(|spec| materialize_one(spec, params, colors))
        .collect()
}

fn materialize_one(spec: &ArgumentSpec, params: &[String], colors: &ColorTable) -> Result<Value> {
    match spec {
        ArgumentSpec::Literal(value) => Ok(Value::String(value.to_string())),
        ArgumentSpec::Integer(index) => {
            let raw = param(params, *index)?;
            raw.trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| HubError::invalid_parameter(format!("'{raw}' is not a number")))
        }
        ArgumentSpec::Text(index) => Ok(Value::String(param(params, *index)?.to_string())),
        ArgumentSpec::ColorLookup(index) => {
            Ok(Value::String(colors.resolve(param(params, *index)?)))
        }
        ArgumentSpec::Map(entries) => {
            let mut object = Map::new();
            for (key, inner) in entries.iter() {
                object.insert(key.to_string(), materialize_one(inner, params, colors)?);
            }
            Ok(Value::Object(object))
        }
    }
}

fn param(params: &[String], index: usize) -> Result<&str> {
    params
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| HubError::invalid_parameter(format!("missing parameter {}", index + 1)))
}
