//! Device catalog types.
//!
//! Devices, their attributes, the color name table and status rendering.

pub mod colors;
pub mod status;
mod types;

pub use colors::ColorTable;
pub use types::{
    attributes_from_response, value_text, Attributes, Device, DeviceKind, SCENE_ACTIVATOR,
};
