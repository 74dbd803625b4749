//! hubquick - control Hubitat devices from short free-text phrases.
//!
//! This library exposes the core modules for use in integration tests.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod devices;
pub mod dispatch;
pub mod error;
pub mod hub;
pub mod logging;
pub mod notify;
pub mod persistence;
pub mod resolve;
pub mod suggest;
