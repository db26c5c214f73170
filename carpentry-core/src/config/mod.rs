//! Configuration module for the installer.
//!
//! Manages installer settings stored as JSON.

mod settings;

pub use settings::{Settings, SETTINGS_FILE};
