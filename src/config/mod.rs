//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Top-level config struct and loading (Config, ClientConfig)
//! - [`server`]: Per-server connection settings (ServerSettings, TlsMode)
//! - [`defaults`]: Serde default value functions
//! - [`validation`]: Startup validation

mod defaults;
mod server;
mod types;
pub mod validation;

pub use server::{AddressFamily, ServerSettings, TlsMode};
pub use types::{ClientConfig, Config, ConfigError};
pub use validation::{ValidationError, validate, validate_server};
