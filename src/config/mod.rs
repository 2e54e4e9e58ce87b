//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and loading
//! - [`defaults`]: serde default value functions
//! - [`validation`]: startup checks, collecting every problem at once

mod defaults;
mod types;
mod validation;

pub use types::{Config, ConfigError, IdentityConfig, LogConfig, ServerConfig, SessionConfig};
pub use validation::{ValidationError, validate};
