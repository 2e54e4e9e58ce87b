//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.host is required")]
    MissingHost,
    #[error("server.port must not be 0")]
    InvalidPort,
    #[error("identity.nick is required")]
    MissingNick,
    #[error("identity.{field} must not contain spaces or line breaks, got {value:?}")]
    InvalidIdentity { field: &'static str, value: String },
    #[error("session.hook_timeout must be at least 1 second")]
    ZeroHookTimeout,
    #[error("session.channels entry must start with '#' or '&', got {0:?}")]
    InvalidChannel(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Server
    if config.server.host.trim().is_empty() {
        errors.push(ValidationError::MissingHost);
    }
    if config.server.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }

    // Identity. Both values end up as bare parameters on the wire.
    let identity = &config.identity;
    if identity.nick.is_empty() {
        errors.push(ValidationError::MissingNick);
    } else if !is_bare_param(&identity.nick) {
        errors.push(ValidationError::InvalidIdentity {
            field: "nick",
            value: identity.nick.clone(),
        });
    }
    if let Some(ref user) = identity.user
        && (user.is_empty() || !is_bare_param(user))
    {
        errors.push(ValidationError::InvalidIdentity {
            field: "user",
            value: user.clone(),
        });
    }

    // Session
    if config.session.hook_timeout == 0 {
        errors.push(ValidationError::ZeroHookTimeout);
    }
    for channel in &config.session.channels {
        if !(channel.starts_with('#') || channel.starts_with('&')) || !is_bare_param(channel) {
            errors.push(ValidationError::InvalidChannel(channel.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_bare_param(value: &str) -> bool {
    !value.contains([' ', '\r', '\n']) && !value.starts_with(':')
}
