//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_port() -> u16 {
    6667
}

/// Seconds without inbound traffic before the connection is dropped.
pub fn default_idle_timeout() -> u64 {
    300
}

// =============================================================================
// Identity Defaults
// =============================================================================

pub fn default_realname() -> String {
    "kaa".to_string()
}

// =============================================================================
// Session Defaults
// =============================================================================

pub fn default_hook_timeout() -> u64 {
    5
}

/// Pause between NICK and USER during registration.
pub fn default_registration_grace_ms() -> u64 {
    1000
}

/// RPL_WELCOME and RPL_ENDOFMOTD.
pub fn default_join_on() -> Vec<String> {
    vec!["001".to_string(), "376".to_string()]
}

// =============================================================================
// Log Defaults
// =============================================================================

pub fn default_log_level() -> String {
    "info".to_string()
}
