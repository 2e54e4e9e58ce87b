//! Core configuration types and loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use kaa_proto::{Endpoint, Security};
use serde::Deserialize;
use thiserror::Error;

use super::defaults::{
    default_hook_timeout, default_idle_timeout, default_join_on, default_log_level, default_port,
    default_realname, default_registration_grace_ms,
};
use super::validation::{ValidationError, validate};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server to connect to.
    pub server: ServerConfig,
    /// Who the bot is on the network.
    pub identity: IdentityConfig,
    /// Registration and dispatch behavior.
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging.
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }
}

impl std::str::FromStr for Config {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(content)?;
        validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

/// Server connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host name or address.
    pub host: String,
    /// Port (default: 6667).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Wrap the connection in TLS.
    #[serde(default)]
    pub tls: bool,
    /// Seconds without inbound traffic before the connection is dropped
    /// (default: 300, 0 disables).
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: u64,
}

impl ServerConfig {
    /// The transport endpoint described by this section.
    pub fn endpoint(&self) -> Endpoint {
        let security = if self.tls {
            Security::Tls
        } else {
            Security::Plain
        };
        let idle_timeout = (self.idle_timeout > 0).then(|| Duration::from_secs(self.idle_timeout));
        Endpoint::new(self.host.clone(), self.port, security).with_idle_timeout(idle_timeout)
    }
}

/// Nick, user name and real name sent during registration.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    pub nick: String,
    /// User name (default: the nick).
    pub user: Option<String>,
    #[serde(default = "default_realname")]
    pub realname: String,
}

impl IdentityConfig {
    /// The configured user name, falling back to the nick.
    pub fn user(&self) -> &str {
        self.user.as_deref().unwrap_or(&self.nick)
    }
}

/// Session behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Channels joined once registration completes, in order.
    #[serde(default)]
    pub channels: Vec<String>,
    /// Default per-hook deadline in seconds (default: 5).
    #[serde(default = "default_hook_timeout")]
    pub hook_timeout: u64,
    /// Milliseconds between NICK and USER (default: 1000).
    #[serde(default = "default_registration_grace_ms")]
    pub registration_grace_ms: u64,
    /// Commands that mark registration as complete (default: 001, 376).
    #[serde(default = "default_join_on")]
    pub join_on: Vec<String>,
    /// Seconds to wait before reconnecting. Unset means exit on disconnect.
    pub reconnect_delay: Option<u64>,
}

impl SessionConfig {
    pub fn hook_timeout(&self) -> Duration {
        Duration::from_secs(self.hook_timeout)
    }

    pub fn registration_grace(&self) -> Duration {
        Duration::from_millis(self.registration_grace_ms)
    }

    pub fn reconnect_delay(&self) -> Option<Duration> {
        self.reconnect_delay.map(Duration::from_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            channels: Vec::new(),
            hook_timeout: default_hook_timeout(),
            registration_grace_ms: default_registration_grace_ms(),
            join_on: default_join_on(),
            reconnect_delay: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive (default: "info"). `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for `kaa.log`. Logs go to stderr when unset.
    pub dir: Option<PathBuf>,
    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = r#"
[server]
host = "irc.example.net"

[identity]
nick = "kaa"
"#
        .parse()
        .unwrap();

        assert_eq!(config.server.port, 6667);
        assert!(!config.server.tls);
        assert_eq!(config.identity.user(), "kaa");
        assert_eq!(config.identity.realname, "kaa");
        assert!(config.session.channels.is_empty());
        assert_eq!(config.session.hook_timeout(), Duration::from_secs(5));
        assert_eq!(config.session.registration_grace(), Duration::from_millis(1000));
        assert_eq!(config.session.join_on, ["001", "376"]);
        assert_eq!(config.session.reconnect_delay(), None);
        assert_eq!(config.log.level, "info");
        assert!(config.log.dir.is_none());

        let endpoint = config.server.endpoint();
        assert_eq!(endpoint.security, Security::Plain);
        assert_eq!(endpoint.idle_timeout, Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_full_config() {
        let config: Config = r##"
[server]
host = "irc.libera.chat"
port = 6697
tls = true
idle_timeout = 0

[identity]
nick = "kaa"
user = "kaabot"
realname = "Kaa IRC bot"

[session]
channels = ["#kaa", "&local"]
hook_timeout = 2
registration_grace_ms = 0
join_on = ["376"]
reconnect_delay = 30

[log]
level = "kaa=debug"
dir = "logs"
json = true
"##
        .parse()
        .unwrap();

        assert_eq!(config.identity.user(), "kaabot");
        assert_eq!(config.session.channels, ["#kaa", "&local"]);
        assert_eq!(config.session.reconnect_delay(), Some(Duration::from_secs(30)));
        assert_eq!(config.log.dir.as_deref(), Some(Path::new("logs")));
        assert!(config.log.json);

        let endpoint = config.server.endpoint();
        assert_eq!(endpoint.address(), "irc.libera.chat:6697");
        assert_eq!(endpoint.security, Security::Tls);
        assert_eq!(endpoint.idle_timeout, None);
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let result: Result<Config, _> = "[server]\nhost = \"irc.example.net\"\n".parse();
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_config_reports_every_error() {
        let result: Result<Config, _> = r#"
[server]
host = ""
port = 0

[identity]
nick = "kaa"
"#
        .parse();

        match result {
            Err(ConfigError::Invalid(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/kaa.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
