//! Configuration loading from the process environment.

use crate::schema::{Config, CLIENT_ID_VAR, REQUIRED_VARS, TOKEN_VAR};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use ticketbot_common::logging::{LogFormat, LoggingConfig};
use ticketbot_common::{ChannelId, GuildId, Result, TicketBotError};
use tracing::debug;

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads configuration values through a lookup function.
///
/// [`ConfigLoader::from_env`] reads the real environment; tests pass a map.
pub struct ConfigLoader {
    lookup: Lookup,
}

impl ConfigLoader {
    /// Creates a loader backed by an arbitrary lookup.
    pub fn new(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Creates a loader backed by the process environment.
    pub fn from_env() -> Self {
        Self::new(|key| std::env::var(key).ok())
    }

    /// Looks up a variable, treating empty and whitespace-only values as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.parse::<T>().map_err(|e| TicketBotError::InvalidConfig {
                    variable: key.to_string(),
                    reason: format!("`{raw}`: {e}"),
                })
            })
            .transpose()
    }

    fn millis(&self, key: &str, default: Duration) -> Result<Duration> {
        Ok(self.parse::<u64>(key)?.map_or(default, Duration::from_millis))
    }

    fn seconds(&self, key: &str, default: Duration) -> Result<Duration> {
        match self.parse::<u64>(key)? {
            Some(0) => Err(TicketBotError::InvalidConfig {
                variable: key.to_string(),
                reason: "must be at least 1".to_string(),
            }),
            Some(secs) => Ok(Duration::from_secs(secs)),
            None => Ok(default),
        }
    }

    /// Logging settings only, never failing.
    ///
    /// Used to bring up logging before anything else; malformed values fall
    /// back to [`LoggingConfig::default()`] field by field.
    pub fn logging(&self) -> LoggingConfig {
        let defaults = LoggingConfig::default();
        LoggingConfig {
            level: self.get("LOG_LEVEL").unwrap_or(defaults.level),
            format: self.parse::<LogFormat>("LOG_FORMAT").ok().flatten().unwrap_or(defaults.format),
            directory: self.get("LOG_DIR").map(PathBuf::from),
            file_prefix: defaults.file_prefix,
        }
    }

    /// Required variables that are unset or blank, in reporting order.
    pub fn missing_required(&self) -> Vec<String> {
        REQUIRED_VARS
            .iter()
            .filter(|name| self.get(name).is_none())
            .map(|name| (*name).to_string())
            .collect()
    }

    /// Loads the full configuration.
    ///
    /// Required credentials are not checked here; see
    /// [`ConfigValidator`](crate::ConfigValidator).
    pub fn load(&self) -> Result<Config> {
        let mut config = Config::default();

        config.discord.token = self.get(TOKEN_VAR);
        config.discord.client_id = self.get(CLIENT_ID_VAR);
        config.discord.guild_id = self.parse::<u64>("GUILD_ID")?.map(GuildId);
        config.discord.welcome_channel_id = self.parse::<u64>("WELCOME_CHANNEL_ID")?.map(ChannelId);
        config.discord.ticket_channel_id = self.parse::<u64>("TICKET_CHANNEL_ID")?.map(ChannelId);

        config.logging = LoggingConfig {
            format: self.parse::<LogFormat>("LOG_FORMAT")?.unwrap_or_default(),
            ..self.logging()
        };

        config.lifecycle.shutdown_grace =
            self.millis("SHUTDOWN_GRACE_MS", config.lifecycle.shutdown_grace)?;
        config.lifecycle.fault_flush_delay =
            self.millis("FAULT_FLUSH_MS", config.lifecycle.fault_flush_delay)?;
        config.lifecycle.connect_timeout =
            self.seconds("CONNECT_TIMEOUT_SECS", config.lifecycle.connect_timeout)?;
        config.rate_limiting.sweep_interval =
            self.seconds("COOLDOWN_SWEEP_SECS", config.rate_limiting.sweep_interval)?;

        debug!(
            guild_scoped = config.discord.guild_id.is_some(),
            welcome = config.discord.welcome_channel_id.is_some(),
            ticket_panel = config.discord.ticket_channel_id.is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLoader").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn loader(vars: &[(&str, &str)]) -> ConfigLoader {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ConfigLoader::new(move |key| map.get(key).cloned())
    }

    #[test]
    fn test_empty_environment_loads_defaults() {
        let config = loader(&[]).load().unwrap();
        assert_eq!(config, Config::default());
        assert!(config.discord.token.is_none());
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = loader(&[(TOKEN_VAR, "   "), (CLIENT_ID_VAR, "")]).load().unwrap();
        assert!(config.discord.token.is_none());
        assert!(config.discord.client_id.is_none());
    }

    #[test]
    fn test_optional_values_are_parsed() {
        let config = loader(&[
            (TOKEN_VAR, "abc.def.ghi"),
            (CLIENT_ID_VAR, "1234"),
            ("GUILD_ID", "42"),
            ("TICKET_CHANNEL_ID", "77"),
            ("SHUTDOWN_GRACE_MS", "250"),
            ("COOLDOWN_SWEEP_SECS", "5"),
            ("LOG_FORMAT", "compact"),
        ])
        .load()
        .unwrap();

        assert_eq!(config.discord.token.as_deref(), Some("abc.def.ghi"));
        assert_eq!(config.discord.guild_id, Some(GuildId(42)));
        assert_eq!(config.discord.ticket_channel_id, Some(ChannelId(77)));
        assert_eq!(config.lifecycle.shutdown_grace, Duration::from_millis(250));
        assert_eq!(config.rate_limiting.sweep_interval, Duration::from_secs(5));
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_malformed_optional_value_is_rejected() {
        let err = loader(&[("GUILD_ID", "not-a-number")]).load().unwrap_err();
        assert!(err.to_string().contains("GUILD_ID"));

        let err = loader(&[("COOLDOWN_SWEEP_SECS", "0")]).load().unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_missing_required_ignores_optional_values() {
        let missing = loader(&[("GUILD_ID", "abc"), (CLIENT_ID_VAR, " ")]).missing_required();
        assert_eq!(missing, vec![TOKEN_VAR, CLIENT_ID_VAR]);
        assert!(loader(&[(TOKEN_VAR, "t"), (CLIENT_ID_VAR, "1")]).missing_required().is_empty());
    }

    #[test]
    fn test_logging_settings_never_fail() {
        let logging = loader(&[("LOG_FORMAT", "fancy"), ("LOG_LEVEL", "debug")]).logging();
        assert_eq!(logging.format, LogFormat::Pretty);
        assert_eq!(logging.level, "debug");
    }
}
