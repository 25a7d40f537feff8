//! Configuration schema definitions.

use std::time::Duration;
use ticketbot_common::logging::LoggingConfig;
use ticketbot_common::{ChannelId, GuildId};

/// Environment variable holding the gateway authentication token.
pub const TOKEN_VAR: &str = "DISCORD_TOKEN";
/// Environment variable holding the application (client) id.
pub const CLIENT_ID_VAR: &str = "CLIENT_ID";
/// Variables without which the bot cannot start, in reporting order.
pub const REQUIRED_VARS: [&str; 2] = [TOKEN_VAR, CLIENT_ID_VAR];

/// Main configuration structure for TicketBot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Discord configuration.
    pub discord: DiscordConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Startup and shutdown timing.
    pub lifecycle: LifecycleConfig,
    /// Rate limiting configuration.
    pub rate_limiting: RateLimitingConfig,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscordConfig {
    /// Discord bot token. Required.
    pub token: Option<String>,
    /// Application id. Required.
    pub client_id: Option<String>,
    /// Register commands to this guild only.
    pub guild_id: Option<GuildId>,
    /// Channel that receives member greetings.
    pub welcome_channel_id: Option<ChannelId>,
    /// Channel that receives the ticket panel at startup.
    pub ticket_channel_id: Option<ChannelId>,
}

/// Startup and shutdown timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// How long in-flight work gets during a graceful shutdown.
    pub shutdown_grace: Duration,
    /// Delay before a fault-triggered shutdown, so the fault gets logged.
    pub fault_flush_delay: Duration,
    /// Upper bound on the connect phase.
    pub connect_timeout: Duration,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitingConfig {
    /// How often expired cooldown entries are pruned.
    pub sweep_interval: Duration,
}

/// Validated credentials needed to connect.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Gateway authentication token.
    pub token: String,
    /// Application id.
    pub client_id: u64,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("client_id", &self.client_id)
            .finish()
    }
}
