//! Command registry for managing bot commands.

use crate::framework::CommandHandler;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use ticketbot_common::CommandMetadata;
use tracing::debug;

/// Cooldown applied when a command does not specify one.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(3);

const MAX_NAME_LEN: usize = 32;

/// Errors raised while building the registry.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// A command with this name is already registered.
    #[error("Command '{0}' is already registered")]
    Duplicate(String),
    /// The cooldown must be at least one second.
    #[error("Command '{0}' has a zero cooldown")]
    ZeroCooldown(String),
    /// Names must be 1-32 lowercase characters without spaces.
    #[error("Invalid command name '{0}'")]
    InvalidName(String),
}

/// A registered slash command.
#[derive(Clone)]
pub struct CommandDescriptor {
    name: String,
    description: String,
    cooldown: Duration,
    handler: Arc<dyn CommandHandler>,
}

impl CommandDescriptor {
    /// Creates a descriptor with the default cooldown.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: Arc<dyn CommandHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            cooldown: DEFAULT_COOLDOWN,
            handler,
        }
    }

    /// Overrides the per-user cooldown.
    #[must_use]
    pub const fn with_cooldown_secs(mut self, seconds: u64) -> Self {
        self.cooldown = Duration::from_secs(seconds);
        self
    }

    /// Command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Command description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Per-user cooldown.
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// The execute contract.
    pub fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }

    /// Registration payload for the gateway.
    pub fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

/// Name-indexed set of commands, filled before the bot goes ready and read-only afterwards.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandDescriptor>,
}

impl CommandRegistry {
    /// Create a new, empty command registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        let name = descriptor.name().to_string();
        let valid_name = !name.is_empty()
            && name.chars().count() <= MAX_NAME_LEN
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !valid_name {
            return Err(RegistryError::InvalidName(name));
        }
        if descriptor.cooldown().is_zero() {
            return Err(RegistryError::ZeroCooldown(name));
        }
        if self.commands.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }

        debug!("Registered command '{}' (cooldown {:?})", name, descriptor.cooldown());
        self.commands.insert(name, descriptor);
        Ok(())
    }

    /// Looks a command up by name.
    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name)
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no command is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registration payloads, sorted by name.
    pub fn metadata(&self) -> Vec<CommandMetadata> {
        let mut metadata: Vec<_> = self.commands.values().map(CommandDescriptor::metadata).collect();
        metadata.sort_by(|a, b| a.name.cmp(&b.name));
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::CommandError;
    use crate::interaction::Interaction;
    use async_trait::async_trait;
    use ticketbot_common::ClientHandle;

    struct Noop;

    #[async_trait]
    impl CommandHandler for Noop {
        async fn execute(&self, _: &Interaction, _: &ClientHandle) -> Result<(), CommandError> {
            Ok(())
        }
    }

    fn descriptor(name: &str) -> CommandDescriptor {
        CommandDescriptor::new(name, "test", Arc::new(Noop))
    }

    #[test]
    fn test_default_cooldown_is_three_seconds() {
        assert_eq!(descriptor("ping").cooldown(), Duration::from_secs(3));
        assert_eq!(
            descriptor("ping").with_cooldown_secs(7).cooldown(),
            Duration::from_secs(7)
        );
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register(descriptor("ping")).unwrap();
        assert_eq!(
            registry.register(descriptor("ping")),
            Err(RegistryError::Duplicate("ping".to_string()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_zero_cooldown_is_rejected() {
        let mut registry = CommandRegistry::new();
        assert_eq!(
            registry.register(descriptor("ping").with_cooldown_secs(0)),
            Err(RegistryError::ZeroCooldown("ping".to_string()))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let mut registry = CommandRegistry::new();
        let too_long = "x".repeat(33);
        for name in ["", "Ping", "two words", too_long.as_str()] {
            assert!(matches!(
                registry.register(descriptor(name)),
                Err(RegistryError::InvalidName(_))
            ));
        }
    }

    #[test]
    fn test_metadata_is_sorted() {
        let mut registry = CommandRegistry::new();
        registry.register(descriptor("ticket")).unwrap();
        registry.register(descriptor("ping")).unwrap();
        let names: Vec<_> = registry.metadata().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["ping", "ticket"]);
    }
}
