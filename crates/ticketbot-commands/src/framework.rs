//! Handler traits and assembly of the built-in command set.

use crate::interaction::Interaction;
use crate::registry::{CommandDescriptor, CommandRegistry, RegistryError};
use crate::ticket_desk::TicketDesk;
use async_trait::async_trait;
use std::sync::Arc;
use ticketbot_common::ClientHandle;

/// Application error type for commands.
pub type CommandError = Box<dyn std::error::Error + Send + Sync>;

/// The execute contract of a slash command.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Runs the command for one interaction.
    async fn execute(&self, interaction: &Interaction, client: &ClientHandle) -> Result<(), CommandError>;
}

/// A subsystem that owns every component id under one prefix.
#[async_trait]
pub trait ComponentDelegate: Send + Sync {
    /// Namespace prefix, e.g. `ticket:`.
    fn prefix(&self) -> &str;

    /// Handles a component interaction whose id starts with [`prefix`](Self::prefix).
    async fn handle(&self, interaction: &Interaction, client: &ClientHandle) -> Result<(), CommandError>;
}

/// Builds the registry of built-in commands.
pub fn builtin_commands(desk: Arc<TicketDesk>) -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new();
    registry.register(CommandDescriptor::new(
        "ping",
        "Check that the bot is alive",
        Arc::new(crate::ping::PingCommand),
    ))?;
    registry.register(
        CommandDescriptor::new(
            "ticket",
            "Post the support ticket panel",
            Arc::new(crate::ticket::TicketCommand::new(desk)),
        )
        .with_cooldown_secs(10),
    )?;
    Ok(registry)
}
