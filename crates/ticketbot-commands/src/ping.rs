//! Ping command.

use crate::framework::{CommandError, CommandHandler};
use crate::interaction::Interaction;
use async_trait::async_trait;
use ticketbot_common::{ClientHandle, OutgoingMessage};

/// Replies with a pong and the gateway state.
pub struct PingCommand;

#[async_trait]
impl CommandHandler for PingCommand {
    async fn execute(&self, interaction: &Interaction, client: &ClientHandle) -> Result<(), CommandError> {
        let state = if client.is_ready() { "connected" } else { "reconnecting" };
        interaction
            .reply(OutgoingMessage::ephemeral(format!("Pong! Gateway {state}.")))
            .await?;
        Ok(())
    }
}
