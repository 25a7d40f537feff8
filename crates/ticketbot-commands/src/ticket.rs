//! Ticket panel command.

use crate::framework::{CommandError, CommandHandler};
use crate::interaction::Interaction;
use crate::ticket_desk::TicketDesk;
use async_trait::async_trait;
use std::sync::Arc;
use ticketbot_common::ClientHandle;

/// Posts the ticket panel in the current channel.
pub struct TicketCommand {
    desk: Arc<TicketDesk>,
}

impl TicketCommand {
    /// Creates the command for `desk`.
    pub const fn new(desk: Arc<TicketDesk>) -> Self {
        Self { desk }
    }
}

#[async_trait]
impl CommandHandler for TicketCommand {
    async fn execute(&self, interaction: &Interaction, _client: &ClientHandle) -> Result<(), CommandError> {
        interaction.reply(self.desk.panel()).await?;
        Ok(())
    }
}
