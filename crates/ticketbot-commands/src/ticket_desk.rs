//! Ticket desk: the component delegate behind the `ticket:` buttons.
//!
//! Each user has at most one open ticket. Tickets live in memory only.

use crate::framework::{CommandError, ComponentDelegate};
use crate::interaction::{Interaction, InteractionEvent};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use ticketbot_common::{
    format_timestamp, ChannelId, ClientHandle, MessageButton, OutgoingMessage, Result, UserId,
};
use tracing::info;

/// Component id prefix owned by the desk.
pub const TICKET_PREFIX: &str = "ticket:";
/// Button that opens a ticket.
pub const OPEN_ID: &str = "ticket:open";
/// Button that closes the caller's ticket.
pub const CLOSE_ID: &str = "ticket:close";

/// An open support ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    /// Sequential ticket number, starting at 1.
    pub number: u64,
    /// User who opened it.
    pub owner: UserId,
    /// When it was opened.
    pub opened_at: DateTime<Utc>,
}

/// In-memory ticket bookkeeping.
#[derive(Debug)]
pub struct TicketDesk {
    open: DashMap<UserId, Ticket>,
    next_number: AtomicU64,
    panel_channel: Option<ChannelId>,
}

impl TicketDesk {
    /// Creates a desk. `panel_channel` receives the panel at startup.
    pub fn new(panel_channel: Option<ChannelId>) -> Self {
        Self {
            open: DashMap::new(),
            next_number: AtomicU64::new(1),
            panel_channel,
        }
    }

    /// The public panel with the open button.
    pub fn panel(&self) -> OutgoingMessage {
        OutgoingMessage::public("Need help? Open a support ticket and a moderator will get back to you.")
            .with_button(MessageButton::new(OPEN_ID, "Open ticket"))
    }

    /// Opens a ticket for `owner`, or returns the one already open.
    pub fn open_ticket(&self, owner: UserId) -> std::result::Result<Ticket, Ticket> {
        match self.open.entry(owner) {
            Entry::Occupied(existing) => Err(existing.get().clone()),
            Entry::Vacant(slot) => {
                let ticket = Ticket {
                    number: self.next_number.fetch_add(1, Ordering::Relaxed),
                    owner,
                    opened_at: Utc::now(),
                };
                slot.insert(ticket.clone());
                Ok(ticket)
            }
        }
    }

    /// Closes the ticket of `owner`, if any.
    pub fn close_ticket(&self, owner: UserId) -> Option<Ticket> {
        self.open.remove(&owner).map(|(_, ticket)| ticket)
    }

    /// Number of open tickets.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Startup work: posts the panel when a panel channel is configured.
    pub async fn initialize(&self, client: &ClientHandle) -> Result<()> {
        let Some(channel) = self.panel_channel else {
            info!("Ticket desk ready (no panel channel configured)");
            return Ok(());
        };

        client.send_message(channel, self.panel()).await?;
        info!("Ticket desk ready, panel posted to channel {}", channel);
        Ok(())
    }
}

#[async_trait]
impl ComponentDelegate for TicketDesk {
    fn prefix(&self) -> &str {
        TICKET_PREFIX
    }

    async fn handle(&self, interaction: &Interaction, _client: &ClientHandle) -> std::result::Result<(), CommandError> {
        let InteractionEvent::ComponentInteraction { custom_id, caller_id } = interaction.event() else {
            return Ok(());
        };

        let reply = match custom_id.as_str() {
            OPEN_ID => match self.open_ticket(*caller_id) {
                Ok(ticket) => {
                    info!(ticket = ticket.number, owner = %caller_id, "Ticket opened");
                    OutgoingMessage::ephemeral(format!(
                        "Ticket #{} opened at {}. A moderator will be with you shortly.",
                        ticket.number,
                        format_timestamp(ticket.opened_at)
                    ))
                    .with_button(MessageButton::new(CLOSE_ID, "Close ticket"))
                }
                Err(existing) => OutgoingMessage::ephemeral(format!(
                    "You already have an open ticket (#{}).",
                    existing.number
                )),
            },
            CLOSE_ID => match self.close_ticket(*caller_id) {
                Some(ticket) => {
                    info!(ticket = ticket.number, owner = %caller_id, "Ticket closed");
                    OutgoingMessage::ephemeral(format!("Ticket #{} closed.", ticket.number))
                }
                None => OutgoingMessage::ephemeral("You have no open ticket."),
            },
            _ => OutgoingMessage::ephemeral("This ticket action is no longer available."),
        };

        interaction.reply(reply).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketbot_common::test_utils::StubGateway;

    #[test]
    fn test_one_open_ticket_per_user() {
        let desk = TicketDesk::new(None);
        let first = desk.open_ticket(UserId(1)).unwrap();
        assert_eq!(first.number, 1);

        let again = desk.open_ticket(UserId(1)).unwrap_err();
        assert_eq!(again, first);

        let other = desk.open_ticket(UserId(2)).unwrap();
        assert_eq!(other.number, 2);
        assert_eq!(desk.open_count(), 2);
    }

    #[test]
    fn test_close_ticket() {
        let desk = TicketDesk::new(None);
        assert!(desk.close_ticket(UserId(1)).is_none());
        desk.open_ticket(UserId(1)).unwrap();
        assert_eq!(desk.close_ticket(UserId(1)).map(|t| t.number), Some(1));
        assert_eq!(desk.open_count(), 0);
    }

    #[test]
    fn test_panel_carries_open_button() {
        let panel = TicketDesk::new(None).panel();
        assert!(!panel.ephemeral);
        assert_eq!(panel.buttons[0].custom_id, OPEN_ID);
        assert!(panel.buttons[0].custom_id.starts_with(TICKET_PREFIX));
    }

    #[tokio::test]
    async fn test_initialize_posts_panel_when_configured() {
        let gateway = StubGateway::ready();
        let client: ClientHandle = gateway.clone();

        TicketDesk::new(None).initialize(&client).await.unwrap();
        assert!(gateway.posts().is_empty());

        TicketDesk::new(Some(ChannelId(9))).initialize(&client).await.unwrap();
        let posts = gateway.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, ChannelId(9));
    }

    #[tokio::test]
    async fn test_initialize_reports_gateway_failure() {
        let client: ClientHandle = StubGateway::failing();
        assert!(TicketDesk::new(Some(ChannelId(9))).initialize(&client).await.is_err());
    }
}
