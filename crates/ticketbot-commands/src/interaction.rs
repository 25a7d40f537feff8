//! Inbound interaction model.

use std::fmt;
use std::sync::Arc;
use ticketbot_common::{InteractionResponder, OutgoingMessage, Result, UserId};

/// A caller-initiated event that needs a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionEvent {
    /// A slash command invocation.
    ChatInputCommand {
        /// Command name without the slash.
        command_name: String,
        /// Invoking user.
        caller_id: UserId,
        /// Display tag of the invoking user, for logs.
        caller_tag: String,
    },
    /// A button click.
    ComponentInteraction {
        /// Namespaced component id, e.g. `ticket:open`.
        custom_id: String,
        /// Clicking user.
        caller_id: UserId,
    },
}

impl InteractionEvent {
    /// The user who triggered the event.
    pub const fn caller_id(&self) -> UserId {
        match self {
            Self::ChatInputCommand { caller_id, .. } | Self::ComponentInteraction { caller_id, .. } => {
                *caller_id
            }
        }
    }

    /// Command name or component id, whichever identifies the target.
    pub fn origin(&self) -> &str {
        match self {
            Self::ChatInputCommand { command_name, .. } => command_name,
            Self::ComponentInteraction { custom_id, .. } => custom_id,
        }
    }
}

impl fmt::Display for InteractionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChatInputCommand { command_name, caller_tag, .. } => {
                write!(f, "/{command_name} from {caller_tag}")
            }
            Self::ComponentInteraction { custom_id, caller_id } => {
                write!(f, "component {custom_id} from {caller_id}")
            }
        }
    }
}

/// An event together with the channel used to answer it.
#[derive(Clone)]
pub struct Interaction {
    event: InteractionEvent,
    responder: Arc<dyn InteractionResponder>,
}

impl Interaction {
    /// Pairs an event with its responder.
    pub fn new(event: InteractionEvent, responder: Arc<dyn InteractionResponder>) -> Self {
        Self { event, responder }
    }

    /// The immutable event.
    pub const fn event(&self) -> &InteractionEvent {
        &self.event
    }

    /// The user who triggered the interaction.
    pub const fn caller_id(&self) -> UserId {
        self.event.caller_id()
    }

    /// Whether an initial response has been sent.
    pub fn is_acknowledged(&self) -> bool {
        self.responder.is_acknowledged()
    }

    /// Sends the initial response.
    pub async fn reply(&self, message: OutgoingMessage) -> Result<()> {
        self.responder.reply(message).await
    }

    /// Sends a follow-up.
    pub async fn follow_up(&self, message: OutgoingMessage) -> Result<()> {
        self.responder.follow_up(message).await
    }

    /// Acknowledges without content.
    pub async fn defer(&self, ephemeral: bool) -> Result<()> {
        self.responder.defer(ephemeral).await
    }
}

impl fmt::Debug for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interaction")
            .field("event", &self.event)
            .field("acknowledged", &self.is_acknowledged())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_and_caller() {
        let command = InteractionEvent::ChatInputCommand {
            command_name: "ping".to_string(),
            caller_id: UserId(1),
            caller_tag: "alice".to_string(),
        };
        assert_eq!(command.origin(), "ping");
        assert_eq!(command.caller_id(), UserId(1));
        assert_eq!(command.to_string(), "/ping from alice");

        let click = InteractionEvent::ComponentInteraction {
            custom_id: "ticket:open".to_string(),
            caller_id: UserId(2),
        };
        assert_eq!(click.origin(), "ticket:open");
        assert_eq!(click.caller_id(), UserId(2));
    }
}
