//! Interaction routing: classify, throttle, dispatch.

use crate::containment::contain;
use crate::cooldown::{CooldownOutcome, CooldownRegistry};
use crate::framework::ComponentDelegate;
use crate::interaction::{Interaction, InteractionEvent};
use crate::registry::CommandRegistry;
use std::sync::Arc;
use std::time::Duration;
use ticketbot_common::{format_seconds, ClientHandle, OutgoingMessage, UserId};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// What happened to a routed interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The command ran to completion.
    Executed,
    /// The caller is cooling down; the handler was not invoked.
    Throttled {
        /// Time until the caller may retry.
        remaining: Duration,
    },
    /// No command with that name is registered.
    UnknownCommand,
    /// A delegate handled the component interaction.
    Delegated,
    /// No delegate owns the component id.
    Ignored,
    /// The handler or delegate failed; the caller was notified.
    Failed,
}

/// Dispatches interactions to commands and component delegates.
pub struct InteractionRouter {
    commands: Arc<CommandRegistry>,
    cooldowns: Arc<CooldownRegistry>,
    delegates: Vec<Arc<dyn ComponentDelegate>>,
    client: ClientHandle,
}

impl InteractionRouter {
    /// Creates a router without component delegates.
    pub fn new(
        commands: Arc<CommandRegistry>,
        cooldowns: Arc<CooldownRegistry>,
        client: ClientHandle,
    ) -> Self {
        Self {
            commands,
            cooldowns,
            delegates: Vec::new(),
            client,
        }
    }

    /// Adds a delegate for its component id prefix.
    #[must_use]
    pub fn with_delegate(mut self, delegate: Arc<dyn ComponentDelegate>) -> Self {
        self.delegates.push(delegate);
        self
    }

    /// The commands this router dispatches to.
    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Routes one interaction to exactly one handler, or drops it.
    pub async fn route(&self, interaction: Interaction) -> RouteOutcome {
        match interaction.event() {
            InteractionEvent::ChatInputCommand {
                command_name,
                caller_id,
                caller_tag,
            } => {
                self.route_command(&interaction, command_name, *caller_id, caller_tag)
                    .await
            }
            InteractionEvent::ComponentInteraction { custom_id, .. } => {
                self.route_component(&interaction, custom_id).await
            }
        }
    }

    async fn route_command(
        &self,
        interaction: &Interaction,
        name: &str,
        caller_id: UserId,
        caller_tag: &str,
    ) -> RouteOutcome {
        let Some(command) = self.commands.get(name) else {
            warn!("No command matching '{}' was found", name);
            return RouteOutcome::UnknownCommand;
        };

        let outcome =
            self.cooldowns
                .check_and_record(name, caller_id, command.cooldown(), Instant::now());
        if let CooldownOutcome::Throttled { remaining } = outcome {
            debug!(command = name, caller = %caller_id, "Throttled for {:?}", remaining);
            let notice = OutgoingMessage::ephemeral(format!(
                "Please wait {} more second(s) before reusing the `{}` command.",
                format_seconds(remaining),
                name
            ));
            if let Err(e) = interaction.reply(notice).await {
                warn!(command = name, caller = %caller_id, "Could not send cooldown notice: {}", e);
            }
            return RouteOutcome::Throttled { remaining };
        }

        let work = command.handler().execute(interaction, &self.client);
        match contain(interaction, work).await {
            Ok(()) => {
                info!(
                    target: "audit",
                    command = name,
                    caller = caller_tag,
                    caller_id = %caller_id,
                    "{} executed /{}",
                    caller_tag,
                    name
                );
                RouteOutcome::Executed
            }
            Err(_) => RouteOutcome::Failed,
        }
    }

    async fn route_component(&self, interaction: &Interaction, custom_id: &str) -> RouteOutcome {
        let Some(delegate) = self
            .delegates
            .iter()
            .find(|delegate| custom_id.starts_with(delegate.prefix()))
        else {
            debug!("Ignoring component interaction '{}' with no owner", custom_id);
            return RouteOutcome::Ignored;
        };

        match contain(interaction, delegate.handle(interaction, &self.client)).await {
            Ok(()) => RouteOutcome::Delegated,
            Err(_) => RouteOutcome::Failed,
        }
    }
}
