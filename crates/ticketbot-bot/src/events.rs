//! Gateway event table.
//!
//! Each event kind is mapped to one handler when the bot starts. The pump
//! takes events in arrival order and runs every dispatch on its own task,
//! so a slow handler never holds up the events behind it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use ticketbot_commands::{Interaction, InteractionRouter, RouteOutcome};
use ticketbot_common::{ChannelId, ClientHandle, GuildId, OutgoingMessage, UserId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// An inbound event from the gateway session.
pub enum GatewayEvent {
    /// The session is ready.
    Ready {
        /// Bot account tag.
        user_tag: String,
        /// Guilds visible at startup.
        guild_count: usize,
    },
    /// A user interacted with the bot.
    InteractionCreate(Interaction),
    /// A member joined a guild.
    GuildMemberAdd {
        /// Guild joined.
        guild_id: GuildId,
        /// New member.
        user_id: UserId,
        /// New member's tag.
        user_tag: String,
    },
    /// The client reported an error.
    Error(String),
}

impl GatewayEvent {
    /// Kind used to look up the handler.
    pub const fn kind(&self) -> GatewayEventKind {
        match self {
            Self::Ready { .. } => GatewayEventKind::Ready,
            Self::InteractionCreate(_) => GatewayEventKind::InteractionCreate,
            Self::GuildMemberAdd { .. } => GatewayEventKind::GuildMemberAdd,
            Self::Error(_) => GatewayEventKind::Error,
        }
    }
}

impl fmt::Debug for GatewayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InteractionCreate(interaction) => {
                write!(f, "InteractionCreate({})", interaction.event())
            }
            other => write!(f, "{:?}", other.kind()),
        }
    }
}

/// Event kinds with a handler slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayEventKind {
    /// See [`GatewayEvent::Ready`].
    Ready,
    /// See [`GatewayEvent::InteractionCreate`].
    InteractionCreate,
    /// See [`GatewayEvent::GuildMemberAdd`].
    GuildMemberAdd,
    /// See [`GatewayEvent::Error`].
    Error,
}

/// Handler for one event kind.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Kind this handler serves.
    fn kind(&self) -> GatewayEventKind;

    /// Handles one event of that kind.
    async fn handle(&self, event: GatewayEvent);
}

/// Event kind to handler mapping, fixed after startup.
#[derive(Default)]
pub struct EventTable {
    handlers: HashMap<GatewayEventKind, Arc<dyn EventHandler>>,
}

impl EventTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps the handler's kind to it, replacing any earlier handler.
    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(handler.kind(), Arc::new(handler));
    }

    /// Number of mapped kinds.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Runs the handler for `event`. Returns whether one was mapped.
    pub async fn dispatch(&self, event: GatewayEvent) -> bool {
        let Some(handler) = self.handlers.get(&event.kind()) else {
            debug!("No handler for {:?}", event);
            return false;
        };
        handler.handle(event).await;
        true
    }
}

/// Builds the standard table.
pub fn default_table(
    router: Arc<InteractionRouter>,
    client: ClientHandle,
    welcome_channel: Option<ChannelId>,
) -> EventTable {
    let mut table = EventTable::new();
    table.register(ReadyLogger);
    table.register(InteractionDispatch::new(router));
    table.register(MemberGreeter::new(client, welcome_channel));
    table.register(ClientErrorLogger);
    table
}

/// Consumes events in arrival order, dispatching each on its own task.
pub fn spawn_event_pump(
    table: Arc<EventTable>,
    mut events: mpsc::UnboundedReceiver<GatewayEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let table = Arc::clone(&table);
            tokio::spawn(async move {
                table.dispatch(event).await;
            });
        }
        debug!("Gateway event stream closed");
    })
}

/// Logs the ready event.
pub struct ReadyLogger;

#[async_trait]
impl EventHandler for ReadyLogger {
    fn kind(&self) -> GatewayEventKind {
        GatewayEventKind::Ready
    }

    async fn handle(&self, event: GatewayEvent) {
        if let GatewayEvent::Ready {
            user_tag,
            guild_count,
        } = event
        {
            info!("Ready! Logged in as {} in {} guild(s)", user_tag, guild_count);
        }
    }
}

/// Hands interactions to the router.
pub struct InteractionDispatch {
    router: Arc<InteractionRouter>,
}

impl InteractionDispatch {
    /// Creates the handler.
    pub const fn new(router: Arc<InteractionRouter>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl EventHandler for InteractionDispatch {
    fn kind(&self) -> GatewayEventKind {
        GatewayEventKind::InteractionCreate
    }

    async fn handle(&self, event: GatewayEvent) {
        if let GatewayEvent::InteractionCreate(interaction) = event {
            let origin = interaction.event().origin().to_string();
            let outcome = self.router.route(interaction).await;
            if outcome != RouteOutcome::Executed {
                debug!("Interaction {} finished as {:?}", origin, outcome);
            }
        }
    }
}

/// Welcomes new members.
pub struct MemberGreeter {
    client: ClientHandle,
    channel: Option<ChannelId>,
}

impl MemberGreeter {
    /// Greets in `channel`, or only logs joins when it is unset.
    pub fn new(client: ClientHandle, channel: Option<ChannelId>) -> Self {
        Self { client, channel }
    }

    /// Text of the welcome message.
    pub fn greeting(user_id: UserId) -> String {
        format!("Welcome to the server, {}! Use /ticket if you need help.", user_id.mention())
    }
}

#[async_trait]
impl EventHandler for MemberGreeter {
    fn kind(&self) -> GatewayEventKind {
        GatewayEventKind::GuildMemberAdd
    }

    async fn handle(&self, event: GatewayEvent) {
        let GatewayEvent::GuildMemberAdd {
            guild_id,
            user_id,
            user_tag,
        } = event
        else {
            return;
        };
        info!(guild = %guild_id, "{} joined", user_tag);

        let Some(channel) = self.channel else {
            return;
        };
        let message = OutgoingMessage::public(Self::greeting(user_id));
        if let Err(e) = self.client.send_message(channel, message).await {
            warn!(channel = %channel, "Could not welcome {}: {}", user_tag, e);
        }
    }
}

/// Logs client errors.
pub struct ClientErrorLogger;

#[async_trait]
impl EventHandler for ClientErrorLogger {
    fn kind(&self) -> GatewayEventKind {
        GatewayEventKind::Error
    }

    async fn handle(&self, event: GatewayEvent) {
        if let GatewayEvent::Error(message) = event {
            error!("Gateway client error: {}", message);
        }
    }
}
