//! Discord gateway adapter built on serenity.
//!
//! [`SerenityGateway`] owns the serenity client for one session, forwards
//! gateway events to the event pump and exposes the session through the
//! [`GatewayClient`] capability the dispatch core is written against.

use crate::events::GatewayEvent;
use crate::lifecycle::{Fault, FaultSource, ShutdownTrigger, TriggerSender};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serenity::all as discord;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use ticketbot_commands::{Interaction, InteractionEvent};
use ticketbot_common::{
    ChannelId, CommandMetadata, GatewayClient, GuildId, InteractionResponder, MessageButton,
    OutgoingMessage, RegistrationScope, Result, TicketBotError, UserId,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Discord client status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientStatus {
    /// Client is not connected
    Disconnected,
    /// Client is connecting
    Connecting,
    /// Client is connected and ready
    Connected,
    /// Client lost a shard connection and serenity is reconnecting it
    Reconnecting,
    /// Client has failed and cannot reconnect
    Failed(String),
}

/// Gateway intents the bot needs.
pub fn required_intents() -> discord::GatewayIntents {
    discord::GatewayIntents::GUILDS | discord::GatewayIntents::GUILD_MEMBERS
}

/// Serenity-backed gateway session.
pub struct SerenityGateway {
    application_id: u64,
    events: mpsc::UnboundedSender<GatewayEvent>,
    triggers: TriggerSender,
    status: Arc<RwLock<ClientStatus>>,
    http: RwLock<Option<Arc<discord::Http>>>,
    shard_manager: Mutex<Option<Arc<discord::ShardManager>>>,
}

impl SerenityGateway {
    /// Creates a disconnected gateway for the given application.
    pub fn new(
        application_id: u64,
        events: mpsc::UnboundedSender<GatewayEvent>,
        triggers: TriggerSender,
    ) -> Self {
        Self {
            application_id,
            events,
            triggers,
            status: Arc::new(RwLock::new(ClientStatus::Disconnected)),
            http: RwLock::new(None),
            shard_manager: Mutex::new(None),
        }
    }

    /// Get the current connection status
    pub fn status(&self) -> ClientStatus {
        self.status.read().clone()
    }

    fn set_status(&self, status: ClientStatus) {
        *self.status.write() = status;
    }

    fn http(&self) -> Result<Arc<discord::Http>> {
        self.http
            .read()
            .clone()
            .ok_or_else(|| TicketBotError::gateway("Gateway client is not logged in"))
    }

    /// Reports the end of a session that had reached ready.
    fn watch_session(&self, exit: oneshot::Receiver<std::result::Result<(), String>>) {
        let status = Arc::clone(&self.status);
        let triggers = self.triggers.clone();
        tokio::spawn(async move {
            let detail = match exit.await {
                Ok(Ok(())) => "gateway session ended".to_string(),
                Ok(Err(e)) => e,
                Err(_) => "gateway task stopped unexpectedly".to_string(),
            };
            {
                let mut status = status.write();
                if *status == ClientStatus::Disconnected {
                    debug!("Gateway session closed: {}", detail);
                    return;
                }
                *status = ClientStatus::Failed(detail.clone());
            }
            let fault = Fault {
                source: FaultSource::Gateway,
                detail,
            };
            let _ = triggers.send(ShutdownTrigger::Fault(fault));
        });
    }
}

#[async_trait]
impl GatewayClient for SerenityGateway {
    async fn login(&self, token: &str) -> Result<()> {
        self.set_status(ClientStatus::Connecting);

        let (ready_tx, ready_rx) = oneshot::channel();
        let bridge = GatewayBridge {
            events: self.events.clone(),
            status: Arc::clone(&self.status),
            ready: Mutex::new(Some(ready_tx)),
        };

        let built = discord::ClientBuilder::new(token, required_intents())
            .application_id(discord::ApplicationId::new(self.application_id))
            .event_handler(bridge)
            .await;
        let mut client = match built {
            Ok(client) => client,
            Err(e) => {
                self.set_status(ClientStatus::Failed(e.to_string()));
                return Err(TicketBotError::gateway_with_source(
                    "Failed to create Discord client",
                    e,
                ));
            }
        };
        debug!("Configured Discord intents: {:?}", required_intents());

        *self.http.write() = Some(Arc::clone(&client.http));
        *self.shard_manager.lock() = Some(Arc::clone(&client.shard_manager));

        let (exit_tx, mut exit_rx) = oneshot::channel();
        tokio::spawn(async move {
            let outcome = client.start().await.map_err(|e| e.to_string());
            let _ = exit_tx.send(outcome);
        });

        tokio::select! {
            ready = ready_rx => {
                if ready.is_err() {
                    let message = "Gateway closed before becoming ready".to_string();
                    self.set_status(ClientStatus::Failed(message.clone()));
                    return Err(TicketBotError::gateway(message));
                }
                self.set_status(ClientStatus::Connected);
                self.watch_session(exit_rx);
                Ok(())
            }
            exit = &mut exit_rx => {
                let message = match exit {
                    Ok(Err(e)) => e,
                    _ => "Gateway session ended before becoming ready".to_string(),
                };
                self.set_status(ClientStatus::Failed(message.clone()));
                Err(TicketBotError::gateway(message))
            }
        }
    }

    async fn destroy(&self) {
        self.set_status(ClientStatus::Disconnected);
        let shard_manager = self.shard_manager.lock().take();
        if let Some(shard_manager) = shard_manager {
            shard_manager.shutdown_all().await;
            info!("Discord client shutdown completed");
        }
    }

    fn is_ready(&self) -> bool {
        matches!(*self.status.read(), ClientStatus::Connected)
    }

    async fn register_commands(
        &self,
        scope: RegistrationScope,
        commands: &[CommandMetadata],
    ) -> Result<()> {
        let http = self.http()?;
        let builders: Vec<_> = commands
            .iter()
            .map(|command| {
                discord::CreateCommand::new(&command.name).description(&command.description)
            })
            .collect();

        let registered = match scope {
            RegistrationScope::Global => {
                discord::Command::set_global_commands(&http, builders).await
            }
            RegistrationScope::Guild(guild) => {
                discord::GuildId::new(guild.0).set_commands(&http, builders).await
            }
        };
        registered
            .map(|_| ())
            .map_err(|e| TicketBotError::gateway_with_source("Failed to register commands", e))
    }

    async fn send_message(&self, channel: ChannelId, message: OutgoingMessage) -> Result<()> {
        let http = self.http()?;
        let builder = discord::CreateMessage::new()
            .content(message.content)
            .components(action_rows(&message.buttons));
        discord::ChannelId::new(channel.0)
            .send_message(&http, builder)
            .await
            .map(|_| ())
            .map_err(|e| TicketBotError::gateway_with_source("Failed to send message", e))
    }
}

/// Serenity event handler that feeds the event pump.
struct GatewayBridge {
    events: mpsc::UnboundedSender<GatewayEvent>,
    status: Arc<RwLock<ClientStatus>>,
    ready: Mutex<Option<oneshot::Sender<()>>>,
}

impl GatewayBridge {
    fn forward(&self, event: GatewayEvent) {
        if self.events.send(event).is_err() {
            warn!("Dropping gateway event: event pump is gone");
        }
    }
}

#[async_trait]
impl discord::EventHandler for GatewayBridge {
    async fn ready(&self, _ctx: discord::Context, ready: discord::Ready) {
        let signal = self.ready.lock().take();
        if let Some(signal) = signal {
            let _ = signal.send(());
        }
        self.forward(GatewayEvent::Ready {
            user_tag: ready.user.tag(),
            guild_count: ready.guilds.len(),
        });
    }

    async fn interaction_create(&self, ctx: discord::Context, interaction: discord::Interaction) {
        let (event, target) = match interaction {
            discord::Interaction::Command(command)
                if command.data.kind == discord::CommandType::ChatInput =>
            {
                let event = InteractionEvent::ChatInputCommand {
                    command_name: command.data.name.clone(),
                    caller_id: UserId(command.user.id.get()),
                    caller_tag: command.user.tag(),
                };
                (event, ResponseTarget::Command(Box::new(command)))
            }
            discord::Interaction::Component(component) => {
                let event = InteractionEvent::ComponentInteraction {
                    custom_id: component.data.custom_id.clone(),
                    caller_id: UserId(component.user.id.get()),
                };
                (event, ResponseTarget::Component(Box::new(component)))
            }
            _ => return,
        };

        let responder = Arc::new(SerenityResponder::new(Arc::clone(&ctx.http), target));
        self.forward(GatewayEvent::InteractionCreate(Interaction::new(event, responder)));
    }

    async fn guild_member_addition(&self, _ctx: discord::Context, member: discord::Member) {
        self.forward(GatewayEvent::GuildMemberAdd {
            guild_id: GuildId(member.guild_id.get()),
            user_id: UserId(member.user.id.get()),
            user_tag: member.user.tag(),
        });
    }

    async fn shard_stage_update(&self, _ctx: discord::Context, event: discord::ShardStageUpdateEvent) {
        match event.new {
            discord::ConnectionStage::Disconnected => {
                {
                    let mut status = self.status.write();
                    if *status != ClientStatus::Connected {
                        return;
                    }
                    *status = ClientStatus::Reconnecting;
                }
                self.forward(GatewayEvent::Error(format!(
                    "shard {} disconnected",
                    event.shard_id.0
                )));
            }
            discord::ConnectionStage::Connected => {
                let mut status = self.status.write();
                if *status == ClientStatus::Reconnecting {
                    *status = ClientStatus::Connected;
                }
            }
            _ => {}
        }
    }

    async fn resume(&self, _ctx: discord::Context, _event: discord::ResumedEvent) {
        let mut status = self.status.write();
        if *status == ClientStatus::Reconnecting {
            *status = ClientStatus::Connected;
        }
    }
}

enum ResponseTarget {
    Command(Box<discord::CommandInteraction>),
    Component(Box<discord::ComponentInteraction>),
}

/// Response channel of one serenity interaction.
struct SerenityResponder {
    http: Arc<discord::Http>,
    target: ResponseTarget,
    acknowledged: AtomicBool,
}

impl SerenityResponder {
    fn new(http: Arc<discord::Http>, target: ResponseTarget) -> Self {
        Self {
            http,
            target,
            acknowledged: AtomicBool::new(false),
        }
    }

    async fn respond(&self, response: discord::CreateInteractionResponse) -> Result<()> {
        if self.acknowledged.swap(true, Ordering::SeqCst) {
            return Err(TicketBotError::gateway(
                "Interaction has already been acknowledged",
            ));
        }
        let sent = match &self.target {
            ResponseTarget::Command(command) => command.create_response(&self.http, response).await,
            ResponseTarget::Component(component) => {
                component.create_response(&self.http, response).await
            }
        };
        sent.map_err(|e| {
            self.acknowledged.store(false, Ordering::SeqCst);
            TicketBotError::gateway_with_source("Failed to respond to interaction", e)
        })
    }
}

#[async_trait]
impl InteractionResponder for SerenityResponder {
    fn is_acknowledged(&self) -> bool {
        self.acknowledged.load(Ordering::SeqCst)
    }

    async fn reply(&self, message: OutgoingMessage) -> Result<()> {
        let builder = discord::CreateInteractionResponseMessage::new()
            .content(message.content)
            .ephemeral(message.ephemeral)
            .components(action_rows(&message.buttons));
        self.respond(discord::CreateInteractionResponse::Message(builder))
            .await
    }

    async fn follow_up(&self, message: OutgoingMessage) -> Result<()> {
        let builder = discord::CreateInteractionResponseFollowup::new()
            .content(message.content)
            .ephemeral(message.ephemeral)
            .components(action_rows(&message.buttons));
        let sent = match &self.target {
            ResponseTarget::Command(command) => command.create_followup(&self.http, builder).await,
            ResponseTarget::Component(component) => {
                component.create_followup(&self.http, builder).await
            }
        };
        sent.map(|_| ())
            .map_err(|e| TicketBotError::gateway_with_source("Failed to send follow-up", e))
    }

    async fn defer(&self, ephemeral: bool) -> Result<()> {
        let builder = discord::CreateInteractionResponseMessage::new().ephemeral(ephemeral);
        self.respond(discord::CreateInteractionResponse::Defer(builder))
            .await
    }
}

fn action_rows(buttons: &[MessageButton]) -> Vec<discord::CreateActionRow> {
    if buttons.is_empty() {
        return Vec::new();
    }
    let row = buttons
        .iter()
        .map(|button| discord::CreateButton::new(&button.custom_id).label(&button.label))
        .collect();
    vec![discord::CreateActionRow::Buttons(row)]
}
