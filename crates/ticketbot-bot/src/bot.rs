//! Wiring of the bot: configuration, gateway, dispatch and lifecycle.

use crate::error::BotResult;
use crate::events::{default_table, spawn_event_pump, EventTable, GatewayEvent};
use crate::gateway::SerenityGateway;
use crate::lifecycle::{LifecycleManager, TriggerReceiver, EXIT_FAILURE};
use crate::signals::{install_panic_hook, spawn_signal_listener};
use std::sync::Arc;
use ticketbot_commands::{builtin_commands, CooldownRegistry, InteractionRouter, TicketDesk};
use ticketbot_common::{ClientHandle, RegistrationScope};
use ticketbot_config::{Config, ConfigLoader, Credentials};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Long-lived services shared by the event handlers.
pub struct Services {
    /// Interaction router.
    pub router: Arc<InteractionRouter>,
    /// Ticket desk, also registered as a component delegate.
    pub desk: Arc<TicketDesk>,
    /// Cooldown state of every command.
    pub cooldowns: Arc<CooldownRegistry>,
    /// Gateway event table.
    pub events: EventTable,
}

impl Services {
    /// Builds the command set, router and event table around `client`.
    pub fn assemble(config: &Config, client: &ClientHandle) -> BotResult<Self> {
        let desk = Arc::new(TicketDesk::new(config.discord.ticket_channel_id));
        let commands = Arc::new(builtin_commands(Arc::clone(&desk))?);
        let cooldowns = Arc::new(CooldownRegistry::new());

        let router = Arc::new(
            InteractionRouter::new(commands, Arc::clone(&cooldowns), Arc::clone(client))
                .with_delegate(desk.clone()),
        );
        let events = default_table(
            Arc::clone(&router),
            Arc::clone(client),
            config.discord.welcome_channel_id,
        );

        Ok(Self {
            router,
            desk,
            cooldowns,
            events,
        })
    }
}

/// The bot process.
pub struct TicketBot {
    loader: ConfigLoader,
    lifecycle: LifecycleManager,
}

impl TicketBot {
    /// Creates a bot reading its configuration through `loader`.
    pub fn new(loader: ConfigLoader) -> Self {
        Self {
            loader,
            lifecycle: LifecycleManager::new(),
        }
    }

    /// The lifecycle state object.
    pub const fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    /// Runs against the Discord gateway until shutdown; returns the exit status.
    pub async fn run(&self) -> i32 {
        let Some((config, credentials)) = self.validate() else {
            return EXIT_FAILURE;
        };

        let (triggers_tx, triggers_rx) = mpsc::unbounded_channel();
        install_panic_hook(triggers_tx.clone());
        spawn_signal_listener(triggers_tx.clone());

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let gateway: ClientHandle = Arc::new(SerenityGateway::new(
            credentials.client_id,
            events_tx,
            triggers_tx,
        ));

        self.serve(&config, &credentials, gateway, events_rx, triggers_rx)
            .await
    }

    /// Validates configuration, logging every problem found.
    pub fn validate(&self) -> Option<(Config, Credentials)> {
        match self.lifecycle.validate(&self.loader) {
            Ok(validated) => Some(validated),
            Err(e) => {
                error!("Configuration error: {}", e);
                None
            }
        }
    }

    /// Connects `gateway` and serves events until a trigger ends the process.
    pub async fn serve(
        &self,
        config: &Config,
        credentials: &Credentials,
        gateway: ClientHandle,
        events: mpsc::UnboundedReceiver<GatewayEvent>,
        mut triggers: TriggerReceiver,
    ) -> i32 {
        let services = match Services::assemble(config, &gateway) {
            Ok(services) => services,
            Err(e) => {
                error!("Failed to assemble commands: {}", e);
                return EXIT_FAILURE;
            }
        };
        let Services {
            router,
            desk,
            cooldowns,
            events: table,
        } = services;
        let pump = spawn_event_pump(Arc::new(table), events);

        let connected = self
            .lifecycle
            .connect_or_interrupt(Arc::clone(&gateway), credentials, &mut triggers)
            .await;
        match connected {
            Ok(None) => {}
            Ok(Some(code)) => {
                pump.abort();
                info!("Exiting with status {}", code);
                return code;
            }
            Err(e) => {
                error!("Failed to connect to the gateway: {}", e);
                pump.abort();
                return EXIT_FAILURE;
            }
        }

        run_startup_actions(config, &router, &desk, &gateway).await;
        let sweeper = cooldowns.spawn_sweeper(config.rate_limiting.sweep_interval);

        let code = self.lifecycle.serve(triggers).await;
        sweeper.abort();
        pump.abort();
        info!("Exiting with status {}", code);
        code
    }
}

/// Registers the commands remotely and initializes the ticket desk.
///
/// Failures are logged; the bot keeps serving without them.
pub async fn run_startup_actions(
    config: &Config,
    router: &InteractionRouter,
    desk: &TicketDesk,
    client: &ClientHandle,
) {
    let scope = config
        .discord
        .guild_id
        .map_or(RegistrationScope::Global, RegistrationScope::Guild);
    let metadata = router.commands().metadata();
    match client.register_commands(scope, &metadata).await {
        Ok(()) => info!("Registered {} command(s) ({})", metadata.len(), scope),
        Err(e) => warn!("Failed to register commands ({}): {}", scope, e),
    }

    if let Err(e) = desk.initialize(client).await {
        warn!("Failed to initialize the ticket desk: {}", e);
    }
}
