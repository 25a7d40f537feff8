//! Process lifecycle: validation, connection, readiness and shutdown.
//!
//! ```text
//! Uninitialized -> Validating -> Connecting -> Ready -> ShuttingDown -> Terminated
//! ```
//!
//! Failures while validating or connecting end the process directly with a
//! non-zero status; there is nothing to tear down yet. Shutdown is entered
//! at most once, from `Ready`, by a termination signal (exit 0) or a
//! process-level fault (exit 1).

use crate::error::{BotError, BotResult};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use ticketbot_common::ClientHandle;
use ticketbot_config::{Config, ConfigLoader, ConfigValidator, Credentials, LifecycleConfig};
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

/// Exit status after a signal-triggered shutdown.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit status after any failure.
pub const EXIT_FAILURE: i32 = 1;

/// Process lifecycle states, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Process started, nothing checked yet.
    Uninitialized,
    /// Checking configuration.
    Validating,
    /// Opening the gateway session.
    Connecting,
    /// Serving interactions.
    Ready,
    /// Tearing down.
    ShuttingDown,
    /// Done; the process is about to exit.
    Terminated,
}

impl LifecycleState {
    /// The only state reachable from this one.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Uninitialized => Some(Self::Validating),
            Self::Validating => Some(Self::Connecting),
            Self::Connecting => Some(Self::Ready),
            Self::Ready => Some(Self::ShuttingDown),
            Self::ShuttingDown => Some(Self::Terminated),
            Self::Terminated => None,
        }
    }
}

/// Where a process-level fault came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultSource {
    /// A panic outside any interaction.
    Panic,
    /// The gateway session died.
    Gateway,
}

/// A fault not tied to any interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Origin of the fault.
    pub source: FaultSource,
    /// Full diagnostic text.
    pub detail: String,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} fault: {}", self.source, self.detail)
    }
}

/// Why the process is shutting down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownTrigger {
    /// A termination signal, by name.
    Signal(&'static str),
    /// An unrecoverable fault.
    Fault(Fault),
}

impl ShutdownTrigger {
    /// Exit status for this trigger.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Signal(_) => EXIT_SUCCESS,
            Self::Fault(_) => EXIT_FAILURE,
        }
    }
}

/// Sending half for shutdown triggers.
pub type TriggerSender = mpsc::UnboundedSender<ShutdownTrigger>;
/// Receiving half for shutdown triggers.
pub type TriggerReceiver = mpsc::UnboundedReceiver<ShutdownTrigger>;

/// The single lifecycle state object of the process.
pub struct LifecycleManager {
    state: Mutex<LifecycleState>,
    settings: Mutex<LifecycleConfig>,
    gateway: Mutex<Option<ClientHandle>>,
}

impl LifecycleManager {
    /// Creates a manager in `Uninitialized` with default timings.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LifecycleState::Uninitialized),
            settings: Mutex::new(LifecycleConfig::default()),
            gateway: Mutex::new(None),
        }
    }

    /// Current state.
    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    fn advance(&self, to: LifecycleState) -> BotResult<()> {
        let mut state = self.state.lock();
        if state.next() != Some(to) {
            return Err(BotError::Transition { from: *state, to });
        }
        debug!("Lifecycle {:?} -> {:?}", *state, to);
        *state = to;
        Ok(())
    }

    fn settings(&self) -> LifecycleConfig {
        self.settings.lock().clone()
    }

    /// `Validating`: loads the configuration and checks the credentials.
    pub fn validate(&self, loader: &ConfigLoader) -> BotResult<(Config, Credentials)> {
        self.advance(LifecycleState::Validating)?;

        let (config, credentials) = ConfigValidator::load_validated(loader)?;
        *self.settings.lock() = config.lifecycle.clone();

        info!("Configuration validated");
        Ok((config, credentials))
    }

    /// `Connecting`: logs in and moves to `Ready` once the gateway is ready.
    pub async fn connect(&self, gateway: ClientHandle, credentials: &Credentials) -> BotResult<()> {
        self.advance(LifecycleState::Connecting)?;
        *self.gateway.lock() = Some(gateway.clone());

        let limit = self.settings().connect_timeout;
        info!("Connecting to the gateway");
        match timeout(limit, gateway.login(&credentials.token)).await {
            Ok(Ok(())) => {
                self.advance(LifecycleState::Ready)?;
                info!("Gateway session ready");
                Ok(())
            }
            Ok(Err(e)) => {
                gateway.destroy().await;
                Err(e.into())
            }
            Err(_) => {
                gateway.destroy().await;
                Err(BotError::ConnectTimeout(limit))
            }
        }
    }

    /// Connects unless a trigger arrives first.
    ///
    /// An interrupted connect closes the gateway and ends the process without
    /// entering `ShuttingDown`; the returned status is the trigger's.
    pub async fn connect_or_interrupt(
        &self,
        gateway: ClientHandle,
        credentials: &Credentials,
        triggers: &mut TriggerReceiver,
    ) -> BotResult<Option<i32>> {
        tokio::select! {
            biased;
            Some(trigger) = triggers.recv() => {
                match &trigger {
                    ShutdownTrigger::Signal(name) => info!("Received {} while connecting, aborting startup", name),
                    ShutdownTrigger::Fault(fault) => error!("Startup aborted by {}", fault),
                }
                gateway.destroy().await;
                Ok(Some(trigger.exit_code()))
            }
            connected = self.connect(Arc::clone(&gateway), credentials) => connected.map(|()| None),
        }
    }

    /// Runs the shutdown sequence once. Later calls return `None`.
    pub async fn shutdown(&self, trigger: &ShutdownTrigger) -> Option<i32> {
        {
            let mut state = self.state.lock();
            if *state != LifecycleState::Ready {
                debug!("Ignoring {:?} in state {:?}", trigger, *state);
                return None;
            }
            *state = LifecycleState::ShuttingDown;
        }

        match trigger {
            ShutdownTrigger::Signal(name) => info!("Received {}, shutting down gracefully", name),
            ShutdownTrigger::Fault(fault) => warn!("Shutting down after {}", fault),
        }

        let gateway = self.gateway.lock().clone();
        if let Some(gateway) = gateway {
            gateway.destroy().await;
            info!("Gateway session closed");
        }

        sleep(self.settings().shutdown_grace).await;

        if self.advance(LifecycleState::Terminated).is_err() {
            warn!("Lifecycle left ShuttingDown unexpectedly");
        }
        Some(trigger.exit_code())
    }

    /// Handles one trigger. Faults are logged and given time to flush first.
    pub async fn handle(&self, trigger: ShutdownTrigger) -> Option<i32> {
        if let ShutdownTrigger::Fault(fault) = &trigger {
            if self.state() != LifecycleState::Ready {
                return None;
            }
            error!(source = ?fault.source, "Unrecoverable process-level fault: {}", fault.detail);
            sleep(self.settings().fault_flush_delay).await;
        }
        self.shutdown(&trigger).await
    }

    /// Serves until a trigger completes the shutdown; returns the exit status.
    pub async fn serve(&self, mut triggers: TriggerReceiver) -> i32 {
        while let Some(trigger) = triggers.recv().await {
            if let Some(code) = self.handle(trigger).await {
                return code;
            }
        }

        let fault = Fault {
            source: FaultSource::Gateway,
            detail: "every shutdown trigger source is gone".to_string(),
        };
        self.shutdown(&ShutdownTrigger::Fault(fault)).await.unwrap_or(EXIT_FAILURE)
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}
