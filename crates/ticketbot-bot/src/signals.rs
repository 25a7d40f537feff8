//! Termination signals and the process-level panic hook.

use crate::lifecycle::{Fault, FaultSource, ShutdownTrigger, TriggerSender};
use std::backtrace::Backtrace;
use ticketbot_commands::in_interaction_scope;
use ticketbot_common::panic_message;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Waits for SIGINT or SIGTERM and returns the signal's name.
///
/// A signal source that cannot be installed is logged and never fires.
pub async fn wait_for_termination() -> &'static str {
    let interrupt = async {
        match signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                warn!("Failed to listen for SIGINT: {}", e);
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                "SIGTERM"
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    }
}

/// Forwards every termination signal to the lifecycle until it stops listening.
pub fn spawn_signal_listener(triggers: TriggerSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let name = wait_for_termination().await;
            debug!("Caught {}", name);
            if triggers.send(ShutdownTrigger::Signal(name)).is_err() {
                break;
            }
        }
    })
}

/// Installs a panic hook that escalates panics outside any interaction.
///
/// Panics inside an interaction are left to the containment boundary.
pub fn install_panic_hook(triggers: TriggerSender) {
    std::panic::set_hook(Box::new(move |info| {
        let message = panic_message(info.payload());
        let location = info
            .location()
            .map_or_else(|| "unknown location".to_string(), ToString::to_string);

        if in_interaction_scope() {
            debug!("Interaction handler panicked at {}: {}", location, message);
            return;
        }

        let backtrace = Backtrace::force_capture();
        error!("Panic at {}: {}\n{}", location, message, backtrace);
        let fault = Fault {
            source: FaultSource::Panic,
            detail: format!("{message} at {location}"),
        };
        // The lifecycle may already be gone during teardown.
        let _ = triggers.send(ShutdownTrigger::Fault(fault));
    }));
}
