//! Application-wide error types using thiserror.

use crate::lifecycle::LifecycleState;
use std::time::Duration;
use ticketbot_commands::RegistryError;
use ticketbot_common::TicketBotError;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    /// Configuration or gateway error from the shared layer.
    #[error(transparent)]
    Common(#[from] TicketBotError),

    /// The built-in command set could not be assembled.
    #[error("Command registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The lifecycle was asked to skip or repeat a state.
    #[error("Invalid lifecycle transition from {from:?} to {to:?}")]
    Transition {
        /// State at the time of the request.
        from: LifecycleState,
        /// Requested state.
        to: LifecycleState,
    },

    /// The gateway did not become ready in time.
    #[error("Gateway did not become ready within {0:?}")]
    ConnectTimeout(Duration),
}

/// Result type for the bot application.
pub type BotResult<T> = Result<T, BotError>;
