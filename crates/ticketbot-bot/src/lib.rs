//! # TicketBot
//!
//! Discord support bot: slash-command dispatch with per-user cooldowns,
//! a ticket desk, and a process lifecycle with graceful shutdown.
//!
//! This is the main binary crate that connects the dispatch core to the
//! Discord gateway and owns the application lifecycle.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bot;
pub mod error;
pub mod events;
pub mod gateway;
pub mod lifecycle;
pub mod signals;

pub use bot::*;
pub use error::*;
pub use lifecycle::{
    Fault, FaultSource, LifecycleManager, LifecycleState, ShutdownTrigger, EXIT_FAILURE,
    EXIT_SUCCESS,
};
