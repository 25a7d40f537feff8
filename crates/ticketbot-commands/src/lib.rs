//! # TicketBot Commands
//!
//! Interaction dispatch for TicketBot.
//!
//! This crate classifies inbound interactions, enforces per-command,
//! per-user cooldowns, runs every handler inside an error containment
//! boundary, and provides the built-in commands and the ticket desk.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod containment;
pub mod cooldown;
pub mod framework;
pub mod interaction;
pub mod ping;
pub mod registry;
pub mod router;
pub mod ticket;
pub mod ticket_desk;

pub use containment::{contain, in_interaction_scope, Failure, ERROR_REPLY};
pub use cooldown::{CooldownOutcome, CooldownRegistry};
pub use framework::*;
pub use interaction::{Interaction, InteractionEvent};
pub use registry::{CommandDescriptor, CommandRegistry, RegistryError, DEFAULT_COOLDOWN};
pub use router::{InteractionRouter, RouteOutcome};
pub use ticket_desk::{Ticket, TicketDesk, TICKET_PREFIX};
