//! # TicketBot Common
//!
//! Shared types, utilities, and common functionality for TicketBot.
//!
//! This crate provides the foundational types used across all other crates
//! in the workspace: the error type, id newtypes, the outgoing message model,
//! the gateway capabilities the dispatch core talks to, and logging setup.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod gateway;
pub mod logging;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::*;
pub use gateway::*;
pub use types::*;
pub use utils::*;
