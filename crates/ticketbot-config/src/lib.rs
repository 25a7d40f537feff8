//! # TicketBot Config
//!
//! Configuration management for TicketBot.
//!
//! Configuration comes from the process environment. Loading is lenient and
//! only rejects malformed optional values; checking that the required
//! credentials are present is a separate validation step so that every
//! missing variable can be reported at once.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use defaults::*;
pub use loader::*;
pub use schema::*;
pub use validator::*;
