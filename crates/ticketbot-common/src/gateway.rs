//! Capabilities the dispatch core needs from the remote gateway.
//!
//! The transport itself lives in the binary crate; everything here is a
//! trait so that routing and lifecycle logic can run against test doubles.

use crate::{ChannelId, CommandMetadata, OutgoingMessage, RegistrationScope, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Session-level operations on the gateway client.
#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Opens a session and resolves once the gateway reports ready.
    async fn login(&self, token: &str) -> Result<()>;

    /// Closes the session. Calling it on a closed client is a no-op.
    async fn destroy(&self);

    /// Whether a session is currently open and ready.
    fn is_ready(&self) -> bool;

    /// Replaces the remote slash command metadata for `scope`.
    async fn register_commands(
        &self,
        scope: RegistrationScope,
        commands: &[CommandMetadata],
    ) -> Result<()>;

    /// Posts a message to a channel.
    async fn send_message(&self, channel: ChannelId, message: OutgoingMessage) -> Result<()>;
}

/// Shared client handle passed to every command and delegate.
pub type ClientHandle = Arc<dyn GatewayClient>;

/// The response channel of a single interaction.
///
/// The gateway accepts exactly one initial response per interaction; anything
/// after that has to be a follow-up. Implementations track which one applies.
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    /// Whether an initial response (reply or deferral) has been sent.
    fn is_acknowledged(&self) -> bool;

    /// Sends the initial response.
    async fn reply(&self, message: OutgoingMessage) -> Result<()>;

    /// Sends a follow-up after the interaction was acknowledged.
    async fn follow_up(&self, message: OutgoingMessage) -> Result<()>;

    /// Acknowledges the interaction without content yet.
    async fn defer(&self, ephemeral: bool) -> Result<()>;
}
