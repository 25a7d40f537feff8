//! Test utilities and shared test helpers for TicketBot.
//!
//! This module provides fixtures and in-memory gateway doubles that can be
//! used across all crates in the workspace for unit and integration testing.

use crate::{
    ChannelId, CommandMetadata, GatewayClient, InteractionResponder, OutgoingMessage,
    RegistrationScope, Result, TicketBotError,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Discord-related test fixtures.
pub mod discord_fixtures {
    use crate::{ChannelId, GuildId, UserId};

    /// Create a test channel ID.
    pub fn test_channel_id() -> ChannelId {
        ChannelId(123_456_789_012_345_678)
    }

    /// Create a test guild ID.
    pub fn test_guild_id() -> GuildId {
        GuildId(555_555_555_555_555_555)
    }

    /// Create a test user ID.
    pub fn test_user_id() -> UserId {
        UserId(987_654_321_098_765_432)
    }

    /// Create multiple distinct test user IDs.
    pub fn test_user_ids(count: usize) -> Vec<UserId> {
        (0..count as u64)
            .map(|i| UserId(100_000_000_000_000_000 + i))
            .collect()
    }
}

/// How a recorded message reached the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Initial response.
    Reply,
    /// Follow-up after acknowledgement.
    FollowUp,
}

/// In-memory responder that records everything sent through it.
#[derive(Debug, Default)]
pub struct RecordingResponder {
    acknowledged: AtomicBool,
    fail_delivery: AtomicBool,
    deferrals: AtomicUsize,
    sent: Mutex<Vec<(ResponseKind, OutgoingMessage)>>,
}

impl RecordingResponder {
    /// A fresh, unacknowledged responder.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A responder whose every delivery fails, as with an expired interaction.
    pub fn failing() -> Arc<Self> {
        let responder = Self::default();
        responder.fail_delivery.store(true, Ordering::SeqCst);
        Arc::new(responder)
    }

    /// Everything delivered so far, in order.
    pub fn sent(&self) -> Vec<(ResponseKind, OutgoingMessage)> {
        self.sent.lock().clone()
    }

    /// Number of deferrals.
    pub fn deferrals(&self) -> usize {
        self.deferrals.load(Ordering::SeqCst)
    }

    fn deliver(&self, kind: ResponseKind, message: OutgoingMessage) -> Result<()> {
        if self.fail_delivery.load(Ordering::SeqCst) {
            return Err(TicketBotError::gateway("Unknown interaction"));
        }
        self.sent.lock().push((kind, message));
        Ok(())
    }
}

#[async_trait]
impl InteractionResponder for RecordingResponder {
    fn is_acknowledged(&self) -> bool {
        self.acknowledged.load(Ordering::SeqCst)
    }

    async fn reply(&self, message: OutgoingMessage) -> Result<()> {
        if self.acknowledged.swap(true, Ordering::SeqCst) {
            return Err(TicketBotError::gateway("Interaction has already been acknowledged"));
        }
        self.deliver(ResponseKind::Reply, message)
    }

    async fn follow_up(&self, message: OutgoingMessage) -> Result<()> {
        self.deliver(ResponseKind::FollowUp, message)
    }

    async fn defer(&self, _ephemeral: bool) -> Result<()> {
        if self.acknowledged.swap(true, Ordering::SeqCst) {
            return Err(TicketBotError::gateway("Interaction has already been acknowledged"));
        }
        self.deferrals.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory gateway that records channel posts and command registrations.
#[derive(Debug, Default)]
pub struct StubGateway {
    ready: AtomicBool,
    fail_requests: AtomicBool,
    destroyed: AtomicUsize,
    posts: Mutex<Vec<(ChannelId, OutgoingMessage)>>,
    registrations: Mutex<Vec<(RegistrationScope, Vec<CommandMetadata>)>>,
}

impl StubGateway {
    /// A gateway that reports ready.
    pub fn ready() -> Arc<Self> {
        let gateway = Self::default();
        gateway.ready.store(true, Ordering::SeqCst);
        Arc::new(gateway)
    }

    /// A ready gateway whose REST calls fail.
    pub fn failing() -> Arc<Self> {
        let gateway = Self::default();
        gateway.ready.store(true, Ordering::SeqCst);
        gateway.fail_requests.store(true, Ordering::SeqCst);
        Arc::new(gateway)
    }

    /// Channel posts so far.
    pub fn posts(&self) -> Vec<(ChannelId, OutgoingMessage)> {
        self.posts.lock().clone()
    }

    /// Command registrations so far.
    pub fn registrations(&self) -> Vec<(RegistrationScope, Vec<CommandMetadata>)> {
        self.registrations.lock().clone()
    }

    /// Number of `destroy` calls.
    pub fn destroy_count(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(TicketBotError::gateway("Missing Access"));
        }
        Ok(())
    }
}

#[async_trait]
impl GatewayClient for StubGateway {
    async fn login(&self, _token: &str) -> Result<()> {
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn destroy(&self) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        self.ready.store(false, Ordering::SeqCst);
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn register_commands(
        &self,
        scope: RegistrationScope,
        commands: &[CommandMetadata],
    ) -> Result<()> {
        self.check_available()?;
        self.registrations.lock().push((scope, commands.to_vec()));
        Ok(())
    }

    async fn send_message(&self, channel: ChannelId, message: OutgoingMessage) -> Result<()> {
        self.check_available()?;
        self.posts.lock().push((channel, message));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_responder_rejects_second_initial_response() {
        let responder = RecordingResponder::new();
        assert!(!responder.is_acknowledged());

        responder.reply(OutgoingMessage::ephemeral("first")).await.unwrap();
        assert!(responder.is_acknowledged());
        assert!(responder.reply(OutgoingMessage::ephemeral("second")).await.is_err());

        responder.follow_up(OutgoingMessage::ephemeral("later")).await.unwrap();
        let sent = responder.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].0, ResponseKind::FollowUp);
    }

    #[tokio::test]
    async fn test_stub_gateway_records_posts() {
        let gateway = StubGateway::ready();
        gateway
            .send_message(discord_fixtures::test_channel_id(), OutgoingMessage::public("hi"))
            .await
            .unwrap();
        assert_eq!(gateway.posts().len(), 1);

        gateway.destroy().await;
        assert!(!gateway.is_ready());
        assert_eq!(gateway.destroy_count(), 1);
    }

    #[test]
    fn test_user_ids_are_distinct() {
        let ids = discord_fixtures::test_user_ids(3);
        assert_eq!(ids.len(), 3);
        assert_ne!(ids[0], ids[1]);
    }
}
