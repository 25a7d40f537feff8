//! Common type definitions and newtype wrappers for domain modeling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Discord channel ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Discord user ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl UserId {
    /// Mention markup for this user.
    pub fn mention(self) -> String {
        format!("<@{}>", self.0)
    }
}

/// A Discord guild ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuildId(pub u64);

impl fmt::Display for GuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A clickable button attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageButton {
    /// Namespaced component id, e.g. `ticket:open`.
    pub custom_id: String,
    /// Label shown on the button.
    pub label: String,
}

impl MessageButton {
    /// Creates a button.
    pub fn new(custom_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            custom_id: custom_id.into(),
            label: label.into(),
        }
    }
}

/// A message sent as an interaction reply, follow-up, or channel post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Text content.
    pub content: String,
    /// Only visible to the invoking user. Ignored for channel posts.
    pub ephemeral: bool,
    /// Buttons rendered in a single action row.
    pub buttons: Vec<MessageButton>,
}

impl OutgoingMessage {
    /// A public message.
    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// A message visible only to the invoking user.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
            buttons: Vec::new(),
        }
    }

    /// Appends a button.
    #[must_use]
    pub fn with_button(mut self, button: MessageButton) -> Self {
        self.buttons.push(button);
        self
    }
}

/// Metadata pushed to the gateway when registering slash commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// Command name as typed after the slash.
    pub name: String,
    /// Description shown in the command picker.
    pub description: String,
}

/// Where slash command metadata is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationScope {
    /// Available in every guild; propagation may take a while.
    Global,
    /// Available immediately, but only in one guild.
    Guild(GuildId),
}

impl fmt::Display for RegistrationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Guild(id) => write!(f, "guild {id}"),
        }
    }
}
