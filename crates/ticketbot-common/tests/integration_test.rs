//! Integration tests for ticketbot-common crate.

use std::time::Duration;
use ticketbot_common::{
    format_seconds, ChannelId, GuildId, OutgoingMessage, RegistrationScope, TicketBotError, UserId,
};

#[test]
fn test_id_display() {
    assert_eq!(format!("{}", ChannelId(123_456_789)), "123456789");
    assert_eq!(format!("{}", UserId(987_654_321)), "987654321");
    assert_eq!(format!("{}", GuildId(5)), "5");
}

#[test]
fn test_ids_serialize_as_plain_numbers() {
    let serialized = serde_json::to_string(&UserId(42)).unwrap();
    assert_eq!(serialized, "42");
    let parsed: UserId = serde_json::from_str(&serialized).unwrap();
    assert_eq!(parsed, UserId(42));
}

#[test]
fn test_outgoing_message_defaults_to_public() {
    let message = OutgoingMessage::public("panel");
    assert!(!message.ephemeral);
    assert!(message.buttons.is_empty());
}

#[test]
fn test_config_errors_are_classified() {
    let missing = TicketBotError::MissingConfig(vec!["CLIENT_ID".to_string()]);
    assert!(missing.is_config());
    assert!(missing.to_string().ends_with("CLIENT_ID"));
    assert!(!TicketBotError::gateway("down").is_config());
}

#[test]
fn test_remaining_time_formatting() {
    assert_eq!(format_seconds(Duration::from_millis(2_000)), "2.0");
    assert_eq!(format_seconds(Duration::from_millis(260)), "0.3");
}

#[test]
fn test_guild_scope_display() {
    assert_eq!(RegistrationScope::Guild(GuildId(9)).to_string(), "guild 9");
}
