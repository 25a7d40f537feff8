//! Integration tests for ticketbot-bot crate.
//!
//! These drive the whole bot against an in-memory gateway: configuration
//! validation, event dispatch through the router, and shutdown.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use ticketbot_bot::events::GatewayEvent;
use ticketbot_bot::{
    Fault, FaultSource, LifecycleState, ShutdownTrigger, TicketBot, EXIT_FAILURE, EXIT_SUCCESS,
};
use ticketbot_commands::{Interaction, InteractionEvent};
use ticketbot_common::test_utils::{init_test_logging, RecordingResponder, StubGateway};
use ticketbot_common::{ClientHandle, UserId};
use ticketbot_config::ConfigLoader;
use tokio::sync::mpsc;

fn loader(vars: &[(&str, &str)]) -> ConfigLoader {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    ConfigLoader::new(move |key| map.get(key).cloned())
}

fn valid_loader() -> ConfigLoader {
    loader(&[
        ("DISCORD_TOKEN", "test-token"),
        ("CLIENT_ID", "123456789"),
        ("SHUTDOWN_GRACE_MS", "0"),
        ("FAULT_FLUSH_MS", "0"),
    ])
}

fn ping(caller: u64, responder: Arc<RecordingResponder>) -> GatewayEvent {
    GatewayEvent::InteractionCreate(Interaction::new(
        InteractionEvent::ChatInputCommand {
            command_name: "ping".to_string(),
            caller_id: UserId(caller),
            caller_tag: format!("user#{caller:04}"),
        },
        responder,
    ))
}

async fn wait_for_reply(responder: &RecordingResponder) {
    for _ in 0..100 {
        if !responder.sent().is_empty() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no reply was sent");
}

#[tokio::test]
async fn test_missing_credentials_exit_with_failure() {
    init_test_logging();

    let bot = TicketBot::new(loader(&[]));
    assert_eq!(bot.run().await, EXIT_FAILURE);
    assert_eq!(bot.lifecycle().state(), LifecycleState::Validating);
}

#[tokio::test]
async fn test_serves_interactions_then_shuts_down_on_signal() {
    init_test_logging();

    let bot = TicketBot::new(valid_loader());
    let (config, credentials) = bot.validate().unwrap();
    let stub = StubGateway::default();
    let gateway: ClientHandle = Arc::new(stub);
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (triggers_tx, triggers_rx) = mpsc::unbounded_channel();

    let first = RecordingResponder::new();
    let second = RecordingResponder::new();
    let driver = async {
        events_tx.send(ping(1, first.clone())).unwrap();
        wait_for_reply(&first).await;
        events_tx.send(ping(1, second.clone())).unwrap();
        wait_for_reply(&second).await;

        triggers_tx.send(ShutdownTrigger::Signal("SIGINT")).unwrap();
        triggers_tx.send(ShutdownTrigger::Signal("SIGTERM")).unwrap();
    };

    let (code, ()) = tokio::join!(
        bot.serve(&config, &credentials, Arc::clone(&gateway), events_rx, triggers_rx),
        driver
    );

    assert_eq!(code, EXIT_SUCCESS);
    assert_eq!(bot.lifecycle().state(), LifecycleState::Terminated);
    assert!(!gateway.is_ready());
    assert!(first.sent()[0].1.content.starts_with("Pong!"));
    assert!(second.sent()[0].1.content.starts_with("Please wait"));
}

#[tokio::test]
async fn test_process_fault_exits_with_failure() {
    init_test_logging();

    let bot = TicketBot::new(valid_loader());
    let (config, credentials) = bot.validate().unwrap();
    let stub = Arc::new(StubGateway::default());
    let gateway: ClientHandle = stub.clone();
    let (_events_tx, events_rx) = mpsc::unbounded_channel();
    let (triggers_tx, triggers_rx) = mpsc::unbounded_channel();

    let driver = async {
        for _ in 0..100 {
            if !stub.registrations().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        triggers_tx
            .send(ShutdownTrigger::Fault(Fault {
                source: FaultSource::Gateway,
                detail: "session invalidated".to_string(),
            }))
            .unwrap();
    };

    let (code, ()) = tokio::join!(
        bot.serve(&config, &credentials, gateway, events_rx, triggers_rx),
        driver
    );

    assert_eq!(code, EXIT_FAILURE);
    assert_eq!(stub.destroy_count(), 1);
    assert_eq!(stub.registrations().len(), 1);
}

#[tokio::test]
async fn test_signal_while_connecting_skips_startup_actions() {
    init_test_logging();

    let bot = TicketBot::new(loader(&[
        ("DISCORD_TOKEN", "test-token"),
        ("CLIENT_ID", "123456789"),
        ("TICKET_CHANNEL_ID", "9"),
        ("SHUTDOWN_GRACE_MS", "0"),
    ]));
    let (config, credentials) = bot.validate().unwrap();
    let stub = Arc::new(StubGateway::default());
    let (_events_tx, events_rx) = mpsc::unbounded_channel();
    let (triggers_tx, triggers_rx) = mpsc::unbounded_channel();
    triggers_tx.send(ShutdownTrigger::Signal("SIGINT")).unwrap();

    let code = bot
        .serve(&config, &credentials, stub.clone(), events_rx, triggers_rx)
        .await;

    assert_eq!(code, EXIT_SUCCESS);
    assert_eq!(bot.lifecycle().state(), LifecycleState::Connecting);
    assert!(stub.registrations().is_empty());
    assert!(stub.posts().is_empty());
    assert_eq!(stub.destroy_count(), 1);
}
