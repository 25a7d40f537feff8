//! Error containment boundary around every handler invocation.
//!
//! A failing interaction must neither crash the process nor leave the caller
//! without a response. [`contain`] turns returned errors and panics into a
//! logged [`Failure`] and a best-effort ephemeral notice to the caller.

use crate::framework::CommandError;
use crate::interaction::Interaction;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use ticketbot_common::{panic_message, OutgoingMessage};
use tracing::{error, warn};

/// Text of the ephemeral notice sent after a failure.
pub const ERROR_REPLY: &str = "There was an error while executing this command!";

tokio::task_local! {
    static INTERACTION_ORIGIN: String;
}

/// Whether the current task is running inside [`contain`].
///
/// The process-level panic hook uses this to leave interaction panics to
/// the boundary.
pub fn in_interaction_scope() -> bool {
    INTERACTION_ORIGIN.try_with(|_| ()).is_ok()
}

/// A handler failure caught by the boundary.
#[derive(Debug)]
pub enum Failure {
    /// The handler returned an error.
    Error(CommandError),
    /// The handler panicked.
    Panic(String),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(e) => write!(f, "{e}"),
            Self::Panic(message) => write!(f, "panicked: {message}"),
        }
    }
}

/// Runs `work` for `interaction`, containing any failure.
pub async fn contain<F>(interaction: &Interaction, work: F) -> Result<(), Failure>
where
    F: Future<Output = Result<(), CommandError>> + Send,
{
    let event = interaction.event();
    let outcome = INTERACTION_ORIGIN
        .scope(event.origin().to_string(), AssertUnwindSafe(work).catch_unwind())
        .await;

    let failure = match outcome {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(e)) => Failure::Error(e),
        Err(payload) => Failure::Panic(panic_message(payload.as_ref())),
    };

    error!(
        origin = %event.origin(),
        caller = %event.caller_id(),
        error = %failure,
        "Error while handling interaction {}",
        event
    );
    notify_caller(interaction).await;
    Err(failure)
}

async fn notify_caller(interaction: &Interaction) {
    let notice = OutgoingMessage::ephemeral(ERROR_REPLY);
    let delivery = if interaction.is_acknowledged() {
        interaction.follow_up(notice).await
    } else {
        interaction.reply(notice).await
    };

    if let Err(e) = delivery {
        warn!(
            origin = %interaction.event().origin(),
            caller = %interaction.caller_id(),
            "Could not notify caller about the failure: {}",
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::InteractionEvent;
    use ticketbot_common::test_utils::{RecordingResponder, ResponseKind};
    use ticketbot_common::UserId;

    fn interaction(responder: std::sync::Arc<RecordingResponder>) -> Interaction {
        Interaction::new(
            InteractionEvent::ChatInputCommand {
                command_name: "boom".to_string(),
                caller_id: UserId(1),
                caller_tag: "alice".to_string(),
            },
            responder,
        )
    }

    #[tokio::test]
    async fn test_success_sends_nothing_extra() {
        let responder = RecordingResponder::new();
        let result = contain(&interaction(responder.clone()), async { Ok::<(), CommandError>(()) }).await;
        assert!(result.is_ok());
        assert!(responder.sent().is_empty());
    }

    #[tokio::test]
    async fn test_error_before_reply_sends_ephemeral_reply() {
        let responder = RecordingResponder::new();
        let result = contain(&interaction(responder.clone()), async { Err::<(), CommandError>("db down".into()) }).await;

        assert!(matches!(result, Err(Failure::Error(_))));
        let sent = responder.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ResponseKind::Reply);
        assert!(sent[0].1.ephemeral);
        assert_eq!(sent[0].1.content, ERROR_REPLY);
    }

    #[tokio::test]
    async fn test_error_after_deferral_sends_follow_up() {
        let responder = RecordingResponder::new();
        let interaction = interaction(responder.clone());
        let work = async {
            interaction.defer(true).await?;
            Err::<(), CommandError>("late failure".into())
        };

        assert!(contain(&interaction, work).await.is_err());
        let sent = responder.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ResponseKind::FollowUp);
        assert!(sent[0].1.ephemeral);
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let responder = RecordingResponder::new();
        let result = contain(&interaction(responder.clone()), async {
            if responder.deferrals() == 0 {
                panic!("handler exploded");
            }
            Ok::<(), CommandError>(())
        })
        .await;

        match result {
            Err(Failure::Panic(message)) => assert_eq!(message, "handler exploded"),
            other => panic!("expected a contained panic, got {other:?}"),
        }
        assert_eq!(responder.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_undeliverable_notice_is_swallowed() {
        let responder = RecordingResponder::failing();
        let result = contain(&interaction(responder.clone()), async { Err::<(), CommandError>("boom".into()) }).await;
        assert!(matches!(result, Err(Failure::Error(_))));
        assert!(responder.sent().is_empty());
    }

    #[tokio::test]
    async fn test_scope_is_visible_only_inside_the_boundary() {
        assert!(!in_interaction_scope());
        let responder = RecordingResponder::new();
        contain(&interaction(responder), async {
            assert!(in_interaction_scope());
            Ok::<(), CommandError>(())
        })
        .await
        .unwrap();
    }
}
