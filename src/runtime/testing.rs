//! Test helpers for driving a widget runtime
//!
//! Tests run on a paused tokio clock so the typing and reset delays elapse
//! deterministically.

use super::{spawn, RuntimeError, WidgetHandle};
use crate::config::EngineConfig;
use crate::session::{DialogueSession, Message, Phase, Sender, WidgetState, WidgetUpdate};
use std::time::Duration;
use tokio::sync::broadcast;

// ============================================================================
// Update recorder
// ============================================================================

/// Collects every update published by a runtime
pub struct UpdateRecorder {
    rx: broadcast::Receiver<WidgetUpdate>,
    pub seen: Vec<WidgetUpdate>,
}

#[allow(dead_code)]
impl UpdateRecorder {
    pub fn new(handle: &WidgetHandle) -> Self {
        Self {
            rx: handle.subscribe(),
            seen: Vec::new(),
        }
    }

    /// Pull everything published so far
    pub fn drain(&mut self) -> &[WidgetUpdate] {
        while let Ok(update) = self.rx.try_recv() {
            self.seen.push(update);
        }
        &self.seen
    }

    /// Messages announced through updates, in order
    pub fn messages(&mut self) -> Vec<Message> {
        self.drain()
            .iter()
            .filter_map(|update| match update {
                WidgetUpdate::Message { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn test_config() -> EngineConfig {
    EngineConfig::default()
}

pub fn open_session(handle: &WidgetHandle) -> DialogueSession {
    handle
        .snapshot()
        .session()
        .cloned()
        .expect("widget should be open")
}

/// Longer than the typing delay
pub async fn wait_for_reply() {
    tokio::time::sleep(Duration::from_millis(600)).await;
}

/// Longer than the reset delay
pub async fn wait_for_reset() {
    tokio::time::sleep(Duration::from_millis(2100)).await;
}

/// Pick an option and let the reply arrive
pub async fn choose(handle: &WidgetHandle, option_id: &str, label: &str) {
    handle.select_option(option_id, label).await.unwrap();
    wait_for_reply().await;
}

/// Open and walk the appointment branch into the rating phase
pub async fn reach_rating(handle: &WidgetHandle) {
    handle.open().await.unwrap();
    choose(handle, "appointment", "Appointment").await;
    choose(handle, "general", "General Physician").await;
    choose(handle, "asap", "As soon as possible").await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TransitionError;
    use crate::session::state::GREETING;

    #[tokio::test(start_paused = true)]
    async fn test_open_shows_greeting() {
        let handle = spawn(test_config());
        assert_eq!(handle.snapshot(), WidgetState::Closed);

        let session_id = handle.open().await.unwrap();
        let session = open_session(&handle);
        assert_eq!(session.id, session_id);
        assert_eq!(session.current_step, "main");
        assert_eq!(session.log, vec![Message::greeting()]);
        assert_eq!(session.log[0].text, GREETING);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_arrives_after_typing_delay() {
        let handle = spawn(test_config());
        let mut updates = UpdateRecorder::new(&handle);
        handle.open().await.unwrap();

        handle.select_option("appointment", "Appointment").await.unwrap();
        let session = open_session(&handle);
        assert_eq!(session.log.len(), 2);
        assert_eq!(session.log[1], Message::user("Appointment"));
        assert_eq!(session.phase(), Phase::Typing { step: "main".into() });

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(open_session(&handle).log.len(), 2, "reply must wait for the delay");

        tokio::time::sleep(Duration::from_millis(200)).await;
        let session = open_session(&handle);
        assert_eq!(session.log.len(), 3);
        assert_eq!(session.current_step, "appointment");
        assert_eq!(session.log[2].sender, Sender::Bot);
        assert_eq!(session.log[2].options.len(), 4);

        let announced = updates.messages();
        assert_eq!(announced, session.log[1..].to_vec());
    }

    #[tokio::test(start_paused = true)]
    async fn test_branch_end_starts_rating() {
        let handle = spawn(test_config());
        reach_rating(&handle).await;

        let session = open_session(&handle);
        assert!(session.rating_active);
        assert_eq!(session.phase(), Phase::RatingPending);
        assert!(session.log.last().unwrap().options.is_empty());
        assert_eq!(session.data.get("main"), Some("appointment"));
        assert_eq!(session.data.get("appointment"), Some("general"));
        assert_eq!(session.data.get("appointment_details"), Some("asap"));

        let err = handle.select_option("asap", "As soon as possible").await;
        assert!(matches!(
            err,
            Err(RuntimeError::Rejected(TransitionError::RatingPending))
        ));
        assert_eq!(open_session(&handle).log, session.log);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rating_resets_to_fresh_session() {
        let handle = spawn(test_config());
        let mut updates = UpdateRecorder::new(&handle);
        reach_rating(&handle).await;
        let rated_id = open_session(&handle).id;

        handle.submit_rating(4).await.unwrap();
        let session = open_session(&handle);
        assert_eq!(session.rating, 4);
        assert_eq!(
            session.log.last().unwrap().text,
            "Thank you for your 4-star rating!"
        );

        wait_for_reset().await;
        let session = open_session(&handle);
        assert_ne!(session.id, rated_id);
        assert_eq!(session, DialogueSession::open(session.id));
        assert!(updates
            .drain()
            .iter()
            .any(|u| matches!(u, WidgetUpdate::Reset { session_id, .. } if *session_id == session.id)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_rating_changes_nothing() {
        let handle = spawn(test_config());
        reach_rating(&handle).await;
        let before = handle.snapshot();

        let err = handle.submit_rating(7).await;
        assert!(matches!(
            err,
            Err(RuntimeError::Rejected(TransitionError::InvalidRating(7)))
        ));
        assert_eq!(handle.snapshot(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rating_rejected_while_awaiting_choice() {
        let handle = spawn(test_config());
        handle.open().await.unwrap();

        let err = handle.submit_rating(3).await;
        assert!(matches!(
            err,
            Err(RuntimeError::Rejected(TransitionError::NotAwaitingRating))
        ));
        assert_eq!(open_session(&handle).log.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_while_typing_drops_reply() {
        let handle = spawn(test_config());
        let mut updates = UpdateRecorder::new(&handle);
        handle.open().await.unwrap();
        handle.select_option("symptoms", "Symptoms").await.unwrap();

        handle.close().await.unwrap();
        updates.drain();
        let seen_at_close = updates.seen.len();

        wait_for_reset().await;
        assert_eq!(handle.snapshot(), WidgetState::Closed);
        assert_eq!(updates.drain().len(), seen_at_close, "nothing after close");

        handle.open().await.unwrap();
        wait_for_reset().await;
        let session = open_session(&handle);
        assert_eq!(session.log, vec![Message::greeting()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reopen_while_typing_drops_reply() {
        let handle = spawn(test_config());
        handle.open().await.unwrap();
        handle.select_option("medicine", "Medicine").await.unwrap();

        let fresh = handle.open().await.unwrap();
        wait_for_reply().await;
        let session = open_session(&handle);
        assert_eq!(session, DialogueSession::open(fresh));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_during_reset_delay_stays_closed() {
        let handle = spawn(test_config());
        reach_rating(&handle).await;
        handle.submit_rating(5).await.unwrap();
        handle.close().await.unwrap();

        wait_for_reset().await;
        assert_eq!(handle.snapshot(), WidgetState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_while_typing_rejected() {
        let handle = spawn(test_config());
        handle.open().await.unwrap();
        handle.select_option("routine", "Routine").await.unwrap();

        let err = handle.select_option("symptoms", "Symptoms").await;
        assert!(matches!(
            err,
            Err(RuntimeError::Rejected(TransitionError::ReplyPending))
        ));

        wait_for_reply().await;
        let session = open_session(&handle);
        assert_eq!(session.current_step, "routine");
        assert_eq!(session.log.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_step_context_rejected() {
        let handle = spawn(test_config());
        handle.open().await.unwrap();
        choose(&handle, "routine", "Routine").await;

        let err = handle.select_option_at("main", "symptoms", "Symptoms").await;
        assert!(matches!(
            err,
            Err(RuntimeError::Rejected(TransitionError::StaleStep { .. }))
        ));

        handle.select_option_at("routine", "sleep", "Sleep").await.unwrap();
        wait_for_reply().await;
        assert_eq!(open_session(&handle).current_step, "sleep_hours");
    }

    #[tokio::test(start_paused = true)]
    async fn test_actions_on_closed_widget_rejected() {
        let handle = spawn(test_config());
        let err = handle.select_option("appointment", "Appointment").await;
        assert!(matches!(
            err,
            Err(RuntimeError::Rejected(TransitionError::WidgetClosed))
        ));
        assert!(handle.close().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_delays_are_honoured() {
        let config = test_config().with_delays(Duration::from_secs(3), Duration::from_secs(1));
        let handle = spawn(config);
        handle.open().await.unwrap();
        handle.select_option("symptoms", "Symptoms").await.unwrap();

        wait_for_reset().await;
        assert_eq!(open_session(&handle).log.len(), 2);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(open_session(&handle).log.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runtime_stops_when_handles_dropped() {
        let (runtime, handle) = crate::runtime::build(test_config());
        let task = tokio::spawn(runtime.run());
        handle.open().await.unwrap();
        handle.select_option("symptoms", "Symptoms").await.unwrap();

        drop(handle);
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("runtime should stop")
            .unwrap();
    }
}
