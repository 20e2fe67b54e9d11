//! Effects produced by state transitions

use super::state::{DialogueSession, Message, Phase};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Deliver `Event::ReplyDue` for `session_id` after `delay`
    ScheduleReply { session_id: Uuid, delay: Duration },

    /// Deliver `Event::ResetDue` for `session_id` after `delay`
    ScheduleReset { session_id: Uuid, delay: Duration },

    /// Cancel whatever deferred emission is still outstanding
    CancelPending,

    /// Notify observers
    Notify(WidgetUpdate),
}

/// Updates published to observers of the widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetUpdate {
    Opened {
        session_id: Uuid,
        log: Vec<Message>,
    },
    Message {
        message: Message,
    },
    StateChange {
        phase: Phase,
        rating_active: bool,
        rating: u8,
    },
    /// Session replaced by a fresh one after a rating
    Reset {
        session_id: Uuid,
        log: Vec<Message>,
    },
    Closed,
}

impl Effect {
    pub fn notify_opened(session: &DialogueSession) -> Self {
        Effect::Notify(WidgetUpdate::Opened {
            session_id: session.id,
            log: session.log.clone(),
        })
    }

    pub fn notify_reset(session: &DialogueSession) -> Self {
        Effect::Notify(WidgetUpdate::Reset {
            session_id: session.id,
            log: session.log.clone(),
        })
    }

    pub fn notify_message(message: Message) -> Self {
        Effect::Notify(WidgetUpdate::Message { message })
    }

    pub fn notify_state_change(session: &DialogueSession) -> Self {
        Effect::Notify(WidgetUpdate::StateChange {
            phase: session.phase(),
            rating_active: session.rating_active,
            rating: session.rating,
        })
    }

    pub fn notify_closed() -> Self {
        Effect::Notify(WidgetUpdate::Closed)
    }
}
