//! Pure state transition function
//!
//! Given the same state, config and event this always produces the same
//! result. Timers, cancellation and observer notification are described as
//! effects and carried out by the runtime.

use super::state::{DialogueSession, Message, WidgetState, RATING_RANGE};
use super::{Effect, Event};
use crate::config::EngineConfig;
use crate::resolver;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_state: WidgetState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: WidgetState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Rejected actions. None of them changes state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
    #[error("Waiting for a rating, options are closed")]
    RatingPending,
    #[error("No rating is being collected")]
    NotAwaitingRating,
    #[error("Rating already submitted")]
    AlreadyRated,
    #[error("Still replying to the previous choice")]
    ReplyPending,
    #[error("Option belongs to step {got}, current step is {expected}")]
    StaleStep { expected: String, got: String },
    #[error("Assistant is closed")]
    WidgetClosed,
    #[error("Timer event does not belong to the current session")]
    Stale,
}

/// Pure transition function
pub fn transition(
    state: &WidgetState,
    config: &EngineConfig,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Widget lifecycle
        // ============================================================

        // Any + Open -> fresh session, dropping anything still scheduled
        (_, Event::Open { session_id }) => {
            let session = DialogueSession::open(session_id);
            Ok(TransitionResult::new(WidgetState::Open(session.clone()))
                .with_effect(Effect::CancelPending)
                .with_effect(Effect::notify_opened(&session))
                .with_effect(Effect::notify_state_change(&session)))
        }

        (WidgetState::Open(_), Event::Close) => Ok(TransitionResult::new(WidgetState::Closed)
            .with_effect(Effect::CancelPending)
            .with_effect(Effect::notify_closed())),

        (WidgetState::Closed, Event::Close) => {
            Ok(TransitionResult::new(WidgetState::Closed).with_effect(Effect::CancelPending))
        }

        (WidgetState::Closed, Event::SelectOption { .. } | Event::SubmitRating { .. }) => {
            Err(TransitionError::WidgetClosed)
        }

        (WidgetState::Closed, Event::ReplyDue { .. } | Event::ResetDue { .. }) => {
            Err(TransitionError::Stale)
        }

        // ============================================================
        // Option selection
        // ============================================================
        (
            WidgetState::Open(session),
            Event::SelectOption {
                step,
                option_id,
                label,
            },
        ) => {
            if session.rating_active {
                return Err(TransitionError::RatingPending);
            }
            if session.pending_reply.is_some() {
                return Err(TransitionError::ReplyPending);
            }
            if let Some(step) = step {
                if step != session.current_step {
                    return Err(TransitionError::StaleStep {
                        expected: session.current_step.clone(),
                        got: step,
                    });
                }
            }

            let mut next = session.clone();
            let user_message = Message::user(label.clone());
            next.log.push(user_message.clone());
            next.data.record(next.current_step.clone(), option_id.clone());
            let resolution =
                resolver::resolve(&next.current_step, &option_id, &label, &next.data, config);
            next.pending_reply = Some(resolution);

            let effects = [
                Effect::notify_message(user_message),
                Effect::notify_state_change(&next),
                Effect::ScheduleReply {
                    session_id: next.id,
                    delay: config.reply_delay,
                },
            ];
            Ok(TransitionResult::new(WidgetState::Open(next)).with_effects(effects))
        }

        // Typing delay elapsed -> emit the reply, advance or start rating
        (WidgetState::Open(session), Event::ReplyDue { session_id })
            if session.id == session_id && session.pending_reply.is_some() =>
        {
            let mut next = session.clone();
            let Some(resolution) = next.pending_reply.take() else {
                return Err(TransitionError::Stale);
            };

            let bot_message = Message::bot(resolution.bot_text, resolution.next_options);
            next.log.push(bot_message.clone());
            if resolution.ends_branch {
                next.rating_active = true;
            } else {
                next.current_step = resolution.next_step;
            }

            let effects = [
                Effect::notify_message(bot_message),
                Effect::notify_state_change(&next),
            ];
            Ok(TransitionResult::new(WidgetState::Open(next)).with_effects(effects))
        }

        // ============================================================
        // Rating
        // ============================================================
        (WidgetState::Open(_), Event::SubmitRating { stars }) if !RATING_RANGE.contains(&stars) => {
            Err(TransitionError::InvalidRating(stars))
        }

        (WidgetState::Open(session), Event::SubmitRating { stars }) => {
            if !session.rating_active {
                return Err(TransitionError::NotAwaitingRating);
            }
            if session.rating != 0 {
                return Err(TransitionError::AlreadyRated);
            }

            let mut next = session.clone();
            next.rating = stars;
            let acknowledgement = Message::rating_acknowledgement(stars);
            next.log.push(acknowledgement.clone());

            let effects = [
                Effect::notify_message(acknowledgement),
                Effect::notify_state_change(&next),
                Effect::ScheduleReset {
                    session_id: next.id,
                    delay: config.reset_delay,
                },
            ];
            Ok(TransitionResult::new(WidgetState::Open(next)).with_effects(effects))
        }

        // Post-rating delay elapsed -> same state a fresh open would give
        (WidgetState::Open(session), Event::ResetDue { session_id, fresh_id })
            if session.id == session_id && session.rating != 0 =>
        {
            let fresh = DialogueSession::open(fresh_id);
            let effects = [Effect::notify_reset(&fresh), Effect::notify_state_change(&fresh)];
            Ok(TransitionResult::new(WidgetState::Open(fresh)).with_effects(effects))
        }

        // ============================================================
        // Stale timers
        // ============================================================
        (WidgetState::Open(_), Event::ReplyDue { .. } | Event::ResetDue { .. }) => {
            Err(TransitionError::Stale)
        }
    }
}
