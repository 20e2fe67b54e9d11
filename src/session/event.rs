//! Events that drive the dialogue session

use uuid::Uuid;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // Widget events
    /// Open (or reopen) the assistant with a fresh session
    Open { session_id: Uuid },
    Close,

    // User events
    SelectOption {
        /// Step the option was rendered under; `None` means the current step
        step: Option<String>,
        option_id: String,
        label: String,
    },
    SubmitRating { stars: u8 },

    // Timer events
    /// Typing delay elapsed for the reply pending in `session_id`
    ReplyDue { session_id: Uuid },
    /// Post-rating delay elapsed; replace `session_id` with a fresh session
    ResetDue { session_id: Uuid, fresh_id: Uuid },
}

impl Event {
    pub fn select(option_id: impl Into<String>, label: impl Into<String>) -> Self {
        Event::SelectOption {
            step: None,
            option_id: option_id.into(),
            label: label.into(),
        }
    }

    pub fn select_at(
        step: impl Into<String>,
        option_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Event::SelectOption {
            step: Some(step.into()),
            option_id: option_id.into(),
            label: label.into(),
        }
    }

    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Open { .. } => "open",
            Event::Close => "close",
            Event::SelectOption { .. } => "select_option",
            Event::SubmitRating { .. } => "submit_rating",
            Event::ReplyDue { .. } => "reply_due",
            Event::ResetDue { .. } => "reset_due",
        }
    }
}
