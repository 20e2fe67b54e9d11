//! Dialogue session state types

use crate::catalog::{self, MenuOption};
use crate::resolver::Resolution;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const GREETING: &str = "Hello! I'm your healthcare assistant. How can I help you today?";

/// Shown by the presentation layer next to the star buttons
pub const RATING_PROMPT: &str = "How would you rate this conversation?";

/// Accepted star ratings
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

/// One entry of the chat log; never mutated once appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    #[serde(default)]
    pub options: Vec<MenuOption>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            options: Vec::new(),
        }
    }

    pub fn bot(text: impl Into<String>, options: Vec<MenuOption>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            options,
        }
    }

    pub fn greeting() -> Self {
        Self::bot(GREETING, catalog::lookup(catalog::MAIN).to_vec())
    }

    pub fn rating_acknowledgement(stars: u8) -> Self {
        Self::bot(format!("Thank you for your {stars}-star rating!"), Vec::new())
    }
}

// ============================================================================
// Session data
// ============================================================================

/// Answers collected so far, keyed by the step they were given at.
///
/// Last write wins if a step is answered twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionData(BTreeMap<String, String>);

impl SessionData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: impl Into<String>, option_id: impl Into<String>) {
        self.0.insert(step.into(), option_id.into());
    }

    pub fn get(&self, step: &str) -> Option<&str> {
        self.0.get(step).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ============================================================================
// Session
// ============================================================================

/// Where the widget is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Phase {
    Closed,
    /// Options for `step` are shown and a choice is expected
    Awaiting { step: String },
    /// A choice was made; the bot reply is still pending
    Typing { step: String },
    /// Branch finished, waiting for a star rating
    RatingPending,
    /// Rating accepted; the session resets after a delay
    Resetting { stars: u8 },
}

/// State of one open assistant widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueSession {
    pub id: Uuid,
    pub current_step: String,
    pub data: SessionData,
    pub log: Vec<Message>,
    pub rating_active: bool,
    /// 0 until a rating is accepted
    pub rating: u8,
    /// Reply resolved at selection time, emitted once the typing delay elapses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_reply: Option<Resolution>,
}

impl DialogueSession {
    /// Fresh session: greeting with the main menu, nothing answered yet
    pub fn open(id: Uuid) -> Self {
        Self {
            id,
            current_step: catalog::MAIN.to_string(),
            data: SessionData::new(),
            log: vec![Message::greeting()],
            rating_active: false,
            rating: 0,
            pending_reply: None,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.rating_active {
            if self.rating == 0 {
                Phase::RatingPending
            } else {
                Phase::Resetting { stars: self.rating }
            }
        } else if self.pending_reply.is_some() {
            Phase::Typing {
                step: self.current_step.clone(),
            }
        } else {
            Phase::Awaiting {
                step: self.current_step.clone(),
            }
        }
    }

    /// Options the user can currently pick from.
    ///
    /// Empty while typing or rating; options of older messages are stale.
    pub fn available_options(&self) -> &[MenuOption] {
        if self.rating_active || self.pending_reply.is_some() {
            return &[];
        }
        match self.log.last() {
            Some(message) if message.sender == Sender::Bot => &message.options,
            _ => &[],
        }
    }
}

/// Widget state: closed, or open with exactly one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetState {
    #[default]
    Closed,
    Open(DialogueSession),
}

impl WidgetState {
    pub fn session(&self) -> Option<&DialogueSession> {
        match self {
            WidgetState::Closed => None,
            WidgetState::Open(session) => Some(session),
        }
    }

    pub fn phase(&self) -> Phase {
        self.session().map_or(Phase::Closed, DialogueSession::phase)
    }

    pub fn is_open(&self) -> bool {
        matches!(self, WidgetState::Open(_))
    }
}
