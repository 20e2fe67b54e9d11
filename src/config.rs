//! Engine configuration

use std::time::Duration;

const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_RESET_DELAY: Duration = Duration::from_millis(2000);

/// Tunables for the dialogue engine (immutable once the runtime starts)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// "Bot is typing" delay before a reply is appended
    pub reply_delay: Duration,
    /// Delay between the rating acknowledgement and the session reset
    pub reset_delay: Duration,
    /// Continue routine branches into the age / weight / lifestyle questions
    /// instead of closing right after the first follow-up
    pub routine_profile: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reply_delay: DEFAULT_REPLY_DELAY,
            reset_delay: DEFAULT_RESET_DELAY,
            routine_profile: false,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            reply_delay: env_millis("CARE_ASSISTANT_REPLY_DELAY_MS").unwrap_or(defaults.reply_delay),
            reset_delay: env_millis("CARE_ASSISTANT_RESET_DELAY_MS").unwrap_or(defaults.reset_delay),
            routine_profile: env_flag("CARE_ASSISTANT_ROUTINE_PROFILE")
                .unwrap_or(defaults.routine_profile),
        }
    }

    #[must_use]
    pub fn with_routine_profile(mut self, enabled: bool) -> Self {
        self.routine_profile = enabled;
        self
    }

    #[must_use]
    pub fn with_delays(mut self, reply_delay: Duration, reset_delay: Duration) -> Self {
        self.reply_delay = reply_delay;
        self.reset_delay = reset_delay;
        self
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    let raw = std::env::var(key).ok()?;
    match parse_millis(&raw) {
        Some(delay) => Some(delay),
        None => {
            tracing::warn!(key, value = %raw, "Ignoring invalid delay, using default");
            None
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    let raw = std::env::var(key).ok()?;
    match parse_flag(&raw) {
        Some(flag) => Some(flag),
        None => {
            tracing::warn!(key, value = %raw, "Ignoring invalid flag, using default");
            None
        }
    }
}

fn parse_millis(raw: &str) -> Option<Duration> {
    raw.trim().parse::<u64>().ok().map(Duration::from_millis)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
