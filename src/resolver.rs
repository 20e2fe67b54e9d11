//! Transition resolver
//!
//! Maps `(current step, chosen option)` to the bot's reply. The branching lives
//! in an explicit rule table keyed by step; any step without a rule closes the
//! branch with a generic acknowledgement, which triggers the rating phase.
//!
//! Resolution is pure: no clock, no randomness, no I/O.

use crate::catalog::{self, MenuOption};
use crate::config::EngineConfig;
use crate::session::SessionData;
use serde::{Deserialize, Serialize};

/// Placeholder replaced with the chosen option's label
const LABEL: &str = "{label}";

/// What the bot says next and where the dialogue goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub next_step: String,
    pub bot_text: String,
    pub next_options: Vec<MenuOption>,
    /// The branch is finished; the session moves to the rating phase
    pub ends_branch: bool,
}

// ============================================================================
// Rule table
// ============================================================================

/// How a step reacts to a choice
#[derive(Debug)]
enum Rule {
    /// The chosen option id is itself the next step (top-level menu)
    EnterDomain { prompt: &'static str },
    /// Fixed follow-up question regardless of which option was picked
    Ask {
        next: &'static str,
        prompt: &'static str,
    },
    /// Follow-up depends on which option was picked
    Branch(&'static [Route]),
    /// End of the routine profile chain
    ProfileSummary,
}

#[derive(Debug)]
struct Route {
    option: &'static str,
    next: &'static str,
    prompt: &'static str,
}

const TRANSITIONS: &[(&str, Rule)] = &[
    (
        catalog::MAIN,
        Rule::EnterDomain {
            prompt: "You selected {label}. What would you like to know about {label}?",
        },
    ),
    (
        catalog::APPOINTMENT,
        Rule::Ask {
            next: catalog::APPOINTMENT_DETAILS,
            prompt: "You need an appointment for {label}. When would you like to schedule it?",
        },
    ),
    (
        catalog::SYMPTOMS,
        Rule::Ask {
            next: catalog::SYMPTOM_DETAILS,
            prompt: "You're experiencing {label}. How long have you had these symptoms?",
        },
    ),
    (
        catalog::MEDICINE,
        Rule::Ask {
            next: catalog::MEDICINE_DETAILS,
            prompt: "You need help with {label}. Please provide more details.",
        },
    ),
    (
        catalog::ROUTINE,
        Rule::Branch(&[
            Route {
                option: "exercise",
                next: catalog::EXERCISE_FREQUENCY,
                prompt: "How often do you exercise?",
            },
            Route {
                option: "diet",
                next: catalog::DIET_TYPE,
                prompt: "What type of diet do you follow?",
            },
            Route {
                option: "sleep",
                next: catalog::SLEEP_HOURS,
                prompt: "How many hours do you sleep on average?",
            },
            Route {
                option: "mental_health",
                next: catalog::MENTAL_HEALTH_FREQUENCY,
                prompt: "How often do you feel stressed or anxious?",
            },
        ]),
    ),
];

const AGE_PROMPT: &str = "Please select your age group:";

/// Only consulted when `EngineConfig::routine_profile` is set
const PROFILE_TRANSITIONS: &[(&str, Rule)] = &[
    (
        catalog::EXERCISE_FREQUENCY,
        Rule::Ask {
            next: catalog::ROUTINE_AGE,
            prompt: AGE_PROMPT,
        },
    ),
    (
        catalog::DIET_TYPE,
        Rule::Ask {
            next: catalog::ROUTINE_AGE,
            prompt: AGE_PROMPT,
        },
    ),
    (
        catalog::SLEEP_HOURS,
        Rule::Ask {
            next: catalog::ROUTINE_AGE,
            prompt: AGE_PROMPT,
        },
    ),
    (
        catalog::MENTAL_HEALTH_FREQUENCY,
        Rule::Ask {
            next: catalog::ROUTINE_AGE,
            prompt: AGE_PROMPT,
        },
    ),
    (
        catalog::ROUTINE_AGE,
        Rule::Ask {
            next: catalog::ROUTINE_WEIGHT,
            prompt: "Please select your weight category:",
        },
    ),
    (
        catalog::ROUTINE_WEIGHT,
        Rule::Ask {
            next: catalog::ROUTINE_LIFESTYLE,
            prompt: "Please select your lifestyle:",
        },
    ),
    (catalog::ROUTINE_LIFESTYLE, Rule::ProfileSummary),
];

fn rule_for(step: &str, config: &EngineConfig) -> Option<&'static Rule> {
    let profile: &'static [(&'static str, Rule)] = if config.routine_profile {
        PROFILE_TRANSITIONS
    } else {
        &[]
    };
    profile
        .iter()
        .chain(TRANSITIONS)
        .find(|(key, _)| *key == step)
        .map(|(_, rule)| rule)
}

/// Steps that have an explicit rule under `config`
pub fn enumerated_steps(config: &EngineConfig) -> Vec<&'static str> {
    let mut steps: Vec<_> = TRANSITIONS.iter().map(|(step, _)| *step).collect();
    if config.routine_profile {
        steps.extend(PROFILE_TRANSITIONS.iter().map(|(step, _)| *step));
    }
    steps
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the bot's reply to `label` (id `option_id`) chosen at `step`.
///
/// Total: combinations without a specific rule get the closing response.
pub fn resolve(
    step: &str,
    option_id: &str,
    label: &str,
    answers: &SessionData,
    config: &EngineConfig,
) -> Resolution {
    match rule_for(step, config) {
        Some(Rule::EnterDomain { prompt }) if catalog::find(step, option_id).is_some() => {
            ask(option_id, prompt, label)
        }
        Some(Rule::Ask { next, prompt }) => ask(next, prompt, label),
        Some(Rule::Branch(routes)) => match routes.iter().find(|r| r.option == option_id) {
            Some(route) => ask(route.next, route.prompt, label),
            None => closing(step, label),
        },
        Some(Rule::ProfileSummary) => profile_summary(step, label, answers),
        Some(Rule::EnterDomain { .. }) | None => closing(step, label),
    }
}

fn ask(next: &str, prompt: &str, label: &str) -> Resolution {
    Resolution {
        next_step: next.to_string(),
        bot_text: prompt.replace(LABEL, label),
        next_options: catalog::lookup(next).to_vec(),
        ends_branch: false,
    }
}

fn closing(step: &str, label: &str) -> Resolution {
    Resolution {
        next_step: step.to_string(),
        bot_text: format!(
            "Thank you for your response. I have noted your {step} concern about {label}. \
             A healthcare professional will contact you shortly."
        ),
        next_options: Vec::new(),
        ends_branch: true,
    }
}

fn profile_summary(step: &str, lifestyle: &str, answers: &SessionData) -> Resolution {
    let age = answer_label(answers, catalog::ROUTINE_AGE);
    let weight = answer_label(answers, catalog::ROUTINE_WEIGHT);

    Resolution {
        next_step: step.to_string(),
        bot_text: format!(
            "Thank you for providing your information. Based on your profile \
             ({age}, {weight}, {lifestyle}), I can recommend a suitable health routine."
        ),
        next_options: Vec::new(),
        ends_branch: true,
    }
}

fn answer_label<'a>(answers: &'a SessionData, step: &str) -> &'a str {
    answers
        .get(step)
        .map_or("not provided", |id| catalog::label_of(step, id))
}
