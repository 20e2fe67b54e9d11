//! Static decision tree of selectable options
//!
//! Each step identifier maps to the ordered list of options offered while the
//! dialogue sits at that step. The table is built once and never mutated.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

// ============================================================================
// Step identifiers
// ============================================================================

pub const MAIN: &str = "main";

pub const APPOINTMENT: &str = "appointment";
pub const SYMPTOMS: &str = "symptoms";
pub const MEDICINE: &str = "medicine";
pub const ROUTINE: &str = "routine";

pub const APPOINTMENT_DETAILS: &str = "appointment_details";
pub const SYMPTOM_DETAILS: &str = "symptom_details";
pub const MEDICINE_DETAILS: &str = "medicine_details";

pub const EXERCISE_FREQUENCY: &str = "exercise_frequency";
pub const DIET_TYPE: &str = "diet_type";
pub const SLEEP_HOURS: &str = "sleep_hours";
pub const MENTAL_HEALTH_FREQUENCY: &str = "mental_health_frequency";

pub const ROUTINE_AGE: &str = "routine_age";
pub const ROUTINE_WEIGHT: &str = "routine_weight";
pub const ROUTINE_LIFESTYLE: &str = "routine_lifestyle";

// ============================================================================
// Option
// ============================================================================

/// A selectable choice shown under a bot message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuOption {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl MenuOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: None,
        }
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

// ============================================================================
// Catalog
// ============================================================================

fn options(pairs: &[(&str, &str)]) -> Vec<MenuOption> {
    pairs
        .iter()
        .map(|(id, label)| MenuOption::new(*id, *label))
        .collect()
}

static CATALOG: LazyLock<HashMap<&'static str, Vec<MenuOption>>> = LazyLock::new(|| {
    let mut table = HashMap::new();

    table.insert(
        MAIN,
        vec![
            MenuOption::new(APPOINTMENT, "Appointment").with_icon("📅"),
            MenuOption::new(SYMPTOMS, "Symptoms").with_icon("🤒"),
            MenuOption::new(MEDICINE, "Medicine").with_icon("💊"),
            MenuOption::new(ROUTINE, "Routine").with_icon("🔄"),
        ],
    );

    // Second level: one set per domain
    table.insert(
        APPOINTMENT,
        options(&[
            ("general", "General Physician"),
            ("specialist", "Specialist Doctor"),
            ("followup", "Follow-up Visit"),
            ("emergency", "Emergency Care"),
        ]),
    );
    table.insert(
        SYMPTOMS,
        options(&[
            ("fever", "Fever"),
            ("headache", "Headache"),
            ("stomach", "Stomach Pain"),
            ("other", "Other Symptoms"),
        ]),
    );
    table.insert(
        MEDICINE,
        options(&[
            ("prescription", "Prescription Refill"),
            ("information", "Medicine Information"),
            ("side_effects", "Side Effects"),
            ("interaction", "Drug Interactions"),
        ]),
    );
    table.insert(
        ROUTINE,
        options(&[
            ("exercise", "Exercise"),
            ("diet", "Diet"),
            ("sleep", "Sleep"),
            ("mental_health", "Mental Health"),
        ]),
    );

    // Domain detail questions
    table.insert(
        APPOINTMENT_DETAILS,
        options(&[
            ("asap", "As soon as possible"),
            ("this_week", "This week"),
            ("next_week", "Next week"),
            ("flexible", "Flexible timing"),
        ]),
    );
    table.insert(
        SYMPTOM_DETAILS,
        options(&[
            ("today", "Today only"),
            ("few_days", "A few days"),
            ("week", "About a week"),
            ("longer", "More than a week"),
        ]),
    );
    table.insert(
        MEDICINE_DETAILS,
        options(&[
            ("name", "Medicine name"),
            ("dosage", "Dosage information"),
            ("duration", "How long to take"),
            ("concern", "Specific concern"),
        ]),
    );

    // Routine follow-up questions
    table.insert(
        EXERCISE_FREQUENCY,
        options(&[
            ("daily", "Daily"),
            ("weekly", "3-4 times a week"),
            ("occasional", "Occasionally"),
            ("never", "Rarely/Never"),
        ]),
    );
    table.insert(
        DIET_TYPE,
        options(&[
            ("vegetarian", "Vegetarian"),
            ("non_vegetarian", "Non-vegetarian"),
            ("vegan", "Vegan"),
            ("other", "Other"),
        ]),
    );
    table.insert(
        SLEEP_HOURS,
        options(&[
            ("less5", "Less than 5 hours"),
            ("5-7", "5-7 hours"),
            ("7-9", "7-9 hours"),
            ("more9", "More than 9 hours"),
        ]),
    );
    table.insert(
        MENTAL_HEALTH_FREQUENCY,
        options(&[
            ("rarely", "Rarely"),
            ("sometimes", "Sometimes"),
            ("often", "Often"),
            ("always", "Almost always"),
        ]),
    );

    // Routine profile chain
    table.insert(
        ROUTINE_AGE,
        options(&[
            ("child", "Child (0-12)"),
            ("teen", "Teenager (13-19)"),
            ("adult", "Adult (20-59)"),
            ("senior", "Senior (60+)"),
        ]),
    );
    table.insert(
        ROUTINE_WEIGHT,
        options(&[
            ("underweight", "Underweight"),
            ("normal", "Normal"),
            ("overweight", "Overweight"),
            ("obese", "Obese"),
        ]),
    );
    table.insert(
        ROUTINE_LIFESTYLE,
        options(&[
            ("student", "Student"),
            ("working", "Working Professional"),
            ("homemaker", "Homemaker"),
            ("retired", "Retired"),
        ]),
    );

    table
});

/// Options offered at `step`, in display order.
///
/// Empty for any step with no further choices.
pub fn lookup(step: &str) -> &'static [MenuOption] {
    match CATALOG.get(step) {
        Some(options) => options,
        None => &[],
    }
}

/// Find a single option offered at `step`
pub fn find(step: &str, option_id: &str) -> Option<&'static MenuOption> {
    lookup(step).iter().find(|option| option.id == option_id)
}

/// Label for `option_id` at `step`, falling back to the raw id
pub fn label_of<'a>(step: &str, option_id: &'a str) -> &'a str {
    match find(step, option_id) {
        Some(option) => option.label.as_str(),
        None => option_id,
    }
}
