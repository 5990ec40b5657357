//! Meal plans and adherence tracking.

use serde::{Deserialize, Serialize};

/// A meal plan prescribed to a patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Plan {
    pub id: String,
    pub name: String,
    /// Daily energy target
    pub kcal_target: u32,
    /// Whether this is the plan currently followed
    pub active: bool,
    pub sections: Vec<MealSection>,
    pub supplements: String,
    /// Foods to avoid
    pub avoid: String,
    pub created_at: String,
}

/// A meal slot (breakfast, lunch, ...) with its options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MealSection {
    pub title: String,
    pub options: Vec<Meal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Meal {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// One day of plan adherence, as checked off by the patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Adherence {
    /// Day (YYYY-MM-DD)
    pub date: String,
    /// Count of checked items
    pub completed: u32,
    /// Total items tracked
    pub total: u32,
    pub checks: Option<AdherenceChecks>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AdherenceChecks {
    pub breakfast: bool,
    pub lunch: bool,
    pub dinner: bool,
    pub supplements: bool,
}

impl Adherence {
    /// Build a day entry from the checklist; `completed`/`total` follow the checks.
    pub fn from_checks(date: impl Into<String>, checks: AdherenceChecks) -> Self {
        let ticks = [checks.breakfast, checks.lunch, checks.dinner, checks.supplements];
        Self {
            date: date.into(),
            completed: ticks.iter().filter(|t| **t).count() as u32,
            total: ticks.len() as u32,
            checks: Some(checks),
        }
    }
}
