//! Derived clinical metrics.
//!
//! Everything here is a pure function of record data. Nothing computed here is
//! stored back into a record.

use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Adherence, Patient};

/// Date format used by every record date field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Body mass index from weight (kg) and height (cm), rounded to one decimal.
///
/// Returns `0.0` for a zero height.
pub fn imc(weight_kg: f64, height_cm: f64) -> f64 {
    if height_cm == 0.0 {
        return 0.0;
    }
    let height_m = height_cm / 100.0;
    round1(weight_kg / (height_m * height_m))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// WHO body mass index classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImcCategory {
    Underweight,
    Normal,
    Overweight,
    ObesityI,
    ObesityII,
    ObesityIII,
}

impl ImcCategory {
    /// Classify an IMC value. `None` for non-positive values (no measurement).
    pub fn classify(imc: f64) -> Option<Self> {
        if imc <= 0.0 || imc.is_nan() {
            return None;
        }
        Some(match imc {
            v if v < 18.5 => ImcCategory::Underweight,
            v if v < 25.0 => ImcCategory::Normal,
            v if v < 30.0 => ImcCategory::Overweight,
            v if v < 35.0 => ImcCategory::ObesityI,
            v if v < 40.0 => ImcCategory::ObesityII,
            _ => ImcCategory::ObesityIII,
        })
    }

    /// Label shown in the reference table.
    pub fn label(self) -> &'static str {
        match self {
            ImcCategory::Underweight => "Bajo Peso",
            ImcCategory::Normal => "Normal",
            ImcCategory::Overweight => "Sobrepeso",
            ImcCategory::ObesityI => "Obesidad I",
            ImcCategory::ObesityII => "Obesidad II",
            ImcCategory::ObesityIII => "Obesidad III",
        }
    }
}

/// Parse a `YYYY-MM-DD` record date.
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()
}

/// Chronological comparison of two record dates.
///
/// Parsed dates compare as dates; unparseable ones sort before parseable ones
/// and fall back to string order among themselves.
pub fn compare_dates(a: &str, b: &str) -> Ordering {
    match (parse_date(a), parse_date(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Age in years by naive year subtraction (month and day are ignored).
pub fn age_years(dob: &str, today: NaiveDate) -> Option<i32> {
    let birth_year = match parse_date(dob) {
        Some(date) => date.year(),
        None => dob.get(..4)?.parse().ok()?,
    };
    Some(today.year() - birth_year)
}

/// Patients with at least one note whose next appointment is exactly `date`.
pub fn agenda<'a>(patients: &'a [Patient], date: &str) -> Vec<&'a Patient> {
    patients
        .iter()
        .filter(|p| {
            p.notes
                .iter()
                .any(|n| n.next_appointment.as_deref() == Some(date))
        })
        .collect()
}

/// Adherence percentage over all tracked days. `None` when nothing is tracked.
pub fn adherence_rate(entries: &[Adherence]) -> Option<f64> {
    let (completed, total) = entries.iter().fold((0u64, 0u64), |(c, t), e| {
        (c + u64::from(e.completed), t + u64::from(e.total))
    });
    if total == 0 {
        return None;
    }
    Some(round1(completed as f64 * 100.0 / total as f64))
}
