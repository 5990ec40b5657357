//! Anthropometric measurements.

use serde::{Deserialize, Serialize};

use crate::metrics;

/// One anthropometry visit.
///
/// IMC is not stored: [`Anthropometry::imc`] derives it from weight and height
/// on every read, so editing either value moves the IMC with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Anthropometry {
    /// Unique measurement ID
    pub id: String,
    /// Visit date (YYYY-MM-DD)
    pub date: String,
    /// Weight in kg
    pub weight: f64,
    /// Height in cm
    pub height: f64,
    /// Circumferences in cm
    pub circumference: Circumference,
    /// Skinfolds in mm
    pub folds: Folds,
    /// Free-text notes
    pub notes: String,
}

/// Body circumferences (cm).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Circumference {
    pub waist: f64,
    pub hip: f64,
    pub abdomen: f64,
    pub chest: f64,
    pub arm_r: f64,
    pub arm_l: f64,
    pub thigh: f64,
    pub calf: f64,
}

/// Skinfold thicknesses (mm).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Folds {
    pub tricipital: f64,
    pub bicipital: f64,
    pub subscapular: f64,
    pub suprailiac: f64,
    pub abdominal: f64,
    pub quadriceps: f64,
}

impl Anthropometry {
    /// Create a measurement with a generated ID.
    pub fn new(date: impl Into<String>, weight: f64, height: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date: date.into(),
            weight,
            height,
            ..Default::default()
        }
    }

    /// Body mass index, rounded to one decimal.
    pub fn imc(&self) -> f64 {
        metrics::imc(self.weight, self.height)
    }

    /// Apply an edit to this measurement.
    pub fn apply(&mut self, patch: MeasurementPatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(weight) = patch.weight {
            self.weight = weight;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(circumference) = patch.circumference {
            self.circumference = circumference;
        }
        if let Some(folds) = patch.folds {
            self.folds = folds;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
    }
}

/// Edit to a single measurement. `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementPatch {
    pub date: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub circumference: Option<Circumference>,
    pub folds: Option<Folds>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imc_follows_weight_edit() {
        let mut m = Anthropometry::new("2024-03-01", 70.0, 175.0);
        assert_eq!(m.imc(), 22.9);

        m.apply(MeasurementPatch {
            weight: Some(80.0),
            ..Default::default()
        });
        assert_eq!(m.imc(), 26.1);
        assert_eq!(m.height, 175.0);
    }

    #[test]
    fn test_zero_height_imc() {
        let m = Anthropometry::new("2024-03-01", 70.0, 0.0);
        assert_eq!(m.imc(), 0.0);
    }

    #[test]
    fn test_new_measurement_has_uuid() {
        let m = Anthropometry::new("2024-03-01", 70.0, 175.0);
        assert_eq!(m.id.len(), 36);
        assert_eq!(m.circumference, Circumference::default());
    }
}
