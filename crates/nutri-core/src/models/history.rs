//! Lifestyle and clinical history forms.
//!
//! Both are single structs owned by a patient and are replaced wholesale when a
//! partial update carries them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Food budget bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Budget {
    Bajo,
    #[default]
    Medio,
    Alto,
}

/// Lifestyle questionnaire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Lifestyle {
    pub activity: Activity,
    pub sleep: Sleep,
    pub diet: Diet,
    /// Bowel habit (constipation notes)
    pub bowel_movement: Option<String>,
    pub preferences: Preferences,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Activity {
    pub regular: bool,
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Sleep {
    pub hours: String,
    pub stress: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Diet {
    pub meals: String,
    pub water: String,
    pub alcohol: bool,
    pub tobacco: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Preferences {
    pub likes: String,
    pub dislikes: String,
    pub budget: Budget,
    pub access: String,
    pub eating_out: String,
}

/// Clinical history form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClinicalHistory {
    pub background: Background,
    pub gyneco: Option<Gyneco>,
    pub recall_24h: Recall24h,
    /// Food group → consumption frequency (e.g. "Verduras" → "Diario")
    pub frequencies: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Background {
    /// Reason for consultation
    pub motive: String,
    pub medications: String,
    pub family_history: String,
    pub pathological: Option<Pathological>,
}

/// Pathological history checklist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Pathological {
    pub diabetes: bool,
    pub cancer: bool,
    pub dislipidemia: bool,
    pub anemia: bool,
    pub hypertension: bool,
    pub renal: bool,
    pub others: String,
    pub allergies: String,
}

impl Pathological {
    /// Names of the conditions that are checked.
    pub fn flagged_conditions(&self) -> Vec<&'static str> {
        [
            (self.diabetes, "diabetes"),
            (self.cancer, "cancer"),
            (self.dislipidemia, "dislipidemia"),
            (self.anemia, "anemia"),
            (self.hypertension, "hypertension"),
            (self.renal, "renal"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect()
    }
}

/// Gyneco-obstetric history (gestations, births, cesareans, last period).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Gyneco {
    pub g: String,
    pub p: String,
    pub c: String,
    pub fum: String,
    pub contraception: String,
}

/// 24-hour dietary recall.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Recall24h {
    pub breakfast: String,
    pub snack_am: String,
    pub lunch: String,
    pub snack_pm: String,
    pub dinner: String,
}

/// Food groups tracked by the frequency grid.
pub const FOOD_GROUPS: [&str; 13] = [
    "Verduras",
    "Frutas",
    "Cereales",
    "Tubérculos",
    "Leguminosas",
    "Carnes Rojas",
    "Pollo / Pavo",
    "Pescados",
    "Huevo",
    "Embutidos",
    "Lácteos",
    "Grasas",
    "Azúcares",
];

/// Allowed frequency values for the grid.
pub const FREQUENCIES: [&str; 5] = ["Diario", "Semanal", "Quincenal", "Ocasional", "Nunca"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flagged_conditions() {
        let p = Pathological {
            diabetes: true,
            hypertension: true,
            ..Default::default()
        };
        assert_eq!(p.flagged_conditions(), vec!["diabetes", "hypertension"]);
    }

    #[test]
    fn test_default_budget() {
        assert_eq!(Lifestyle::default().preferences.budget, Budget::Medio);
    }
}
