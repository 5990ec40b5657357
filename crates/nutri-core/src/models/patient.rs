//! Patient records.

use serde::{Deserialize, Deserializer, Serialize};

use super::{Adherence, Anthropometry, ClinicalHistory, LabResult, Lifestyle, Plan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    M,
    F,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::F => "F",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "M" => Some(Gender::M),
            "F" => Some(Gender::F),
            _ => None,
        }
    }
}

/// Evolution note written at a consultation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Note {
    pub id: String,
    /// Consultation date (YYYY-MM-DD)
    pub date: String,
    pub objective: String,
    pub observations: String,
    /// Attached image URLs
    pub images: Vec<String>,
    /// Follow-up appointment date (YYYY-MM-DD)
    pub next_appointment: Option<String>,
}

impl Note {
    pub fn new(date: impl Into<String>, objective: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date: date.into(),
            objective: objective.into(),
            ..Default::default()
        }
    }
}

/// The aggregate patient record. Every sub-collection is owned by the patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Unique, stable patient ID
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Date of birth (YYYY-MM-DD)
    pub dob: String,
    pub gender: Gender,
    pub occupation: String,
    pub marital_status: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
    pub notes: Vec<Note>,
    pub lifestyle: Lifestyle,
    pub anthropometry: Vec<Anthropometry>,
    pub clinical: ClinicalHistory,
    pub plans: Vec<Plan>,
    pub adherence: Vec<Adherence>,
    pub labs: Vec<LabResult>,
}

/// Input for the new-patient flow.
#[derive(Debug, Clone, Default)]
pub struct NewPatient {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub dob: String,
    pub gender: Gender,
    pub occupation: String,
    pub marital_status: Option<String>,
    pub address: Option<String>,
}

impl Patient {
    /// Create a patient with a generated ID and empty history.
    pub fn new(input: NewPatient) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), input)
    }

    /// Create a patient with a caller-chosen ID (seed data, imports).
    pub fn with_id(id: impl Into<String>, input: NewPatient) -> Self {
        Self {
            id: id.into(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            dob: input.dob,
            gender: input.gender,
            occupation: input.occupation,
            marital_status: input.marital_status,
            address: input.address,
            avatar_url: None,
            notes: Vec::new(),
            lifestyle: Lifestyle::default(),
            anthropometry: Vec::new(),
            clinical: ClinicalHistory::default(),
            plans: Vec::new(),
            adherence: Vec::new(),
            labs: Vec::new(),
        }
    }

    /// Most recent measurement by date.
    pub fn latest_measurement(&self) -> Option<&Anthropometry> {
        self.anthropometry
            .iter()
            .max_by(|a, b| crate::metrics::compare_dates(&a.date, &b.date))
    }

    pub fn active_plan(&self) -> Option<&Plan> {
        self.plans.iter().find(|p| p.active)
    }
}

/// Top-level field of a patient record, as touched by a [`PatientUpdate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatientField {
    Name,
    Email,
    Phone,
    Dob,
    Gender,
    Occupation,
    MaritalStatus,
    Address,
    AvatarUrl,
    Notes,
    Lifestyle,
    Anthropometry,
    Clinical,
    Plans,
    Adherence,
    Labs,
}

impl PatientField {
    /// Wire name, matching the serialized record key.
    pub fn as_str(self) -> &'static str {
        match self {
            PatientField::Name => "name",
            PatientField::Email => "email",
            PatientField::Phone => "phone",
            PatientField::Dob => "dob",
            PatientField::Gender => "gender",
            PatientField::Occupation => "occupation",
            PatientField::MaritalStatus => "marital_status",
            PatientField::Address => "address",
            PatientField::AvatarUrl => "avatar_url",
            PatientField::Notes => "notes",
            PatientField::Lifestyle => "lifestyle",
            PatientField::Anthropometry => "anthropometry",
            PatientField::Clinical => "clinical",
            PatientField::Plans => "plans",
            PatientField::Adherence => "adherence",
            PatientField::Labs => "labs",
        }
    }
}

/// Partial update of a patient record.
///
/// Merge is shallow: each `Some` field replaces the record's field wholesale
/// (nested structs and collections included), `None` leaves it untouched. There
/// is no `id` field, so a patient's ID cannot change.
///
/// Deserializes from the record's own keys; unknown keys are rejected, and
/// `null` on `marital_status`, `address` or `avatar_url` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<Gender>,
    pub occupation: Option<String>,
    #[serde(deserialize_with = "present")]
    pub marital_status: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub address: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub avatar_url: Option<Option<String>>,
    pub notes: Option<Vec<Note>>,
    pub lifestyle: Option<Lifestyle>,
    pub anthropometry: Option<Vec<Anthropometry>>,
    pub clinical: Option<ClinicalHistory>,
    pub plans: Option<Vec<Plan>>,
    pub adherence: Option<Vec<Adherence>>,
    pub labs: Option<Vec<LabResult>>,
}

impl PatientUpdate {
    /// Fields this update would overwrite.
    pub fn fields(&self) -> Vec<PatientField> {
        let present = [
            (self.name.is_some(), PatientField::Name),
            (self.email.is_some(), PatientField::Email),
            (self.phone.is_some(), PatientField::Phone),
            (self.dob.is_some(), PatientField::Dob),
            (self.gender.is_some(), PatientField::Gender),
            (self.occupation.is_some(), PatientField::Occupation),
            (self.marital_status.is_some(), PatientField::MaritalStatus),
            (self.address.is_some(), PatientField::Address),
            (self.avatar_url.is_some(), PatientField::AvatarUrl),
            (self.notes.is_some(), PatientField::Notes),
            (self.lifestyle.is_some(), PatientField::Lifestyle),
            (self.anthropometry.is_some(), PatientField::Anthropometry),
            (self.clinical.is_some(), PatientField::Clinical),
            (self.plans.is_some(), PatientField::Plans),
            (self.adherence.is_some(), PatientField::Adherence),
            (self.labs.is_some(), PatientField::Labs),
        ];
        present
            .into_iter()
            .filter_map(|(set, field)| set.then_some(field))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Merge into a record.
    pub fn apply_to(self, patient: &mut Patient) {
        if let Some(v) = self.name {
            patient.name = v;
        }
        if let Some(v) = self.email {
            patient.email = v;
        }
        if let Some(v) = self.phone {
            patient.phone = v;
        }
        if let Some(v) = self.dob {
            patient.dob = v;
        }
        if let Some(v) = self.gender {
            patient.gender = v;
        }
        if let Some(v) = self.occupation {
            patient.occupation = v;
        }
        if let Some(v) = self.marital_status {
            patient.marital_status = v;
        }
        if let Some(v) = self.address {
            patient.address = v;
        }
        if let Some(v) = self.avatar_url {
            patient.avatar_url = v;
        }
        if let Some(v) = self.notes {
            patient.notes = v;
        }
        if let Some(v) = self.lifestyle {
            patient.lifestyle = v;
        }
        if let Some(v) = self.anthropometry {
            patient.anthropometry = v;
        }
        if let Some(v) = self.clinical {
            patient.clinical = v;
        }
        if let Some(v) = self.plans {
            patient.plans = v;
        }
        if let Some(v) = self.adherence {
            patient.adherence = v;
        }
        if let Some(v) = self.labs {
            patient.labs = v;
        }
    }
}

/// A present key, `null` included, becomes `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Activity, Background};

    fn make_patient() -> Patient {
        Patient::with_id(
            "p1",
            NewPatient {
                name: "Ana López".into(),
                email: "ana@mail.com".into(),
                phone: "555-0101".into(),
                dob: "1990-04-12".into(),
                gender: Gender::F,
                occupation: "Docente".into(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_new_patient() {
        let patient = Patient::new(NewPatient {
            name: "Luis".into(),
            ..Default::default()
        });
        assert_eq!(patient.id.len(), 36);
        assert!(patient.notes.is_empty());
        assert!(patient.anthropometry.is_empty());
    }

    #[test]
    fn test_update_from_json() {
        let update: PatientUpdate =
            serde_json::from_str(r#"{"phone": "555-0000", "address": null}"#).unwrap();
        assert_eq!(update.phone.as_deref(), Some("555-0000"));
        assert_eq!(update.address, Some(None));
        assert_eq!(update.marital_status, None);
        assert_eq!(update.fields(), vec![PatientField::Phone, PatientField::Address]);

        assert!(serde_json::from_str::<PatientUpdate>(r#"{"id": "p2"}"#).is_err());
        assert!(serde_json::from_str::<PatientUpdate>("{}").unwrap().is_empty());
    }

    #[test]
    fn test_update_touches_only_present_fields() {
        let mut patient = make_patient();
        let update = PatientUpdate {
            phone: Some("555-9999".into()),
            ..Default::default()
        };
        assert_eq!(update.fields(), vec![PatientField::Phone]);

        update.apply_to(&mut patient);
        assert_eq!(patient.phone, "555-9999");
        assert_eq!(patient.name, "Ana López");
        assert_eq!(patient.id, "p1");
    }

    #[test]
    fn test_nested_struct_replaced_wholesale() {
        let mut patient = make_patient();
        patient.lifestyle.activity = Activity {
            regular: true,
            details: "Natación 3x semana".into(),
        };
        patient.lifestyle.diet.water = "2L".into();

        let replacement = Lifestyle {
            activity: Activity {
                regular: false,
                details: String::new(),
            },
            ..Default::default()
        };
        PatientUpdate {
            lifestyle: Some(replacement),
            ..Default::default()
        }
        .apply_to(&mut patient);

        // Not deep-merged: the untouched diet.water is gone too.
        assert!(!patient.lifestyle.activity.regular);
        assert_eq!(patient.lifestyle.diet.water, "");
    }

    #[test]
    fn test_clear_optional_field() {
        let mut patient = make_patient();
        patient.address = Some("Calle 1".into());
        patient.clinical.background = Background {
            motive: "Bajar de peso".into(),
            ..Default::default()
        };

        PatientUpdate {
            address: Some(None),
            ..Default::default()
        }
        .apply_to(&mut patient);

        assert_eq!(patient.address, None);
        assert_eq!(patient.clinical.background.motive, "Bajar de peso");
    }

    #[test]
    fn test_empty_update() {
        assert!(PatientUpdate::default().is_empty());
    }
}
