//! Full patient record export with an integrity digest.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ExportResult;
use crate::metrics::{self, ImcCategory};
use crate::models::Patient;

/// Export metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub patient_id: String,
    /// User who requested the export
    pub exported_by: String,
    /// Export timestamp (RFC 3339)
    pub exported_at: String,
    /// SHA-256 (hex) of the record's JSON serialization
    pub record_digest: String,
}

/// IMC materialized for one measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementImc {
    pub measurement_id: String,
    pub date: String,
    pub imc: f64,
    pub category: Option<ImcCategory>,
}

/// Values derived at export time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub age: Option<i32>,
    /// Chronological
    pub imc: Vec<MeasurementImc>,
    pub adherence_rate: Option<f64>,
}

/// A complete patient record export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordExport {
    pub metadata: ExportMetadata,
    pub patient: Patient,
    pub derived: DerivedMetrics,
}

impl RecordExport {
    /// Build an export of `patient` as of `today`.
    pub fn from_patient(patient: &Patient, exported_by: &str, today: NaiveDate) -> ExportResult<Self> {
        let mut imc: Vec<MeasurementImc> = patient
            .anthropometry
            .iter()
            .map(|m| MeasurementImc {
                measurement_id: m.id.clone(),
                date: m.date.clone(),
                imc: m.imc(),
                category: ImcCategory::classify(m.imc()),
            })
            .collect();
        imc.sort_by(|a, b| metrics::compare_dates(&a.date, &b.date));

        Ok(Self {
            metadata: ExportMetadata {
                patient_id: patient.id.clone(),
                exported_by: exported_by.to_string(),
                exported_at: chrono::Utc::now().to_rfc3339(),
                record_digest: record_digest(patient)?,
            },
            patient: patient.clone(),
            derived: DerivedMetrics {
                age: metrics::age_years(&patient.dob, today),
                imc,
                adherence_rate: metrics::adherence_rate(&patient.adherence),
            },
        })
    }

    /// Export to JSON.
    pub fn to_json(&self) -> ExportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that the embedded record still matches its digest.
    pub fn verify(&self) -> ExportResult<bool> {
        Ok(record_digest(&self.patient)? == self.metadata.record_digest)
    }
}

/// SHA-256 hex digest of a patient record's JSON serialization.
///
/// Field order is fixed by the struct definitions and maps are ordered, so
/// equal records always hash equal.
pub fn record_digest(patient: &Patient) -> ExportResult<String> {
    let json = serde_json::to_string(patient)?;
    Ok(hex::encode(Sha256::digest(json.as_bytes())))
}
