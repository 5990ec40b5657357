//! Anthropometry CSV export.

use crate::metrics;
use crate::models::Patient;

const HEADER: &str = "date,weight_kg,height_cm,imc,waist_cm,hip_cm,abdomen_cm,arm_r_cm,notes\n";

/// Export a patient's measurements as CSV, oldest first.
pub fn anthropometry_csv(patient: &Patient) -> String {
    let mut rows: Vec<_> = patient.anthropometry.iter().collect();
    rows.sort_by(|a, b| metrics::compare_dates(&a.date, &b.date));

    let mut csv = String::from(HEADER);
    for m in rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            escape_csv(&m.date),
            m.weight,
            m.height,
            m.imc(),
            m.circumference.waist,
            m.circumference.hip,
            m.circumference.abdomen,
            m.circumference.arm_r,
            escape_csv(&m.notes),
        ));
    }
    csv
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Anthropometry, NewPatient};

    #[test]
    fn test_csv_rows_oldest_first() {
        let mut patient = Patient::with_id("p1", NewPatient::default());
        let mut later = Anthropometry::new("2024-03-01", 80.0, 175.0);
        later.notes = "Post vacaciones, retención".into();
        patient.anthropometry = vec![later, Anthropometry::new("2024-01-01", 70.0, 175.0)];

        let csv = anthropometry_csv(&patient);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,"));
        assert!(lines[1].starts_with("2024-01-01,70,175,22.9,"));
        assert!(lines[2].ends_with("\"Post vacaciones, retención\""));
    }

    #[test]
    fn test_csv_escaping() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
    }
}
