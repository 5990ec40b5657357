//! Read surface of the store.
//!
//! Raw accessors (`patients`, `patient`, ...) return what is stored. The view
//! accessors authorize against the current session and attach derived values
//! (age, IMC, sort order) at read time.

use chrono::NaiveDate;
use serde::Serialize;

use super::{NutriStore, StoreError, StoreResult};
use crate::auth::{self, authorize, Action, Route, RouteDecision, Tab, TabAccess};
use crate::export::{self, RecordExport};
use crate::metrics::{self, ImcCategory};
use crate::models::{Note, Patient, ThemeConfig, User};
use crate::search::{self, SearchHit};

/// A patient record with values derived for display.
#[derive(Debug, Clone, Serialize)]
pub struct PatientView {
    pub patient: Patient,
    /// Years since birth year
    pub age: Option<i32>,
    /// IMC of the most recent measurement
    pub latest_imc: Option<f64>,
    pub imc_category: Option<ImcCategory>,
    /// Percentage of plan items checked off
    pub adherence_rate: Option<f64>,
}

/// One point of the anthropometry chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementPoint {
    pub measurement_id: String,
    pub date: String,
    pub weight: f64,
    pub height: f64,
    pub imc: f64,
    pub waist: f64,
    pub hip: f64,
}

/// Roster entry on the dashboard follow-up list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowUp {
    pub patient_id: String,
    pub name: String,
    pub last_note_date: Option<String>,
}

/// Dashboard figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_patients: usize,
    pub active_plans: usize,
    /// Lab markers flagged high or low across the roster
    pub lab_alerts: usize,
    pub follow_ups: Vec<FollowUp>,
}

impl NutriStore {
    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn theme(&self) -> &ThemeConfig {
        &self.theme
    }

    /// Incremented on every successful write.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Linear lookup by ID, without authorization.
    pub fn patient(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    /// Route gate for the current session.
    pub fn resolve_route(&self, route: &Route) -> RouteDecision {
        auth::resolve(route, self.current_user(), &self.patients)
    }

    /// Tab gate for the current session.
    pub fn tab_access(&self, patient_id: &str, tab: Tab) -> TabAccess {
        auth::tab_access(self.current_user(), patient_id, tab)
    }

    /// Authorized lookup; the caller redirects on `PatientNotFound`.
    pub fn view_patient(&self, id: &str) -> StoreResult<&Patient> {
        authorize(self.current_user(), &Action::ViewPatient(id))?;
        self.patient(id)
            .ok_or_else(|| StoreError::PatientNotFound(id.to_string()))
    }

    /// Patients the current session may list: the roster for clinicians, the
    /// linked record for patients.
    pub fn visible_patients(&self) -> StoreResult<Vec<&Patient>> {
        let user = self.current_user();
        if auth::check(user, &Action::ViewRoster).allowed {
            return Ok(self.patients.iter().collect());
        }

        let linked = user
            .ok_or(auth::AuthError::NotAuthenticated)?
            .linked_patient();
        Ok(self
            .patients
            .iter()
            .filter(|p| Some(p.id.as_str()) == linked)
            .collect())
    }

    /// Patient record with derived values, relative to today.
    pub fn patient_view(&self, id: &str) -> StoreResult<PatientView> {
        self.patient_view_on(id, chrono::Local::now().date_naive())
    }

    /// Patient record with derived values, relative to `today`.
    pub fn patient_view_on(&self, id: &str, today: NaiveDate) -> StoreResult<PatientView> {
        let patient = self.view_patient(id)?;
        let latest_imc = patient.latest_measurement().map(|m| m.imc());

        Ok(PatientView {
            age: metrics::age_years(&patient.dob, today),
            latest_imc,
            imc_category: latest_imc.and_then(ImcCategory::classify),
            adherence_rate: metrics::adherence_rate(&patient.adherence),
            patient: patient.clone(),
        })
    }

    /// Measurements in chronological order, for charting.
    pub fn anthropometry_series(&self, id: &str) -> StoreResult<Vec<MeasurementPoint>> {
        let patient = self.view_patient(id)?;
        let mut points: Vec<MeasurementPoint> = patient
            .anthropometry
            .iter()
            .map(|m| MeasurementPoint {
                measurement_id: m.id.clone(),
                date: m.date.clone(),
                weight: m.weight,
                height: m.height,
                imc: m.imc(),
                waist: m.circumference.waist,
                hip: m.circumference.hip,
            })
            .collect();
        points.sort_by(|a, b| metrics::compare_dates(&a.date, &b.date));
        Ok(points)
    }

    /// Evolution notes, most recent first.
    pub fn notes_recent_first(&self, id: &str) -> StoreResult<Vec<&Note>> {
        let patient = self.view_patient(id)?;
        let mut notes: Vec<&Note> = patient.notes.iter().collect();
        notes.sort_by(|a, b| metrics::compare_dates(&b.date, &a.date));
        Ok(notes)
    }

    /// Patients with a follow-up appointment on `date` (YYYY-MM-DD).
    pub fn agenda(&self, date: &str) -> StoreResult<Vec<&Patient>> {
        authorize(self.current_user(), &Action::ViewRoster)?;
        Ok(metrics::agenda(&self.patients, date))
    }

    /// Fuzzy search over the roster.
    pub fn search_patients(&self, query: &str) -> StoreResult<Vec<SearchHit>> {
        authorize(self.current_user(), &Action::ViewRoster)?;
        Ok(search::search_patients(&self.patients, query, &self.search))
    }

    /// JSON export of a record the session may view.
    pub fn export_patient_json(&self, id: &str) -> StoreResult<String> {
        let patient = self.view_patient(id)?;
        let exported_by = self.current_user().map(|u| u.id.as_str()).unwrap_or_default();
        let today = chrono::Local::now().date_naive();

        Ok(RecordExport::from_patient(patient, exported_by, today)?.to_json()?)
    }

    /// Anthropometry CSV of a record the session may view.
    pub fn export_anthropometry_csv(&self, id: &str) -> StoreResult<String> {
        Ok(export::anthropometry_csv(self.view_patient(id)?))
    }

    pub fn dashboard_summary(&self) -> StoreResult<DashboardSummary> {
        authorize(self.current_user(), &Action::ViewDashboard)?;

        let follow_ups = self
            .patients
            .iter()
            .map(|p| FollowUp {
                patient_id: p.id.clone(),
                name: p.name.clone(),
                last_note_date: p
                    .notes
                    .iter()
                    .max_by(|a, b| metrics::compare_dates(&a.date, &b.date))
                    .map(|n| n.date.clone()),
            })
            .collect();

        Ok(DashboardSummary {
            total_patients: self.patients.len(),
            active_plans: self
                .patients
                .iter()
                .filter(|p| p.active_plan().is_some())
                .count(),
            lab_alerts: self
                .patients
                .iter()
                .flat_map(|p| &p.labs)
                .map(|lab| lab.flagged_markers().count())
                .sum(),
            follow_ups,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{AuthSettings, NutriConfig};
    use crate::models::{Anthropometry, NewPatient, Note, Patient, Role, User};
    use crate::store::{NutriStore, StoreError};
    use chrono::NaiveDate;

    fn store() -> NutriStore {
        let config = NutriConfig {
            auth: AuthSettings::fast(),
            store: crate::config::StoreSettings {
                seed_demo_data: false,
            },
            ..Default::default()
        };
        let mut store = NutriStore::new(&config).unwrap();
        let hash = store.hasher().hash("password123").unwrap();

        let mut p1 = Patient::with_id(
            "p1",
            NewPatient {
                name: "Ana".into(),
                dob: "1990-11-30".into(),
                ..Default::default()
            },
        );
        p1.anthropometry = vec![
            Anthropometry::new("2024-03-01", 80.0, 175.0),
            Anthropometry::new("2024-01-10", 84.0, 175.0),
            Anthropometry::new("2024-02-05", 82.0, 175.0),
        ];
        p1.notes = vec![
            Note::new("2024-01-10", "Primera consulta"),
            Note::new("2024-03-01", "Control"),
        ];

        let users = vec![
            User {
                id: "admin".into(),
                email: "doc@clinic.com".into(),
                password_hash: hash.clone(),
                name: "Doc".into(),
                role: Role::Admin,
                patient_id: None,
            },
            User {
                id: "ana".into(),
                email: "ana@mail.com".into(),
                password_hash: hash,
                name: "Ana".into(),
                role: Role::Patient,
                patient_id: Some("p1".into()),
            },
        ];
        store
            .bootstrap(
                users,
                vec![p1, Patient::with_id("p2", NewPatient::default())],
            )
            .unwrap();
        store
    }

    #[test]
    fn test_series_sorted_chronologically() {
        let mut store = store();
        store.login("doc@clinic.com", "password123").unwrap();

        let series = store.anthropometry_series("p1").unwrap();
        let dates: Vec<&str> = series.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-10", "2024-02-05", "2024-03-01"]);
        assert_eq!(series[2].imc, 26.1);

        // Stored order is untouched.
        assert_eq!(store.patient("p1").unwrap().anthropometry[0].date, "2024-03-01");
    }

    #[test]
    fn test_notes_recent_first() {
        let mut store = store();
        store.login("ana@mail.com", "password123").unwrap();
        let notes = store.notes_recent_first("p1").unwrap();
        assert_eq!(notes[0].objective, "Control");
    }

    #[test]
    fn test_patient_view_derived_fields() {
        let mut store = store();
        store.login("ana@mail.com", "password123").unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let view = store.patient_view_on("p1", today).unwrap();
        assert_eq!(view.age, Some(34));
        assert_eq!(view.latest_imc, Some(26.1));
        assert_eq!(view.imc_category, Some(crate::metrics::ImcCategory::Overweight));
        assert_eq!(view.adherence_rate, None);
    }

    #[test]
    fn test_patient_sees_only_linked_record() {
        let mut store = store();
        store.login("ana@mail.com", "password123").unwrap();

        let visible: Vec<&str> = store
            .visible_patients()
            .unwrap()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(visible, vec!["p1"]);
        assert!(matches!(
            store.view_patient("p2"),
            Err(StoreError::Auth(_))
        ));
        assert!(store.agenda("2024-05-01").is_err());
        assert!(store.dashboard_summary().is_err());
    }

    #[test]
    fn test_view_missing_patient() {
        let mut store = store();
        store.login("doc@clinic.com", "password123").unwrap();
        assert_eq!(
            store.view_patient("ghost").unwrap_err(),
            StoreError::PatientNotFound("ghost".into())
        );
    }

    #[test]
    fn test_patient_exports_own_record_only() {
        let mut store = store();
        store.login("ana@mail.com", "password123").unwrap();

        let json = store.export_patient_json("p1").unwrap();
        assert!(json.contains("\"exported_by\": \"ana\""));
        let csv = store.export_anthropometry_csv("p1").unwrap();
        assert_eq!(csv.lines().count(), 4);
        assert!(store.export_patient_json("p2").is_err());
    }

    #[test]
    fn test_dashboard_summary() {
        let mut store = store();
        store.login("doc@clinic.com", "password123").unwrap();

        let summary = store.dashboard_summary().unwrap();
        assert_eq!(summary.total_patients, 2);
        assert_eq!(summary.lab_alerts, 0);
        assert_eq!(summary.follow_ups[0].last_note_date.as_deref(), Some("2024-03-01"));
        assert_eq!(summary.follow_ups[1].last_note_date, None);
    }
}
