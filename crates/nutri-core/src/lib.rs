//! NutriClinical Core Library
//!
//! Client-side state for a clinical-nutrition practice: session, patient roster,
//! clinical records and theme, held in one store that UI shells read and write.
//!
//! # Architecture
//!
//! ```text
//!   UI shell (web / mobile)
//!          │  Command                         ▲ ChangeNotice
//!          ▼                                  │
//!   ┌──────────────────────────────────────────────────────┐
//!   │                      NutriStore                      │
//!   │  dispatch ──► authorize ──► apply ──► publish         │
//!   │                  │                                   │
//!   │     session · users · patients · theme               │
//!   └──────────────────┬───────────────────────────────────┘
//!                      │ read-time derivation
//!          ┌───────────┼─────────────┬──────────────┐
//!          ▼           ▼             ▼              ▼
//!       IMC / age    Agenda      Fuzzy search    Exports
//! ```
//!
//! # Core Principle
//!
//! **Every write is authorized in the store.** Hiding a control in the view is
//! never the only guard; a patient session may only check off adherence on its
//! own record.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Patient, Anthropometry, Plan, User, etc.)
//! - [`metrics`]: IMC, age and agenda derivations
//! - [`auth`]: Password hashing, capability checks and route gating
//! - [`store`]: The state container and its command dispatch
//! - [`search`]: Fuzzy roster search
//! - [`export`]: Record and anthropometry exports
//! - [`config`]: TOML configuration with environment overrides
//! - [`seed`]: Demo roster

pub mod auth;
pub mod config;
pub mod export;
pub mod metrics;
pub mod models;
pub mod search;
pub mod seed;
pub mod store;

// Re-export commonly used types
pub use auth::{Route, RouteDecision, Tab, TabAccess};
pub use config::NutriConfig;
pub use metrics::ImcCategory;
pub use models::{
    Adherence, AdherenceChecks, Anthropometry, Gender, MeasurementPatch, NewPatient, NewUser,
    Note, Patient, PatientField, PatientUpdate, Role, ThemeConfig, User,
};
pub use store::{ChangeNotice, Command, NutriStore, Outcome, StoreError, StoreEvent};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::debug;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum NutriError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("No active session")]
    NotAuthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<auth::AuthError> for NutriError {
    fn from(e: auth::AuthError) -> Self {
        match e {
            auth::AuthError::InvalidCredentials => NutriError::InvalidCredentials,
            auth::AuthError::NotAuthenticated => NutriError::NotAuthenticated,
            auth::AuthError::Forbidden(what) => NutriError::Forbidden(what),
            auth::AuthError::WeakPassword { .. } => NutriError::InvalidInput(e.to_string()),
            auth::AuthError::Hashing(msg) => NutriError::Internal(msg),
        }
    }
}

impl From<StoreError> for NutriError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Auth(auth) => auth.into(),
            StoreError::PatientNotFound(_) | StoreError::MeasurementNotFound(_) => {
                NutriError::NotFound(e.to_string())
            }
            StoreError::Export(msg) => NutriError::Internal(msg),
            _ => NutriError::InvalidInput(e.to_string()),
        }
    }
}

impl From<config::ConfigError> for NutriError {
    fn from(e: config::ConfigError) -> Self {
        NutriError::ConfigError(e.to_string())
    }
}

impl From<serde_json::Error> for NutriError {
    fn from(e: serde_json::Error) -> Self {
        NutriError::Internal(format!("Serialization error: {}", e))
    }
}

impl<T> From<std::sync::PoisonError<T>> for NutriError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        NutriError::Internal(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open a store with default settings and the demo roster.
#[uniffi::export]
pub fn open_store() -> Result<Arc<NutriCore>, NutriError> {
    let config = NutriConfig::load(None)?;
    NutriCore::new(&config)
}

/// Open a store configured from a TOML file. A missing file means defaults.
#[uniffi::export]
pub fn open_store_with_config(path: String) -> Result<Arc<NutriCore>, NutriError> {
    let config = NutriConfig::load(Some(Path::new(&path)))?;
    NutriCore::new(&config)
}

/// Install the tracing subscriber. `RUST_LOG` overrides the default filter.
/// Calling it twice is harmless.
#[uniffi::export]
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nutri_core=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Standalone IMC calculator; needs no session.
#[uniffi::export]
pub fn calculate_imc(weight_kg: f64, height_cm: f64) -> FfiImc {
    let imc = metrics::imc(weight_kg, height_cm);
    FfiImc {
        imc,
        category: ImcCategory::classify(imc).map(|c| c.label().to_string()),
    }
}

/// Font families offered by the theme settings screen.
#[uniffi::export]
pub fn font_choices() -> Vec<String> {
    models::FONT_CHOICES.iter().map(|f| f.to_string()).collect()
}

// =========================================================================
// Observers
// =========================================================================

/// Implemented by the UI shell to re-render on state changes.
#[uniffi::export(with_foreign)]
pub trait StoreObserver: Send + Sync {
    fn on_change(&self, event: FfiStoreEvent);
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store wrapper for FFI.
///
/// Store listeners run under the store lock, so notices are queued there and
/// handed to foreign observers once the lock is released. An observer may call
/// back into `NutriCore` from `on_change`.
#[derive(uniffi::Object)]
pub struct NutriCore {
    store: Arc<Mutex<NutriStore>>,
    observers: Mutex<Vec<Arc<dyn StoreObserver>>>,
    pending: Arc<Mutex<Vec<ChangeNotice>>>,
}

impl NutriCore {
    fn new(config: &NutriConfig) -> Result<Arc<Self>, NutriError> {
        let mut store = NutriStore::new(config)?;
        let pending = Arc::new(Mutex::new(Vec::new()));

        let queue = Arc::clone(&pending);
        store.subscribe(move |notice: &ChangeNotice| {
            if let Ok(mut queue) = queue.lock() {
                queue.push(notice.clone());
            }
        });

        Ok(Arc::new(Self {
            store: Arc::new(Mutex::new(store)),
            observers: Mutex::new(Vec::new()),
            pending,
        }))
    }

    fn read<T>(&self, f: impl FnOnce(&NutriStore) -> Result<T, NutriError>) -> Result<T, NutriError> {
        let store = self.store.lock()?;
        f(&store)
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut NutriStore) -> Result<T, NutriError>,
    ) -> Result<T, NutriError> {
        let result = {
            let mut store = self.store.lock()?;
            f(&mut store)
        };
        self.flush()?;
        result
    }

    fn flush(&self) -> Result<(), NutriError> {
        let notices = std::mem::take(&mut *self.pending.lock()?);
        if notices.is_empty() {
            return Ok(());
        }
        let observers = self.observers.lock()?.clone();
        debug!(
            notices = notices.len(),
            observers = observers.len(),
            "Notifying observers"
        );
        for notice in notices {
            let event = FfiStoreEvent::from(notice);
            for observer in &observers {
                observer.on_change(event.clone());
            }
        }
        Ok(())
    }
}

#[uniffi::export]
impl NutriCore {
    // =========================================================================
    // Session
    // =========================================================================

    pub fn login(&self, email: String, password: String) -> Result<FfiUser, NutriError> {
        self.write(|store| Ok(store.login(&email, &password)?.into()))
    }

    pub fn logout(&self) -> Result<(), NutriError> {
        self.write(|store| {
            store.logout();
            Ok(())
        })
    }

    pub fn current_user(&self) -> Result<Option<FfiUser>, NutriError> {
        self.read(|store| Ok(store.current_user().cloned().map(Into::into)))
    }

    /// Register an observer called after every successful write.
    pub fn subscribe(&self, observer: Arc<dyn StoreObserver>) -> Result<(), NutriError> {
        self.observers.lock()?.push(observer);
        Ok(())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Gate a URL path for the current session.
    pub fn resolve_route(&self, path: String) -> Result<FfiRouteDecision, NutriError> {
        let route = Route::from_path(&path)
            .ok_or_else(|| NutriError::InvalidInput(format!("unknown route: {}", path)))?;
        self.read(|store| Ok(store.resolve_route(&route).into()))
    }

    /// Visibility and editability of a patient-detail tab.
    pub fn tab_access(&self, patient_id: String, tab: String) -> Result<FfiTabAccess, NutriError> {
        let tab = Tab::parse(&tab)
            .ok_or_else(|| NutriError::InvalidInput(format!("unknown tab: {}", tab)))?;
        self.read(|store| Ok(store.tab_access(&patient_id, tab).into()))
    }

    // =========================================================================
    // Roster
    // =========================================================================

    /// Patients visible to the current session.
    pub fn list_patients(&self) -> Result<Vec<FfiPatientSummary>, NutriError> {
        self.read(|store| {
            let today = chrono::Local::now().date_naive();
            Ok(store
                .visible_patients()?
                .into_iter()
                .map(|p| FfiPatientSummary::build(p, today))
                .collect())
        })
    }

    pub fn get_patient(&self, patient_id: String) -> Result<FfiPatientProfile, NutriError> {
        self.read(|store| Ok(store.patient_view(&patient_id)?.into()))
    }

    pub fn add_patient(&self, input: FfiNewPatient) -> Result<FfiPatientSummary, NutriError> {
        let input: NewPatient = input.try_into()?;
        self.write(|store| {
            let patient = store.add_patient(input)?;
            Ok(FfiPatientSummary::build(&patient, chrono::Local::now().date_naive()))
        })
    }

    pub fn add_user(&self, input: FfiNewUser) -> Result<FfiUser, NutriError> {
        let role = Role::parse(&input.role)
            .ok_or_else(|| NutriError::InvalidInput(format!("unknown role: {}", input.role)))?;
        self.write(|store| {
            let user = store.add_user(NewUser {
                email: input.email,
                password: input.password,
                name: input.name,
                role,
                patient_id: input.patient_id,
            })?;
            Ok(user.into())
        })
    }

    /// The full record with derived values, as JSON. Tab screens read their
    /// nested sections (lifestyle, clinical history, plans, labs) from here.
    pub fn get_patient_json(&self, patient_id: String) -> Result<String, NutriError> {
        self.read(|store| Ok(serde_json::to_string(&store.patient_view(&patient_id)?)?))
    }

    /// Merge a partial record given as JSON, keyed like the record itself.
    /// Present keys replace the field wholesale. Returns the updated record
    /// as [`get_patient_json`](Self::get_patient_json) would.
    pub fn update_patient_json(
        &self,
        patient_id: String,
        partial_json: String,
    ) -> Result<String, NutriError> {
        let update: PatientUpdate = serde_json::from_str(&partial_json)
            .map_err(|e| NutriError::InvalidInput(format!("partial record: {}", e)))?;
        self.write(|store| {
            store.update_patient(&patient_id, update)?;
            Ok(serde_json::to_string(&store.patient_view(&patient_id)?)?)
        })
    }

    /// Merge profile fields into a record. Unset fields are kept.
    pub fn update_patient_profile(
        &self,
        patient_id: String,
        update: FfiProfileUpdate,
    ) -> Result<FfiPatientProfile, NutriError> {
        let update: PatientUpdate = update.try_into()?;
        self.write(|store| {
            store.update_patient(&patient_id, update)?;
            Ok(store.patient_view(&patient_id)?.into())
        })
    }

    /// Roster search by name or email.
    pub fn search_patients(&self, query: String) -> Result<Vec<FfiSearchHit>, NutriError> {
        self.read(|store| {
            Ok(store
                .search_patients(&query)?
                .into_iter()
                .map(Into::into)
                .collect())
        })
    }

    /// Patients with a follow-up appointment on `date` (YYYY-MM-DD).
    pub fn agenda(&self, date: String) -> Result<Vec<FfiPatientSummary>, NutriError> {
        self.read(|store| {
            let today = chrono::Local::now().date_naive();
            Ok(store
                .agenda(&date)?
                .into_iter()
                .map(|p| FfiPatientSummary::build(p, today))
                .collect())
        })
    }

    pub fn dashboard(&self) -> Result<FfiDashboard, NutriError> {
        self.read(|store| Ok(store.dashboard_summary()?.into()))
    }

    // =========================================================================
    // Clinical record
    // =========================================================================

    /// Record a visit. Returns the new measurement ID.
    pub fn add_anthropometry(
        &self,
        patient_id: String,
        input: FfiMeasurement,
    ) -> Result<String, NutriError> {
        let mut measurement = Anthropometry::new(input.date, input.weight, input.height);
        measurement.circumference.waist = input.waist;
        measurement.circumference.hip = input.hip;
        measurement.circumference.abdomen = input.abdomen;
        measurement.notes = input.notes;
        let id = measurement.id.clone();

        self.write(|store| {
            store.add_measurement(&patient_id, measurement)?;
            Ok(id)
        })
    }

    /// Correct weight or height of a visit; the returned point carries the
    /// recomputed IMC.
    pub fn update_anthropometry(
        &self,
        patient_id: String,
        measurement_id: String,
        weight: Option<f64>,
        height: Option<f64>,
    ) -> Result<FfiMeasurementPoint, NutriError> {
        self.write(|store| {
            let patch = MeasurementPatch {
                weight,
                height,
                ..Default::default()
            };
            store.update_measurement(&patient_id, &measurement_id, patch)?;
            store
                .anthropometry_series(&patient_id)?
                .into_iter()
                .find(|p| p.measurement_id == measurement_id)
                .map(Into::into)
                .ok_or_else(|| NutriError::NotFound(measurement_id.clone()))
        })
    }

    /// Measurements in chronological order.
    pub fn anthropometry_series(
        &self,
        patient_id: String,
    ) -> Result<Vec<FfiMeasurementPoint>, NutriError> {
        self.read(|store| {
            Ok(store
                .anthropometry_series(&patient_id)?
                .into_iter()
                .map(Into::into)
                .collect())
        })
    }

    /// Check off a day of the active plan. Returns the updated adherence rate.
    pub fn record_adherence(
        &self,
        patient_id: String,
        input: FfiAdherence,
    ) -> Result<Option<f64>, NutriError> {
        let entry = Adherence::from_checks(
            input.date,
            AdherenceChecks {
                breakfast: input.breakfast,
                lunch: input.lunch,
                dinner: input.dinner,
                supplements: input.supplements,
            },
        );
        self.write(|store| {
            let patient = store.record_adherence(&patient_id, entry)?;
            Ok(metrics::adherence_rate(&patient.adherence))
        })
    }

    /// Prepend an evolution note. Returns the new note ID.
    pub fn add_note(&self, patient_id: String, input: FfiNewNote) -> Result<String, NutriError> {
        let note = Note {
            observations: input.observations,
            next_appointment: input.next_appointment.filter(|d| !d.is_empty()),
            ..Note::new(input.date, input.objective)
        };
        let id = note.id.clone();

        self.write(|store| {
            store.add_note(&patient_id, note)?;
            Ok(id)
        })
    }

    /// Evolution notes, most recent first.
    pub fn list_notes(&self, patient_id: String) -> Result<Vec<FfiNote>, NutriError> {
        self.read(|store| {
            Ok(store
                .notes_recent_first(&patient_id)?
                .into_iter()
                .cloned()
                .map(Into::into)
                .collect())
        })
    }

    // =========================================================================
    // Theme
    // =========================================================================

    pub fn theme(&self) -> Result<FfiTheme, NutriError> {
        self.read(|store| Ok(store.theme().clone().into()))
    }

    pub fn update_theme(&self, theme: FfiTheme) -> Result<(), NutriError> {
        self.write(|store| Ok(store.update_theme(theme.into())?))
    }

    pub fn reset_theme(&self) -> Result<(), NutriError> {
        self.write(|store| Ok(store.reset_theme()?))
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Full record with derived metrics and a content digest, as JSON.
    pub fn export_patient_json(&self, patient_id: String) -> Result<String, NutriError> {
        self.read(|store| Ok(store.export_patient_json(&patient_id)?))
    }

    /// Anthropometry history as CSV.
    pub fn export_anthropometry_csv(&self, patient_id: String) -> Result<String, NutriError> {
        self.read(|store| Ok(store.export_anthropometry_csv(&patient_id)?))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe user. The password hash never crosses the boundary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub patient_id: Option<String>,
}

impl From<User> for FfiUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role.as_str().to_string(),
            patient_id: user.patient_id,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
    pub patient_id: Option<String>,
}

/// Roster row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub avatar_url: Option<String>,
    pub age: Option<i32>,
    pub latest_imc: Option<f64>,
    pub active_plan: Option<String>,
}

impl FfiPatientSummary {
    fn build(patient: &Patient, today: chrono::NaiveDate) -> Self {
        Self {
            id: patient.id.clone(),
            name: patient.name.clone(),
            email: patient.email.clone(),
            phone: patient.phone.clone(),
            avatar_url: patient.avatar_url.clone(),
            age: metrics::age_years(&patient.dob, today),
            latest_imc: patient.latest_measurement().map(|m| m.imc()),
            active_plan: patient.active_plan().map(|p| p.name.clone()),
        }
    }
}

/// Profile header of the patient detail screen.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub dob: String,
    pub gender: String,
    pub occupation: String,
    pub marital_status: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
    pub age: Option<i32>,
    pub latest_imc: Option<f64>,
    pub imc_category: Option<String>,
    pub adherence_rate: Option<f64>,
}

impl From<store::PatientView> for FfiPatientProfile {
    fn from(view: store::PatientView) -> Self {
        let p = view.patient;
        Self {
            id: p.id,
            name: p.name,
            email: p.email,
            phone: p.phone,
            dob: p.dob,
            gender: p.gender.as_str().to_string(),
            occupation: p.occupation,
            marital_status: p.marital_status,
            address: p.address,
            avatar_url: p.avatar_url,
            age: view.age,
            latest_imc: view.latest_imc,
            imc_category: view.imc_category.map(|c| c.label().to_string()),
            adherence_rate: view.adherence_rate,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPatient {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub dob: String,
    pub gender: String,
    pub occupation: String,
    pub marital_status: Option<String>,
    pub address: Option<String>,
}

impl TryFrom<FfiNewPatient> for NewPatient {
    type Error = NutriError;

    fn try_from(input: FfiNewPatient) -> Result<Self, Self::Error> {
        Ok(NewPatient {
            gender: parse_gender(&input.gender)?,
            name: input.name,
            email: input.email,
            phone: input.phone,
            dob: input.dob,
            occupation: input.occupation,
            marital_status: input.marital_status,
            address: input.address,
        })
    }
}

/// Profile edit. `None` keeps a field; for the optional fields an empty
/// string clears it.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub occupation: Option<String>,
    pub marital_status: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
}

impl TryFrom<FfiProfileUpdate> for PatientUpdate {
    type Error = NutriError;

    fn try_from(input: FfiProfileUpdate) -> Result<Self, Self::Error> {
        let clearable = |v: Option<String>| v.map(|s| Some(s).filter(|s| !s.is_empty()));
        Ok(PatientUpdate {
            gender: input.gender.as_deref().map(parse_gender).transpose()?,
            name: input.name,
            email: input.email,
            phone: input.phone,
            dob: input.dob,
            occupation: input.occupation,
            marital_status: clearable(input.marital_status),
            address: clearable(input.address),
            avatar_url: clearable(input.avatar_url),
            ..Default::default()
        })
    }
}

fn parse_gender(s: &str) -> Result<Gender, NutriError> {
    Gender::parse(s).ok_or_else(|| NutriError::InvalidInput(format!("unknown gender: {}", s)))
}

/// New anthropometry visit.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMeasurement {
    pub date: String,
    pub weight: f64,
    pub height: f64,
    pub waist: f64,
    pub hip: f64,
    pub abdomen: f64,
    pub notes: String,
}

/// One point of the anthropometry chart.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMeasurementPoint {
    pub measurement_id: String,
    pub date: String,
    pub weight: f64,
    pub height: f64,
    pub imc: f64,
    pub waist: f64,
    pub hip: f64,
}

impl From<store::MeasurementPoint> for FfiMeasurementPoint {
    fn from(point: store::MeasurementPoint) -> Self {
        Self {
            measurement_id: point.measurement_id,
            date: point.date,
            weight: point.weight,
            height: point.height,
            imc: point.imc,
            waist: point.waist,
            hip: point.hip,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiImc {
    pub imc: f64,
    pub category: Option<String>,
}

/// Daily plan checklist.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAdherence {
    pub date: String,
    pub breakfast: bool,
    pub lunch: bool,
    pub dinner: bool,
    pub supplements: bool,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewNote {
    pub date: String,
    pub objective: String,
    pub observations: String,
    pub next_appointment: Option<String>,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNote {
    pub id: String,
    pub date: String,
    pub objective: String,
    pub observations: String,
    pub images: Vec<String>,
    pub next_appointment: Option<String>,
}

impl From<Note> for FfiNote {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            date: note.date,
            objective: note.objective,
            observations: note.observations,
            images: note.images,
            next_appointment: note.next_appointment,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDashboard {
    pub total_patients: u32,
    pub active_plans: u32,
    pub lab_alerts: u32,
}

impl From<store::DashboardSummary> for FfiDashboard {
    fn from(summary: store::DashboardSummary) -> Self {
        Self {
            total_patients: summary.total_patients as u32,
            active_plans: summary.active_plans as u32,
            lab_alerts: summary.lab_alerts as u32,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSearchHit {
    pub patient_id: String,
    pub name: String,
    pub email: String,
    pub score: f64,
}

impl From<search::SearchHit> for FfiSearchHit {
    fn from(hit: search::SearchHit) -> Self {
        Self {
            patient_id: hit.patient_id,
            name: hit.name,
            email: hit.email,
            score: hit.score,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTheme {
    pub app_bg: String,
    pub card_bg: String,
    pub text_color: String,
    pub primary_color: String,
    pub font_family: String,
}

impl From<ThemeConfig> for FfiTheme {
    fn from(theme: ThemeConfig) -> Self {
        Self {
            app_bg: theme.app_bg,
            card_bg: theme.card_bg,
            text_color: theme.text_color,
            primary_color: theme.primary_color,
            font_family: theme.font_family,
        }
    }
}

impl From<FfiTheme> for ThemeConfig {
    fn from(theme: FfiTheme) -> Self {
        ThemeConfig {
            app_bg: theme.app_bg,
            card_bg: theme.card_bg,
            text_color: theme.text_color,
            primary_color: theme.primary_color,
            font_family: theme.font_family,
        }
    }
}

/// `redirect_to` is a URL path when `allowed` is false.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRouteDecision {
    pub allowed: bool,
    pub redirect_to: Option<String>,
}

impl From<RouteDecision> for FfiRouteDecision {
    fn from(decision: RouteDecision) -> Self {
        match decision {
            RouteDecision::Allow => Self {
                allowed: true,
                redirect_to: None,
            },
            RouteDecision::Redirect(route) => Self {
                allowed: false,
                redirect_to: Some(route.path()),
            },
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTabAccess {
    pub visible: bool,
    pub read_only: bool,
    pub can_record_adherence: bool,
}

impl From<TabAccess> for FfiTabAccess {
    fn from(access: TabAccess) -> Self {
        Self {
            visible: access.visible,
            read_only: access.read_only,
            can_record_adherence: access.can_record_adherence,
        }
    }
}

/// Change notification delivered to [`StoreObserver`]s.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStoreEvent {
    pub revision: u64,
    pub kind: String,
    pub patient_id: Option<String>,
    /// Record fields touched, for `patient_updated`
    pub fields: Vec<String>,
}

impl From<ChangeNotice> for FfiStoreEvent {
    fn from(notice: ChangeNotice) -> Self {
        let fields = match &notice.event {
            StoreEvent::PatientUpdated { fields, .. } => {
                fields.iter().map(|f| f.as_str().to_string()).collect()
            }
            _ => Vec::new(),
        };
        Self {
            revision: notice.revision,
            kind: notice.event.kind().to_string(),
            patient_id: notice.event.patient_id().map(String::from),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{
        DEMO_ADMIN_EMAIL, DEMO_ADMIN_PASSWORD, DEMO_PATIENT_EMAIL, DEMO_PATIENT_ID,
        DEMO_PATIENT_PASSWORD,
    };

    struct Recorder(Mutex<Vec<FfiStoreEvent>>);

    impl StoreObserver for Recorder {
        fn on_change(&self, event: FfiStoreEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn core() -> Arc<NutriCore> {
        let config = NutriConfig {
            auth: config::AuthSettings::fast(),
            ..Default::default()
        };
        NutriCore::new(&config).unwrap()
    }

    #[test]
    fn test_observer_sees_writes_after_unlock() {
        let core = core();
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        core.subscribe(recorder.clone()).unwrap();

        core.login(DEMO_ADMIN_EMAIL.into(), DEMO_ADMIN_PASSWORD.into())
            .unwrap();
        core.add_note(
            DEMO_PATIENT_ID.into(),
            FfiNewNote {
                date: "2024-05-01".into(),
                objective: "Control".into(),
                observations: String::new(),
                next_appointment: Some("2024-05-15".into()),
            },
        )
        .unwrap();

        let events = recorder.0.lock().unwrap();
        let kinds: Vec<&str> = events.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds, vec!["session_changed", "patient_updated"]);
        assert_eq!(events[1].fields, vec!["notes"]);
        assert!(events[0].revision < events[1].revision);
    }

    #[test]
    fn test_failed_write_notifies_nobody() {
        let core = core();
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        core.subscribe(recorder.clone()).unwrap();

        assert!(matches!(
            core.login(DEMO_ADMIN_EMAIL.into(), "wrong".into()),
            Err(NutriError::InvalidCredentials)
        ));
        assert!(core.current_user().unwrap().is_none());
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_route_paths_across_session() {
        let core = core();
        let decision = core.resolve_route("/patients".into()).unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.redirect_to.as_deref(), Some("/"));
        assert!(core.resolve_route("/".into()).unwrap().allowed);

        core.login(DEMO_PATIENT_EMAIL.into(), DEMO_PATIENT_PASSWORD.into())
            .unwrap();
        let own = Some(format!("/patients/{}", DEMO_PATIENT_ID));
        assert_eq!(core.resolve_route("/".into()).unwrap().redirect_to, own);
        assert_eq!(core.resolve_route("/dashboard".into()).unwrap().redirect_to, own);

        core.login(DEMO_ADMIN_EMAIL.into(), DEMO_ADMIN_PASSWORD.into())
            .unwrap();
        assert!(core.resolve_route("/dashboard".into()).unwrap().allowed);
        assert_eq!(
            core.resolve_route("/login".into()).unwrap().redirect_to.as_deref(),
            Some("/dashboard")
        );

        assert!(matches!(
            core.resolve_route("/nowhere".into()),
            Err(NutriError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_profile_update_clears_optional_field() {
        let core = core();
        core.login(DEMO_ADMIN_EMAIL.into(), DEMO_ADMIN_PASSWORD.into())
            .unwrap();

        let profile = core
            .update_patient_profile(
                DEMO_PATIENT_ID.into(),
                FfiProfileUpdate {
                    phone: Some("555-0000".into()),
                    address: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(profile.phone, "555-0000");
        assert_eq!(profile.address, None);
        assert!(!profile.name.is_empty());
    }

    #[test]
    fn test_patient_session_cannot_edit_profile() {
        let core = core();
        core.login(DEMO_PATIENT_EMAIL.into(), DEMO_PATIENT_PASSWORD.into())
            .unwrap();

        let err = core
            .update_patient_profile(
                DEMO_PATIENT_ID.into(),
                FfiProfileUpdate {
                    name: Some("Otro".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, NutriError::Forbidden(_)));

        let rate = core
            .record_adherence(
                DEMO_PATIENT_ID.into(),
                FfiAdherence {
                    date: "2024-05-02".into(),
                    breakfast: true,
                    lunch: true,
                    dinner: false,
                    supplements: false,
                },
            )
            .unwrap();
        assert!(rate.is_some());
    }

    #[test]
    fn test_lifestyle_replaced_through_json() {
        let core = core();
        core.login(DEMO_ADMIN_EMAIL.into(), DEMO_ADMIN_PASSWORD.into())
            .unwrap();
        let before: serde_json::Value =
            serde_json::from_str(&core.get_patient_json(DEMO_PATIENT_ID.into()).unwrap()).unwrap();

        let mut lifestyle = models::Lifestyle::default();
        lifestyle.activity.regular = true;
        lifestyle.activity.details = "Natación 3x semana".into();
        lifestyle.sleep.hours = "8".into();
        let partial = serde_json::json!({ "lifestyle": lifestyle }).to_string();

        let updated = core
            .update_patient_json(DEMO_PATIENT_ID.into(), partial)
            .unwrap();
        let after: serde_json::Value = serde_json::from_str(&updated).unwrap();
        assert_eq!(after["patient"]["lifestyle"], serde_json::to_value(&lifestyle).unwrap());
        assert_eq!(after["patient"]["clinical"], before["patient"]["clinical"]);
        assert_eq!(after["patient"]["name"], before["patient"]["name"]);

        let reread = core.get_patient_json(DEMO_PATIENT_ID.into()).unwrap();
        assert_eq!(reread, updated);
    }

    #[test]
    fn test_json_update_rejects_bad_partials() {
        let core = core();
        core.login(DEMO_PATIENT_EMAIL.into(), DEMO_PATIENT_PASSWORD.into())
            .unwrap();

        assert!(matches!(
            core.update_patient_json(DEMO_PATIENT_ID.into(), r#"{"id": "p9"}"#.into()),
            Err(NutriError::InvalidInput(_))
        ));
        assert!(matches!(
            core.update_patient_json(DEMO_PATIENT_ID.into(), r#"{"labs": []}"#.into()),
            Err(NutriError::Forbidden(_))
        ));
    }

    #[test]
    fn test_font_choices_include_default() {
        let fonts = font_choices();
        assert_eq!(fonts.len(), 4);
        assert!(fonts.contains(&ThemeConfig::default().font_family));
    }

    #[test]
    fn test_calculate_imc() {
        let result = calculate_imc(80.0, 175.0);
        assert_eq!(result.imc, 26.1);
        assert_eq!(result.category.as_deref(), Some("Sobrepeso"));
        assert_eq!(calculate_imc(70.0, 0.0).category, None);
    }
}
