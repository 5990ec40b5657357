//! Typed commands accepted by the store, and the events they produce.

use crate::models::{
    MeasurementPatch, NewPatient, NewUser, Patient, PatientField, PatientUpdate, ThemeConfig, User,
};

/// A state change request. Every write to the store is one of these.
#[derive(Debug, Clone)]
pub enum Command {
    Login { email: String, password: String },
    Logout,
    AddPatient(NewPatient),
    AddUser(NewUser),
    UpdatePatient { id: String, update: PatientUpdate },
    UpdateMeasurement {
        patient_id: String,
        measurement_id: String,
        patch: MeasurementPatch,
    },
    UpdateTheme(ThemeConfig),
    ResetTheme,
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::Logout => "logout",
            Command::AddPatient(_) => "add_patient",
            Command::AddUser(_) => "add_user",
            Command::UpdatePatient { .. } => "update_patient",
            Command::UpdateMeasurement { .. } => "update_measurement",
            Command::UpdateTheme(_) => "update_theme",
            Command::ResetTheme => "reset_theme",
        }
    }
}

/// Result of a successful command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    LoggedIn(User),
    LoggedOut,
    PatientAdded(Patient),
    UserAdded(User),
    PatientUpdated(Patient),
    ThemeUpdated(ThemeConfig),
}

/// What changed, as broadcast to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    SessionChanged { user_id: Option<String> },
    PatientAdded { id: String },
    UserAdded { id: String },
    PatientUpdated { id: String, fields: Vec<PatientField> },
    ThemeChanged,
}

impl StoreEvent {
    /// Event kind as exposed to UI shells.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreEvent::SessionChanged { .. } => "session_changed",
            StoreEvent::PatientAdded { .. } => "patient_added",
            StoreEvent::UserAdded { .. } => "user_added",
            StoreEvent::PatientUpdated { .. } => "patient_updated",
            StoreEvent::ThemeChanged => "theme_changed",
        }
    }

    /// Patient the event concerns, if any.
    pub fn patient_id(&self) -> Option<&str> {
        match self {
            StoreEvent::PatientAdded { id } | StoreEvent::PatientUpdated { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// An event stamped with the store revision it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeNotice {
    pub revision: u64,
    pub event: StoreEvent,
}
