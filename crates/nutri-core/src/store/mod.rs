//! In-memory application state.
//!
//! [`NutriStore`] is the single source of truth for the session, the user and
//! patient rosters, and the theme. Views hold a reference to one store, read
//! through the accessors and write through [`NutriStore::dispatch`]. Every write
//! is authorized here, not only hidden in the view.

mod accessors;
mod command;

pub use accessors::*;
pub use command::*;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::{authorize, verify_password, Action, AuthError, CredentialHasher};
use crate::config::{NutriConfig, SearchSettings};
use crate::models::{
    Adherence, Anthropometry, MeasurementPatch, NewPatient, NewUser, Note, Patient, PatientField,
    PatientUpdate, Role, ThemeConfig, User,
};

/// Store errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Measurement not found: {0}")]
    MeasurementNotFound(String),

    #[error("Duplicate measurement: {0}")]
    DuplicateMeasurement(String),

    #[error("Duplicate patient: {0}")]
    DuplicatePatient(String),

    #[error("Duplicate user: {0}")]
    DuplicateUser(String),

    #[error("User links to unknown patient: {0}")]
    InvalidLink(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Export failed: {0}")]
    Export(String),
}

impl From<crate::export::ExportError> for StoreError {
    fn from(e: crate::export::ExportError) -> Self {
        StoreError::Export(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle returned by [`NutriStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&ChangeNotice) + Send>;

/// The application state container.
pub struct NutriStore {
    current_user: Option<User>,
    users: Vec<User>,
    patients: Vec<Patient>,
    theme: ThemeConfig,
    default_theme: ThemeConfig,
    hasher: CredentialHasher,
    search: SearchSettings,
    revision: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for NutriStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NutriStore")
            .field("current_user", &self.current_user.as_ref().map(|u| &u.id))
            .field("users", &self.users.len())
            .field("patients", &self.patients.len())
            .field("revision", &self.revision)
            .finish()
    }
}

impl NutriStore {
    /// Create an empty store. Seeds the demo roster when the config asks for it.
    pub fn new(config: &NutriConfig) -> StoreResult<Self> {
        let mut store = Self {
            current_user: None,
            users: Vec::new(),
            patients: Vec::new(),
            theme: config.theme.clone(),
            default_theme: config.theme.clone(),
            hasher: CredentialHasher::new(&config.auth)?,
            search: config.search.clone(),
            revision: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        };

        if config.store.seed_demo_data {
            let (users, patients) = crate::seed::demo_roster(&store.hasher)?;
            store.bootstrap(users, patients)?;
        }

        Ok(store)
    }

    /// Load an initial roster without a session (startup, fixtures).
    ///
    /// Uniqueness of IDs and emails and patient links are enforced across the
    /// whole batch before anything is inserted, so a rejected batch leaves the
    /// roster as it was. Listeners are not notified.
    pub fn bootstrap(&mut self, users: Vec<User>, patients: Vec<Patient>) -> StoreResult<()> {
        let mut staged_patients = self.patients.clone();
        for patient in patients {
            stage_patient(&mut staged_patients, patient)?;
        }
        let mut staged_users = self.users.clone();
        for user in users {
            stage_user(&mut staged_users, &staged_patients, user)?;
        }

        self.patients = staged_patients;
        self.users = staged_users;
        info!(
            users = self.users.len(),
            patients = self.patients.len(),
            "Roster loaded"
        );
        Ok(())
    }

    /// Hasher configured for this store.
    pub fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Register a listener called synchronously after every successful write.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&ChangeNotice) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn publish(&mut self, event: StoreEvent) {
        self.revision += 1;
        let notice = ChangeNotice {
            revision: self.revision,
            event,
        };
        debug!(revision = notice.revision, kind = notice.event.kind(), "State changed");
        for (_, listener) in &self.listeners {
            listener(&notice);
        }
    }

    // =========================================================================
    // Command dispatch
    // =========================================================================

    /// Apply a command. On error the state is left unchanged.
    pub fn dispatch(&mut self, command: Command) -> StoreResult<Outcome> {
        let name = command.name();
        let result = match command {
            Command::Login { email, password } => self.do_login(&email, &password),
            Command::Logout => Ok(self.do_logout()),
            Command::AddPatient(input) => self.do_add_patient(input),
            Command::AddUser(input) => self.do_add_user(input),
            Command::UpdatePatient { id, update } => self.do_update_patient(&id, update),
            Command::UpdateMeasurement {
                patient_id,
                measurement_id,
                patch,
            } => self.do_update_measurement(&patient_id, &measurement_id, patch),
            Command::UpdateTheme(theme) => self.do_update_theme(theme),
            Command::ResetTheme => {
                let theme = self.default_theme.clone();
                self.do_update_theme(theme)
            }
        };

        if let Err(ref e) = result {
            debug!(command = name, error = %e, "Command rejected");
        }
        result
    }

    fn do_login(&mut self, email: &str, password: &str) -> StoreResult<Outcome> {
        let user = self
            .users
            .iter()
            .find(|u| u.email == email && verify_password(password, &u.password_hash))
            .cloned();

        let Some(user) = user else {
            warn!(email, "Login failed");
            return Err(AuthError::InvalidCredentials.into());
        };

        info!(user_id = %user.id, role = %user.role, "Logged in");
        self.current_user = Some(user.clone());
        self.publish(StoreEvent::SessionChanged {
            user_id: Some(user.id.clone()),
        });
        Ok(Outcome::LoggedIn(user))
    }

    fn do_logout(&mut self) -> Outcome {
        if let Some(user) = self.current_user.take() {
            info!(user_id = %user.id, "Logged out");
            self.publish(StoreEvent::SessionChanged { user_id: None });
        }
        Outcome::LoggedOut
    }

    fn do_add_patient(&mut self, input: NewPatient) -> StoreResult<Outcome> {
        authorize(self.current_user.as_ref(), &Action::AddPatient)?;
        if input.name.trim().is_empty() {
            return Err(StoreError::InvalidInput("patient name is required".into()));
        }

        let patient = Patient::new(input);
        stage_patient(&mut self.patients, patient.clone())?;

        info!(patient_id = %patient.id, "Patient added");
        self.publish(StoreEvent::PatientAdded {
            id: patient.id.clone(),
        });
        Ok(Outcome::PatientAdded(patient))
    }

    fn do_add_user(&mut self, input: NewUser) -> StoreResult<Outcome> {
        authorize(self.current_user.as_ref(), &Action::AddUser)?;

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: input.email.trim().to_string(),
            password_hash: self.hasher.hash(&input.password)?,
            name: input.name,
            role: input.role,
            patient_id: input.patient_id,
        };
        stage_user(&mut self.users, &self.patients, user.clone())?;

        info!(user_id = %user.id, role = %user.role, "User added");
        self.publish(StoreEvent::UserAdded {
            id: user.id.clone(),
        });
        Ok(Outcome::UserAdded(user))
    }

    fn do_update_patient(&mut self, id: &str, update: PatientUpdate) -> StoreResult<Outcome> {
        let fields = update.fields();
        authorize(
            self.current_user.as_ref(),
            &Action::EditPatient {
                patient_id: id,
                fields: &fields,
            },
        )?;
        if update.is_empty() {
            return Err(StoreError::InvalidInput("update carries no fields".into()));
        }

        let patient = self
            .patients
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::PatientNotFound(id.to_string()))?;

        update.apply_to(patient);
        let updated = patient.clone();

        info!(patient_id = id, ?fields, "Patient updated");
        self.publish(StoreEvent::PatientUpdated {
            id: id.to_string(),
            fields,
        });
        Ok(Outcome::PatientUpdated(updated))
    }

    fn do_update_measurement(
        &mut self,
        patient_id: &str,
        measurement_id: &str,
        patch: MeasurementPatch,
    ) -> StoreResult<Outcome> {
        let fields = [PatientField::Anthropometry];
        authorize(
            self.current_user.as_ref(),
            &Action::EditPatient {
                patient_id,
                fields: &fields,
            },
        )?;

        let patient = self
            .patients
            .iter_mut()
            .find(|p| p.id == patient_id)
            .ok_or_else(|| StoreError::PatientNotFound(patient_id.to_string()))?;

        let measurement = patient
            .anthropometry
            .iter_mut()
            .find(|m| m.id == measurement_id)
            .ok_or_else(|| StoreError::MeasurementNotFound(measurement_id.to_string()))?;

        measurement.apply(patch);
        debug!(patient_id, measurement_id, imc = measurement.imc(), "Measurement edited");
        let updated = patient.clone();

        self.publish(StoreEvent::PatientUpdated {
            id: patient_id.to_string(),
            fields: fields.to_vec(),
        });
        Ok(Outcome::PatientUpdated(updated))
    }

    fn do_update_theme(&mut self, theme: ThemeConfig) -> StoreResult<Outcome> {
        authorize(self.current_user.as_ref(), &Action::UpdateTheme)?;

        self.theme = theme.clone();
        self.publish(StoreEvent::ThemeChanged);
        Ok(Outcome::ThemeUpdated(theme))
    }

    // =========================================================================
    // Convenience wrappers
    // =========================================================================

    /// Sign in. On failure the current session is left as it was.
    pub fn login(&mut self, email: &str, password: &str) -> StoreResult<User> {
        match self.dispatch(Command::Login {
            email: email.to_string(),
            password: password.to_string(),
        })? {
            Outcome::LoggedIn(user) => Ok(user),
            other => Err(unexpected(other)),
        }
    }

    pub fn logout(&mut self) {
        // Logout has no failure path.
        let _ = self.dispatch(Command::Logout);
    }

    pub fn add_patient(&mut self, input: NewPatient) -> StoreResult<Patient> {
        match self.dispatch(Command::AddPatient(input))? {
            Outcome::PatientAdded(patient) => Ok(patient),
            other => Err(unexpected(other)),
        }
    }

    pub fn add_user(&mut self, input: NewUser) -> StoreResult<User> {
        match self.dispatch(Command::AddUser(input))? {
            Outcome::UserAdded(user) => Ok(user),
            other => Err(unexpected(other)),
        }
    }

    /// Shallow-merge `update` into patient `id`.
    pub fn update_patient(&mut self, id: &str, update: PatientUpdate) -> StoreResult<Patient> {
        match self.dispatch(Command::UpdatePatient {
            id: id.to_string(),
            update,
        })? {
            Outcome::PatientUpdated(patient) => Ok(patient),
            other => Err(unexpected(other)),
        }
    }

    pub fn update_measurement(
        &mut self,
        patient_id: &str,
        measurement_id: &str,
        patch: MeasurementPatch,
    ) -> StoreResult<Patient> {
        match self.dispatch(Command::UpdateMeasurement {
            patient_id: patient_id.to_string(),
            measurement_id: measurement_id.to_string(),
            patch,
        })? {
            Outcome::PatientUpdated(patient) => Ok(patient),
            other => Err(unexpected(other)),
        }
    }

    pub fn update_theme(&mut self, theme: ThemeConfig) -> StoreResult<()> {
        self.dispatch(Command::UpdateTheme(theme)).map(|_| ())
    }

    /// Restore the configured default theme.
    pub fn reset_theme(&mut self) -> StoreResult<()> {
        self.dispatch(Command::ResetTheme).map(|_| ())
    }

    // =========================================================================
    // Tab writes (built on partial updates)
    // =========================================================================

    /// Prepend an evolution note.
    pub fn add_note(&mut self, patient_id: &str, note: Note) -> StoreResult<Patient> {
        let mut notes = self.editable_patient(patient_id, PatientField::Notes)?.notes.clone();
        notes.insert(0, note);
        self.update_patient(
            patient_id,
            PatientUpdate {
                notes: Some(notes),
                ..Default::default()
            },
        )
    }

    /// Prepend an anthropometry visit.
    pub fn add_measurement(
        &mut self,
        patient_id: &str,
        measurement: Anthropometry,
    ) -> StoreResult<Patient> {
        let mut series = self
            .editable_patient(patient_id, PatientField::Anthropometry)?
            .anthropometry
            .clone();
        if series.iter().any(|m| m.id == measurement.id) {
            return Err(StoreError::DuplicateMeasurement(measurement.id));
        }
        series.insert(0, measurement);
        self.update_patient(
            patient_id,
            PatientUpdate {
                anthropometry: Some(series),
                ..Default::default()
            },
        )
    }

    /// Record a day of plan adherence, replacing any entry for the same date.
    pub fn record_adherence(&mut self, patient_id: &str, entry: Adherence) -> StoreResult<Patient> {
        let mut entries = self
            .editable_patient(patient_id, PatientField::Adherence)?
            .adherence
            .clone();
        match entries.iter_mut().find(|e| e.date == entry.date) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        self.update_patient(
            patient_id,
            PatientUpdate {
                adherence: Some(entries),
                ..Default::default()
            },
        )
    }

    /// Authorize a write of `field` before looking the record up, so a
    /// rejected caller learns nothing about which IDs exist.
    fn editable_patient(&self, id: &str, field: PatientField) -> StoreResult<&Patient> {
        authorize(
            self.current_user.as_ref(),
            &Action::EditPatient {
                patient_id: id,
                fields: &[field],
            },
        )?;
        self.patient(id)
            .ok_or_else(|| StoreError::PatientNotFound(id.to_string()))
    }
}

fn stage_patient(roster: &mut Vec<Patient>, patient: Patient) -> StoreResult<()> {
    if roster.iter().any(|p| p.id == patient.id) {
        return Err(StoreError::DuplicatePatient(patient.id));
    }
    roster.push(patient);
    Ok(())
}

fn stage_user(users: &mut Vec<User>, patients: &[Patient], user: User) -> StoreResult<()> {
    if user.email.is_empty() {
        return Err(StoreError::InvalidInput("user email is required".into()));
    }
    if users.iter().any(|u| u.id == user.id || u.email == user.email) {
        return Err(StoreError::DuplicateUser(user.email));
    }
    if user.role == Role::Patient {
        let link = user
            .patient_id
            .as_deref()
            .ok_or_else(|| StoreError::InvalidLink(String::new()))?;
        if !patients.iter().any(|p| p.id == link) {
            return Err(StoreError::InvalidLink(link.to_string()));
        }
    }
    users.push(user);
    Ok(())
}

fn unexpected(outcome: Outcome) -> StoreError {
    StoreError::InvalidInput(format!("unexpected outcome: {:?}", outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthSettings;
    use crate::models::Gender;
    use std::sync::{Arc, Mutex};

    fn empty_store() -> NutriStore {
        let config = NutriConfig {
            auth: AuthSettings::fast(),
            store: crate::config::StoreSettings {
                seed_demo_data: false,
            },
            ..Default::default()
        };
        NutriStore::new(&config).unwrap()
    }

    fn store_with_roster() -> NutriStore {
        let mut store = empty_store();
        let hash = store.hasher().hash("right-password").unwrap();
        let patient = Patient::with_id(
            "p1",
            NewPatient {
                name: "Ana".into(),
                gender: Gender::F,
                ..Default::default()
            },
        );
        let users = vec![
            User {
                id: "u-admin".into(),
                email: "x@x.com".into(),
                password_hash: hash.clone(),
                name: "Dra. Ruiz".into(),
                role: Role::Admin,
                patient_id: None,
            },
            User {
                id: "u-ana".into(),
                email: "ana@mail.com".into(),
                password_hash: hash,
                name: "Ana".into(),
                role: Role::Patient,
                patient_id: Some("p1".into()),
            },
        ];
        store.bootstrap(users, vec![patient]).unwrap();
        store
    }

    #[test]
    fn test_login_wrong_password_leaves_session_unset() {
        let mut store = store_with_roster();
        let err = store.login("x@x.com", "wrong").unwrap_err();
        assert_eq!(err, StoreError::Auth(AuthError::InvalidCredentials));
        assert!(store.current_user().is_none());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_failed_login_keeps_existing_session() {
        let mut store = store_with_roster();
        store.login("x@x.com", "right-password").unwrap();
        assert!(store.login("ana@mail.com", "nope-nope").is_err());
        assert_eq!(store.current_user().map(|u| u.id.as_str()), Some("u-admin"));
    }

    #[test]
    fn test_login_email_must_match_exactly() {
        let mut store = store_with_roster();
        assert!(store.login("X@x.com", "right-password").is_err());
        assert!(store.login(" x@x.com", "right-password").is_err());
    }

    #[test]
    fn test_update_unknown_patient() {
        let mut store = store_with_roster();
        store.login("x@x.com", "right-password").unwrap();
        let err = store
            .update_patient(
                "ghost",
                PatientUpdate {
                    name: Some("x".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, StoreError::PatientNotFound("ghost".into()));
    }

    #[test]
    fn test_update_requires_session() {
        let mut store = store_with_roster();
        let err = store
            .update_patient(
                "p1",
                PatientUpdate {
                    phone: Some("1".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, StoreError::Auth(AuthError::NotAuthenticated));
    }

    #[test]
    fn test_listeners_see_every_write() {
        let mut store = store_with_roster();
        let seen: Arc<Mutex<Vec<ChangeNotice>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let sub = store.subscribe(move |n| sink.lock().unwrap().push(n.clone()));

        store.login("x@x.com", "right-password").unwrap();
        store
            .update_patient(
                "p1",
                PatientUpdate {
                    occupation: Some("Chef".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        {
            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 2);
            assert_eq!(seen[1].revision, 2);
            assert_eq!(
                seen[1].event,
                StoreEvent::PatientUpdated {
                    id: "p1".into(),
                    fields: vec![PatientField::Occupation],
                }
            );
        }

        assert!(store.unsubscribe(sub));
        store.logout();
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert_eq!(store.revision(), 3);
    }

    #[test]
    fn test_record_adherence_replaces_same_day() {
        let mut store = store_with_roster();
        store.login("ana@mail.com", "right-password").unwrap();

        let day = |completed| Adherence {
            date: "2024-05-01".into(),
            completed,
            total: 4,
            checks: None,
        };
        store.record_adherence("p1", day(1)).unwrap();
        let patient = store.record_adherence("p1", day(3)).unwrap();

        assert_eq!(patient.adherence.len(), 1);
        assert_eq!(patient.adherence[0].completed, 3);
    }

    #[test]
    fn test_add_user_rejects_dangling_link() {
        let mut store = store_with_roster();
        store.login("x@x.com", "right-password").unwrap();
        let err = store
            .add_user(NewUser {
                email: "new@mail.com".into(),
                password: "long-enough".into(),
                name: "New".into(),
                role: Role::Patient,
                patient_id: Some("ghost".into()),
            })
            .unwrap_err();
        assert_eq!(err, StoreError::InvalidLink("ghost".into()));
    }

    #[test]
    fn test_bootstrap_rejects_duplicates() {
        let mut store = store_with_roster();
        let dup = Patient::with_id("p1", NewPatient::default());
        let err = store.bootstrap(Vec::new(), vec![dup]).unwrap_err();
        assert_eq!(err, StoreError::DuplicatePatient("p1".into()));
    }

    #[test]
    fn test_empty_update_rejected_without_event() {
        let mut store = store_with_roster();
        store.login("ana@mail.com", "right-password").unwrap();
        let revision = store.revision();

        assert!(store.update_patient("p1", PatientUpdate::default()).is_err());
        assert_eq!(store.revision(), revision);

        store.login("x@x.com", "right-password").unwrap();
        let revision = store.revision();
        let err = store.update_patient("p1", PatientUpdate::default()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_tab_writes_authorize_before_lookup() {
        let mut store = store_with_roster();
        let not_signed_in = StoreError::Auth(AuthError::NotAuthenticated);

        for id in ["p1", "ghost"] {
            assert_eq!(
                store.add_note(id, Note::new("2024-05-01", "x")).unwrap_err(),
                not_signed_in
            );
            assert_eq!(
                store
                    .add_measurement(id, Anthropometry::new("2024-05-01", 70.0, 170.0))
                    .unwrap_err(),
                not_signed_in
            );
            assert_eq!(
                store.record_adherence(id, Adherence::default()).unwrap_err(),
                not_signed_in
            );
        }
    }

    #[test]
    fn test_add_measurement_rejects_duplicate_id() {
        let mut store = store_with_roster();
        store.login("x@x.com", "right-password").unwrap();

        let visit = Anthropometry::new("2024-05-01", 70.0, 170.0);
        store.add_measurement("p1", visit.clone()).unwrap();
        let revision = store.revision();

        let err = store.add_measurement("p1", visit.clone()).unwrap_err();
        assert_eq!(err, StoreError::DuplicateMeasurement(visit.id));
        assert_eq!(store.patient("p1").unwrap().anthropometry.len(), 1);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_rejected_bootstrap_inserts_nothing() {
        let mut store = store_with_roster();
        let user = |id: &str| User {
            id: id.into(),
            email: "same@x.com".into(),
            password_hash: String::new(),
            name: id.into(),
            role: Role::Admin,
            patient_id: None,
        };

        let err = store
            .bootstrap(
                vec![user("a"), user("b")],
                vec![Patient::with_id("p9", NewPatient::default())],
            )
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateUser("same@x.com".into()));
        assert_eq!(store.patients().len(), 1);
        assert_eq!(store.users().len(), 2);
        assert_eq!(store.revision(), 0);
        assert!(store.patient("p9").is_none());
    }
}
