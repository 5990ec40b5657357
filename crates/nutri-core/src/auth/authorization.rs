//! Role-based capability checks.
//!
//! Default-deny. Rules, checked in order:
//! 1. No session → DENY
//! 2. Admin → ALLOW everything
//! 3. Patient viewing their own linked record → ALLOW
//! 4. Patient editing their own record, adherence only → ALLOW
//! 5. Any authenticated user → theme and calculator
//! 6. Default → DENY
//!
//! Both the session gate and every store mutator call into this module, so a
//! control hidden in a view is also refused by the store.

use tracing::warn;

use super::{AuthError, AuthResult};
use crate::models::{PatientField, User};

/// Something a user is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    ViewDashboard,
    ViewRoster,
    ViewPatient(&'a str),
    EditPatient {
        patient_id: &'a str,
        fields: &'a [PatientField],
    },
    AddPatient,
    AddUser,
    UpdateTheme,
    UseCalculator,
}

impl Action<'_> {
    /// Short description used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Action::ViewDashboard => "view the dashboard",
            Action::ViewRoster => "view the patient roster",
            Action::ViewPatient(_) => "view this patient record",
            Action::EditPatient { .. } => "edit this patient record",
            Action::AddPatient => "add patients",
            Action::AddUser => "add users",
            Action::UpdateTheme => "change the theme",
            Action::UseCalculator => "use the calculator",
        }
    }
}

/// Why access was granted or denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessReason {
    /// Clinician with full access
    Clinician,
    /// Patient reading their own record
    OwnRecord,
    /// Patient checking off plan adherence
    AdherenceSelfReport,
    /// Open to any signed-in user
    Authenticated,
    /// No session
    NotAuthenticated,
    /// No rule matched
    Denied,
}

/// Result of a capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: AccessReason,
}

impl AccessDecision {
    fn allow(reason: AccessReason) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }

    fn deny(reason: AccessReason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }
}

/// Evaluate `action` for `user` without producing an error.
pub fn check(user: Option<&User>, action: &Action<'_>) -> AccessDecision {
    let Some(user) = user else {
        return AccessDecision::deny(AccessReason::NotAuthenticated);
    };

    if user.is_admin() {
        return AccessDecision::allow(AccessReason::Clinician);
    }

    let own = |id: &str| user.linked_patient() == Some(id);

    match action {
        Action::ViewPatient(id) if own(*id) => AccessDecision::allow(AccessReason::OwnRecord),
        Action::EditPatient { patient_id, fields }
            if own(*patient_id)
                && !fields.is_empty()
                && fields.iter().all(|f| *f == PatientField::Adherence) =>
        {
            AccessDecision::allow(AccessReason::AdherenceSelfReport)
        }
        Action::UpdateTheme | Action::UseCalculator => {
            AccessDecision::allow(AccessReason::Authenticated)
        }
        _ => AccessDecision::deny(AccessReason::Denied),
    }
}

/// Evaluate `action` for `user`, turning a denial into an [`AuthError`].
pub fn authorize(user: Option<&User>, action: &Action<'_>) -> AuthResult<AccessReason> {
    let decision = check(user, action);
    if decision.allowed {
        return Ok(decision.reason);
    }

    match decision.reason {
        AccessReason::NotAuthenticated => {
            warn!(?action, "Rejected action without a session");
            Err(AuthError::NotAuthenticated)
        }
        _ => {
            let user_id = user.map(|u| u.id.as_str()).unwrap_or_default();
            warn!(user_id, ?action, "Rejected action");
            Err(AuthError::Forbidden(action.describe().to_string()))
        }
    }
}
