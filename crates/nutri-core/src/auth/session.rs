//! Route and tab gating for the current session.

use super::authorization::{check, Action};
use crate::models::{Patient, PatientField, User};

/// Navigable screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Patients,
    PatientDetail(String),
    Calculator,
    ThemeSettings,
}

impl Route {
    /// URL path of the screen.
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/".into(),
            Route::Dashboard => "/dashboard".into(),
            Route::Patients => "/patients".into(),
            Route::PatientDetail(id) => format!("/patients/{}", id),
            Route::Calculator => "/calculator".into(),
            Route::ThemeSettings => "/settings/theme".into(),
        }
    }

    /// Parse a URL path; trailing slashes are ignored. `/` is the login entry,
    /// `/login` an alias of it.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" | "/login" => Some(Route::Login),
            "/dashboard" => Some(Route::Dashboard),
            "/patients" => Some(Route::Patients),
            "/calculator" => Some(Route::Calculator),
            "/settings/theme" => Some(Route::ThemeSettings),
            _ => trimmed
                .strip_prefix("/patients/")
                .filter(|id| !id.is_empty() && !id.contains('/'))
                .map(|id| Route::PatientDetail(id.to_string())),
        }
    }
}

/// Outcome of resolving a route for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(Route),
}

/// Tabs of the patient detail screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Notes,
    Lifestyle,
    Anthropometry,
    Clinical,
    Plans,
    Labs,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Notes,
        Tab::Lifestyle,
        Tab::Anthropometry,
        Tab::Clinical,
        Tab::Plans,
        Tab::Labs,
    ];

    /// Parse the tab key used by UI shells.
    pub fn parse(s: &str) -> Option<Tab> {
        match s.to_lowercase().as_str() {
            "notes" => Some(Tab::Notes),
            "lifestyle" => Some(Tab::Lifestyle),
            "anthropometry" => Some(Tab::Anthropometry),
            "clinical" => Some(Tab::Clinical),
            "plans" => Some(Tab::Plans),
            "labs" => Some(Tab::Labs),
            _ => None,
        }
    }

    /// Record field the tab writes through.
    pub fn field(self) -> PatientField {
        match self {
            Tab::Notes => PatientField::Notes,
            Tab::Lifestyle => PatientField::Lifestyle,
            Tab::Anthropometry => PatientField::Anthropometry,
            Tab::Clinical => PatientField::Clinical,
            Tab::Plans => PatientField::Plans,
            Tab::Labs => PatientField::Labs,
        }
    }
}

/// What the current user may do on a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabAccess {
    pub visible: bool,
    pub read_only: bool,
    /// Plans tab only: adherence check-offs are accepted
    pub can_record_adherence: bool,
}

/// Where a signed-in user lands after login.
///
/// Patients land on their own record; a patient whose link does not resolve
/// lands on the calculator, which every session may open.
pub fn landing_route(user: &User, patients: &[Patient]) -> Route {
    if user.is_admin() {
        return Route::Dashboard;
    }
    match user.linked_patient() {
        Some(id) if patients.iter().any(|p| p.id == id) => Route::PatientDetail(id.to_string()),
        _ => Route::Calculator,
    }
}

/// Decide whether `route` is reachable for `user`.
pub fn resolve(route: &Route, user: Option<&User>, patients: &[Patient]) -> RouteDecision {
    let Some(current) = user else {
        return match route {
            Route::Login => RouteDecision::Allow,
            _ => RouteDecision::Redirect(Route::Login),
        };
    };

    let action = match route {
        Route::Login => return RouteDecision::Redirect(landing_route(current, patients)),
        Route::Dashboard => Action::ViewDashboard,
        Route::Patients => Action::ViewRoster,
        Route::PatientDetail(id) => {
            if !patients.iter().any(|p| &p.id == id) {
                return RouteDecision::Redirect(not_found_fallback(current, patients));
            }
            Action::ViewPatient(id.as_str())
        }
        Route::Calculator => Action::UseCalculator,
        Route::ThemeSettings => Action::UpdateTheme,
    };

    if check(user, &action).allowed {
        RouteDecision::Allow
    } else {
        RouteDecision::Redirect(landing_route(current, patients))
    }
}

fn not_found_fallback(user: &User, patients: &[Patient]) -> Route {
    if user.is_admin() {
        Route::Dashboard
    } else {
        landing_route(user, patients)
    }
}

/// Visibility and editability of `tab` on `patient_id` for `user`.
pub fn tab_access(user: Option<&User>, patient_id: &str, tab: Tab) -> TabAccess {
    let visible = check(user, &Action::ViewPatient(patient_id)).allowed;
    let fields = [tab.field()];
    let editable = check(
        user,
        &Action::EditPatient {
            patient_id,
            fields: &fields,
        },
    )
    .allowed;

    let adherence = [PatientField::Adherence];
    let can_record_adherence = tab == Tab::Plans
        && check(
            user,
            &Action::EditPatient {
                patient_id,
                fields: &adherence,
            },
        )
        .allowed;

    TabAccess {
        visible,
        read_only: visible && !editable,
        can_record_adherence,
    }
}
