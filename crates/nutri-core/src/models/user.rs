//! User accounts and roles.

use serde::{Deserialize, Serialize};

/// Role attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Clinician: dashboard, full roster, any patient record
    Admin,
    /// Patient: only their own linked record
    Patient,
}

impl Role {
    /// String form used by the UI shells.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Patient => "patient",
        }
    }

    /// Parse the UI string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "patient" => Some(Role::Patient),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user in the roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique user ID
    pub id: String,
    /// Login email (exact match on login)
    pub email: String,
    /// Argon2 PHC string, never the plaintext password
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Display name
    pub name: String,
    /// Access role
    pub role: Role,
    /// Linked patient record, only meaningful for `Role::Patient`
    pub patient_id: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Patient record this user is linked to, if they are a patient.
    pub fn linked_patient(&self) -> Option<&str> {
        match self.role {
            Role::Patient => self.patient_id.as_deref(),
            Role::Admin => None,
        }
    }
}

/// Input for creating a user. The password is hashed on creation.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub patient_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("Patient"), Some(Role::Patient));
        assert_eq!(Role::parse("nurse"), None);
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_linked_patient_ignored_for_admin() {
        let user = User {
            id: "u1".into(),
            email: "doc@clinic.com".into(),
            password_hash: String::new(),
            name: "Doc".into(),
            role: Role::Admin,
            patient_id: Some("p1".into()),
        };
        assert_eq!(user.linked_patient(), None);
        assert!(user.is_admin());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: "u1".into(),
            email: "ana@mail.com".into(),
            password_hash: "$argon2id$secret".into(),
            name: "Ana".into(),
            role: Role::Patient,
            patient_id: Some("p1".into()),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
    }
}
