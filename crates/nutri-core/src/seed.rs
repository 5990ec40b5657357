//! Demo roster loaded when `store.seed_demo_data` is set.

use std::collections::BTreeMap;

use crate::auth::CredentialHasher;
use crate::models::{
    Activity, Adherence, AdherenceChecks, Anthropometry, Background, Budget, Circumference,
    ClinicalHistory, Diet, Gender, LabMarker, LabResult, Lifestyle, MarkerFlag, Meal, MealSection,
    NewPatient, Note, Patient, Plan, Preferences, Recall24h, Role, Sleep, User,
};
use crate::store::StoreResult;

/// Demo clinician login.
pub const DEMO_ADMIN_EMAIL: &str = "admin@nutriclinical.com";
pub const DEMO_ADMIN_PASSWORD: &str = "admin1234";

/// Demo patient login, linked to `DEMO_PATIENT_ID`.
pub const DEMO_PATIENT_EMAIL: &str = "maria@mail.com";
pub const DEMO_PATIENT_PASSWORD: &str = "paciente123";
pub const DEMO_PATIENT_ID: &str = "p1";

/// Build the demo users and patients.
pub fn demo_roster(hasher: &CredentialHasher) -> StoreResult<(Vec<User>, Vec<Patient>)> {
    let users = vec![
        User {
            id: "u1".into(),
            email: DEMO_ADMIN_EMAIL.into(),
            password_hash: hasher.hash(DEMO_ADMIN_PASSWORD)?,
            name: "Dra. Elena Ruiz".into(),
            role: Role::Admin,
            patient_id: None,
        },
        User {
            id: "u2".into(),
            email: DEMO_PATIENT_EMAIL.into(),
            password_hash: hasher.hash(DEMO_PATIENT_PASSWORD)?,
            name: "María González".into(),
            role: Role::Patient,
            patient_id: Some(DEMO_PATIENT_ID.into()),
        },
    ];

    Ok((users, vec![maria(), carlos()]))
}

fn maria() -> Patient {
    let mut patient = Patient::with_id(
        DEMO_PATIENT_ID,
        NewPatient {
            name: "María González".into(),
            email: DEMO_PATIENT_EMAIL.into(),
            phone: "+34 600 111 222".into(),
            dob: "1988-05-14".into(),
            gender: Gender::F,
            occupation: "Arquitecta".into(),
            marital_status: Some("Casada".into()),
            address: None,
        },
    );

    patient.notes = vec![
        Note {
            next_appointment: Some("2024-04-12".into()),
            observations: "Buena adherencia, reducir harinas por la noche.".into(),
            ..Note::new("2024-03-15", "Control mensual")
        },
        Note {
            observations: "Motivada, refiere picoteo por ansiedad.".into(),
            ..Note::new("2024-02-10", "Primera consulta")
        },
    ];

    patient.lifestyle = Lifestyle {
        activity: Activity {
            regular: true,
            details: "Caminata 30 min, 4 días por semana".into(),
        },
        sleep: Sleep {
            hours: "6-7".into(),
            stress: "Alto".into(),
        },
        diet: Diet {
            meals: "3 comidas + 1 snack".into(),
            water: "1.5L".into(),
            alcohol: false,
            tobacco: false,
        },
        bowel_movement: Some("Regular".into()),
        preferences: Preferences {
            likes: "Pescado, frutas".into(),
            dislikes: "Hígado".into(),
            budget: Budget::Medio,
            access: "Supermercado cercano".into(),
            eating_out: "2 veces por semana".into(),
        },
    };

    patient.anthropometry = vec![
        Anthropometry {
            circumference: Circumference {
                waist: 86.0,
                hip: 104.0,
                ..Default::default()
            },
            ..Anthropometry::new("2024-03-15", 72.5, 165.0)
        },
        Anthropometry {
            circumference: Circumference {
                waist: 90.0,
                hip: 106.0,
                ..Default::default()
            },
            ..Anthropometry::new("2024-02-10", 75.0, 165.0)
        },
    ];

    patient.clinical = ClinicalHistory {
        background: Background {
            motive: "Reducción de peso".into(),
            medications: "Ninguno".into(),
            family_history: "Diabetes tipo 2 (madre)".into(),
            pathological: None,
        },
        gyneco: None,
        recall_24h: Recall24h {
            breakfast: "Café con leche y tostada".into(),
            snack_am: "Fruta".into(),
            lunch: "Arroz con pollo".into(),
            snack_pm: "Galletas".into(),
            dinner: "Sándwich".into(),
        },
        frequencies: BTreeMap::from([
            ("Verduras".to_string(), "Diario".to_string()),
            ("Azúcares".to_string(), "Semanal".to_string()),
        ]),
    };

    patient.plans = vec![Plan {
        id: "plan-1".into(),
        name: "Déficit moderado".into(),
        kcal_target: 1600,
        active: true,
        sections: vec![MealSection {
            title: "Desayuno".into(),
            options: vec![Meal {
                id: "m1".into(),
                name: "Opción 1".into(),
                description: "Avena con frutos rojos".into(),
            }],
        }],
        supplements: "Vitamina D".into(),
        avoid: "Bebidas azucaradas".into(),
        created_at: "2024-02-10".into(),
    }];

    patient.adherence = vec![Adherence::from_checks(
        "2024-03-16",
        AdherenceChecks {
            breakfast: true,
            lunch: true,
            dinner: true,
            supplements: false,
        },
    )];

    patient.labs = vec![LabResult {
        id: "lab-1".into(),
        name: "Perfil lipídico".into(),
        date: "2024-02-08".into(),
        attachments: Vec::new(),
        markers: vec![
            LabMarker {
                name: "Colesterol total".into(),
                value: "232".into(),
                unit: Some("mg/dL".into()),
                flag: Some(MarkerFlag::High),
            },
            LabMarker {
                name: "HDL".into(),
                value: "52".into(),
                unit: Some("mg/dL".into()),
                flag: Some(MarkerFlag::Normal),
            },
        ],
    }];

    patient
}

fn carlos() -> Patient {
    let mut patient = Patient::with_id(
        "p2",
        NewPatient {
            name: "Carlos Pérez".into(),
            email: "carlos@mail.com".into(),
            phone: "+34 600 333 444".into(),
            dob: "1975-11-02".into(),
            gender: Gender::M,
            occupation: "Conductor".into(),
            marital_status: None,
            address: Some("Av. Central 12".into()),
        },
    );
    patient.notes = vec![Note {
        next_appointment: Some("2024-04-12".into()),
        ..Note::new("2024-03-20", "Evaluación inicial")
    }];
    patient.anthropometry = vec![Anthropometry::new("2024-03-20", 98.0, 178.0)];
    patient
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthSettings;

    #[test]
    fn test_demo_roster_links_resolve() {
        let hasher = CredentialHasher::new(&AuthSettings::fast()).unwrap();
        let (users, patients) = demo_roster(&hasher).unwrap();

        for user in users.iter().filter(|u| u.role == Role::Patient) {
            let link = user.patient_id.as_deref().unwrap();
            assert!(patients.iter().any(|p| p.id == link));
        }
        assert!(users.iter().all(|u| !u.password_hash.contains(DEMO_ADMIN_PASSWORD)));
    }
}
