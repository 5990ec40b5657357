//! Fuzzy roster search.
//!
//! A name or email containing the query scores 1.0. Otherwise the best of
//! Jaro-Winkler against each name token and normalized Levenshtein against the
//! full name is used.

use serde::Serialize;
use strsim::{jaro_winkler, normalized_levenshtein};

use crate::config::SearchSettings;
use crate::models::Patient;

/// A roster search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub patient_id: String,
    pub name: String,
    pub email: String,
    pub score: f64,
}

/// Rank patients against `query`, best first, ties broken by name.
///
/// An empty query lists the whole roster (up to the limit).
pub fn search_patients(patients: &[Patient], query: &str, settings: &SearchSettings) -> Vec<SearchHit> {
    let query = query.trim().to_lowercase();

    let mut hits: Vec<SearchHit> = patients
        .iter()
        .map(|p| SearchHit {
            patient_id: p.id.clone(),
            name: p.name.clone(),
            email: p.email.clone(),
            score: score_patient(p, &query),
        })
        .filter(|hit| hit.score >= settings.min_score)
        .collect();

    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    hits.truncate(settings.limit);
    hits
}

fn score_patient(patient: &Patient, query: &str) -> f64 {
    if query.is_empty() {
        return 1.0;
    }

    let name = patient.name.to_lowercase();
    let email = patient.email.to_lowercase();
    if name.contains(query) || email.contains(query) {
        return 1.0;
    }

    let token_score = name
        .split_whitespace()
        .map(|token| jaro_winkler(query, token))
        .fold(0.0, f64::max);

    token_score.max(normalized_levenshtein(query, &name))
}
