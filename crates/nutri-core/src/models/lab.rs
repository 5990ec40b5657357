//! Laboratory results.

use serde::{Deserialize, Serialize};

/// Reference-range flag on a lab marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerFlag {
    High,
    Low,
    Normal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabMarker {
    pub name: String,
    pub value: String,
    pub unit: Option<String>,
    pub flag: Option<MarkerFlag>,
}

impl LabMarker {
    /// Out of range (high or low).
    pub fn is_flagged(&self) -> bool {
        matches!(self.flag, Some(MarkerFlag::High | MarkerFlag::Low))
    }
}

/// A lab panel with its markers and scanned attachments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LabResult {
    pub id: String,
    pub name: String,
    pub date: String,
    /// Attachment image URLs
    pub attachments: Vec<String>,
    pub markers: Vec<LabMarker>,
}

impl LabResult {
    pub fn flagged_markers(&self) -> impl Iterator<Item = &LabMarker> {
        self.markers.iter().filter(|m| m.is_flagged())
    }
}
