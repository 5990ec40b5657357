//! UI theme configuration.

use serde::{Deserialize, Serialize};

/// Global color and font configuration shared by every view.
///
/// Values are passed through to the UI unvalidated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeConfig {
    pub app_bg: String,
    pub card_bg: String,
    pub text_color: String,
    pub primary_color: String,
    pub font_family: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            app_bg: "#020617".into(),
            card_bg: "#0f172a".into(),
            text_color: "#f1f5f9".into(),
            primary_color: "#2563eb".into(),
            font_family: "'Inter', sans-serif".into(),
        }
    }
}

/// Font families offered by the settings screen.
pub const FONT_CHOICES: [&str; 4] = [
    "'Inter', sans-serif",
    "'Merriweather', serif",
    "'Roboto Mono', monospace",
    "system-ui, sans-serif",
];
