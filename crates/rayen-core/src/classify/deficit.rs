//! Developmental-deficit tag detection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::text::normalize;

/// Psychomotor development finding recorded in the DÉFICIT column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Deficit {
    Rezago,
    Riesgo,
    Retraso,
    /// Riesgo biopsicosocial
    Rbps,
    /// Special health-care needs (NANEAS)
    Naneas,
}

impl Deficit {
    /// Tags in match order.
    pub const ALL: [Deficit; 5] = [
        Deficit::Rezago,
        Deficit::Riesgo,
        Deficit::Retraso,
        Deficit::Rbps,
        Deficit::Naneas,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Deficit::Rezago => "REZAGO",
            Deficit::Riesgo => "RIESGO",
            Deficit::Retraso => "RETRASO",
            Deficit::Rbps => "RBPS",
            Deficit::Naneas => "NANEAS",
        }
    }

    /// Read a deficit back from a sheet cell.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = normalize(value);
        Self::ALL.into_iter().find(|d| d.label() == normalized)
    }
}

impl fmt::Display for Deficit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// First deficit tag contained in the text, in [`Deficit::ALL`] order.
pub fn detect_deficit(raw_text: &str) -> Option<Deficit> {
    let normalized = normalize(raw_text);
    Deficit::ALL
        .into_iter()
        .find(|deficit| normalized.contains(deficit.label()))
}
