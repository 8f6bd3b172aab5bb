//! Biological sex as shown on the patient record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::text::normalize;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Sex {
    Male,
    Female,
}

const MALE_MARKERS: [&str; 3] = ["HOMBRE", "MASCULIN", "VARON"];
const FEMALE_MARKERS: [&str; 2] = ["MUJER", "FEMENIN"];

impl Sex {
    /// Label written to the SEXO column.
    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "MASCULINO",
            Sex::Female => "FEMENINO",
        }
    }

    /// Alias of [`parse_sex`] for reading sheet cells.
    pub fn parse(value: &str) -> Option<Self> {
        parse_sex(value)
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parse sex from record text such as "Hombre" or "FEMENINO".
pub fn parse_sex(text: &str) -> Option<Sex> {
    let normalized = normalize(text);
    if MALE_MARKERS.iter().any(|m| normalized.contains(m)) {
        Some(Sex::Male)
    } else if FEMALE_MARKERS.iter().any(|m| normalized.contains(m)) {
        Some(Sex::Female)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sex() {
        assert_eq!(parse_sex("Hombre"), Some(Sex::Male));
        assert_eq!(parse_sex("MASCULINO"), Some(Sex::Male));
        assert_eq!(parse_sex("varón"), Some(Sex::Male));
        assert_eq!(parse_sex("Mujer"), Some(Sex::Female));
        assert_eq!(parse_sex("femenino"), Some(Sex::Female));
        assert_eq!(parse_sex("No especificado"), None);
        assert_eq!(parse_sex(""), None);
    }

    #[test]
    fn test_label_round_trip() {
        assert_eq!(Sex::parse(Sex::Male.label()), Some(Sex::Male));
        assert_eq!(Sex::parse(Sex::Female.label()), Some(Sex::Female));
    }
}
