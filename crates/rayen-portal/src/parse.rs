//! Parsing of portal page text into patient fields.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use rayen_core::classify::{parse_sex, AttentionType, Sex};
use rayen_core::text::{format_rut, normalize_simple};

use crate::TableEntry;

static RUN_FORMATTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"RUN\s*:?\s*([\d\.]+-[\dkK])").expect("valid RUN regex"));
static RUN_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"RUN\s*:?\s*(\d+)").expect("valid RUN digits regex"));
static SECTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)sector:\s*(\w+)").expect("valid sector regex"));
static AGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Paciente de:\s*(.+)").expect("valid age regex"));

/// Fields shown in the popover of a scheduled visit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PopoverInfo {
    /// Formatted RUN, empty when the popover shows none
    pub run: String,
    pub sector: Option<String>,
    /// Free-text age, e.g. "1 año 3 meses 2 días"
    pub age_text: Option<String>,
}

/// Extract RUN, sector and age text from popover text.
///
/// A RUN already written with a check digit is kept (upper-cased); bare
/// digits are formatted.
pub fn parse_popover(text: &str) -> PopoverInfo {
    let run = RUN_FORMATTED
        .captures(text)
        .map(|caps| caps[1].to_uppercase())
        .or_else(|| RUN_DIGITS.captures(text).map(|caps| format_rut(&caps[1])))
        .unwrap_or_default();

    let sector = SECTOR.captures(text).map(|caps| caps[1].to_uppercase());
    let age_text = AGE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|age| !age.is_empty());

    PopoverInfo {
        run,
        sector,
        age_text,
    }
}

/// Attention type implied by the visit status cell.
pub fn visit_status(status: &str) -> AttentionType {
    if normalize_simple(status).contains("no se present") {
        AttentionType::NoShow
    } else {
        AttentionType::Assisted
    }
}

/// Age and sex as shown in the patient's general record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDetails {
    pub age_text: Option<String>,
    pub sex: Option<Sex>,
}

/// Read age and biological sex from record-table entries.
///
/// The first "edad" entry wins; sex comes from the first "sexo biológico"
/// entry whose value parses.
pub fn parse_record_table(entries: &[TableEntry]) -> RecordDetails {
    let mut details = RecordDetails::default();
    for entry in entries {
        let header = normalize_simple(&entry.header);
        let value = entry.value.trim();

        if details.age_text.is_none() && header.contains("edad") && !value.is_empty() {
            details.age_text = Some(value.to_string());
        }
        if details.sex.is_none() && header.contains("sexo") && header.contains("biologico") {
            details.sex = parse_sex(value);
        }
    }
    details
}
