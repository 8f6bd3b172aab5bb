//! The page-driver seam between the flows and a live portal session.
//!
//! A driver owns one logical "current page"; every call is blocking and
//! the flows never issue two calls at once.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::PortalResult;

/// Menu path to the scheduled-patients list.
pub const MENU_SCHEDULED_PATIENTS: [&str; 2] = ["Box", "Pacientes citados"];
/// Menu path to the patient search used when filling sheets.
pub const MENU_ADD_DOCUMENTS: [&str; 2] = ["Box", "Agregar documentos"];
/// Record-tree section holding the clinical note.
pub const ANAMNESIS_SECTION: &str = "Anamnesis";

/// Portal login. The password never appears in `Debug` output.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// Health centre shown in the login location picker
    pub location: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("location", &self.location)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One row of the scheduled-patients table, as raw cell text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VisitRow {
    /// Visit status cell, e.g. "Atendido" or "No se presentó"
    pub status: String,
    /// Patient name cell, possibly with annotations
    pub name: String,
}

/// A header/value pair from the patient record tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableEntry {
    pub header: String,
    pub value: String,
}

/// Outcome of opening a date node and one of its sections in the record tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionLookup {
    pub date_found: bool,
    pub section_found: bool,
    /// Text blocks shown under the section
    pub texts: Vec<String>,
}

impl SectionLookup {
    pub fn date_missing() -> Self {
        Self::default()
    }

    pub fn section_missing() -> Self {
        Self {
            date_found: true,
            ..Self::default()
        }
    }

    pub fn found(texts: Vec<String>) -> Self {
        Self {
            date_found: true,
            section_found: true,
            texts,
        }
    }
}

/// Capabilities the flows need from a portal session.
///
/// `Ok(false)` (or an empty lookup) means the page was reachable but the
/// thing asked for is not there; `Err` means the session itself failed.
pub trait PageDriver {
    fn login(&mut self, credentials: &Credentials) -> PortalResult<()>;

    /// Follow a menu path such as [`MENU_SCHEDULED_PATIENTS`].
    fn navigate_to(&mut self, menu_path: &[&str]) -> PortalResult<()>;

    /// Wait for loaders to finish and dismiss blocking modals.
    fn wait_until_stable(&mut self) -> PortalResult<()>;

    /// Pick a day in the scheduled-patients calendar.
    fn select_date(&mut self, date: NaiveDate) -> PortalResult<bool>;

    fn read_visit_rows(&mut self) -> PortalResult<Vec<VisitRow>>;

    /// Text of the popover opened by clicking row `row`.
    fn read_popover_text(&mut self, row: usize) -> PortalResult<String>;

    /// Open a patient's follow-up record by RUN.
    fn search_patient(&mut self, run: &str) -> PortalResult<bool>;

    /// Header/value pairs of the record tables on the current page.
    fn read_table(&mut self) -> PortalResult<Vec<TableEntry>>;

    fn find_date_node(&mut self, date: NaiveDate) -> PortalResult<bool>;

    fn open_date_and_section(
        &mut self,
        date: NaiveDate,
        section: &str,
    ) -> PortalResult<SectionLookup>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials {
            location: "CESFAM".into(),
            username: "enfermera".into(),
            password: "secreto".into(),
        };
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("enfermera"));
        assert!(!debug.contains("secreto"));
    }

    #[test]
    fn test_section_lookup_constructors() {
        assert!(!SectionLookup::date_missing().date_found);
        let missing = SectionLookup::section_missing();
        assert!(missing.date_found && !missing.section_found);
        assert_eq!(SectionLookup::found(vec!["x".into()]).texts, ["x"]);
    }
}
