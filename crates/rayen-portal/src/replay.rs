//! Replay driver: serves portal pages from a recorded JSON fixture.
//!
//! Used for offline runs and tests in place of a live browser session.
//!
//! ```json
//! {
//!   "credentials": { "location": "CESFAM", "username": "u", "password": "p" },
//!   "menus": [["Box", "Pacientes citados"]],
//!   "days": {
//!     "2025-07-01": [
//!       { "status": "Atendido", "name": "ROJAS, ANA", "popover": "RUN: 11.111.111-1" }
//!     ]
//!   },
//!   "patients": {
//!     "11.111.111-1": {
//!       "table": [{ "header": "Edad", "value": "3 meses" }],
//!       "records": { "2025-07-01": { "Anamnesis": ["MOTIVO DE CONSULTA: NSP"] } }
//!     }
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use rayen_core::text::{format_rut, normalize_simple};

use crate::{
    Credentials, PageDriver, PortalError, PortalResult, SectionLookup, TableEntry, VisitRow,
};

const FIXTURE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Recorded portal content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayFixture {
    /// Expected login; any login is accepted when absent
    pub credentials: Option<Credentials>,
    /// Menu paths that exist; every path is accepted when empty
    pub menus: Vec<Vec<String>>,
    /// Scheduled visits per ISO date
    pub days: BTreeMap<String, Vec<ReplayVisit>>,
    /// Patient records keyed by RUN (any formatting)
    pub patients: BTreeMap<String, ReplayPatient>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayVisit {
    pub status: String,
    pub name: String,
    pub popover: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayPatient {
    pub table: Vec<TableEntry>,
    /// ISO date → section name → text blocks
    pub records: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

/// [`PageDriver`] over a [`ReplayFixture`].
#[derive(Debug)]
pub struct ReplayDriver {
    fixture: ReplayFixture,
    /// Patients re-keyed by formatted RUN
    patients: HashMap<String, ReplayPatient>,
    logged_in: bool,
    current_day: Option<String>,
    current_patient: Option<String>,
}

impl ReplayDriver {
    pub fn new(fixture: ReplayFixture) -> Self {
        let patients = fixture
            .patients
            .iter()
            .map(|(run, patient)| (format_rut(run), patient.clone()))
            .collect();
        Self {
            fixture,
            patients,
            logged_in: false,
            current_day: None,
            current_patient: None,
        }
    }

    pub fn from_json(json: &str) -> PortalResult<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_path(path: &Path) -> PortalResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| PortalError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let driver = Self::from_json(&json)?;
        tracing::info!("Loaded replay fixture from {}", path.display());
        Ok(driver)
    }

    fn require_login(&self) -> PortalResult<()> {
        if self.logged_in {
            Ok(())
        } else {
            Err(PortalError::Navigation("not logged in".into()))
        }
    }

    fn open_patient(&self) -> PortalResult<&ReplayPatient> {
        self.current_patient
            .as_ref()
            .and_then(|run| self.patients.get(run))
            .ok_or_else(|| PortalError::NotFound("no patient record open".into()))
    }

    fn current_visits(&self) -> PortalResult<&[ReplayVisit]> {
        self.current_day
            .as_ref()
            .and_then(|day| self.fixture.days.get(day))
            .map(Vec::as_slice)
            .ok_or_else(|| PortalError::NotFound("no date selected".into()))
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format(FIXTURE_DATE_FORMAT).to_string()
}

impl PageDriver for ReplayDriver {
    fn login(&mut self, credentials: &Credentials) -> PortalResult<()> {
        if let Some(expected) = &self.fixture.credentials {
            let location_ok =
                expected.location.is_empty() || expected.location == credentials.location;
            if !location_ok
                || expected.username != credentials.username
                || expected.password != credentials.password
            {
                return Err(PortalError::Authentication(
                    "invalid location, username or password".into(),
                ));
            }
        }
        self.logged_in = true;
        tracing::debug!("replay login accepted");
        Ok(())
    }

    fn navigate_to(&mut self, menu_path: &[&str]) -> PortalResult<()> {
        self.require_login()?;
        let known = self.fixture.menus.is_empty()
            || self.fixture.menus.iter().any(|menu| {
                menu.len() == menu_path.len()
                    && menu
                        .iter()
                        .zip(menu_path)
                        .all(|(a, b)| normalize_simple(a) == normalize_simple(b))
            });
        if !known {
            return Err(PortalError::Navigation(menu_path.join(" > ")));
        }
        self.current_day = None;
        self.current_patient = None;
        tracing::debug!(menu = %menu_path.join(" > "), "navigated");
        Ok(())
    }

    fn wait_until_stable(&mut self) -> PortalResult<()> {
        Ok(())
    }

    fn select_date(&mut self, date: NaiveDate) -> PortalResult<bool> {
        self.require_login()?;
        let key = date_key(date);
        if self.fixture.days.contains_key(&key) {
            self.current_day = Some(key);
            Ok(true)
        } else {
            self.current_day = None;
            Ok(false)
        }
    }

    fn read_visit_rows(&mut self) -> PortalResult<Vec<VisitRow>> {
        Ok(self
            .current_visits()?
            .iter()
            .map(|visit| VisitRow {
                status: visit.status.clone(),
                name: visit.name.clone(),
            })
            .collect())
    }

    fn read_popover_text(&mut self, row: usize) -> PortalResult<String> {
        self.current_visits()?
            .get(row)
            .map(|visit| visit.popover.clone())
            .ok_or_else(|| PortalError::NotFound(format!("visit row {row}")))
    }

    fn search_patient(&mut self, run: &str) -> PortalResult<bool> {
        self.require_login()?;
        let key = format_rut(run);
        let found = self.patients.contains_key(&key);
        self.current_patient = found.then_some(key);
        Ok(found)
    }

    fn read_table(&mut self) -> PortalResult<Vec<TableEntry>> {
        Ok(self.open_patient()?.table.clone())
    }

    fn find_date_node(&mut self, date: NaiveDate) -> PortalResult<bool> {
        Ok(self
            .open_patient()?
            .records
            .contains_key(&date_key(date)))
    }

    fn open_date_and_section(
        &mut self,
        date: NaiveDate,
        section: &str,
    ) -> PortalResult<SectionLookup> {
        let Some(sections) = self.open_patient()?.records.get(&date_key(date)) else {
            return Ok(SectionLookup::date_missing());
        };
        let wanted = normalize_simple(section);
        Ok(sections
            .iter()
            .find(|(name, _)| normalize_simple(name) == wanted)
            .map(|(_, texts)| SectionLookup::found(texts.clone()))
            .unwrap_or_else(SectionLookup::section_missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "credentials": { "location": "CESFAM", "username": "u", "password": "p" },
        "menus": [["Box", "Pacientes citados"]],
        "days": { "2025-07-01": [{ "status": "Atendido", "name": "ANA", "popover": "RUN: 1-9" }] },
        "patients": {
            "11111111-1": {
                "table": [{ "header": "Edad", "value": "2 meses" }],
                "records": { "2025-07-01": { "Anamnesis": ["MOTIVO DE CONSULTA: control"] } }
            }
        }
    }"#;

    fn credentials(password: &str) -> Credentials {
        Credentials {
            location: "CESFAM".into(),
            username: "u".into(),
            password: password.into(),
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    #[test]
    fn test_login_checks_credentials() {
        let mut driver = ReplayDriver::from_json(FIXTURE).unwrap();
        assert!(matches!(
            driver.login(&credentials("x")),
            Err(PortalError::Authentication(_))
        ));
        assert!(driver.login(&credentials("p")).is_ok());
    }

    #[test]
    fn test_navigation_requires_login_and_known_menu() {
        let mut driver = ReplayDriver::from_json(FIXTURE).unwrap();
        assert!(driver.navigate_to(&["Box", "Pacientes citados"]).is_err());
        driver.login(&credentials("p")).unwrap();
        assert!(driver.navigate_to(&["box", "pacientes citados"]).is_ok());
        assert!(matches!(
            driver.navigate_to(&["Box", "Agregar documentos"]),
            Err(PortalError::Navigation(path)) if path == "Box > Agregar documentos"
        ));
    }

    #[test]
    fn test_day_rows_and_popover() {
        let mut driver = ReplayDriver::from_json(FIXTURE).unwrap();
        driver.login(&credentials("p")).unwrap();
        assert!(!driver.select_date(date(2)).unwrap());
        assert!(driver.read_visit_rows().is_err());

        assert!(driver.select_date(date(1)).unwrap());
        let rows = driver.read_visit_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "ANA");
        assert_eq!(driver.read_popover_text(0).unwrap(), "RUN: 1-9");
        assert!(driver.read_popover_text(1).is_err());
    }

    #[test]
    fn test_patient_record_tree() {
        let mut driver = ReplayDriver::from_json(FIXTURE).unwrap();
        driver.login(&credentials("p")).unwrap();
        // Any RUN formatting finds the patient.
        assert!(driver.search_patient("111111111").unwrap());
        assert_eq!(driver.read_table().unwrap()[0].value, "2 meses");
        assert!(driver.find_date_node(date(1)).unwrap());
        assert!(!driver.find_date_node(date(3)).unwrap());

        let lookup = driver.open_date_and_section(date(1), "anamnesis").unwrap();
        assert_eq!(lookup, SectionLookup::found(vec!["MOTIVO DE CONSULTA: control".into()]));
        assert_eq!(
            driver.open_date_and_section(date(1), "Diagnóstico").unwrap(),
            SectionLookup::section_missing()
        );
        assert_eq!(
            driver.open_date_and_section(date(3), "Anamnesis").unwrap(),
            SectionLookup::date_missing()
        );

        assert!(!driver.search_patient("22.222.222-2").unwrap());
        assert!(driver.read_table().is_err());
    }

    #[test]
    fn test_bad_fixture() {
        assert!(matches!(
            ReplayDriver::from_json("{ not json"),
            Err(PortalError::Fixture(_))
        ));
    }
}
