//! The two portal flows.
//!
//! - Extraction: collect every patient scheduled on the weekdays of a
//!   [`DateRange`] into fresh records.
//! - Fill: for records read from an existing sheet, look each patient up and
//!   fill sex, LME counseling, attention type and deficit.
//!
//! Both flows are sequential. A failure on one day or one patient is logged
//! and counted, and the run moves on; only login and navigation abort.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use rayen_core::classify::{
    analyze_anamnesis, bucket_of, is_under_4_months, AnamnesisSections,
};
use rayen_core::models::{DateRange, PatientRecord, LME_COUNSELING};
use rayen_core::text::clean_name;

use crate::parse::{parse_popover, parse_record_table, visit_status};
use crate::{
    Credentials, PageDriver, PortalResult, ANAMNESIS_SECTION, MENU_ADD_DOCUMENTS,
    MENU_SCHEDULED_PATIENTS,
};

/// Outcome of an extraction run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionReport {
    /// Weekdays whose list was read
    pub dates_processed: Vec<NaiveDate>,
    /// Weekdays the calendar would not select, or that failed to load
    pub dates_unavailable: Vec<NaiveDate>,
    /// Rows without a name or whose popover could not be read
    pub rows_skipped: usize,
    pub records: Vec<PatientRecord>,
}

/// Collect scheduled patients for every weekday in `range`.
pub fn collect_scheduled<D: PageDriver + ?Sized>(
    driver: &mut D,
    credentials: &Credentials,
    range: &DateRange,
) -> PortalResult<ExtractionReport> {
    driver.login(credentials)?;
    driver.wait_until_stable()?;
    driver.navigate_to(&MENU_SCHEDULED_PATIENTS)?;

    let mut report = ExtractionReport::default();
    for date in range.weekdays() {
        match collect_day(driver, date, &mut report) {
            Ok(true) => report.dates_processed.push(date),
            Ok(false) => {
                tracing::warn!(%date, "date not available, skipping");
                report.dates_unavailable.push(date);
            }
            Err(e) => {
                tracing::error!(%date, error = %e, "failed to read scheduled patients");
                report.dates_unavailable.push(date);
            }
        }
    }

    tracing::info!(
        patients = report.records.len(),
        days = report.dates_processed.len(),
        skipped_rows = report.rows_skipped,
        "extraction finished"
    );
    Ok(report)
}

fn collect_day<D: PageDriver + ?Sized>(
    driver: &mut D,
    date: NaiveDate,
    report: &mut ExtractionReport,
) -> PortalResult<bool> {
    driver.wait_until_stable()?;
    if !driver.select_date(date)? {
        return Ok(false);
    }
    driver.wait_until_stable()?;

    let rows = driver.read_visit_rows()?;
    let before = report.records.len();
    for (index, row) in rows.iter().enumerate() {
        let name = clean_name(&row.name);
        if name.is_empty() {
            tracing::debug!(%date, row = index, "row without patient name");
            report.rows_skipped += 1;
            continue;
        }

        let popover = match driver.read_popover_text(index) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(%date, row = index, error = %e, "could not read popover");
                report.rows_skipped += 1;
                continue;
            }
        };
        let info = parse_popover(&popover);

        let mut record = PatientRecord::new(&info.run, &name);
        record.fill_visit_date(date);
        if let Some(sector) = &info.sector {
            record.fill_sector(sector);
        }
        if let Some(bucket) = info.age_text.as_deref().and_then(bucket_of) {
            record.fill_age_bucket(bucket);
        }
        record.fill_attention_type(visit_status(&row.status));
        report.records.push(record);
    }

    tracing::info!(%date, patients = report.records.len() - before, "collected day");
    Ok(true)
}

/// Why the anamnesis step was not run for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnamnesisSkip {
    /// The sheet already marks the visit as a no-show
    AlreadyNoShow,
    /// The row has no usable date
    NoDate,
    /// The visit date is missing from the record tree
    DateNotFound,
    /// The date has no Anamnesis section
    SectionNotFound,
    /// The Anamnesis section has no reason or history text
    EmptyText,
}

impl fmt::Display for AnamnesisSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            AnamnesisSkip::AlreadyNoShow => "visit already marked NSP",
            AnamnesisSkip::NoDate => "row has no date",
            AnamnesisSkip::DateNotFound => "date not in record tree",
            AnamnesisSkip::SectionNotFound => "no Anamnesis section",
            AnamnesisSkip::EmptyText => "Anamnesis text is empty",
        };
        f.write_str(reason)
    }
}

/// Outcome of a fill run. Row numbers are 0-based data rows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FillReport {
    pub rows: usize,
    /// Rows without a RUN
    pub rows_without_run: usize,
    /// Patients the portal search did not find
    pub patients_not_found: Vec<usize>,
    /// Rows whose anamnesis was classified
    pub analyzed: usize,
    pub anamnesis_skipped: Vec<(usize, AnamnesisSkip)>,
    /// Rows abandoned after a driver error
    pub failed: Vec<usize>,
}

enum PatientOutcome {
    NotFound,
    Analyzed,
    Skipped(AnamnesisSkip),
}

/// Look every record up in the portal and fill the missing fields.
///
/// Fields that already hold a value (from the sheet) are never replaced.
pub fn fill_records<D: PageDriver + ?Sized>(
    driver: &mut D,
    credentials: &Credentials,
    records: &mut [PatientRecord],
) -> PortalResult<FillReport> {
    driver.login(credentials)?;
    driver.wait_until_stable()?;
    driver.navigate_to(&MENU_ADD_DOCUMENTS)?;

    let mut report = FillReport {
        rows: records.len(),
        ..FillReport::default()
    };
    for (row, record) in records.iter_mut().enumerate() {
        if record.national_id.is_empty() {
            tracing::debug!(row, "row without RUN");
            report.rows_without_run += 1;
            continue;
        }

        match fill_patient(driver, record) {
            Ok(PatientOutcome::NotFound) => {
                tracing::warn!(row, "patient not found in portal");
                report.patients_not_found.push(row);
            }
            Ok(PatientOutcome::Analyzed) => report.analyzed += 1,
            Ok(PatientOutcome::Skipped(reason)) => {
                tracing::warn!(row, %reason, "anamnesis skipped");
                report.anamnesis_skipped.push((row, reason));
            }
            Err(e) => {
                tracing::error!(row, error = %e, "failed to process patient");
                report.failed.push(row);
            }
        }
    }

    tracing::info!(
        rows = report.rows,
        analyzed = report.analyzed,
        not_found = report.patients_not_found.len(),
        failed = report.failed.len(),
        "fill finished"
    );
    Ok(report)
}

fn fill_patient<D: PageDriver + ?Sized>(
    driver: &mut D,
    record: &mut PatientRecord,
) -> PortalResult<PatientOutcome> {
    driver.wait_until_stable()?;
    if !driver.search_patient(&record.national_id)? {
        return Ok(PatientOutcome::NotFound);
    }
    driver.wait_until_stable()?;

    let details = parse_record_table(&driver.read_table()?);
    if let Some(sex) = details.sex {
        record.fill_sex(sex);
    }
    if let Some(age) = details.age_text.as_deref() {
        if is_under_4_months(age) && record.fill_counseling(LME_COUNSELING) {
            tracing::debug!(age, "LME counseling assigned");
        }
    }

    if record.attention_type().is_some_and(|t| t.is_no_show()) {
        return Ok(PatientOutcome::Skipped(AnamnesisSkip::AlreadyNoShow));
    }
    let Some(date) = record.visit_date() else {
        return Ok(PatientOutcome::Skipped(AnamnesisSkip::NoDate));
    };
    if !driver.find_date_node(date)? {
        return Ok(PatientOutcome::Skipped(AnamnesisSkip::DateNotFound));
    }

    let lookup = driver.open_date_and_section(date, ANAMNESIS_SECTION)?;
    if !lookup.date_found {
        return Ok(PatientOutcome::Skipped(AnamnesisSkip::DateNotFound));
    }
    if !lookup.section_found {
        return Ok(PatientOutcome::Skipped(AnamnesisSkip::SectionNotFound));
    }
    let text = AnamnesisSections::from_texts(&lookup.texts).combined();
    if text.is_empty() {
        return Ok(PatientOutcome::Skipped(AnamnesisSkip::EmptyText));
    }

    let analysis = analyze_anamnesis(&text);
    let written = record.apply_analysis(&analysis);
    tracing::debug!(
        attention = ?analysis.attention_type,
        deficit = ?analysis.deficit,
        written,
        "anamnesis analyzed"
    );
    Ok(PatientOutcome::Analyzed)
}
