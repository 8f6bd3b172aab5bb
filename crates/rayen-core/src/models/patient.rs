//! Patient record models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::classify::{bucket_of, AgeBucket, AnamnesisAnalysis, AttentionType, Deficit, Sex};
use crate::sheet::{
    header_key, CellValue, MergeSource, SheetError, SheetResult, SpreadsheetDocument, COL_AGE,
    COL_ATTENTION, COL_COUNSELING, COL_DATE, COL_DEFICIT, COL_NAME, COL_RUN, COL_SECTOR, COL_SEX,
};
use crate::text::{clean_name, format_rut, is_empty_text};

/// Counseling value written for infants under 4 months.
pub const LME_COUNSELING: &str = "LME";

/// One patient visit, as scraped from the portal or read from a sheet row.
///
/// Optional fields are filled through `fill_*` methods only: once a field
/// holds a value it is never replaced during the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientRecord {
    /// Formatted RUN, e.g. "12.345.678-9". Empty when unknown.
    pub national_id: String,
    /// Patient name with portal annotations removed
    pub full_name: String,
    visit_date: Option<NaiveDate>,
    sector: Option<String>,
    age_bucket: Option<AgeBucket>,
    sex: Option<Sex>,
    attention_type: Option<AttentionType>,
    deficit: Option<Deficit>,
    counseling: Option<String>,
}

/// Set `slot` to `value` if the slot is still empty.
fn fill<T>(slot: &mut Option<T>, value: T) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}

/// Text variant of [`fill`]: blank-marker values are never stored.
fn fill_text(slot: &mut Option<String>, value: &str) -> bool {
    let value = value.trim();
    if is_empty_text(value) {
        return false;
    }
    fill(slot, value.to_string())
}

impl PatientRecord {
    /// Create a record from raw portal text; the RUN is formatted and the
    /// name cleaned.
    pub fn new(raw_run: &str, raw_name: &str) -> Self {
        Self {
            national_id: format_rut(raw_run),
            full_name: clean_name(raw_name),
            ..Self::default()
        }
    }

    pub fn visit_date(&self) -> Option<NaiveDate> {
        self.visit_date
    }

    pub fn sector(&self) -> Option<&str> {
        self.sector.as_deref()
    }

    pub fn age_bucket(&self) -> Option<AgeBucket> {
        self.age_bucket
    }

    pub fn sex(&self) -> Option<Sex> {
        self.sex
    }

    pub fn attention_type(&self) -> Option<AttentionType> {
        self.attention_type
    }

    pub fn deficit(&self) -> Option<Deficit> {
        self.deficit
    }

    pub fn counseling(&self) -> Option<&str> {
        self.counseling.as_deref()
    }

    pub fn fill_visit_date(&mut self, date: NaiveDate) -> bool {
        fill(&mut self.visit_date, date)
    }

    pub fn fill_sector(&mut self, sector: &str) -> bool {
        fill_text(&mut self.sector, sector)
    }

    pub fn fill_age_bucket(&mut self, bucket: AgeBucket) -> bool {
        fill(&mut self.age_bucket, bucket)
    }

    pub fn fill_sex(&mut self, sex: Sex) -> bool {
        fill(&mut self.sex, sex)
    }

    pub fn fill_attention_type(&mut self, attention_type: AttentionType) -> bool {
        fill(&mut self.attention_type, attention_type)
    }

    pub fn fill_deficit(&mut self, deficit: Deficit) -> bool {
        fill(&mut self.deficit, deficit)
    }

    pub fn fill_counseling(&mut self, counseling: &str) -> bool {
        fill_text(&mut self.counseling, counseling)
    }

    /// Fill attention type and deficit from an anamnesis analysis.
    ///
    /// Returns the number of fields written.
    pub fn apply_analysis(&mut self, analysis: &AnamnesisAnalysis) -> usize {
        let mut written = 0;
        if let Some(attention_type) = analysis.attention_type {
            written += usize::from(self.fill_attention_type(attention_type));
        }
        if let Some(deficit) = analysis.deficit {
            written += usize::from(self.fill_deficit(deficit));
        }
        written
    }

    /// Forget the fields the portal fills (sex, counseling, deficit), so a
    /// fresh lookup can replace what the sheet held.
    pub fn clear_portal_fields(&mut self) {
        self.sex = None;
        self.counseling = None;
        self.deficit = None;
    }

    /// True once the record carries everything the monthly report needs.
    pub fn is_complete(&self) -> bool {
        !self.national_id.is_empty()
            && !self.full_name.is_empty()
            && self.visit_date.is_some()
            && self.sex.is_some()
            && self.attention_type.is_some()
    }

    /// Read data row `row` of a clinic sheet.
    ///
    /// A `RUN` (or `RUT`) column is required; every other column is
    /// optional. Cells that do not parse leave the field unset.
    pub fn from_row(doc: &SpreadsheetDocument, row: usize) -> SheetResult<Self> {
        let run_col = doc
            .find_column(&[COL_RUN, "RUT"])
            .ok_or_else(|| SheetError::MissingColumn(COL_RUN.to_string()))?;
        let text_at = |names: &[&str]| {
            doc.find_column(names)
                .map(|col| doc.cell(row, col).as_text())
                .unwrap_or_default()
        };

        let mut record = Self::new(
            &doc.cell(row, run_col).as_text(),
            &text_at(&[COL_NAME]),
        );

        if let Some(date) = doc
            .find_column(&[COL_DATE])
            .and_then(|col| doc.cell(row, col).as_date())
        {
            record.fill_visit_date(date);
        }
        record.fill_sector(&text_at(&[COL_SECTOR]));

        let age = text_at(&[COL_AGE]);
        if let Some(bucket) = AgeBucket::parse(&age).or_else(|| bucket_of(&age)) {
            record.fill_age_bucket(bucket);
        }
        if let Some(sex) = Sex::parse(&text_at(&[COL_SEX])) {
            record.fill_sex(sex);
        }
        if let Some(attention_type) =
            AttentionType::parse(&text_at(&[COL_ATTENTION, "TIPO DE ATENCION"]))
        {
            record.fill_attention_type(attention_type);
        }
        if let Some(deficit) = Deficit::parse(&text_at(&[COL_DEFICIT, "DEFICIT"])) {
            record.fill_deficit(deficit);
        }
        record.fill_counseling(&text_at(&[COL_COUNSELING, "CONSEJERÍA"]));

        Ok(record)
    }
}

impl MergeSource for PatientRecord {
    fn value_for(&self, canonical: &str) -> CellValue {
        let key = header_key(canonical);
        let text = |value: Option<&str>| CellValue::from(value.map(str::to_string));
        let label = |value: Option<&'static str>| CellValue::from(value);

        if key == header_key(COL_DATE) {
            CellValue::from(self.visit_date)
        } else if key == header_key(COL_SECTOR) {
            text(self.sector())
        } else if key == header_key(COL_NAME) {
            CellValue::from(self.full_name.clone())
        } else if key == header_key(COL_RUN) || key == "RUT" {
            CellValue::from(self.national_id.clone())
        } else if key == header_key(COL_ATTENTION) {
            label(self.attention_type.map(|a| a.label()))
        } else if key == header_key(COL_AGE) {
            label(self.age_bucket.map(|b| b.label()))
        } else if key == header_key(COL_DEFICIT) {
            label(self.deficit.map(|d| d.label()))
        } else if key == header_key(COL_SEX) {
            label(self.sex.map(|s| s.label()))
        } else if key == header_key(COL_COUNSELING) {
            text(self.counseling())
        } else {
            CellValue::Empty
        }
    }
}
