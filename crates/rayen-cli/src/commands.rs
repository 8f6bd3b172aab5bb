//! Command runners. Each returns what the summary printer needs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use rayen_core::classify::{analyze_anamnesis, bucket_of, is_under_4_months, parse_months};
use rayen_core::classify::{AgeBucket, AnamnesisAnalysis};
use rayen_core::models::{DateRange, PatientRecord};
use rayen_core::sheet::{
    ensure_unlocked, load_document, merge_file, read_records, write_scheduled, ColumnAliases,
    MergeStats, WritePolicy,
};
use rayen_core::text::format_rut;
use rayen_portal::{collect_scheduled, fill_records, ExtractionReport, FillReport, ReplayDriver};

use crate::config::Settings;
use crate::logging::redact_value;

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub range: DateRange,
    /// Recorded portal session to replay
    pub replay: PathBuf,
    /// Overrides the configured output directory
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub struct ExtractOutcome {
    pub report: ExtractionReport,
    pub output: PathBuf,
}

pub fn run_extract(settings: &Settings, options: &ExtractOptions) -> Result<ExtractOutcome> {
    let range = &options.range;
    let span = info_span!("extract", year = range.year, month = range.month);
    let _guard = span.enter();

    let output_dir = options
        .output_dir
        .clone()
        .or_else(|| settings.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let output = output_dir.join(range.output_file_name());
    ensure_unlocked(&output).with_context(|| format!("check {}", output.display()))?;

    let mut driver = open_replay(&options.replay)?;
    let report = collect_scheduled(&mut driver, &settings.credentials(), range)
        .context("collect scheduled patients")?;

    fs::create_dir_all(&output_dir)
        .with_context(|| format!("create output directory {}", output_dir.display()))?;
    write_scheduled(&report.records, &output)
        .with_context(|| format!("write {}", output.display()))?;
    info!(
        "Wrote {} patient(s) to {}",
        report.records.len(),
        output.display()
    );

    Ok(ExtractOutcome { report, output })
}

#[derive(Debug, Clone)]
pub struct FillOptions {
    pub sheet: PathBuf,
    pub replay: PathBuf,
    /// Write here instead of back into `sheet`
    pub output: Option<PathBuf>,
    /// With [`WritePolicy::Overwrite`] the sheet's sex, counseling and
    /// deficit are looked up again instead of being kept
    pub policy: WritePolicy,
}

#[derive(Debug)]
pub struct FillOutcome {
    pub report: FillReport,
    pub stats: MergeStats,
    pub output: PathBuf,
}

pub fn run_fill(settings: &Settings, options: &FillOptions) -> Result<FillOutcome> {
    let sheet = &options.sheet;
    let output = options.output.clone().unwrap_or_else(|| sheet.clone());
    let span = info_span!("fill", sheet = %sheet.display());
    let _guard = span.enter();

    // Fail before the portal session, not after it.
    ensure_unlocked(sheet).with_context(|| format!("check {}", sheet.display()))?;
    if output != *sheet {
        ensure_unlocked(&output).with_context(|| format!("check {}", output.display()))?;
    }

    let doc = load_document(sheet).with_context(|| format!("load {}", sheet.display()))?;
    let mut records =
        read_records(&doc).with_context(|| format!("read rows of {}", sheet.display()))?;
    info!("Read {} row(s) from {}", records.len(), sheet.display());
    if matches!(options.policy, WritePolicy::Overwrite) {
        records.iter_mut().for_each(PatientRecord::clear_portal_fields);
    }

    let mut driver = open_replay(&options.replay)?;
    let report = fill_records(&mut driver, &settings.credentials(), &mut records)
        .context("fill records from portal")?;
    for &row in &report.patients_not_found {
        warn!(
            row,
            run = redact_value(&records[row].national_id),
            "patient not found"
        );
    }

    let stats = merge_file(
        sheet,
        &output,
        &records,
        &ColumnAliases::fill_columns(),
        options.policy,
    )
    .with_context(|| format!("write {}", output.display()))?;

    Ok(FillOutcome {
        report,
        stats,
        output,
    })
}

pub fn run_analyze(text: &str) -> AnamnesisAnalysis {
    analyze_anamnesis(text)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeSummary {
    pub months: u32,
    pub bucket: Option<AgeBucket>,
    /// Eligible for LME counseling
    pub lme: bool,
}

pub fn run_age(text: &str) -> AgeSummary {
    AgeSummary {
        months: parse_months(text),
        bucket: bucket_of(text),
        lme: is_under_4_months(text),
    }
}

pub fn run_rut(raw: &str) -> String {
    format_rut(raw)
}

fn open_replay(path: &Path) -> Result<ReplayDriver> {
    ReplayDriver::from_path(path).with_context(|| format!("load replay {}", path.display()))
}
