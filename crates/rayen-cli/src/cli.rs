//! CLI argument definitions for `rayen`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "rayen",
    version,
    about = "Rayen APS clinic-sheet automation",
    long_about = "Extract scheduled patients from the Rayen APS portal into a workbook,\n\
                  and fill sex, counseling, attention type and deficit into clinic sheets\n\
                  without overwriting existing values."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Append logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Prefix log lines with timestamps (pretty and compact formats).
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Include the module path of each log event.
    #[arg(long = "log-target", global = true)]
    pub log_target: bool,

    /// Log patient RUNs and names verbatim.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Settings file (default: ./rayen.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Collect scheduled patients for a range of days into a new workbook.
    Extract(ExtractArgs),

    /// Fill missing patient fields in an existing sheet.
    Fill(FillArgs),

    /// Classify an anamnesis text.
    Analyze {
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Show months, age group and LME eligibility for an age text.
    Age {
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Format a Chilean RUT.
    Rut {
        #[arg(value_name = "RAW")]
        raw: String,
    },
}

#[derive(Args)]
pub struct ExtractArgs {
    #[arg(long)]
    pub year: i32,

    #[arg(long)]
    pub month: u32,

    /// First day of the range.
    #[arg(long = "from", value_name = "DAY")]
    pub day_start: u32,

    /// Last day of the range (inclusive).
    #[arg(long = "to", value_name = "DAY")]
    pub day_end: u32,

    /// Recorded portal session (JSON) to replay.
    #[arg(long, value_name = "FIXTURE")]
    pub replay: PathBuf,

    /// Directory for the workbook (overrides the settings file).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct FillArgs {
    /// Sheet to fill (.xlsx or .csv).
    #[arg(value_name = "SHEET")]
    pub sheet: PathBuf,

    /// Recorded portal session (JSON) to replay.
    #[arg(long, value_name = "FIXTURE")]
    pub replay: PathBuf,

    /// Write the result here instead of back into SHEET.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Replace values already present in the sheet.
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
