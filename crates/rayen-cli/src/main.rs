//! Rayen APS sheet automation CLI.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use rayen_cli::commands::{
    run_age, run_analyze, run_extract, run_fill, run_rut, ExtractOptions, FillOptions,
};
use rayen_cli::config::Settings;
use rayen_cli::logging::{init_logging, LogConfig, LogFormat};
use rayen_cli::summary::{print_age, print_analysis, print_extraction, print_fill};
use rayen_core::models::DateRange;
use rayen_core::sheet::{SheetError, WritePolicy};

mod cli;

use crate::cli::{Cli, Command, ExtractArgs, FillArgs, LogFormatArg, LogLevelArg};

/// Exit code when a sheet is open in another program.
const EXIT_LOCKED: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report_error(&error),
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Extract(args) => {
            let settings = Settings::load(cli.config.as_deref())?;
            let outcome = run_extract(&settings, &extract_options(args)?)?;
            print_extraction(&outcome);
        }
        Command::Fill(args) => {
            let settings = Settings::load(cli.config.as_deref())?;
            let outcome = run_fill(&settings, &fill_options(args))?;
            print_fill(&outcome);
        }
        Command::Analyze { text } => print_analysis(&run_analyze(&text)),
        Command::Age { text } => print_age(&run_age(&text)),
        Command::Rut { raw } => println!("{}", run_rut(&raw)),
    }
    Ok(())
}

fn extract_options(args: ExtractArgs) -> Result<ExtractOptions> {
    let range = DateRange::new(args.year, args.month, args.day_start, args.day_end)?;
    Ok(ExtractOptions {
        range,
        replay: args.replay,
        output_dir: args.output_dir,
    })
}

fn fill_options(args: FillArgs) -> FillOptions {
    FillOptions {
        sheet: args.sheet,
        replay: args.replay,
        output: args.output,
        policy: if args.overwrite {
            WritePolicy::Overwrite
        } else {
            WritePolicy::OnlyIfEmpty
        },
    }
}

fn report_error(error: &anyhow::Error) -> ExitCode {
    let locked = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<SheetError>())
        .filter(|sheet_error| sheet_error.is_locked());
    if let Some(locked) = locked {
        eprintln!("error: {locked}");
        eprintln!("Close the file in Excel (or any other program) and retry.");
        return ExitCode::from(EXIT_LOCKED);
    }
    eprintln!("error: {error:#}");
    ExitCode::FAILURE
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.with_timestamps = cli.log_timestamps;
    config.with_target = cli.log_target;
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_flags_reach_config() {
        let cli = Cli::parse_from([
            "rayen",
            "--log-timestamps",
            "--log-target",
            "--log-file",
            "rayen.log",
            "rut",
            "123456785",
        ]);
        let config = log_config_from_cli(&cli);
        assert!(config.with_timestamps);
        assert!(config.with_target);
        assert!(!config.with_ansi);
        assert!(config.use_env_filter);
    }

    #[test]
    fn test_log_level_overrides_env() {
        let cli = Cli::parse_from(["rayen", "--log-level", "debug", "age", "3 meses"]);
        let config = log_config_from_cli(&cli);
        assert_eq!(config.level_filter, LevelFilter::DEBUG);
        assert!(!config.use_env_filter);
        assert!(!config.with_timestamps);
    }
}
