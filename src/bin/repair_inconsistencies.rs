//! repair_inconsistencies - Fix glyph/word/line order in PAGE-XML files
//!
//! Usage:
//!   repair_inconsistencies -I OCR-D-OCR -O OCR-D-REPAIR OCR-D-OCR/*.xml
//!   repair_inconsistencies -j 0 --keep-going --report report.json OCR-D-OCR/*.xml

use clap::{ArgAction, Parser, ValueEnum};
use page_order_repair::config::{
    load_parameters, parse_parameter_value, DEFAULT_INPUT_FILE_GRP, DEFAULT_OUTPUT_FILE_GRP,
    DEFAULT_STEP,
};
use page_order_repair::repair::RepairReport;
use page_order_repair::{ErrorPolicy, InputFile, ProcessorConfig, RepairProcessor, Result};
use std::fs;
use std::path::PathBuf;

/// Log verbosity.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum LogLevel {
    /// Errors only
    Error,
    /// Errors and warnings
    Warn,
    /// Per-page summaries and applied repairs (default)
    #[default]
    Info,
    /// Failed repair attempts
    Debug,
    /// Everything
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Repair reading order inconsistencies between the recorded texts of
/// text regions, lines and words and the order of their children.
#[derive(Parser, Debug)]
#[command(name = "repair_inconsistencies")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// One or more PAGE-XML files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Input file group, replaced by the output file group in file ids
    #[arg(short = 'I', long = "input-file-grp", default_value = DEFAULT_INPUT_FILE_GRP)]
    input_file_grp: String,

    /// Output file group
    #[arg(short = 'O', long = "output-file-grp", default_value = DEFAULT_OUTPUT_FILE_GRP)]
    output_file_grp: String,

    /// Output directory (default: the output file group)
    #[arg(short = 'o', long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// JSON file with a parameter object
    #[arg(short = 'p', long = "parameter")]
    parameter: Option<PathBuf>,

    /// Override a single parameter (value parsed as JSON, else string)
    #[arg(short = 'P', long = "param-override", num_args = 2, value_names = ["KEY", "VALUE"], action = ArgAction::Append)]
    param_override: Vec<String>,

    /// Workflow step recorded in the provenance metadata
    #[arg(long, default_value = DEFAULT_STEP)]
    step: String,

    /// Replace existing output files
    #[arg(long, action = ArgAction::SetTrue)]
    overwrite: bool,

    /// Worker threads (0 = one per CPU, 1 = sequential)
    #[arg(short = 'j', long, default_value = "1")]
    jobs: usize,

    /// Skip documents that fail instead of aborting
    #[arg(long = "keep-going", action = ArgAction::SetTrue)]
    keep_going: bool,

    /// Write per-segment outcomes as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log level (RUST_LOG takes precedence)
    #[arg(short = 'l', long = "log-level", value_enum, default_value = "info")]
    log_level: LogLevel,
}

fn build_config(args: &Args) -> Result<ProcessorConfig> {
    let mut parameters = match &args.parameter {
        Some(path) => load_parameters(path)?,
        None => Default::default(),
    };
    for pair in args.param_override.chunks(2) {
        if let [key, value] = pair {
            parameters.insert(key.clone(), parse_parameter_value(value));
        }
    }

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&args.output_file_grp));
    let error_policy = if args.keep_going {
        ErrorPolicy::Skip
    } else {
        ErrorPolicy::Abort
    };

    Ok(ProcessorConfig::new()
        .with_input_file_grp(&args.input_file_grp)
        .with_output_file_grp(&args.output_file_grp)
        .with_output_dir(output_dir)
        .with_parameters(parameters)
        .with_step(&args.step)
        .with_overwrite(args.overwrite)
        .with_jobs(args.jobs)
        .with_error_policy(error_policy))
}

fn run(args: &Args) -> Result<bool> {
    let processor = RepairProcessor::new(build_config(args)?);
    let inputs: Vec<InputFile> = args.files.iter().map(InputFile::from_path).collect();

    let summary = processor.process(&inputs)?;
    log::info!(
        "Processed {} of {} files, {} segments reordered",
        summary.processed.len(),
        inputs.len(),
        summary.repaired()
    );

    if let Some(path) = &args.report {
        let reports: Vec<&RepairReport> = summary.processed.iter().map(|f| &f.report).collect();
        fs::write(path, serde_json::to_string_pretty(&reports)?)?;
    }

    Ok(summary.is_success())
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level.into())
        .parse_default_env()
        .init();

    match run(&args) {
        Ok(true) => {},
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        },
    }
}
