#![forbid(unsafe_code)]

pub mod check;
pub mod cli;
pub mod config;
pub mod document;
pub mod output;
pub mod package;
pub mod progress;
pub mod refusal;
pub mod report;

use cli::{Cli, Command, Outcome};
use config::Settings;
use output::jsonl::write_jsonl;
use package::{JsonPackage, NoPackage, PackageCache};
use refusal::RefusalPayload;
use report::Report;
use serde::Serialize;
use std::path::Path;

/// Run the lila CLI. Returns an exit code (0, 1, or 2).
pub fn run() -> u8 {
    use clap::Parser;

    let cli = Cli::parse();
    if cli.describe {
        return handle_describe();
    }

    let settings = match load_settings(cli.settings.as_deref()) {
        Ok(settings) => settings,
        Err(refusal) => return emit_refusal(&refusal),
    };
    let package = match load_package(&cli.data_dir, cli.package.as_deref()) {
        Ok(package) => package,
        Err(refusal) => return emit_refusal(&refusal),
    };

    let outcome = match cli.command {
        Some(Command::Check {
            testlog,
            warnings_only,
        }) => handle_check(&testlog, warnings_only, &settings, package.as_ref()),
        Some(Command::Batch {
            dir,
            filter,
            progress,
        }) => handle_batch(&dir, filter.as_deref(), progress, &settings, package.as_ref()),
        Some(Command::Labels { testlog }) => handle_labels(&testlog, &settings),
        None => {
            eprintln!("Error: a subcommand is required (check, batch or labels)");
            Err(Outcome::Refusal)
        }
    };
    match outcome {
        Ok(outcome) => outcome.exit_code(),
        Err(outcome) => outcome.exit_code(),
    }
}

/// Handle --describe flag: print operator.json and exit.
fn handle_describe() -> u8 {
    let operator = serde_json::json!({
        "name": "lila",
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "commands": ["check", "batch", "labels"],
        "output_format": "JSONL",
        "exit_codes": { "0": "all passed", "1": "fail or inconclusive entries", "2": "refusal" },
        "refusal_codes": ["E_BAD_INPUT", "E_BAD_SETTINGS"]
    });

    match serde_json::to_string_pretty(&operator) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(_) => {
            eprintln!("Error: Failed to serialize operator metadata");
            2
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings, RefusalPayload> {
    match path {
        Some(path) => Settings::load(path).map_err(|error| refusal::bad_settings(path, error)),
        None => Ok(Settings::default()),
    }
}

fn load_package(
    data_dir: &Path,
    name: Option<&str>,
) -> Result<Box<dyn PackageCache>, RefusalPayload> {
    match name {
        Some(name) => JsonPackage::load(data_dir, name)
            .map(|package| Box::new(package) as Box<dyn PackageCache>)
            .map_err(|error| refusal::bad_settings(&JsonPackage::path(data_dir, name), error)),
        None => Ok(Box::new(NoPackage)),
    }
}

fn handle_check(
    testlog: &Path,
    warnings_only: bool,
    settings: &Settings,
    package: &dyn PackageCache,
) -> Result<Outcome, Outcome> {
    let mut report =
        Report::open(testlog, settings).map_err(|error| refuse(&refusal::bad_input(testlog, error)))?;
    report.run(package);

    let rows = report.rows();
    let outcome = Outcome::from_verdicts(rows.iter().map(|row| row.verdict));
    let rows = if warnings_only {
        report::warnings_only(rows)
    } else {
        rows
    };
    write_stdout(&rows)?;
    Ok(outcome)
}

fn handle_batch(
    dir: &Path,
    filter: Option<&str>,
    progress: bool,
    settings: &Settings,
    package: &dyn PackageCache,
) -> Result<Outcome, Outcome> {
    let filter = filter
        .map(report::batch::compile_filter)
        .transpose()
        .map_err(|error| refuse(&refusal::bad_input(dir, error)))?;
    let entries = report::batch::run_batch(dir, settings, package, filter.as_ref(), progress)
        .map_err(|error| refuse(&refusal::bad_input(dir, error)))?;
    write_stdout(&entries)?;
    if entries.iter().all(|entry| entry.is_ok()) {
        Ok(Outcome::AllPassed)
    } else {
        Ok(Outcome::Issues)
    }
}

#[derive(Serialize)]
struct LabelLine<'a> {
    label: &'a str,
    items: &'a [report::LabelEntry],
}

fn handle_labels(testlog: &Path, settings: &Settings) -> Result<Outcome, Outcome> {
    let labels = Report::open(testlog, settings)
        .and_then(|report| report.label_data())
        .map_err(|error| refuse(&refusal::bad_input(testlog, error)))?;
    let lines: Vec<LabelLine<'_>> = labels
        .iter()
        .map(|(label, items)| LabelLine { label, items })
        .collect();
    write_stdout(&lines)?;
    Ok(Outcome::AllPassed)
}

fn write_stdout<T: Serialize>(records: &[T]) -> Result<(), Outcome> {
    let mut stdout = std::io::stdout();
    write_jsonl(&mut stdout, records).map_err(|error| {
        eprintln!("Error writing output: {error}");
        Outcome::Refusal
    })
}

fn refuse(refusal: &RefusalPayload) -> Outcome {
    emit_refusal(refusal);
    Outcome::Refusal
}

/// Output a refusal envelope to stdout.
fn emit_refusal(refusal: &RefusalPayload) -> u8 {
    if let Ok(json) = serde_json::to_string(refusal) {
        println!("{json}");
    }
    Outcome::Refusal.exit_code()
}
