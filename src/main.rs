use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use daylio_backup::cli::{Cli, Command, RoundtripArgs, ValidateArgs};
use daylio_backup::commands;
use daylio_backup::error::ServiceResult;
use daylio_backup::metadata::{PKG_NAME, PKG_VERSION};
use daylio_backup::schema::report::{ValidationReport, report_schema};
use daylio_backup::settings::Settings;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn print_report(report: &ValidationReport) {
    if report.is_valid() {
        let version = report.version.map(|v| v.to_string()).unwrap_or_default();
        let entries = report.counts.as_ref().map_or(0, |c| c.day_entries);
        println!(
            "{} {} (version {version}, {entries} entries)",
            "valid".green().bold(),
            report.source
        );
    } else {
        println!(
            "{} {}: {}",
            "invalid".red().bold(),
            report.source,
            report.error.as_deref().unwrap_or_default()
        );
    }
    for warning in &report.warnings {
        println!("  {} {warning}", "warning:".yellow());
    }
    for issue in &report.issues {
        println!("  {} {issue}", "reference:".yellow());
    }
}

async fn run_validate(args: ValidateArgs, settings: &Settings) -> ServiceResult<bool> {
    let mut options = settings.validation_options();
    if !args.known_versions.is_empty() {
        options.known_versions = args.known_versions;
    }
    let check_references = args.check_references || settings.check_references;

    let reports = commands::validate_files(&args.paths, &options, check_references).await?;
    for report in &reports {
        if args.json {
            println!("{}", serde_json::to_string(report)?);
        } else {
            print_report(report);
        }
    }
    Ok(reports.iter().all(ValidationReport::is_valid))
}

async fn run_roundtrip(args: RoundtripArgs, settings: &Settings) -> ServiceResult<bool> {
    let outcome = commands::roundtrip_file(&args.path, &settings.validation_options()).await?;
    for warning in &outcome.warnings {
        eprintln!("{} {warning}", "warning:".yellow());
    }
    if let Some(output) = &args.output {
        commands::write_json(output, &outcome.encoded, args.pretty).await?;
        tracing::info!(path = %output.display(), "wrote re-encoded export");
    }
    if outcome.is_identical() {
        println!("{} {}", "identical".green().bold(), args.path.display());
    } else {
        println!(
            "{} {}: {}",
            "changed".yellow().bold(),
            args.path.display(),
            outcome.differing_keys.join(", ")
        );
    }
    Ok(outcome.is_identical())
}

async fn run(command: Command, settings: Settings) -> ServiceResult<bool> {
    match command {
        Command::Validate(args) => run_validate(args, &settings).await,
        Command::Roundtrip(args) => run_roundtrip(args, &settings).await,
        Command::Fields { entity } => {
            print!("{}", commands::field_table(entity.as_deref())?);
            Ok(true)
        }
        Command::ReportSchema => {
            println!("{}", serde_json::to_string_pretty(&report_schema())?);
            Ok(true)
        }
        Command::Version => {
            println!("{PKG_NAME} {PKG_VERSION}");
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            return ExitCode::from(2);
        }
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli.command, settings).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}
