mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::process;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, ProcessArgs};
use dotenv::dotenv;
use modkeeper_core::classifier::Classifier;
use modkeeper_core::{AppConfig, PipelineEngine, RunMode};
use progress::CliReporter;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match modkeeper_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Process(process_args)) => {
            if let Err(err) = run_process(&config, &process_args) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::CheckVersions) => {
            if let Err(err) = run_check_versions(&config) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn run_process(config: &AppConfig, args: &ProcessArgs) -> anyhow::Result<()> {
    let mode = if args.apply {
        RunMode::Apply
    } else {
        RunMode::DryRun
    };

    if mode == RunMode::Apply && !args.yes {
        let prompt = format!(
            "Apply changes to {}? A backup zip is taken first.",
            config.mods_dir.display()
        );
        if !prompt_confirm(&prompt, Some(false))? {
            process::exit(0);
        }
    }

    let engine = PipelineEngine::new(config.clone());
    let reporter = CliReporter::new();
    let result = engine.run(mode, &reporter)?;

    println!();
    if let Some(path) = &result.backup_path {
        info!("Backup written to {}", format!("{}", path.display()).green());
    }
    info!(
        "Backup: {}, Scan: {}, Classify: {}, Act: {}, Report: {}",
        format!("{:.2}s", result.backup_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.scan_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.classify_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.action_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.report_duration.as_secs_f64()).green(),
    );
    info!(
        "{} files scanned: {} garbage, {} tiny, {} duplicate, {} corrupt",
        format!("{}", result.files_scanned).cyan(),
        format!("{}", result.garbage_removed).yellow(),
        format!("{}", result.tiny_quarantined).yellow(),
        format!("{}", result.duplicates_quarantined).red(),
        format!("{}", result.corrupt_quarantined).red(),
    );
    info!(
        "{} archives extracted, {} mods sorted, {} conflict pairs, {} broken, {} outdated",
        format!("{}", result.archives_extracted).cyan(),
        format!("{}", result.moved_to_category).cyan(),
        format!("{}", result.conflict_pairs).red(),
        format!("{}", result.broken_files).red(),
        format!("{}", result.outdated_mods).yellow(),
    );

    if result.mode == RunMode::DryRun {
        println!(
            "{}",
            "Dry run, no files were changed. Re-run with --apply to make changes.".blue()
        );
    } else {
        println!("{}", "All done! Changes applied.".green());
    }

    Ok(())
}

fn run_check_versions(config: &AppConfig) -> anyhow::Result<()> {
    let Some(version_path) = &config.known_versions_path else {
        println!(
            "{}",
            "No known_versions_path configured in Modkeeper.toml.".yellow()
        );
        return Ok(());
    };

    let known = modkeeper_core::versions::load_known_versions(version_path)?;
    let entries = modkeeper_core::scanner::collect_files(
        &config.mods_dir,
        &config.ignore_patterns,
        &config.quarantine_dir,
    )?;

    let mut classifier = Classifier::new();
    let files: Vec<_> = entries.iter().map(|entry| classifier.classify(entry)).collect();
    let outdated = modkeeper_core::versions::check_versions(&files, &known);

    if outdated.is_empty() {
        println!("{}", "All known mods are up to date.".green());
        return Ok(());
    }

    println!("{}", format!("{} outdated mod(s):", outdated.len()).yellow());
    for entry in &outdated {
        println!(
            " - {}: installed {}, latest {}",
            entry.name, entry.installed, entry.latest
        );
        if let Some(url) = &entry.url {
            println!("   update available at {}", url);
        }
    }

    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
