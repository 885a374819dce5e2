use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "modkeeper")]
#[command(about = "Backs up, cleans, and sorts a Sims 4 Mods folder", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full maintenance pipeline on the configured mods folder
    Process(ProcessArgs),
    /// Compare installed mods against the known-versions metadata file
    CheckVersions,
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Make changes (default is a dry-run preview)
    #[arg(long)]
    pub apply: bool,

    /// Skip the confirmation prompt before applying changes
    #[arg(long)]
    pub yes: bool,
}
