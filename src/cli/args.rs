//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    backup::{ExportArgs, ImportArgs},
    completions::CompletionsArgs,
    config::ConfigCommands,
    decl::DeclCommands,
    doctor::DoctorCommands,
    emp::EmpCommands,
    init::InitArgs,
    inv::InvCommands,
    order::OrderCommands,
    pros::ProsCommands,
    status::StatusArgs,
    sup::SupCommands,
};

#[derive(Parser)]
#[command(name = "labdesk")]
#[command(author, version, about = "Dental prosthetics lab records")]
#[command(
    long_about = "Track laboratory orders through production, keep the doctor, catalog, staff and supplier registries, and issue invoices and conformity declarations."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .labdesk/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new labdesk project
    Init(InitArgs),

    /// Order management and production tracking
    #[command(subcommand)]
    Order(OrderCommands),

    /// Doctor registry
    #[command(subcommand)]
    Doctor(DoctorCommands),

    /// Prosthetic catalog
    #[command(subcommand)]
    Pros(ProsCommands),

    /// Employee registry
    #[command(subcommand)]
    Emp(EmpCommands),

    /// Supplier registry (external stage subcontractors)
    #[command(subcommand)]
    Sup(SupCommands),

    /// Invoices
    #[command(subcommand)]
    Inv(InvCommands),

    /// Declarations of conformity
    #[command(subcommand)]
    Decl(DeclCommands),

    /// Show the lab dashboard (urgent orders, monthly figures)
    Status(StatusArgs),

    /// Export all data to a JSON backup file
    Export(ExportArgs),

    /// Import collections from a JSON backup file
    Import(ImportArgs),

    /// Show configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (details for show, tsv for list)
    #[default]
    Auto,
    /// YAML format
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}
