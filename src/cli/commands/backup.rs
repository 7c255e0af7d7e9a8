//! `labdesk export` / `labdesk import` commands - Whole-dataset backup

use std::io::Read;
use std::path::PathBuf;

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{confirm, machine_format, Session};
use crate::cli::GlobalOpts;
use crate::core::backup::backup_file_name;

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Output file (default: pracownia-backup-<date>.json, `-` for stdout)
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Backup file to restore (`-` for stdin)
    pub file: PathBuf,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run_export(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let json = session.lab.export()?;

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(backup_file_name(session.lab.today())));
    if path.as_os_str() == "-" {
        println!("{}", json);
        return session.finish();
    }

    std::fs::write(&path, json).into_diagnostic()?;
    tracing::info!(path = %path.display(), "export written");
    if !global.quiet && !machine_format(global.format) {
        println!(
            "{} Exported to {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }
    session.finish()
}

pub fn run_import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let (source, filename) = if args.file.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .into_diagnostic()?;
        (source, "<stdin>".to_string())
    } else {
        let source = std::fs::read_to_string(&args.file)
            .map_err(|e| miette::miette!("cannot read {}: {}", args.file.display(), e))?;
        (source, args.file.display().to_string())
    };

    if !confirm(
        "Replace the collections contained in this backup?",
        args.yes,
    )? {
        println!("Cancelled.");
        return Ok(());
    }

    let mut session = Session::open(global)?;
    let replaced = session.lab.import(&source, &filename)?;

    if !global.quiet && !machine_format(global.format) {
        if replaced.is_empty() {
            println!("{} Backup contained no collections", style("!").yellow());
        } else {
            println!(
                "{} Imported {} collection(s):",
                style("✓").green(),
                replaced.len()
            );
            for key in &replaced {
                println!("  • {}", key);
            }
        }
    }
    session.finish()
}
