//! `labdesk init` command - Initialize a lab data directory

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::project::{Project, ProjectError, PROJECT_DIR};
use crate::core::{Clock, ConsoleNotifier, Lab};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Rewrite the default config even if .labdesk/ already exists (data is kept)
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            println!(
                "{} Initialized lab at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            // Opening the lab writes the starter catalog when none exists
            let lab = Lab::open(project.store(), ConsoleNotifier::new(false), Clock::System)?;
            if let Some((key, reason)) = lab.unsaved_collections().iter().next() {
                return Err(miette::miette!("could not write {}: {}", key, reason));
            }
            println!();
            println!("Created:");
            println!("  {}/", PROJECT_DIR);
            println!("  {}/config.yaml", PROJECT_DIR);
            println!("  {}/data/", PROJECT_DIR);
            println!();
            println!("Next steps:");
            println!(
                "  {} Register a referring doctor",
                style("labdesk doctor new --name \"...\"").yellow()
            );
            println!(
                "  {} Review the starter catalog",
                style("labdesk pros list").yellow()
            );
            println!(
                "  {} Open an order",
                style("labdesk order new").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Lab already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("labdesk init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
