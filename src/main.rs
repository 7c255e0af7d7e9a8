use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use labdesk::cli::helpers::open_project;
use labdesk::cli::{Cli, Commands, GlobalOpts, OutputFormat};
use labdesk::core::Config;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let project = open_project(&cli.global).ok();
    let config = Config::load_for(project.as_ref());
    init_tracing(&cli.global, &config);

    let mut global = cli.global;
    if global.format == OutputFormat::Auto {
        if let Some(format) = config.default_format.as_deref() {
            match format.parse() {
                Ok(format) => global.format = format,
                Err(e) => tracing::warn!(value = %format, error = %e, "ignoring default_format"),
            }
        }
    }

    match cli.command {
        Commands::Init(args) => labdesk::cli::commands::init::run(args),
        Commands::Order(cmd) => labdesk::cli::commands::order::run(cmd, &global),
        Commands::Doctor(cmd) => labdesk::cli::commands::doctor::run(cmd, &global),
        Commands::Pros(cmd) => labdesk::cli::commands::pros::run(cmd, &global),
        Commands::Emp(cmd) => labdesk::cli::commands::emp::run(cmd, &global),
        Commands::Sup(cmd) => labdesk::cli::commands::sup::run(cmd, &global),
        Commands::Inv(cmd) => labdesk::cli::commands::inv::run(cmd, &global),
        Commands::Decl(cmd) => labdesk::cli::commands::decl::run(cmd, &global),
        Commands::Status(args) => labdesk::cli::commands::status::run(args, &global),
        Commands::Export(args) => labdesk::cli::commands::backup::run_export(args, &global),
        Commands::Import(args) => labdesk::cli::commands::backup::run_import(args, &global),
        Commands::Config(cmd) => labdesk::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => labdesk::cli::commands::completions::run(args),
    }
}

/// Log filter: LABDESK_LOG, then --verbose, then the configured level
fn init_tracing(global: &GlobalOpts, config: &Config) {
    let fallback = if global.verbose {
        "debug"
    } else {
        config.log_level.as_deref().unwrap_or("warn")
    };
    let filter = EnvFilter::try_from_env("LABDESK_LOG")
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
