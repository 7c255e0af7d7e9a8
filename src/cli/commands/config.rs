//! `labdesk config` command - Configuration management
//!
//! Provides commands to view and modify labdesk configuration.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::helpers::open_project;
use crate::cli::GlobalOpts;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration files
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., urgent_days, currency)
    pub key: String,

    /// Value to set
    pub value: String,

    /// Set in global (user) config instead of project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from global (user) config instead of project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    (
        "urgent_days",
        "Days ahead within which an open order counts as urgent",
    ),
    ("currency", "Currency suffix for amounts"),
    (
        "default_format",
        "Default output format (yaml, json, tsv, etc.)",
    ),
    ("log_level", "Log filter when LABDESK_LOG is unset"),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Set(args) => run_set(args, global),
        ConfigCommands::Unset(args) => run_unset(args, global),
        ConfigCommands::Path => run_path(global),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global).ok();
    let config = Config::load_for(project.as_ref());

    if let Some(key) = &args.key {
        check_key(key)?;
        return match get_config_value(&config, key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    for (key, _) in VALID_KEYS {
        print_config_value(key, get_config_value(&config, key).as_deref());
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Environment variables (LABDESK_URGENT_DAYS, LABDESK_CURRENCY)");
    println!("  2. Project config (.labdesk/config.yaml)");
    println!("  3. Global config (~/.config/labdesk/config.yaml)");

    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    check_key(&args.key)?;
    let value = parse_value(&args.key, &args.value)?;
    let config_path = config_path(args.global, global)?;

    let mut config_map = read_mapping(&config_path)?;
    config_map.insert(serde_yml::Value::String(args.key.clone()), value);

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    let scope = if args.global { "global" } else { "project" };
    println!(
        "{} Set {} {} {} in {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(&args.value).yellow(),
        scope
    );

    Ok(())
}

fn run_unset(args: UnsetArgs, global: &GlobalOpts) -> Result<()> {
    let config_path = config_path(args.global, global)?;

    if !config_path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            config_path.display()
        ));
    }

    let mut config_map = read_mapping(&config_path)?;
    if config_map.remove(args.key.as_str()).is_none() {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }

    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    let scope = if args.global { "global" } else { "project" };
    println!(
        "{} Removed {} from {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        scope
    );

    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    let global_path = global_config_path()?;

    println!("{}", style("Configuration file paths:").bold());
    println!();
    println!("  {} {}", style("Global:").cyan(), global_path.display());
    print_exists(global_path.exists(), 9);

    println!();
    match open_project(global) {
        Ok(project) => {
            let path = project.config_path();
            println!("  {} {}", style("Project:").cyan(), path.display());
            print_exists(path.exists(), 10);
        }
        Err(_) => println!(
            "  {} {}",
            style("Project:").cyan(),
            style("(not in a labdesk directory)").dim()
        ),
    }

    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<20} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'labdesk config set <key> <value>' to set a value.").dim()
    );

    Ok(())
}

fn print_exists(exists: bool, indent: usize) {
    let marker = if exists {
        style("(exists)").green()
    } else {
        style("(not created)").dim()
    };
    println!("{}{}", " ".repeat(indent), marker);
}

fn global_config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

fn config_path(use_global: bool, global: &GlobalOpts) -> Result<PathBuf> {
    if use_global {
        global_config_path()
    } else {
        Ok(open_project(global)?.config_path())
    }
}

fn read_mapping(path: &std::path::Path) -> Result<serde_yml::Mapping> {
    if !path.exists() {
        return Ok(serde_yml::Mapping::new());
    }
    let content = fs::read_to_string(path).into_diagnostic()?;
    match serde_yml::from_str::<serde_yml::Value>(&content) {
        Ok(serde_yml::Value::Mapping(map)) => Ok(map),
        Ok(serde_yml::Value::Null) => Ok(serde_yml::Mapping::new()),
        Ok(_) => Err(miette::miette!(
            "{} does not contain a YAML mapping",
            path.display()
        )),
        Err(e) => Err(miette::miette!("could not parse {}: {}", path.display(), e)),
    }
}

fn check_key(key: &str) -> Result<()> {
    if VALID_KEYS.iter().any(|(k, _)| *k == key) {
        Ok(())
    } else {
        Err(miette::miette!(
            help = "run 'labdesk config keys' to list valid keys",
            "unknown configuration key '{}'",
            key
        ))
    }
}

fn parse_value(key: &str, value: &str) -> Result<serde_yml::Value> {
    if key == "urgent_days" {
        let days: i64 = value
            .trim()
            .parse()
            .map_err(|_| miette::miette!("urgent_days must be a whole number of days"))?;
        return Ok(serde_yml::Value::Number(days.into()));
    }
    Ok(serde_yml::Value::String(value.to_string()))
}

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "urgent_days" => Some(config.urgent_days().to_string()),
        "currency" => Some(config.currency().to_string()),
        "default_format" => config.default_format.clone(),
        "log_level" => config.log_level.clone(),
        _ => None,
    }
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(not set)").dim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_key() {
        assert!(check_key("urgent_days").is_ok());
        assert!(check_key("author").is_err());
    }

    #[test]
    fn test_parse_urgent_days() {
        assert_eq!(
            parse_value("urgent_days", " 5 ").unwrap(),
            serde_yml::Value::Number(5.into())
        );
        assert!(parse_value("urgent_days", "soon").is_err());
        assert_eq!(
            parse_value("currency", "EUR").unwrap(),
            serde_yml::Value::String("EUR".to_string())
        );
    }

    #[test]
    fn test_effective_values_include_defaults() {
        let config = Config::default();
        assert_eq!(get_config_value(&config, "urgent_days").as_deref(), Some("3"));
        assert_eq!(get_config_value(&config, "currency").as_deref(), Some("zł"));
        assert_eq!(get_config_value(&config, "log_level"), None);
    }
}
