//! `labdesk pros` command - Prosthetic catalog

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{confirm, report_created, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::documents::format_money;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::prosthetic::parse_stage_list;
use crate::entities::{Prosthetic, ProstheticFields};

#[derive(Subcommand, Debug)]
pub enum ProsCommands {
    /// List catalog items
    List(ListArgs),

    /// Add a catalog item
    New(NewArgs),

    /// Show a catalog item
    Show(ShowArgs),

    /// Change a catalog item (existing orders keep their prices and stages)
    Edit(EditArgs),

    /// Delete a catalog item no order refers to
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in name and GMLC code
    #[arg(long)]
    pub search: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct FieldArgs {
    /// Regulatory (GMLC) code
    #[arg(long, short = 'g')]
    pub gmlc: Option<String>,

    /// Minimum lead time in days
    #[arg(long)]
    pub min_days: Option<u32>,

    /// Unit price per tooth
    #[arg(long, short = 'p')]
    pub price: Option<f64>,

    /// Production stages, comma separated, in order
    #[arg(long, short = 's')]
    pub stages: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Item name
    #[arg(long, short = 'n')]
    pub name: String,

    #[command(flatten)]
    pub fields: FieldArgs,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Catalog item ID or short ID (PROS@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Catalog item ID or short ID (PROS@N)
    pub id: String,

    /// New name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[command(flatten)]
    pub fields: FieldArgs,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Catalog item ID or short ID (PROS@N)
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl FieldArgs {
    fn into_fields(self, name: Option<String>) -> ProstheticFields {
        ProstheticFields {
            name,
            gmlc_code: self.gmlc,
            min_days: self.min_days,
            price: self.price,
            stages: self.stages.as_deref().map(parse_stage_list),
        }
    }
}

/// Run a catalog subcommand
pub fn run(cmd: ProsCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProsCommands::List(args) => run_list(args, global),
        ProsCommands::New(args) => run_new(args, global),
        ProsCommands::Show(args) => run_show(args, global),
        ProsCommands::Edit(args) => run_edit(args, global),
        ProsCommands::Delete(args) => run_delete(args, global),
    }
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "NAME", 28),
    ColumnDef::new("gmlc", "GMLC", 12),
    ColumnDef::new("days", "DAYS", 5),
    ColumnDef::new("price", "PRICE", 14),
    ColumnDef::new("stages", "STAGES", 40),
];

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let search = args.search.as_ref().map(|s| s.to_lowercase());

    let items: Vec<&Prosthetic> = session
        .lab
        .prosthetics()
        .iter()
        .filter(|p| {
            search.as_ref().map_or(true, |needle| {
                p.name.to_lowercase().contains(needle)
                    || p.gmlc_code.to_lowercase().contains(needle)
            })
        })
        .collect();

    if args.count {
        println!("{}", items.len());
        return session.finish();
    }
    if items.is_empty() {
        if !global.quiet {
            println!("No catalog items found.");
        }
        return session.finish();
    }

    session
        .short_ids
        .rebuild(EntityPrefix::Pros, items.iter().map(|p| &p.id));

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&items).into_diagnostic()?);
        }
        format => {
            let currency = session.config.currency().to_string();
            let rows = items.iter().map(|p| {
                TableRow::new(&p.id, &session.short_ids)
                    .cell("name", CellValue::Text(p.name.clone()))
                    .cell("gmlc", CellValue::opt_text(Some(p.gmlc_code.as_str())))
                    .cell("days", CellValue::Number(i64::from(p.min_days)))
                    .cell("price", CellValue::Money(p.price, currency.clone()))
                    .cell("stages", CellValue::Tags(p.stages.clone()))
            });
            let mut formatter = TableFormatter::new(COLUMNS, "catalog item", "PROS");
            if global.quiet {
                formatter = formatter.without_summary();
            }
            formatter.output(rows, format);
        }
    }

    session.finish()
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = session
        .lab
        .add_prosthetic(args.fields.into_fields(Some(args.name)))?;
    let short_id = session.short_ids.add(&id);
    report_created(global, &id, &short_id);
    session.finish()
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let id = resolve_prosthetic(&session, &args.id)?;
    let item = session
        .lab
        .prosthetic(&id)
        .ok_or_else(|| miette::miette!("No catalog item found matching '{}'", args.id))?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(item).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(item).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", item.id),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(item.id.to_string()).cyan());
            println!("{}: {}", style("Name").bold(), style(&item.name).yellow());
            println!("{}", style("─".repeat(60)).dim());
            if !item.gmlc_code.is_empty() {
                println!("{}: {}", style("GMLC code").bold(), item.gmlc_code);
            }
            println!("{}: {} day(s)", style("Lead time").bold(), item.min_days);
            println!(
                "{}: {} per tooth",
                style("Price").bold(),
                format_money(item.price, session.config.currency())
            );

            if !item.stages.is_empty() {
                println!();
                println!("{} ({}):", style("Stages").bold(), item.stages.len());
                for (i, stage) in item.stages.iter().enumerate() {
                    println!("  {}. {}", i + 1, stage);
                }
            }

            let in_use = session
                .lab
                .orders()
                .iter()
                .filter(|o| o.prosthetic_id == item.id)
                .count();
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("Orders").dim(), in_use);
        }
    }

    session.finish()
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = resolve_prosthetic(&session, &args.id)?;
    let fields = args.fields.into_fields(args.name);
    if fields == ProstheticFields::default() {
        return Err(miette::miette!(
            "nothing to change; pass at least one field option"
        ));
    }
    session.lab.update_prosthetic(&id, fields)?;
    session.finish()
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = resolve_prosthetic(&session, &args.id)?;
    let label = session
        .lab
        .prosthetic(&id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| id.to_string());

    if !confirm(&format!("Delete catalog item {}?", label), args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    session.lab.delete_prosthetic(&id)?;
    session.finish()
}

fn resolve_prosthetic(session: &Session, reference: &str) -> Result<EntityId> {
    session.resolve(
        reference,
        EntityPrefix::Pros,
        session.lab.prosthetics().iter().map(|p| &p.id),
    )
}
