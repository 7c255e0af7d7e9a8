//! `labdesk sup` command - Subcontractors

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{confirm, report_created, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::documents::format_money;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::{Supplier, SupplierFields};

#[derive(Subcommand, Debug)]
pub enum SupCommands {
    /// List suppliers
    List(ListArgs),

    /// Add a supplier
    New(NewArgs),

    /// Show a supplier
    Show(ShowArgs),

    /// Change supplier fields
    Edit(EditArgs),

    /// Delete a supplier
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in name and service
    #[arg(long)]
    pub search: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct FieldArgs {
    /// Service provided, e.g. milling
    #[arg(long)]
    pub service: Option<String>,

    /// Contact details
    #[arg(long)]
    pub contact: Option<String>,

    /// Cost per service
    #[arg(long)]
    pub cost: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Company or person name
    #[arg(long, short = 'n')]
    pub name: String,

    #[command(flatten)]
    pub fields: FieldArgs,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Supplier ID or short ID (SUP@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Supplier ID or short ID (SUP@N)
    pub id: String,

    /// New name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[command(flatten)]
    pub fields: FieldArgs,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Supplier ID or short ID (SUP@N)
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl FieldArgs {
    fn into_fields(self, name: Option<String>) -> SupplierFields {
        SupplierFields {
            name,
            service: self.service,
            contact: self.contact,
            cost_per_service: self.cost,
        }
    }
}

/// Run a supplier subcommand
pub fn run(cmd: SupCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SupCommands::List(args) => run_list(args, global),
        SupCommands::New(args) => run_new(args, global),
        SupCommands::Show(args) => run_show(args, global),
        SupCommands::Edit(args) => run_edit(args, global),
        SupCommands::Delete(args) => run_delete(args, global),
    }
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "NAME", 28),
    ColumnDef::new("service", "SERVICE", 20),
    ColumnDef::new("contact", "CONTACT", 24),
    ColumnDef::new("cost", "COST", 14),
];

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let search = args.search.as_ref().map(|s| s.to_lowercase());

    let mut suppliers: Vec<&Supplier> = session
        .lab
        .suppliers()
        .iter()
        .filter(|s| {
            search.as_ref().map_or(true, |needle| {
                s.name.to_lowercase().contains(needle)
                    || s
                        .service
                        .as_ref()
                        .is_some_and(|svc| svc.to_lowercase().contains(needle))
            })
        })
        .collect();
    suppliers.sort_by(|a, b| a.name.cmp(&b.name));

    if args.count {
        println!("{}", suppliers.len());
        return Ok(());
    }
    if suppliers.is_empty() {
        if !global.quiet {
            println!("No suppliers found.");
        }
        return Ok(());
    }

    session
        .short_ids
        .rebuild(EntityPrefix::Sup, suppliers.iter().map(|s| &s.id));

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&suppliers).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&suppliers).into_diagnostic()?);
        }
        format => {
            let currency = session.config.currency().to_string();
            let rows = suppliers.iter().map(|s| {
                let cost = s
                    .cost_per_service
                    .map_or(CellValue::Empty, |c| CellValue::Money(c, currency.clone()));
                TableRow::new(&s.id, &session.short_ids)
                    .cell("name", CellValue::Text(s.name.clone()))
                    .cell("service", CellValue::opt_text(s.service.as_deref()))
                    .cell("contact", CellValue::opt_text(s.contact.as_deref()))
                    .cell("cost", cost)
            });
            let mut formatter = TableFormatter::new(COLUMNS, "supplier", "SUP");
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
        .add_supplier(args.fields.into_fields(Some(args.name)))?;
    let short_id = session.short_ids.add(&id);
    report_created(global, &id, &short_id);
    session.finish()
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let id = resolve_supplier(&session, &args.id)?;
    let supplier = session
        .lab
        .supplier(&id)
        .ok_or_else(|| miette::miette!("No supplier found matching '{}'", args.id))?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(supplier).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(supplier).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", supplier.id),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {}",
                style("ID").bold(),
                style(supplier.id.to_string()).cyan()
            );
            println!("{}: {}", style("Name").bold(), style(&supplier.name).yellow());
            println!("{}", style("─".repeat(60)).dim());
            if let Some(service) = &supplier.service {
                println!("{}: {}", style("Service").bold(), service);
            }
            if let Some(contact) = &supplier.contact {
                println!("{}: {}", style("Contact").bold(), contact);
            }
            if let Some(cost) = supplier.cost_per_service {
                println!(
                    "{}: {}",
                    style("Cost per service").bold(),
                    format_money(cost, session.config.currency())
                );
            }
            println!(
                "{}: {}",
                style("Assignee label").dim(),
                supplier.assignee_label()
            );
        }
    }

    session.finish()
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = resolve_supplier(&session, &args.id)?;
    let fields = args.fields.into_fields(args.name);
    if fields == SupplierFields::default() {
        return Err(miette::miette!(
            "nothing to change; pass at least one field option"
        ));
    }
    session.lab.update_supplier(&id, fields)?;
    session.finish()
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = resolve_supplier(&session, &args.id)?;
    let label = session
        .lab
        .supplier(&id)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| id.to_string());

    if !confirm(&format!("Delete supplier {}?", label), args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    session.lab.delete_supplier(&id)?;
    session.finish()
}

fn resolve_supplier(session: &Session, reference: &str) -> Result<EntityId> {
    session.resolve(
        reference,
        EntityPrefix::Sup,
        session.lab.suppliers().iter().map(|s| &s.id),
    )
}
