//! `labdesk inv` command - Invoices issued for completed orders

use std::path::PathBuf;

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::order::resolve_order;
use crate::cli::helpers::{display_id, report_created, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::documents::render_invoice;
use crate::core::identity::EntityPrefix;
use crate::entities::Invoice;

#[derive(Subcommand, Debug)]
pub enum InvCommands {
    /// List invoices
    List(ListArgs),

    /// Issue the invoice for a completed order
    New(NewArgs),

    /// Show an invoice as a document
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only invoices issued in this year
    #[arg(long)]
    pub year: Option<i32>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Order ID or short ID (ORD@N)
    pub order: String,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Invoice ID, short ID (INV@N), number (FV/2026/0001) or order (ORD@N)
    pub id: String,

    /// Write the rendered document to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Run an invoice subcommand
pub fn run(cmd: InvCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        InvCommands::List(args) => run_list(args, global),
        InvCommands::New(args) => run_new(args, global),
        InvCommands::Show(args) => run_show(args, global),
    }
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("number", "NUMBER", 14),
    ColumnDef::new("issued", "ISSUED", 10),
    ColumnDef::new("doctor", "DOCTOR", 24),
    ColumnDef::new("item", "ITEM", 24),
    ColumnDef::new("teeth", "QTY", 4),
    ColumnDef::new("amount", "AMOUNT", 14),
    ColumnDef::new("order", "ORDER", 10),
];

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let calendar = session.lab.calendar();
    let invoices: Vec<&Invoice> = session
        .lab
        .invoices()
        .iter()
        .filter(|inv| args.year.map_or(true, |y| calendar.year(inv.issue_date) == y))
        .collect();

    if args.count {
        println!("{}", invoices.len());
        return Ok(());
    }
    if invoices.is_empty() {
        if !global.quiet {
            println!("No invoices found.");
        }
        return Ok(());
    }

    session
        .short_ids
        .rebuild(EntityPrefix::Inv, invoices.iter().map(|inv| &inv.id));

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&invoices).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&invoices).into_diagnostic()?);
        }
        format => {
            let currency = session.config.currency().to_string();
            let rows = invoices.iter().map(|inv| {
                TableRow::new(&inv.id, &session.short_ids)
                    .cell("number", CellValue::Text(inv.invoice_number.clone()))
                    .cell("issued", CellValue::Timestamp(inv.issue_date))
                    .cell("doctor", CellValue::opt_text(Some(inv.doctor_name.as_str())))
                    .cell("item", CellValue::opt_text(Some(inv.prosthetic_name.as_str())))
                    .cell("teeth", CellValue::Number(i64::from(inv.teeth_count)))
                    .cell("amount", CellValue::Money(inv.amount, currency.clone()))
                    .cell(
                        "order",
                        CellValue::Text(display_id(&session.short_ids, &inv.order_id)),
                    )
            });
            let mut formatter = TableFormatter::new(COLUMNS, "invoice", "INV");
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
    let order_id = resolve_order(&session, &args.order)?;
    let invoice = session.lab.generate_invoice(&order_id)?;
    let short_id = session.short_ids.add(&invoice.id);
    report_created(global, &invoice.id, &short_id);
    session.finish()
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let invoice = find_invoice(&session, &args.id)?;

    let rendered = match global.format {
        OutputFormat::Json => serde_json::to_string_pretty(invoice).into_diagnostic()? + "\n",
        OutputFormat::Yaml => serde_yml::to_string(invoice).into_diagnostic()?,
        OutputFormat::Id => format!("{}\n", invoice.id),
        _ => render_invoice(invoice, session.config.currency()),
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered).into_diagnostic()?;
            if !global.quiet {
                println!(
                    "{} Wrote {} to {}",
                    console::style("✓").green(),
                    invoice.invoice_number,
                    path.display()
                );
            }
        }
        None => print!("{}", rendered),
    }

    session.finish()
}

fn find_invoice<'a>(session: &'a Session, reference: &str) -> Result<&'a Invoice> {
    let reference = reference.trim();
    if let Some(invoice) = session
        .lab
        .invoices()
        .iter()
        .find(|inv| inv.invoice_number.eq_ignore_ascii_case(reference))
    {
        return Ok(invoice);
    }

    if reference.to_uppercase().starts_with("ORD") {
        let order_id = resolve_order(session, reference)?;
        return session
            .lab
            .invoice_for_order(&order_id)
            .ok_or_else(|| miette::miette!("order '{}' has no invoice yet", reference));
    }

    let id = session.resolve(
        reference,
        EntityPrefix::Inv,
        session.lab.invoices().iter().map(|inv| &inv.id),
    )?;
    session
        .lab
        .invoice(&id)
        .ok_or_else(|| miette::miette!("No invoice found matching '{}'", reference))
}
