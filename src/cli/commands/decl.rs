//! `labdesk decl` command - Conformity declarations

use std::path::PathBuf;

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::order::resolve_order;
use crate::cli::helpers::{display_id, report_created, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::documents::render_declaration;
use crate::core::identity::EntityPrefix;
use crate::entities::Declaration;

#[derive(Subcommand, Debug)]
pub enum DeclCommands {
    /// List declarations
    List(ListArgs),

    /// Issue the declaration for a completed order
    New(NewArgs),

    /// Show a declaration as a document
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only declarations for this patient code
    #[arg(long)]
    pub patient: Option<String>,

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
    /// Declaration ID, short ID (DECL@N), number (OSW/2026/1) or order (ORD@N)
    pub id: String,

    /// Write the rendered document to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Run a declaration subcommand
pub fn run(cmd: DeclCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DeclCommands::List(args) => run_list(args, global),
        DeclCommands::New(args) => run_new(args, global),
        DeclCommands::Show(args) => run_show(args, global),
    }
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("number", "NUMBER", 14),
    ColumnDef::new("issued", "ISSUED", 10),
    ColumnDef::new("patient", "PATIENT", 14),
    ColumnDef::new("device", "DEVICE", 24),
    ColumnDef::new("gmlc", "GMLC", 12),
    ColumnDef::new("order", "ORDER", 10),
];

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let declarations: Vec<&Declaration> = session
        .lab
        .declarations()
        .iter()
        .filter(|d| {
            args.patient
                .as_ref()
                .map_or(true, |p| d.patient_code.eq_ignore_ascii_case(p))
        })
        .collect();

    if args.count {
        println!("{}", declarations.len());
        return Ok(());
    }
    if declarations.is_empty() {
        if !global.quiet {
            println!("No declarations found.");
        }
        return Ok(());
    }

    session
        .short_ids
        .rebuild(EntityPrefix::Decl, declarations.iter().map(|d| &d.id));

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&declarations).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&declarations).into_diagnostic()?);
        }
        format => {
            let rows = declarations.iter().map(|d| {
                TableRow::new(&d.id, &session.short_ids)
                    .cell("number", CellValue::Text(d.declaration_number.clone()))
                    .cell("issued", CellValue::Timestamp(d.issue_date))
                    .cell("patient", CellValue::Text(d.patient_code.clone()))
                    .cell("device", CellValue::opt_text(Some(d.prosthetic_name.as_str())))
                    .cell("gmlc", CellValue::opt_text(Some(d.gmlc_code.as_str())))
                    .cell(
                        "order",
                        CellValue::Text(display_id(&session.short_ids, &d.order_id)),
                    )
            });
            let mut formatter = TableFormatter::new(COLUMNS, "declaration", "DECL");
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
    let declaration = session.lab.generate_declaration(&order_id)?;
    let short_id = session.short_ids.add(&declaration.id);
    report_created(global, &declaration.id, &short_id);
    session.finish()
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let declaration = find_declaration(&session, &args.id)?;

    let rendered = match global.format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(declaration).into_diagnostic()? + "\n"
        }
        OutputFormat::Yaml => serde_yml::to_string(declaration).into_diagnostic()?,
        OutputFormat::Id => format!("{}\n", declaration.id),
        _ => render_declaration(declaration),
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered).into_diagnostic()?;
            if !global.quiet {
                println!(
                    "{} Wrote {} to {}",
                    console::style("✓").green(),
                    declaration.declaration_number,
                    path.display()
                );
            }
        }
        None => print!("{}", rendered),
    }

    session.finish()
}

fn find_declaration<'a>(session: &'a Session, reference: &str) -> Result<&'a Declaration> {
    let reference = reference.trim();
    if let Some(declaration) = session
        .lab
        .declarations()
        .iter()
        .find(|d| d.declaration_number.eq_ignore_ascii_case(reference))
    {
        return Ok(declaration);
    }

    if reference.to_uppercase().starts_with("ORD") {
        let order_id = resolve_order(session, reference)?;
        return session
            .lab
            .declaration_for_order(&order_id)
            .ok_or_else(|| miette::miette!("order '{}' has no declaration yet", reference));
    }

    let id = session.resolve(
        reference,
        EntityPrefix::Decl,
        session.lab.declarations().iter().map(|d| &d.id),
    )?;
    session
        .lab
        .declaration(&id)
        .ok_or_else(|| miette::miette!("No declaration found matching '{}'", reference))
}
