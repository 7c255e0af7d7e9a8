//! `labdesk doctor` command - Doctor registry

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{confirm, display_id, report_created, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::{Doctor, DoctorFields};

#[derive(Subcommand, Debug)]
pub enum DoctorCommands {
    /// List doctors
    List(ListArgs),

    /// Add a doctor
    New(NewArgs),

    /// Show a doctor with their orders
    Show(ShowArgs),

    /// Change doctor fields (empty value clears an optional field)
    Edit(EditArgs),

    /// Delete a doctor no order refers to
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in name, specialty and clinic
    #[arg(long)]
    pub search: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug, Default)]
pub struct FieldArgs {
    /// Specialty
    #[arg(long)]
    pub specialty: Option<String>,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// E-mail address
    #[arg(long)]
    pub email: Option<String>,

    /// Clinic or practice name
    #[arg(long)]
    pub clinic: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Full name
    #[arg(long, short = 'n')]
    pub name: String,

    #[command(flatten)]
    pub fields: FieldArgs,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Doctor ID or short ID (DOC@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Doctor ID or short ID (DOC@N)
    pub id: String,

    /// New name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[command(flatten)]
    pub fields: FieldArgs,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Doctor ID or short ID (DOC@N)
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl FieldArgs {
    fn into_fields(self, name: Option<String>) -> DoctorFields {
        DoctorFields {
            name,
            specialty: self.specialty,
            phone: self.phone,
            email: self.email,
            clinic: self.clinic,
        }
    }
}

/// Run a doctor subcommand
pub fn run(cmd: DoctorCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DoctorCommands::List(args) => run_list(args, global),
        DoctorCommands::New(args) => run_new(args, global),
        DoctorCommands::Show(args) => run_show(args, global),
        DoctorCommands::Edit(args) => run_edit(args, global),
        DoctorCommands::Delete(args) => run_delete(args, global),
    }
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "NAME", 28),
    ColumnDef::new("specialty", "SPECIALTY", 20),
    ColumnDef::new("clinic", "CLINIC", 24),
    ColumnDef::new("phone", "PHONE", 16),
    ColumnDef::new("orders", "ORDERS", 6),
];

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let search = args.search.as_ref().map(|s| s.to_lowercase());

    let mut doctors: Vec<&Doctor> = session
        .lab
        .doctors()
        .iter()
        .filter(|d| {
            search.as_ref().map_or(true, |needle| {
                [Some(&d.name), d.specialty.as_ref(), d.clinic.as_ref()]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(needle))
            })
        })
        .collect();
    doctors.sort_by(|a, b| a.name.cmp(&b.name));

    if args.count {
        println!("{}", doctors.len());
        return Ok(());
    }
    if doctors.is_empty() {
        if !global.quiet {
            println!("No doctors found.");
        }
        return Ok(());
    }

    session
        .short_ids
        .rebuild(EntityPrefix::Doc, doctors.iter().map(|d| &d.id));

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&doctors).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&doctors).into_diagnostic()?);
        }
        format => {
            let orders = session.lab.orders();
            let rows = doctors.iter().map(|d| {
                let count = orders.iter().filter(|o| o.doctor_id == d.id).count();
                TableRow::new(&d.id, &session.short_ids)
                    .cell("name", CellValue::Text(d.name.clone()))
                    .cell("specialty", CellValue::opt_text(d.specialty.as_deref()))
                    .cell("clinic", CellValue::opt_text(d.clinic.as_deref()))
                    .cell("phone", CellValue::opt_text(d.phone.as_deref()))
                    .cell("orders", CellValue::Number(count as i64))
            });
            let mut formatter = TableFormatter::new(COLUMNS, "doctor", "DOC");
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
        .add_doctor(args.fields.into_fields(Some(args.name)))?;
    let short_id = session.short_ids.add(&id);
    report_created(global, &id, &short_id);
    session.finish()
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let id = resolve_doctor(&session, &args.id)?;
    let doctor = session
        .lab
        .doctor(&id)
        .ok_or_else(|| miette::miette!("No doctor found matching '{}'", args.id))?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(doctor).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(doctor).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", doctor.id),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {}",
                style("ID").bold(),
                style(doctor.id.to_string()).cyan()
            );
            println!("{}: {}", style("Name").bold(), style(&doctor.name).yellow());
            println!("{}", style("─".repeat(60)).dim());

            let optional = [
                ("Specialty", &doctor.specialty),
                ("Phone", &doctor.phone),
                ("E-mail", &doctor.email),
                ("Clinic", &doctor.clinic),
            ];
            for (label, value) in optional {
                if let Some(value) = value {
                    println!("{}: {}", style(label).bold(), value);
                }
            }

            let orders: Vec<_> = session
                .lab
                .orders()
                .iter()
                .filter(|o| o.doctor_id == doctor.id)
                .collect();
            if !orders.is_empty() {
                println!();
                println!("{} ({}):", style("Orders").bold(), orders.len());
                for order in orders {
                    println!(
                        "  • {} {} due {} [{}]",
                        style(display_id(&session.short_ids, &order.id)).cyan(),
                        order.patient_code,
                        order.deadline,
                        order.status
                    );
                }
            }
        }
    }

    session.finish()
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = resolve_doctor(&session, &args.id)?;
    let fields = args.fields.into_fields(args.name);
    if fields == DoctorFields::default() {
        return Err(miette::miette!(
            "nothing to change; pass at least one field option"
        ));
    }
    session.lab.update_doctor(&id, fields)?;
    session.finish()
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = resolve_doctor(&session, &args.id)?;
    let label = session
        .lab
        .doctor(&id)
        .map(|d| d.name.clone())
        .unwrap_or_else(|| id.to_string());

    if !confirm(&format!("Delete doctor {}?", label), args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    session.lab.delete_doctor(&id)?;
    session.finish()
}

fn resolve_doctor(session: &Session, reference: &str) -> Result<EntityId> {
    session.resolve(
        reference,
        EntityPrefix::Doc,
        session.lab.doctors().iter().map(|d| &d.id),
    )
}
