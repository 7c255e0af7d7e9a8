//! `labdesk emp` command - Lab staff

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{confirm, report_created, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::prosthetic::parse_stage_list;
use crate::entities::{Employee, EmployeeFields};

#[derive(Subcommand, Debug)]
pub enum EmpCommands {
    /// List employees
    List(ListArgs),

    /// Add an employee
    New(NewArgs),

    /// Show an employee and the stages assigned to them
    Show(ShowArgs),

    /// Change employee fields
    Edit(EditArgs),

    /// Delete an employee
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only employees with this skill
    #[arg(long)]
    pub skill: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct FieldArgs {
    /// Position or role
    #[arg(long)]
    pub position: Option<String>,

    /// Skills, comma separated (replaces the current list)
    #[arg(long)]
    pub skills: Option<String>,
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
    /// Employee ID or short ID (EMP@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Employee ID or short ID (EMP@N)
    pub id: String,

    /// New name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[command(flatten)]
    pub fields: FieldArgs,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Employee ID or short ID (EMP@N)
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl FieldArgs {
    fn into_fields(self, name: Option<String>) -> EmployeeFields {
        EmployeeFields {
            name,
            position: self.position,
            skills: self.skills.as_deref().map(parse_stage_list),
        }
    }
}

/// Run an employee subcommand
pub fn run(cmd: EmpCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        EmpCommands::List(args) => run_list(args, global),
        EmpCommands::New(args) => run_new(args, global),
        EmpCommands::Show(args) => run_show(args, global),
        EmpCommands::Edit(args) => run_edit(args, global),
        EmpCommands::Delete(args) => run_delete(args, global),
    }
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "NAME", 28),
    ColumnDef::new("position", "POSITION", 20),
    ColumnDef::new("skills", "SKILLS", 40),
];

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let skill = args.skill.as_ref().map(|s| s.to_lowercase());

    let mut employees: Vec<&Employee> = session
        .lab
        .employees()
        .iter()
        .filter(|e| {
            skill.as_ref().map_or(true, |wanted| {
                e.skills.iter().any(|s| s.to_lowercase() == *wanted)
            })
        })
        .collect();
    employees.sort_by(|a, b| a.name.cmp(&b.name));

    if args.count {
        println!("{}", employees.len());
        return Ok(());
    }
    if employees.is_empty() {
        if !global.quiet {
            println!("No employees found.");
        }
        return Ok(());
    }

    session
        .short_ids
        .rebuild(EntityPrefix::Emp, employees.iter().map(|e| &e.id));

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&employees).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&employees).into_diagnostic()?);
        }
        format => {
            let rows = employees.iter().map(|e| {
                TableRow::new(&e.id, &session.short_ids)
                    .cell("name", CellValue::Text(e.name.clone()))
                    .cell("position", CellValue::opt_text(e.position.as_deref()))
                    .cell("skills", CellValue::Tags(e.skills.clone()))
            });
            let mut formatter = TableFormatter::new(COLUMNS, "employee", "EMP");
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
        .add_employee(args.fields.into_fields(Some(args.name)))?;
    let short_id = session.short_ids.add(&id);
    report_created(global, &id, &short_id);
    session.finish()
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let id = resolve_employee(&session, &args.id)?;
    let employee = session
        .lab
        .employee(&id)
        .ok_or_else(|| miette::miette!("No employee found matching '{}'", args.id))?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(employee).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(employee).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", employee.id),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {}",
                style("ID").bold(),
                style(employee.id.to_string()).cyan()
            );
            println!("{}: {}", style("Name").bold(), style(&employee.name).yellow());
            println!("{}", style("─".repeat(60)).dim());
            if let Some(position) = &employee.position {
                println!("{}: {}", style("Position").bold(), position);
            }
            if !employee.skills.is_empty() {
                println!("{}: {}", style("Skills").bold(), employee.skills.join(", "));
            }

            // Stages are assigned by name, so this is a name match
            let name = employee.name.as_str();
            let assigned: Vec<(&str, &str)> = session
                .lab
                .orders()
                .iter()
                .flat_map(|o| {
                    o.stages
                        .iter()
                        .zip(&o.stage_progress)
                        .filter(move |(_, p)| p.assignee == name)
                        .map(move |(stage, _)| (o.patient_code.as_str(), stage.as_str()))
                })
                .collect();
            if !assigned.is_empty() {
                println!();
                println!("{} ({}):", style("Assigned stages").bold(), assigned.len());
                for (patient, stage) in assigned {
                    println!("  • {} / {}", patient, stage);
                }
            }
        }
    }

    session.finish()
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = resolve_employee(&session, &args.id)?;
    let fields = args.fields.into_fields(args.name);
    if fields == EmployeeFields::default() {
        return Err(miette::miette!(
            "nothing to change; pass at least one field option"
        ));
    }
    session.lab.update_employee(&id, fields)?;
    session.finish()
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = resolve_employee(&session, &args.id)?;
    let label = session
        .lab
        .employee(&id)
        .map(|e| e.name.clone())
        .unwrap_or_else(|| id.to_string());

    if !confirm(&format!("Delete employee {}?", label), args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    session.lab.delete_employee(&id)?;
    session.finish()
}

fn resolve_employee(session: &Session, reference: &str) -> Result<EntityId> {
    session.resolve(
        reference,
        EntityPrefix::Emp,
        session.lab.employees().iter().map(|e| &e.id),
    )
}
