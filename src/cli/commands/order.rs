//! `labdesk order` command - Order management and production tracking

use chrono::{Duration, NaiveDate};
use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{confirm, display_id, machine_format, report_created, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::documents::format_money;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::{Order, OrderInput, OrderPatch, OrderStatus, StageStatus};

#[derive(Subcommand, Debug)]
pub enum OrderCommands {
    /// List orders with filtering
    List(ListArgs),

    /// Register a new order
    New(NewArgs),

    /// Show an order with its production stages
    Show(ShowArgs),

    /// Change order fields (price is recomputed)
    Edit(EditArgs),

    /// Delete an order
    Delete(DeleteArgs),

    /// Set the order status
    Status(StatusArgs),

    /// Assign and advance a production stage
    Stage(StageArgs),
}

/// Status filter
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum StatusFilter {
    New,
    InProgress,
    TrialFitting,
    Corrections,
    ReadyForPickup,
    Completed,
    /// Everything except completed
    Active,
    /// All statuses
    All,
}

impl StatusFilter {
    fn matches(self, status: OrderStatus) -> bool {
        match self {
            StatusFilter::New => status == OrderStatus::New,
            StatusFilter::InProgress => status == OrderStatus::InProgress,
            StatusFilter::TrialFitting => status == OrderStatus::TrialFitting,
            StatusFilter::Corrections => status == OrderStatus::Corrections,
            StatusFilter::ReadyForPickup => status == OrderStatus::ReadyForPickup,
            StatusFilter::Completed => status == OrderStatus::Completed,
            StatusFilter::Active => status != OrderStatus::Completed,
            StatusFilter::All => true,
        }
    }
}

/// Sort keys for list output
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SortKey {
    Deadline,
    Created,
    Patient,
    Status,
    Price,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, short = 's', default_value = "all")]
    pub status: StatusFilter,

    /// Only orders for this doctor (DOC@N or ID)
    #[arg(long, short = 'd')]
    pub doctor: Option<String>,

    /// Only urgent orders (open and due within the urgency window)
    #[arg(long, short = 'u')]
    pub urgent: bool,

    /// Search in patient code, doctor and prosthetic names, teeth, material and notes
    #[arg(long)]
    pub search: Option<String>,

    /// Sort by field
    #[arg(long, default_value = "deadline")]
    pub sort: SortKey,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Referring doctor (DOC@N or ID)
    #[arg(long, short = 'd')]
    pub doctor: String,

    /// Catalog item (PROS@N or ID)
    #[arg(long, short = 'p')]
    pub prosthetic: String,

    /// Patient code
    #[arg(long)]
    pub patient: String,

    /// Tooth numbers, comma separated (e.g. "14, 15, 16")
    #[arg(long, short = 't', default_value = "")]
    pub teeth: String,

    /// Material
    #[arg(long, short = 'm', default_value = "")]
    pub material: String,

    /// Deadline (YYYY-MM-DD); defaults to today plus the item's lead time
    #[arg(long)]
    pub deadline: Option<NaiveDate>,

    /// Free-text notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Order ID or short ID (ORD@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Order ID or short ID (ORD@N)
    pub id: String,

    /// New referring doctor (DOC@N or ID)
    #[arg(long, short = 'd')]
    pub doctor: Option<String>,

    /// New catalog item (PROS@N or ID)
    #[arg(long, short = 'p')]
    pub prosthetic: Option<String>,

    /// New patient code
    #[arg(long)]
    pub patient: Option<String>,

    /// New tooth numbers
    #[arg(long, short = 't')]
    pub teeth: Option<String>,

    /// New material
    #[arg(long, short = 'm')]
    pub material: Option<String>,

    /// New deadline (YYYY-MM-DD)
    #[arg(long)]
    pub deadline: Option<NaiveDate>,

    /// New notes (empty string clears)
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Order ID or short ID (ORD@N)
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Order ID or short ID (ORD@N)
    pub id: String,

    /// New status (new, in-progress, trial-fitting, corrections, ready-for-pickup, completed)
    pub status: OrderStatus,
}

#[derive(clap::Args, Debug)]
pub struct StageArgs {
    /// Order ID or short ID (ORD@N)
    pub id: String,

    /// Stage number (1-based) or stage name
    pub stage: String,

    /// Stage status (not-started, in-progress, done)
    #[arg(long, short = 's')]
    pub status: StageStatus,

    /// Who works on the stage: EMP@N, SUP@N, or free text (keeps current if omitted)
    #[arg(long, short = 'a')]
    pub assignee: Option<String>,
}

/// Run an order subcommand
pub fn run(cmd: OrderCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        OrderCommands::List(args) => run_list(args, global),
        OrderCommands::New(args) => run_new(args, global),
        OrderCommands::Show(args) => run_show(args, global),
        OrderCommands::Edit(args) => run_edit(args, global),
        OrderCommands::Delete(args) => run_delete(args, global),
        OrderCommands::Status(args) => run_status(args, global),
        OrderCommands::Stage(args) => run_stage(args, global),
    }
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("patient", "PATIENT", 16),
    ColumnDef::new("doctor", "DOCTOR", 22),
    ColumnDef::new("prosthetic", "PROSTHETIC", 24),
    ColumnDef::new("teeth", "TEETH", 14),
    ColumnDef::new("deadline", "DEADLINE", 10),
    ColumnDef::new("status", "STATUS", 16),
    ColumnDef::new("stages", "STAGES", 6),
    ColumnDef::new("total", "TOTAL", 14),
];

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let today = session.lab.today();
    let urgent_days = session.lab.urgent_days();

    let doctor = match &args.doctor {
        Some(reference) => Some(session.resolve(
            reference,
            EntityPrefix::Doc,
            session.lab.doctors().iter().map(|d| &d.id),
        )?),
        None => None,
    };
    let search = args.search.as_ref().map(|s| s.to_lowercase());

    let mut orders: Vec<&Order> = session
        .lab
        .orders()
        .iter()
        .filter(|o| args.status.matches(o.status))
        .filter(|o| doctor.as_ref().map_or(true, |d| &o.doctor_id == d))
        .filter(|o| !args.urgent || o.is_urgent(today, urgent_days))
        .filter(|o| {
            search.as_ref().map_or(true, |needle| {
                let doctor = session.lab.doctor(&o.doctor_id).map(|d| d.name.as_str());
                let prosthetic = session
                    .lab
                    .prosthetic(&o.prosthetic_id)
                    .map(|p| p.name.as_str());
                o.patient_code.to_lowercase().contains(needle)
                    || doctor.is_some_and(|n| n.to_lowercase().contains(needle))
                    || prosthetic.is_some_and(|n| n.to_lowercase().contains(needle))
                    || o.teeth_numbers.to_lowercase().contains(needle)
                    || o.material.to_lowercase().contains(needle)
                    || o.notes
                        .as_ref()
                        .is_some_and(|n| n.to_lowercase().contains(needle))
            })
        })
        .collect();

    match args.sort {
        SortKey::Deadline => orders.sort_by_key(|o| o.deadline),
        SortKey::Created => orders.sort_by_key(|o| o.created_at),
        SortKey::Patient => orders.sort_by(|a, b| a.patient_code.cmp(&b.patient_code)),
        SortKey::Status => orders.sort_by_key(|o| o.status.rank()),
        SortKey::Price => orders.sort_by(|a, b| a.total_price.total_cmp(&b.total_price)),
    }
    if args.reverse {
        orders.reverse();
    }
    if let Some(limit) = args.limit {
        orders.truncate(limit);
    }

    if args.count {
        println!("{}", orders.len());
        return Ok(());
    }

    if orders.is_empty() {
        if !global.quiet {
            println!("No orders found.");
        }
        return Ok(());
    }

    session
        .short_ids
        .rebuild(EntityPrefix::Ord, orders.iter().map(|o| &o.id));

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&orders).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&orders).into_diagnostic()?);
        }
        _ => {
            let currency = session.config.currency().to_string();
            let rows = orders.iter().map(|o| {
                let doctor = session.lab.doctor(&o.doctor_id).map(|d| d.name.as_str());
                let prosthetic = session
                    .lab
                    .prosthetic(&o.prosthetic_id)
                    .map(|p| p.name.as_str());
                TableRow::new(&o.id, &session.short_ids)
                    .cell("patient", CellValue::Text(o.patient_code.clone()))
                    .cell("doctor", CellValue::opt_text(doctor))
                    .cell("prosthetic", CellValue::opt_text(prosthetic))
                    .cell("teeth", CellValue::opt_text(Some(&o.teeth_numbers)))
                    .cell(
                        "deadline",
                        CellValue::Deadline {
                            date: o.deadline,
                            urgent: o.is_urgent(today, urgent_days),
                            overdue: o.is_overdue(today),
                        },
                    )
                    .cell("status", CellValue::OrderStatus(o.status))
                    .cell("stages", CellValue::Progress(o.stages_done(), o.stages.len()))
                    .cell("total", CellValue::Money(o.total_price, currency.clone()))
            });
            let mut formatter = TableFormatter::new(COLUMNS, "order", "ORD");
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

    let doctor_id = session.resolve(
        &args.doctor,
        EntityPrefix::Doc,
        session.lab.doctors().iter().map(|d| &d.id),
    )?;
    let prosthetic_id = session.resolve(
        &args.prosthetic,
        EntityPrefix::Pros,
        session.lab.prosthetics().iter().map(|p| &p.id),
    )?;

    let deadline = match args.deadline {
        Some(date) => date,
        None => {
            let lead_days = session
                .lab
                .prosthetic(&prosthetic_id)
                .map_or(0, |p| p.min_days);
            session.lab.today() + Duration::days(i64::from(lead_days))
        }
    };

    let id = session.lab.create_order(OrderInput {
        doctor_id,
        patient_code: args.patient,
        prosthetic_id,
        deadline,
        teeth_numbers: args.teeth,
        material: args.material,
        notes: args.notes,
    })?;
    let short_id = session.short_ids.add(&id);

    if let Some(order) = session.lab.order(&id) {
        match global.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(order).into_diagnostic()?)
            }
            OutputFormat::Yaml => print!("{}", serde_yml::to_string(order).into_diagnostic()?),
            _ => {
                report_created(global, &id, &short_id);
                if !global.quiet && !machine_format(global.format) {
                    println!(
                        "   Deadline: {} | Total: {}",
                        style(order.deadline).yellow(),
                        style(format_money(order.total_price, session.config.currency()))
                            .yellow()
                    );
                }
            }
        }
    }

    session.finish()
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let id = resolve_order(&session, &args.id)?;
    let order = session
        .lab
        .order(&id)
        .ok_or_else(|| miette::miette!("No order found matching '{}'", args.id))?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(order).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(order).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", order.id),
        _ => print_order(&session, order),
    }

    session.finish()
}

fn print_order(session: &Session, order: &Order) {
    let lab = &session.lab;
    let today = lab.today();
    let currency = session.config.currency();

    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {}",
        style("ID").bold(),
        style(order.id.to_string()).cyan()
    );
    println!(
        "{}: {}",
        style("Patient").bold(),
        style(&order.patient_code).yellow()
    );
    println!("{}: {}", style("Status").bold(), order.status);
    println!("{}", style("─".repeat(60)).dim());

    let doctor = lab
        .doctor(&order.doctor_id)
        .map(|d| d.name.clone())
        .unwrap_or_else(|| format!("{} (missing)", order.doctor_id));
    let prosthetic = lab
        .prosthetic(&order.prosthetic_id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| format!("{} (missing)", order.prosthetic_id));

    println!("{}: {}", style("Doctor").bold(), doctor);
    println!("{}: {}", style("Prosthetic").bold(), prosthetic);
    println!(
        "{}: {} ({} tooth/teeth)",
        style("Teeth").bold(),
        if order.teeth_numbers.is_empty() {
            "-"
        } else {
            &order.teeth_numbers
        },
        order.teeth_count
    );
    if !order.material.is_empty() {
        println!("{}: {}", style("Material").bold(), order.material);
    }

    let deadline = order.deadline.to_string();
    let deadline = if order.is_overdue(today) {
        style(format!("{} (overdue)", deadline)).red().bold()
    } else if order.is_urgent(today, lab.urgent_days()) {
        style(format!("{} (urgent)", deadline)).yellow()
    } else {
        style(deadline)
    };
    println!("{}: {}", style("Deadline").bold(), deadline);
    println!(
        "{}: {}",
        style("Total").bold(),
        format_money(order.total_price, currency)
    );

    if !order.stages.is_empty() {
        println!();
        println!(
            "{} ({}/{} done):",
            style("Stages").bold(),
            order.stages_done(),
            order.stages.len()
        );
        for (i, (name, progress)) in order.stages.iter().zip(&order.stage_progress).enumerate() {
            let marker = match progress.status {
                StageStatus::NotStarted => style("○").dim(),
                StageStatus::InProgress => style("◐").yellow(),
                StageStatus::Done => style("●").green(),
            };
            print!("  {} {}. {:<16} {:<12}", marker, i + 1, name, progress.status);
            if !progress.assignee.is_empty() {
                print!(" {}", style(&progress.assignee).cyan());
            }
            if let Some(done) = progress.completed_at {
                print!(" {}", style(format!("done {}", done.format("%Y-%m-%d"))).dim());
            } else if let Some(started) = progress.started_at {
                print!(
                    " {}",
                    style(format!("started {}", started.format("%Y-%m-%d"))).dim()
                );
            }
            println!();
        }
    }

    if let Some(ref notes) = order.notes {
        println!();
        println!("{}", style("Notes:").bold());
        println!("{}", notes);
    }

    let documents: Vec<String> = lab
        .invoice_for_order(&order.id)
        .map(|inv| format!("invoice {}", inv.invoice_number))
        .into_iter()
        .chain(
            lab.declaration_for_order(&order.id)
                .map(|d| format!("declaration {}", d.declaration_number)),
        )
        .collect();
    if !documents.is_empty() {
        println!();
        println!("{}: {}", style("Documents").bold(), documents.join(", "));
    }

    println!("{}", style("─".repeat(60)).dim());
    print!(
        "{}: {}",
        style("Created").dim(),
        order.created_at.format("%Y-%m-%d %H:%M")
    );
    if let Some(modified) = order.modified_at {
        print!(
            " | {}: {}",
            style("Modified").dim(),
            modified.format("%Y-%m-%d %H:%M")
        );
    }
    if let Some(completed) = order.completed_at {
        print!(
            " | {}: {}",
            style("Completed").dim(),
            completed.format("%Y-%m-%d %H:%M")
        );
    }
    println!();
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = resolve_order(&session, &args.id)?;

    let doctor_id = match &args.doctor {
        Some(reference) => Some(session.resolve(
            reference,
            EntityPrefix::Doc,
            session.lab.doctors().iter().map(|d| &d.id),
        )?),
        None => None,
    };
    let prosthetic_id = match &args.prosthetic {
        Some(reference) => Some(session.resolve(
            reference,
            EntityPrefix::Pros,
            session.lab.prosthetics().iter().map(|p| &p.id),
        )?),
        None => None,
    };

    let patch = OrderPatch {
        doctor_id,
        patient_code: args.patient,
        prosthetic_id,
        deadline: args.deadline,
        teeth_numbers: args.teeth,
        material: args.material,
        notes: args.notes,
    };
    if patch == OrderPatch::default() {
        return Err(miette::miette!(
            "nothing to change; pass at least one field option (see 'labdesk order edit --help')"
        ));
    }

    session.lab.update_order(&id, patch)?;
    session.finish()
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = resolve_order(&session, &args.id)?;

    let label = display_id(&session.short_ids, &id);
    if !confirm(&format!("Delete order {}?", label), args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    session.lab.delete_order(&id)?;
    session.finish()
}

fn run_status(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = resolve_order(&session, &args.id)?;
    session.lab.set_status(&id, args.status)?;
    session.finish()
}

fn run_stage(args: StageArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = resolve_order(&session, &args.id)?;

    let (index, current_assignee) = {
        let order = session
            .lab
            .order(&id)
            .ok_or_else(|| miette::miette!("No order found matching '{}'", args.id))?;
        let index = stage_index(order, &args.stage)?;
        let current = order
            .stage_progress
            .get(index)
            .map(|p| p.assignee.clone())
            .unwrap_or_default();
        (index, current)
    };

    let assignee = match args.assignee {
        Some(reference) => resolve_assignee(&session, &reference)?,
        None => current_assignee,
    };

    session
        .lab
        .set_stage_progress(&id, index, assignee, args.status)?;
    session.finish()
}

pub fn resolve_order(session: &Session, reference: &str) -> Result<EntityId> {
    session.resolve(
        reference,
        EntityPrefix::Ord,
        session.lab.orders().iter().map(|o| &o.id),
    )
}

/// Zero-based stage index from a 1-based number or a stage name
///
/// Out-of-range numbers are passed through so the lab reports them.
fn stage_index(order: &Order, reference: &str) -> Result<usize> {
    let reference = reference.trim();
    if let Ok(number) = reference.parse::<usize>() {
        if number == 0 {
            return Err(miette::miette!("stage numbers start at 1"));
        }
        return Ok(number - 1);
    }
    order
        .stages
        .iter()
        .position(|s| s.eq_ignore_ascii_case(reference))
        .ok_or_else(|| {
            miette::miette!(
                "order has no stage named '{}' (stages: {})",
                reference,
                order.stages.join(", ")
            )
        })
}

/// Employee and supplier references become their display names; anything
/// else is taken as free text
fn resolve_assignee(session: &Session, reference: &str) -> Result<String> {
    let upper = reference.trim().to_uppercase();
    if upper.starts_with("EMP@") || upper.starts_with("EMP-") {
        let id = session.resolve(
            reference,
            EntityPrefix::Emp,
            session.lab.employees().iter().map(|e| &e.id),
        )?;
        return session
            .lab
            .employee(&id)
            .map(|e| e.name.clone())
            .ok_or_else(|| miette::miette!("No employee found matching '{}'", reference));
    }
    if upper.starts_with("SUP@") || upper.starts_with("SUP-") {
        let id = session.resolve(
            reference,
            EntityPrefix::Sup,
            session.lab.suppliers().iter().map(|s| &s.id),
        )?;
        return session
            .lab
            .supplier(&id)
            .map(|s| s.assignee_label())
            .ok_or_else(|| miette::miette!("No supplier found matching '{}'", reference));
    }
    Ok(reference.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Prosthetic;
    use chrono::{TimeZone, Utc};

    fn crown_order() -> Order {
        let crown = Prosthetic::default_catalog().remove(0);
        Order::new(
            OrderInput {
                doctor_id: EntityId::new(EntityPrefix::Doc),
                patient_code: "P-1".to_string(),
                prosthetic_id: crown.id.clone(),
                deadline: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
                teeth_numbers: "11".to_string(),
                material: String::new(),
                notes: None,
            },
            &crown,
            Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_stage_index_by_number_and_name() {
        let order = crown_order();
        assert_eq!(stage_index(&order, "1").unwrap(), 0);
        assert_eq!(stage_index(&order, "porcelana").unwrap(), 2);
        assert_eq!(stage_index(&order, "9").unwrap(), 8);
        assert!(stage_index(&order, "0").is_err());
        assert!(stage_index(&order, "Frezowanie").is_err());
    }

    #[test]
    fn test_status_filter() {
        assert!(StatusFilter::Active.matches(OrderStatus::ReadyForPickup));
        assert!(!StatusFilter::Active.matches(OrderStatus::Completed));
        assert!(StatusFilter::All.matches(OrderStatus::Completed));
        assert!(StatusFilter::TrialFitting.matches(OrderStatus::TrialFitting));
    }
}
