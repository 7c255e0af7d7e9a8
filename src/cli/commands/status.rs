//! `labdesk status` command - Lab dashboard

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{display_id, Session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::documents::format_money;
use crate::core::dashboard::{self, Dashboard};

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Override the urgency window (days ahead of today)
    #[arg(long)]
    pub urgent_days: Option<i64>,
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let urgent_days = args
        .urgent_days
        .map_or(session.lab.urgent_days(), |days| days.max(0));
    let dashboard = dashboard::dashboard(
        session.lab.data(),
        session.lab.now(),
        session.lab.calendar(),
        urgent_days,
    );

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&dashboard).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&dashboard).into_diagnostic()?);
        }
        OutputFormat::Md => print!("{}", render_markdown(&session, &dashboard, urgent_days)),
        _ => print_dashboard(&session, &dashboard, urgent_days),
    }

    session.finish()
}

fn print_dashboard(session: &Session, dashboard: &Dashboard, urgent_days: i64) {
    let width = 60;
    let currency = session.config.currency();

    println!("{}", style("Lab Status").bold().underlined());
    println!("{}", "═".repeat(width));
    println!();

    println!("{}", style("ORDERS").bold());
    println!("  Active:               {}", dashboard.active_orders);
    println!("  Completed this month: {}", dashboard.completed_this_month);
    println!(
        "  Revenue this month:   {}",
        style(format_money(dashboard.revenue_this_month, currency)).green()
    );
    println!();

    println!(
        "{} (due within {} day(s))",
        style("URGENT").bold(),
        urgent_days
    );
    if dashboard.urgent.is_empty() {
        println!("  {}", style("nothing due").dim());
    }
    for urgent in &dashboard.urgent {
        let deadline = if urgent.overdue {
            style(format!("{} OVERDUE", urgent.deadline)).red().bold()
        } else {
            style(urgent.deadline.to_string()).yellow()
        };
        println!(
            "  {} {:<16} {} [{}]",
            style(display_id(&session.short_ids, &urgent.id)).cyan(),
            urgent.patient_code,
            deadline,
            urgent.status
        );
    }
    println!();

    println!("{}", style("REGISTRIES").bold());
    println!(
        "  Doctors: {}   Catalog: {}   Employees: {}   Suppliers: {}",
        dashboard.doctors, dashboard.prosthetics, dashboard.employees, dashboard.suppliers
    );
    println!(
        "  Invoices: {}   Declarations: {}",
        dashboard.invoices, dashboard.declarations
    );
    println!("{}", "═".repeat(width));
}

/// Markdown report of the dashboard
fn render_markdown(session: &Session, dashboard: &Dashboard, urgent_days: i64) -> String {
    let currency = session.config.currency();
    let mut output = String::new();
    output.push_str("# Lab Status\n\n");

    let mut summary = Builder::default();
    summary.push_record(["Metric", "Value"]);
    summary.push_record(["Active orders".to_string(), dashboard.active_orders.to_string()]);
    summary.push_record([
        "Completed this month".to_string(),
        dashboard.completed_this_month.to_string(),
    ]);
    summary.push_record([
        "Revenue this month".to_string(),
        format_money(dashboard.revenue_this_month, currency),
    ]);
    summary.push_record(["Doctors".to_string(), dashboard.doctors.to_string()]);
    summary.push_record(["Catalog items".to_string(), dashboard.prosthetics.to_string()]);
    summary.push_record(["Employees".to_string(), dashboard.employees.to_string()]);
    output.push_str(&summary.build().with(Style::markdown()).to_string());

    output.push_str(&format!(
        "\n\n## Urgent orders (due within {} day(s))\n\n",
        urgent_days
    ));
    if dashboard.urgent.is_empty() {
        output.push_str("_Nothing due._\n");
        return output;
    }

    let mut urgent = Builder::default();
    urgent.push_record(["Order", "Patient", "Deadline", "Status"]);
    for order in &dashboard.urgent {
        let deadline = if order.overdue {
            format!("**{}** (overdue)", order.deadline)
        } else {
            order.deadline.to_string()
        };
        urgent.push_record([
            display_id(&session.short_ids, &order.id),
            order.patient_code.clone(),
            deadline,
            order.status.to_string(),
        ]);
    }
    output.push_str(&urgent.build().with(Style::markdown()).to_string());
    output.push('\n');
    output
}
