//! Dashboard aggregation over the lab's collections

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::core::backup::LabData;
use crate::core::clock::Calendar;
use crate::core::identity::EntityId;
use crate::entities::OrderStatus;

/// An order needing attention soon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrgentOrder {
    pub id: EntityId,
    pub patient_code: String,
    pub deadline: NaiveDate,
    pub status: OrderStatus,
    pub overdue: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// Not completed and due within the urgency window, soonest first
    pub urgent: Vec<UrgentOrder>,
    pub active_orders: usize,
    pub completed_this_month: usize,
    pub revenue_this_month: f64,
    pub doctors: usize,
    pub prosthetics: usize,
    pub employees: usize,
    pub suppliers: usize,
    pub invoices: usize,
    pub declarations: usize,
}

/// Compute the dashboard as seen at `now` on `calendar`
pub fn dashboard(
    data: &LabData,
    now: DateTime<Utc>,
    calendar: Calendar,
    urgent_days: i64,
) -> Dashboard {
    let today = calendar.date(now);
    let mut urgent: Vec<UrgentOrder> = data
        .orders
        .iter()
        .filter(|o| o.is_urgent(today, urgent_days))
        .map(|o| UrgentOrder {
            id: o.id.clone(),
            patient_code: o.patient_code.clone(),
            deadline: o.deadline,
            status: o.status,
            overdue: o.is_overdue(today),
        })
        .collect();
    urgent.sort_by_key(|u| u.deadline);

    let completed_this_month = data
        .orders
        .iter()
        .filter(|o| o.completed_at.is_some_and(|at| calendar.same_month(at, now)))
        .count();

    let revenue_this_month = data
        .invoices
        .iter()
        .filter(|inv| calendar.same_month(inv.issue_date, now))
        .map(|inv| inv.amount)
        .sum();

    Dashboard {
        urgent,
        active_orders: data.orders.iter().filter(|o| !o.is_completed()).count(),
        completed_this_month,
        revenue_this_month,
        doctors: data.doctors.len(),
        prosthetics: data.prosthetics.len(),
        employees: data.employees.len(),
        suppliers: data.suppliers.len(),
        invoices: data.invoices.len(),
        declarations: data.declarations.len(),
    }
}
