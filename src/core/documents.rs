//! Invoice and declaration derivation, numbering and rendering
//!
//! Invoices are numbered per calendar year (`FV/2025/0007`); declarations
//! carry the year too but count globally (`OSW/2025/12`). Both numbers are
//! derived from the current live count, so replacing collections through an
//! import can yield duplicate numbers.

use chrono::{DateTime, Utc};
use tabled::{builder::Builder, settings::Style};

use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::{Declaration, Doctor, Invoice, InvoiceStatus, Order, Prosthetic};

/// Format an invoice number
pub fn invoice_number(year: i32, seq: usize) -> String {
    format!("FV/{}/{:04}", year, seq)
}

/// Next invoice number for `year`: one more than the invoices already
/// numbered in that year
pub fn next_invoice_number(existing: &[Invoice], year: i32) -> String {
    let prefix = format!("FV/{}/", year);
    let issued = existing
        .iter()
        .filter(|inv| inv.invoice_number.starts_with(&prefix))
        .count();
    invoice_number(year, issued + 1)
}

/// Next declaration number: one more than all declarations ever kept
pub fn next_declaration_number(existing: &[Declaration], year: i32) -> String {
    format!("OSW/{}/{}", year, existing.len() + 1)
}

/// Derive an invoice from an order
///
/// Doctor and prosthetic names are copied as they are now; a missing record
/// leaves the name empty.
pub fn build_invoice(
    order: &Order,
    doctor: Option<&Doctor>,
    prosthetic: Option<&Prosthetic>,
    number: String,
    now: DateTime<Utc>,
) -> Invoice {
    Invoice {
        id: EntityId::new(EntityPrefix::Inv),
        order_id: order.id.clone(),
        invoice_number: number,
        doctor_name: doctor.map(|d| d.name.clone()).unwrap_or_default(),
        doctor_id: order.doctor_id.clone(),
        prosthetic_name: prosthetic.map(|p| p.name.clone()).unwrap_or_default(),
        teeth_numbers: order.teeth_numbers.clone(),
        teeth_count: order.teeth_count,
        unit_price: order.total_price / f64::from(order.teeth_count.max(1)),
        amount: order.total_price,
        issue_date: now,
        status: InvoiceStatus::Issued,
    }
}

/// Derive a declaration from an order
pub fn build_declaration(
    order: &Order,
    doctor: Option<&Doctor>,
    prosthetic: Option<&Prosthetic>,
    number: String,
    now: DateTime<Utc>,
) -> Declaration {
    Declaration {
        id: EntityId::new(EntityPrefix::Decl),
        order_id: order.id.clone(),
        declaration_number: number,
        patient_code: order.patient_code.clone(),
        doctor_name: doctor.map(|d| d.name.clone()).unwrap_or_default(),
        prosthetic_name: prosthetic.map(|p| p.name.clone()).unwrap_or_default(),
        gmlc_code: prosthetic.map(|p| p.gmlc_code.clone()).unwrap_or_default(),
        teeth_numbers: order.teeth_numbers.clone(),
        material: order.material.clone(),
        issue_date: now,
        completion_date: order.completed_at,
    }
}

/// Format an amount with two decimals and a currency suffix
pub fn format_money(amount: f64, currency: &str) -> String {
    if currency.is_empty() {
        format!("{:.2}", amount)
    } else {
        format!("{:.2} {}", amount, currency)
    }
}

/// Render an invoice as a Markdown document
pub fn render_invoice(invoice: &Invoice, currency: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("# Invoice {}\n\n", invoice.invoice_number));
    output.push_str(&format!(
        "- **Issued:** {}\n",
        invoice.issue_date.format("%Y-%m-%d")
    ));
    output.push_str(&format!("- **Order:** {}\n", invoice.order_id));
    output.push_str(&format!(
        "- **Doctor:** {}\n",
        display_or_dash(&invoice.doctor_name)
    ));
    output.push_str(&format!("- **Status:** {}\n\n", invoice.status));

    let mut builder = Builder::default();
    builder.push_record(["Item", "Teeth", "Qty", "Unit price", "Amount"]);
    builder.push_record([
        display_or_dash(&invoice.prosthetic_name).to_string(),
        display_or_dash(&invoice.teeth_numbers).to_string(),
        invoice.teeth_count.to_string(),
        format_money(invoice.unit_price, currency),
        format_money(invoice.amount, currency),
    ]);
    output.push_str(&builder.build().with(Style::markdown()).to_string());

    output.push_str(&format!(
        "\n\n**Total:** {}\n",
        format_money(invoice.amount, currency)
    ));
    output
}

/// Render a declaration as a Markdown document
pub fn render_declaration(declaration: &Declaration) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "# Declaration of conformity {}\n\n",
        declaration.declaration_number
    ));
    output.push_str(
        "The custom-made dental device described below was manufactured for the named patient \
         and conforms to the applicable essential requirements.\n\n",
    );

    let completed = declaration
        .completion_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    let issued = declaration.issue_date.format("%Y-%m-%d").to_string();

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    builder.push_record(["Patient code", display_or_dash(&declaration.patient_code)]);
    builder.push_record(["Doctor", display_or_dash(&declaration.doctor_name)]);
    builder.push_record(["Device", display_or_dash(&declaration.prosthetic_name)]);
    builder.push_record(["GMLC code", display_or_dash(&declaration.gmlc_code)]);
    builder.push_record(["Teeth", display_or_dash(&declaration.teeth_numbers)]);
    builder.push_record(["Material", display_or_dash(&declaration.material)]);
    builder.push_record(["Completed", completed.as_str()]);
    builder.push_record(["Issued", issued.as_str()]);
    output.push_str(&builder.build().with(Style::markdown()).to_string());
    output.push('\n');
    output
}

fn display_or_dash(s: &str) -> &str {
    if s.trim().is_empty() {
        "-"
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{OrderInput, OrderStatus};
    use chrono::{NaiveDate, TimeZone};

    fn completed_order(prosthetic: &Prosthetic, doctor: &Doctor) -> Order {
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap();
        let mut order = Order::new(
            OrderInput {
                doctor_id: doctor.id.clone(),
                patient_code: "P-17".to_string(),
                prosthetic_id: prosthetic.id.clone(),
                deadline: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
                teeth_numbers: "14, 15, 16".to_string(),
                material: "Cyrkon".to_string(),
                notes: None,
            },
            prosthetic,
            now,
        );
        order.set_status(OrderStatus::Completed, now);
        order
    }

    fn invoice_with_number(number: &str) -> Invoice {
        let crown = Prosthetic::default_catalog().remove(0);
        let doctor = Doctor::new("Dr Nowak".to_string());
        let order = completed_order(&crown, &doctor);
        build_invoice(&order, Some(&doctor), Some(&crown), number.to_string(), Utc::now())
    }

    #[test]
    fn test_invoice_numbers_are_per_year() {
        let existing = vec![
            invoice_with_number("FV/2024/0001"),
            invoice_with_number("FV/2024/0002"),
            invoice_with_number("FV/2025/0001"),
        ];
        assert_eq!(next_invoice_number(&existing, 2025), "FV/2025/0002");
        assert_eq!(next_invoice_number(&existing, 2026), "FV/2026/0001");
        assert_eq!(next_invoice_number(&[], 2025), "FV/2025/0001");
    }

    #[test]
    fn test_declaration_numbers_count_globally() {
        assert_eq!(next_declaration_number(&[], 2025), "OSW/2025/1");
    }

    #[test]
    fn test_build_invoice_copies_frozen_total() {
        let crown = Prosthetic::default_catalog().remove(0);
        let doctor = Doctor::new("Dr Nowak".to_string());
        let order = completed_order(&crown, &doctor);

        let invoice = build_invoice(
            &order,
            Some(&doctor),
            Some(&crown),
            "FV/2025/0001".to_string(),
            Utc::now(),
        );
        assert_eq!(invoice.amount, 1350.0);
        assert_eq!(invoice.unit_price, 450.0);
        assert_eq!(invoice.teeth_count, 3);
        assert_eq!(invoice.doctor_name, "Dr Nowak");
        assert_eq!(invoice.prosthetic_name, "Korona porcelanowa");
    }

    #[test]
    fn test_build_declaration_tolerates_missing_records() {
        let crown = Prosthetic::default_catalog().remove(0);
        let doctor = Doctor::new("Dr Nowak".to_string());
        let order = completed_order(&crown, &doctor);

        let decl = build_declaration(&order, None, None, "OSW/2025/1".to_string(), Utc::now());
        assert_eq!(decl.doctor_name, "");
        assert_eq!(decl.gmlc_code, "");
        assert_eq!(decl.completion_date, order.completed_at);
        assert_eq!(decl.material, "Cyrkon");
    }

    #[test]
    fn test_render_invoice() {
        let invoice = invoice_with_number("FV/2025/0001");
        let doc = render_invoice(&invoice, "zł");
        assert!(doc.starts_with("# Invoice FV/2025/0001"));
        assert!(doc.contains("Korona porcelanowa"));
        assert!(doc.contains("**Total:** 1350.00 zł"));
    }

    #[test]
    fn test_render_declaration() {
        let crown = Prosthetic::default_catalog().remove(0);
        let doctor = Doctor::new("Dr Nowak".to_string());
        let order = completed_order(&crown, &doctor);
        let decl = build_declaration(
            &order,
            Some(&doctor),
            Some(&crown),
            "OSW/2025/3".to_string(),
            Utc::now(),
        );
        let doc = render_declaration(&decl);
        assert!(doc.contains("OSW/2025/3"));
        assert!(doc.contains("GMLC-001"));
        assert!(doc.contains("2025-06-02"));
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(1350.0, "zł"), "1350.00 zł");
        assert_eq!(format_money(12.5, ""), "12.50");
    }
}
