//! Table formatting utilities for CLI list commands
//!
//! Every `list` subcommand builds [`TableRow`]s of typed [`CellValue`]s and
//! hands them to a [`TableFormatter`], which prints them as aligned TSV,
//! CSV, Markdown or bare IDs.

use chrono::{DateTime, Local, NaiveDate, Utc};
use console::style;

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;
use crate::core::documents::format_money;
use crate::core::identity::EntityId;
use crate::core::shortid::ShortIdIndex;
use crate::entities::{OrderStatus, StageStatus};

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Plain text, truncated to the column
    Text(String),
    /// Order status with color coding
    OrderStatus(OrderStatus),
    /// Stage status with color coding
    StageStatus(StageStatus),
    /// Deadline, red when overdue and yellow when urgent
    Deadline {
        date: NaiveDate,
        urgent: bool,
        overdue: bool,
    },
    /// Calendar date
    Date(NaiveDate),
    /// Timestamp displayed as local date
    Timestamp(DateTime<Utc>),
    /// Amount with currency suffix
    Money(f64, String),
    /// Count or other integer
    Number(i64),
    /// Progress such as `2/4`
    Progress(usize, usize),
    /// Comma-joined list
    Tags(Vec<String>),
    /// Placeholder
    Empty,
}

impl CellValue {
    /// Optional text; `None` and blanks render as [`CellValue::Empty`]
    pub fn opt_text(value: Option<&str>) -> Self {
        match value {
            Some(s) if !s.trim().is_empty() => CellValue::Text(s.to_string()),
            _ => CellValue::Empty,
        }
    }

    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::OrderStatus(status) => {
                let s = status.to_string();
                let styled = match status {
                    OrderStatus::New => style(&s).dim(),
                    OrderStatus::InProgress => style(&s).yellow(),
                    OrderStatus::TrialFitting | OrderStatus::Corrections => style(&s).magenta(),
                    OrderStatus::ReadyForPickup => style(&s).cyan().bold(),
                    OrderStatus::Completed => style(&s).green(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::StageStatus(status) => {
                let s = status.to_string();
                let styled = match status {
                    StageStatus::NotStarted => style(&s).dim(),
                    StageStatus::InProgress => style(&s).yellow(),
                    StageStatus::Done => style(&s).green(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Deadline {
                date,
                urgent,
                overdue,
            } => {
                let s = date.format("%Y-%m-%d").to_string();
                let styled = if *overdue {
                    style(s).red().bold()
                } else if *urgent {
                    style(s).yellow()
                } else {
                    style(s)
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Money(..) | CellValue::Number(_) | CellValue::Progress(_, _) => {
                format!("{:>width$}", self.raw(), width = width)
            }
            CellValue::Tags(tags) => {
                let joined = tags.join(", ");
                format!(
                    "{:<width$}",
                    truncate_str(&joined, width.saturating_sub(2)),
                    width = width
                )
            }
            CellValue::Date(_) | CellValue::Timestamp(_) => {
                format!("{:<width$}", self.raw(), width = width)
            }
            CellValue::Empty => format!("{:<width$}", "-", width = width),
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Money(amount, _) => format!("{:.2}", amount),
            CellValue::Empty => String::new(),
            other => escape_csv(&other.raw()),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Deadline { date, overdue, .. } if *overdue => {
                format!("**{}**", date.format("%Y-%m-%d"))
            }
            CellValue::Empty => "-".to_string(),
            other => other.raw(),
        };
        raw.replace('|', "\\|")
    }

    /// Get raw string value
    pub fn raw(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::OrderStatus(status) => status.to_string(),
            CellValue::StageStatus(status) => status.to_string(),
            CellValue::Deadline { date, .. } | CellValue::Date(date) => {
                date.format("%Y-%m-%d").to_string()
            }
            CellValue::Timestamp(dt) => {
                let local: DateTime<Local> = dt.with_timezone(&Local);
                local.format("%Y-%m-%d").to_string()
            }
            CellValue::Money(amount, currency) => format_money(*amount, currency),
            CellValue::Number(n) => n.to_string(),
            CellValue::Progress(done, total) => format!("{}/{}", done, total),
            CellValue::Tags(tags) => tags.join(", "),
            CellValue::Empty => String::new(),
        }
    }

    /// Display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Empty => 1,
            CellValue::Deadline { .. } | CellValue::Date(_) | CellValue::Timestamp(_) => 10,
            other => other.raw().chars().count(),
        }
    }
}

/// Column definition with header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub short_id: String,
    pub full_id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: &EntityId, short_ids: &ShortIdIndex) -> Self {
        Self {
            short_id: short_ids.get_short_id(id).unwrap_or_default().to_string(),
            full_id: id.to_string(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    entity_prefix: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(
        columns: &'a [ColumnDef],
        entity_name: &'static str,
        entity_prefix: &'static str,
    ) -> Self {
        Self {
            columns,
            entity_name,
            entity_prefix,
            show_summary: true,
        }
    }

    /// Drop the trailing "N found" line (quiet mode)
    pub fn without_summary(mut self) -> Self {
        self.show_summary = false;
        self
    }

    /// Output rows in the specified format
    pub fn output<I>(&self, rows: I, format: OutputFormat)
    where
        I: IntoIterator<Item = TableRow>,
    {
        let rows: Vec<TableRow> = rows.into_iter().collect();

        match format {
            OutputFormat::Csv => self.output_csv(&rows),
            OutputFormat::Md => self.output_md(&rows),
            OutputFormat::Id => {
                for row in &rows {
                    println!("{}", row.full_id);
                }
            }
            _ => self.output_tsv(&rows),
        }
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        let mut widths = Vec::with_capacity(self.columns.len() + 1);

        let short_width = rows
            .iter()
            .map(|r| r.short_id.len())
            .max()
            .unwrap_or(5)
            .max(5);
        widths.push(short_width);

        for col in self.columns {
            let max_content = rows
                .iter()
                .filter_map(|r| r.get(col.key))
                .map(|v| v.display_width())
                .max()
                .unwrap_or(0);
            // +2 leaves room for the truncation marker
            let natural = col.header.len().max(max_content.saturating_add(2));
            widths.push(natural.min(col.width));
        }

        widths
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let mut header_parts = vec![format!(
            "{:<width$}",
            style("SHORT").bold().dim(),
            width = widths[0]
        )];
        for (col, width) in self.columns.iter().zip(&widths[1..]) {
            header_parts.push(format!("{:<width$}", style(col.header).bold(), width = width));
        }
        println!("{}", header_parts.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len() - 1;
        println!("{}", "-".repeat(total_width));

        for row in rows {
            let mut parts = vec![format!(
                "{:<width$}",
                style(&row.short_id).cyan(),
                width = widths[0]
            )];
            for (col, width) in self.columns.iter().zip(&widths[1..]) {
                match row.get(col.key) {
                    Some(value) => parts.push(value.format_tsv(*width)),
                    None => parts.push(format!("{:<width$}", "-", width = width)),
                }
            }
            println!("{}", parts.join(" "));
        }

        if self.show_summary {
            println!();
            println!(
                "{} {}(s) found. Use {} to reference by short ID.",
                style(rows.len()).cyan(),
                self.entity_name,
                style(format!("{}@N", self.entity_prefix)).cyan()
            );
        }
    }

    fn output_csv(&self, rows: &[TableRow]) {
        let mut headers = vec!["short_id".to_string(), "id".to_string()];
        headers.extend(self.columns.iter().map(|c| c.key.to_string()));
        println!("{}", headers.join(","));

        for row in rows {
            let mut values = vec![escape_csv(&row.short_id), escape_csv(&row.full_id)];
            for col in self.columns {
                values.push(row.get(col.key).map(CellValue::format_csv).unwrap_or_default());
            }
            println!("{}", values.join(","));
        }
    }

    fn output_md(&self, rows: &[TableRow]) {
        let mut headers = vec!["Short".to_string(), "ID".to_string()];
        headers.extend(self.columns.iter().map(|c| c.header.to_string()));
        println!("| {} |", headers.join(" | "));

        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        println!("|{}|", separators.join("|"));

        for row in rows {
            let mut values = vec![row.short_id.clone(), row.full_id.clone()];
            for col in self.columns {
                values.push(
                    row.get(col.key)
                        .map(CellValue::format_md)
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            println!("| {} |", values.join(" | "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;

    #[test]
    fn test_text_cell_formats() {
        let cell = CellValue::Text("Korona porcelanowa".to_string());
        assert!(cell.format_tsv(30).contains("Korona porcelanowa"));
        assert_eq!(cell.format_csv(), "Korona porcelanowa");
        assert_eq!(cell.format_md(), "Korona porcelanowa");
    }

    #[test]
    fn test_status_cell_formats() {
        let cell = CellValue::OrderStatus(OrderStatus::ReadyForPickup);
        assert_eq!(cell.format_csv(), "ready-for-pickup");
        assert_eq!(cell.format_md(), "ready-for-pickup");
    }

    #[test]
    fn test_money_cell_formats() {
        let cell = CellValue::Money(1350.0, "zł".to_string());
        assert_eq!(cell.raw(), "1350.00 zł");
        assert_eq!(cell.format_csv(), "1350.00");
    }

    #[test]
    fn test_overdue_deadline_is_bold_in_markdown() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let cell = CellValue::Deadline {
            date,
            urgent: true,
            overdue: true,
        };
        assert_eq!(cell.format_md(), "**2025-06-01**");
        assert_eq!(cell.format_csv(), "2025-06-01");
    }

    #[test]
    fn test_empty_and_optional_cells() {
        assert_eq!(CellValue::opt_text(None).format_md(), "-");
        assert_eq!(CellValue::opt_text(Some("  ")).format_csv(), "");
        assert_eq!(CellValue::opt_text(Some("a|b")).format_md(), "a\\|b");
        assert_eq!(CellValue::Tags(vec!["x".into(), "y".into()]).format_csv(), "\"x, y\"");
    }

    #[test]
    fn test_table_row_builder() {
        let id = EntityId::new(EntityPrefix::Ord);
        let mut short_ids = ShortIdIndex::new();
        short_ids.add(&id);

        let row = TableRow::new(&id, &short_ids)
            .cell("patient", CellValue::Text("P-001".to_string()))
            .cell("stages", CellValue::Progress(1, 4));

        assert_eq!(row.short_id, "ORD@1");
        assert_eq!(row.full_id, id.to_string());
        assert_eq!(row.get("stages").unwrap().raw(), "1/4");
        assert!(row.get("missing").is_none());
    }
}
