//! Spreadsheet workbook export
//!
//! Sheets are built as arrays of rows (array-of-arrays) and rendered as
//! SpreadsheetML. Only populated data slices get a sheet; the Summary
//! sheet is always present.

use std::fmt::Write;

use crate::error::FinReportResult;
use crate::models::ExportBundle;

use super::ExportOptions;

/// One named sheet: rows of string cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rows: Vec::new(),
        }
    }

    fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }
}

/// Generate the workbook payload
pub fn generate(bundle: &ExportBundle, options: &ExportOptions) -> FinReportResult<Vec<u8>> {
    Ok(render(&build_sheets(bundle, options)).into_bytes())
}

/// Build the sheet list for the bundle
pub fn build_sheets(bundle: &ExportBundle, options: &ExportOptions) -> Vec<Sheet> {
    let mut sheets = Vec::new();

    let mut summary = Sheet::new("Summary");
    summary.row(["Metric", "Value"]);
    summary.row(["Accounts", &bundle.accounts.len().to_string()]);
    summary.row(["Transactions", &bundle.transactions.len().to_string()]);
    summary.row(["Total Balance", &bundle.total_balance().to_decimal_string()]);
    sheets.push(summary);

    if options.include_budgets && !bundle.budgets.is_empty() {
        let mut budgets = Sheet::new("Budgets");
        budgets.row(["Category", "Budgeted", "Spent", "Percent Used"]);
        for line in &bundle.budgets {
            budgets.row([
                line.category.clone(),
                line.budgeted.to_decimal_string(),
                line.spent.to_decimal_string(),
                format!("{:.1}", line.percent_used()),
            ]);
        }
        sheets.push(budgets);
    }

    if !bundle.goals.is_empty() {
        let mut goals = Sheet::new("Goals");
        goals.row(["Name", "Target", "Saved"]);
        for goal in &bundle.goals {
            goals.row([
                goal.name.clone(),
                goal.target.to_decimal_string(),
                goal.saved.to_decimal_string(),
            ]);
        }
        sheets.push(goals);
    }

    if options.include_transactions && !bundle.transactions.is_empty() {
        let mut txns = Sheet::new("Transactions");
        txns.row(["Date", "Description", "Category", "Amount"]);
        for txn in &bundle.transactions {
            if !txn.in_range(options.start_date, options.end_date) {
                continue;
            }
            txns.row([
                txn.date.to_string(),
                txn.description.clone(),
                txn.category_or_default().to_string(),
                txn.amount.to_decimal_string(),
            ]);
        }
        sheets.push(txns);

        let mut categories = Sheet::new("Categories");
        categories.row(["Category", "Count", "Total"]);
        for (category, (count, total)) in bundle.category_totals() {
            categories.row([category, count.to_string(), total.to_decimal_string()]);
        }
        sheets.push(categories);
    }

    sheets
}

fn render(sheets: &[Sheet]) -> String {
    let mut out = String::from(
        "<?xml version=\"1.0\"?>\n\
         <Workbook xmlns=\"urn:schemas-microsoft-com:office:spreadsheet\"\n \
         xmlns:ss=\"urn:schemas-microsoft-com:office:spreadsheet\">\n",
    );

    for sheet in sheets {
        let _ = writeln!(out, "<Worksheet ss:Name=\"{}\">", escape_xml(&sheet.name));
        out.push_str("<Table>\n");
        for row in &sheet.rows {
            out.push_str("<Row>");
            for cell in row {
                let _ = write!(
                    out,
                    "<Cell><Data ss:Type=\"String\">{}</Data></Cell>",
                    escape_xml(cell)
                );
            }
            out.push_str("</Row>\n");
        }
        out.push_str("</Table>\n</Worksheet>\n");
    }

    out.push_str("</Workbook>\n");
    out
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportFormat;
    use crate::models::{Account, AccountType, Goal, Money, Transaction};
    use chrono::NaiveDate;

    fn bundle() -> ExportBundle {
        let mut txn = Transaction::new(
            "t1",
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            "Books & Coffee",
            Money::from_cents(-2000),
            "a1",
        );
        txn.category = "Leisure".to_string();

        ExportBundle {
            accounts: vec![Account::with_balance(
                "a1",
                "Checking",
                AccountType::Checking,
                Money::from_cents(50_000),
            )],
            transactions: vec![txn],
            goals: vec![Goal {
                id: "g1".into(),
                name: "Emergency Fund".into(),
                target: Money::from_cents(1_000_000),
                saved: Money::from_cents(250_000),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_sheet_selection() {
        let sheets = build_sheets(&bundle(), &ExportOptions::full(ExportFormat::Xlsx));
        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Summary", "Goals", "Transactions", "Categories"]);
    }

    #[test]
    fn test_empty_bundle_only_summary() {
        let sheets = build_sheets(
            &ExportBundle::default(),
            &ExportOptions::full(ExportFormat::Xlsx),
        );
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].name, "Summary");
    }

    #[test]
    fn test_summary_rows() {
        let sheets = build_sheets(&bundle(), &ExportOptions::full(ExportFormat::Xlsx));
        let summary = &sheets[0];
        assert_eq!(summary.rows[0], vec!["Metric", "Value"]);
        assert!(summary
            .rows
            .iter()
            .any(|r| r[0] == "Total Balance" && r[1] == "500.00"));
    }

    #[test]
    fn test_render_escapes_xml() {
        let out = String::from_utf8(
            generate(&bundle(), &ExportOptions::full(ExportFormat::Xlsx)).unwrap(),
        )
        .unwrap();
        assert!(out.contains("Books &amp; Coffee"));
        assert!(out.contains("<Worksheet ss:Name=\"Summary\">"));
    }
}
