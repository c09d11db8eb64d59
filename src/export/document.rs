//! Document (PDF-style) report export
//!
//! The report is composed here — sections, totals, pagination — while the
//! actual rendering goes through the injected [`DocumentEngine`]. That
//! keeps the core free of a hard dependency on any particular
//! document-rendering library; the built-in [`PlainDocumentEngine`]
//! renders paginated plain text with form-feed page breaks.

use tracing::warn;

use crate::error::FinReportResult;
use crate::models::ExportBundle;

use super::ExportOptions;

/// Usable vertical units per page
const PAGE_HEIGHT: f32 = 290.0;
/// Start a new page once the cursor passes this line
const PAGE_BREAK_AT: f32 = 260.0;
/// Cursor position at the top of a fresh page
const TOP_MARGIN: f32 = 20.0;
/// Vertical advance per text line
const LINE_HEIGHT: f32 = 7.0;

/// Renderer capability, constructed lazily at most once per generator
pub trait DocumentEngine: Send + Sync {
    /// Start a new document
    fn begin(&self) -> Box<dyn DocumentBuilder>;
}

/// A document under construction
pub trait DocumentBuilder {
    fn heading(&mut self, text: &str);
    fn line(&mut self, text: &str);
    /// Embed an image; may fail (e.g. unreachable logo URL)
    fn image(&mut self, url: &str) -> FinReportResult<()>;
    fn page_break(&mut self);
    fn finish(self: Box<Self>) -> Vec<u8>;
}

/// Built-in engine: paginated plain text
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainDocumentEngine;

impl DocumentEngine for PlainDocumentEngine {
    fn begin(&self) -> Box<dyn DocumentBuilder> {
        Box::new(PlainDocumentBuilder::default())
    }
}

#[derive(Default)]
struct PlainDocumentBuilder {
    text: String,
}

impl DocumentBuilder for PlainDocumentBuilder {
    fn heading(&mut self, text: &str) {
        self.text.push_str(text);
        self.text.push('\n');
        self.text.push_str(&"-".repeat(text.len()));
        self.text.push('\n');
    }

    fn line(&mut self, text: &str) {
        self.text.push_str(text);
        self.text.push('\n');
    }

    fn image(&mut self, url: &str) -> FinReportResult<()> {
        self.text.push_str(&format!("[logo: {}]\n", url));
        Ok(())
    }

    fn page_break(&mut self) {
        self.text.push('\x0c');
    }

    fn finish(self: Box<Self>) -> Vec<u8> {
        self.text.into_bytes()
    }
}

/// Tracks the vertical cursor and breaks pages for the builder
struct PageWriter {
    builder: Box<dyn DocumentBuilder>,
    y: f32,
}

impl PageWriter {
    fn new(builder: Box<dyn DocumentBuilder>) -> Self {
        debug_assert!(PAGE_BREAK_AT < PAGE_HEIGHT);
        Self {
            builder,
            y: TOP_MARGIN,
        }
    }

    fn advance(&mut self, height: f32) {
        if self.y > PAGE_BREAK_AT {
            self.builder.page_break();
            self.y = TOP_MARGIN;
        }
        self.y += height;
    }

    fn heading(&mut self, text: &str) {
        self.advance(LINE_HEIGHT * 2.0);
        self.builder.heading(text);
    }

    fn line(&mut self, text: &str) {
        self.advance(LINE_HEIGHT);
        self.builder.line(text);
    }

    fn blank(&mut self) {
        self.line("");
    }
}

/// Compose the report and render it through the engine
pub fn generate(
    engine: &dyn DocumentEngine,
    bundle: &ExportBundle,
    options: &ExportOptions,
) -> FinReportResult<Vec<u8>> {
    let mut doc = PageWriter::new(engine.begin());

    let title = options.custom_title.as_deref().unwrap_or("Financial Report");
    doc.heading(title);

    let period = match (options.start_date, options.end_date) {
        (Some(start), Some(end)) => format!("Period: {} to {}", start, end),
        (Some(start), None) => format!("Period: from {}", start),
        (None, Some(end)) => format!("Period: through {}", end),
        (None, None) => "Period: all time".to_string(),
    };
    doc.line(&period);

    if let Some(url) = &options.logo_url {
        // Logo failures are cosmetic; log and move on
        if let Err(e) = doc.builder.image(url) {
            warn!(url, error = %e, "failed to load report logo");
        } else {
            doc.advance(LINE_HEIGHT * 3.0);
        }
    }
    doc.blank();

    if options.include_accounts && !bundle.accounts.is_empty() {
        doc.heading("Accounts");
        for account in &bundle.accounts {
            doc.line(&format!(
                "{} ({}): {}",
                account.name, account.account_type, account.balance
            ));
        }
        doc.line(&format!("Total: {}", bundle.total_balance()));
        doc.blank();
    }

    if options.include_transactions && !bundle.transactions.is_empty() {
        doc.heading("Transactions by Category");
        for (category, (count, total)) in bundle.category_totals() {
            doc.line(&format!("{}: {} transactions, {}", category, count, total));
        }
        doc.blank();
    }

    if options.include_investments && !bundle.investments.is_empty() {
        doc.heading("Investments");
        for inv in &bundle.investments {
            doc.line(&format!(
                "{}: {} ({:+.1}%)",
                inv.name,
                inv.current_value,
                inv.gain_loss_percent()
            ));
        }
        doc.blank();
    }

    if options.include_budgets && !bundle.budgets.is_empty() {
        doc.heading("Budgets");
        for line in &bundle.budgets {
            doc.line(&format!(
                "{}: spent {} of {} ({:.0}%)",
                line.category,
                line.spent,
                line.budgeted,
                line.percent_used()
            ));
        }
        doc.blank();
    }

    if options.include_charts {
        // Chart rasterization is out of scope; emit a placeholder
        doc.line("[chart: spending by category]");
    }

    Ok(doc.builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportFormat;
    use crate::models::{Account, AccountType, Money, Transaction};
    use chrono::NaiveDate;

    fn bundle() -> ExportBundle {
        let mut txn = Transaction::new(
            "t1",
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            "Market",
            Money::from_cents(-5025),
            "a1",
        );
        txn.category = "Groceries".to_string();

        ExportBundle {
            accounts: vec![Account::with_balance(
                "a1",
                "Checking",
                AccountType::Checking,
                Money::from_cents(100_000),
            )],
            transactions: vec![txn],
            ..Default::default()
        }
    }

    fn render(bundle: &ExportBundle, options: &ExportOptions) -> String {
        let engine = PlainDocumentEngine;
        String::from_utf8(generate(&engine, bundle, options).unwrap()).unwrap()
    }

    #[test]
    fn test_sections_present() {
        let out = render(&bundle(), &ExportOptions::full(ExportFormat::Pdf));
        assert!(out.starts_with("Financial Report\n"));
        assert!(out.contains("Period: all time"));
        assert!(out.contains("Accounts\n"));
        assert!(out.contains("Checking (Checking): $1000.00"));
        assert!(out.contains("Total: $1000.00"));
        assert!(out.contains("Groceries: 1 transactions, -$50.25"));
    }

    #[test]
    fn test_custom_title_and_chart_placeholder() {
        let mut options = ExportOptions::full(ExportFormat::Pdf);
        options.custom_title = Some("Year in Review".to_string());
        options.include_charts = true;
        let out = render(&bundle(), &options);
        assert!(out.starts_with("Year in Review\n"));
        assert!(out.contains("[chart: spending by category]"));
    }

    #[test]
    fn test_logo_placeholder() {
        let mut options = ExportOptions::full(ExportFormat::Pdf);
        options.logo_url = Some("https://example.com/logo.png".to_string());
        let out = render(&bundle(), &options);
        assert!(out.contains("[logo: https://example.com/logo.png]"));
    }

    #[test]
    fn test_pagination_breaks_long_reports() {
        // Enough categories to push the cursor past the break threshold
        let mut b = ExportBundle::default();
        for i in 0..80 {
            let mut txn = Transaction::new(
                format!("t{}", i),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                "x",
                Money::from_cents(-100),
                "a1",
            );
            txn.category = format!("Category {:02}", i);
            b.transactions.push(txn);
        }

        let out = render(&b, &ExportOptions::transactions_only(ExportFormat::Pdf));
        assert!(out.contains('\x0c'), "expected at least one page break");
    }
}
