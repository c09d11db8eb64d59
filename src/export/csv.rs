//! CSV export
//!
//! Flattens one data slice (transactions, accounts, or investments) into a
//! header row plus one row per record. Grouped mode instead emits one row
//! per group with count and total. Escaping follows the csv crate's
//! minimal-quote rules: values containing commas or quotes are quoted with
//! internal quotes doubled.

use std::collections::HashMap;

use crate::error::FinReportResult;
use crate::models::{ExportBundle, Money, Transaction};

use super::{ExportOptions, GroupBy};

/// Generate a CSV payload per the options
///
/// An empty chosen slice yields an empty payload with no header row.
pub fn generate(bundle: &ExportBundle, options: &ExportOptions) -> FinReportResult<Vec<u8>> {
    if options.include_transactions {
        let filtered: Vec<&Transaction> = bundle
            .transactions
            .iter()
            .filter(|t| t.in_range(options.start_date, options.end_date))
            .collect();
        match options.group_by {
            GroupBy::None => transactions_flat(bundle, &filtered),
            grouped => transactions_grouped(&filtered, grouped),
        }
    } else if options.include_accounts {
        accounts(bundle)
    } else if options.include_investments {
        investments(bundle)
    } else {
        Ok(Vec::new())
    }
}

fn transactions_flat(bundle: &ExportBundle, txns: &[&Transaction]) -> FinReportResult<Vec<u8>> {
    if txns.is_empty() {
        return Ok(Vec::new());
    }

    let account_names: HashMap<&str, &str> = bundle
        .accounts
        .iter()
        .map(|a| (a.id.as_str(), a.name.as_str()))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Date", "Description", "Category", "Amount", "Account"])?;

    for txn in txns {
        let account = account_names
            .get(txn.account_id.as_str())
            .copied()
            .unwrap_or("Unknown");
        writer.write_record([
            txn.date.to_string().as_str(),
            &txn.description,
            txn.category_or_default(),
            &txn.amount.to_decimal_string(),
            account,
        ])?;
    }

    finish(writer)
}

fn transactions_grouped(txns: &[&Transaction], group_by: GroupBy) -> FinReportResult<Vec<u8>> {
    if txns.is_empty() {
        return Ok(Vec::new());
    }

    let label = match group_by {
        GroupBy::Category => "Category",
        GroupBy::Account => "Account",
        GroupBy::Month => "Month",
        GroupBy::None => unreachable!("flat mode handled by caller"),
    };

    // BTreeMap keeps group rows in a stable order
    let mut groups: std::collections::BTreeMap<String, (usize, Money)> = Default::default();
    for txn in txns {
        let key = match group_by {
            GroupBy::Category => txn.category_or_default().to_string(),
            GroupBy::Account => txn.account_id.clone(),
            GroupBy::Month => txn.date.format("%Y-%m").to_string(),
            GroupBy::None => unreachable!(),
        };
        let entry = groups.entry(key).or_insert((0, Money::zero()));
        entry.0 += 1;
        entry.1 += txn.amount;
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([label, "Count", "Total"])?;
    for (key, (count, total)) in groups {
        writer.write_record([
            key.as_str(),
            &count.to_string(),
            &total.to_decimal_string(),
        ])?;
    }

    finish(writer)
}

fn accounts(bundle: &ExportBundle) -> FinReportResult<Vec<u8>> {
    if bundle.accounts.is_empty() {
        return Ok(Vec::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Name", "Type", "Balance"])?;
    for account in &bundle.accounts {
        writer.write_record([
            account.name.as_str(),
            &account.account_type.to_string(),
            &account.balance.to_decimal_string(),
        ])?;
    }

    finish(writer)
}

fn investments(bundle: &ExportBundle) -> FinReportResult<Vec<u8>> {
    if bundle.investments.is_empty() {
        return Ok(Vec::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Name", "Symbol", "Purchase Value", "Current Value", "Gain/Loss %"])?;
    for inv in &bundle.investments {
        writer.write_record([
            inv.name.as_str(),
            inv.symbol.as_deref().unwrap_or(""),
            &inv.purchase_value.to_decimal_string(),
            &inv.current_value.to_decimal_string(),
            &format!("{:.2}", inv.gain_loss_percent()),
        ])?;
    }

    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> FinReportResult<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| crate::error::FinReportError::Generation(e.to_string()))
}
