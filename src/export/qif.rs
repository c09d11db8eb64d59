//! QIF export
//!
//! One `!Account` block per account (name, mapped type code, balance)
//! followed by a `!Type:<code>` transaction block for that account. Field
//! codes and ordering are a wire contract with desktop accounting tools.

use std::fmt::Write;

use crate::error::{FinReportError, FinReportResult};
use crate::models::{ExportBundle, Transaction};

use super::ExportOptions;

/// Generate a QIF document
///
/// Fails fast when the options exclude either accounts or transactions;
/// both slices are required for a meaningful QIF file (an empty
/// transaction list is fine).
pub fn generate(bundle: &ExportBundle, options: &ExportOptions) -> FinReportResult<Vec<u8>> {
    if !options.include_accounts || !options.include_transactions {
        return Err(FinReportError::Validation(
            "QIF export requires both accounts and transactions".to_string(),
        ));
    }

    let mut out = String::new();

    for account in &bundle.accounts {
        let qif_type = account.account_type.qif_type();

        // Account block
        out.push_str("!Account\n");
        let _ = writeln!(out, "N{}", account.name);
        let _ = writeln!(out, "T{}", qif_type);
        let _ = writeln!(out, "${}", account.balance.to_decimal_string());
        out.push_str("^\n");

        // Transaction block for this account
        let _ = writeln!(out, "!Type:{}", qif_type);
        for txn in bundle.transactions_for(&account.id) {
            if !txn.in_range(options.start_date, options.end_date) {
                continue;
            }
            write_transaction(&mut out, txn);
        }
    }

    Ok(out.into_bytes())
}

fn write_transaction(out: &mut String, txn: &Transaction) {
    let _ = writeln!(out, "D{}", txn.date.format("%m/%d/%Y"));
    let _ = writeln!(out, "T{}", txn.amount.to_decimal_string());
    let _ = writeln!(out, "P{}", txn.description);
    let _ = writeln!(out, "L{}", txn.category_or_default());
    if let Some(memo) = &txn.memo {
        let _ = writeln!(out, "M{}", memo);
    }
    out.push_str("^\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportFormat;
    use crate::models::{Account, AccountType, Money};
    use chrono::NaiveDate;

    fn options() -> ExportOptions {
        ExportOptions::full(ExportFormat::Qif)
    }

    #[test]
    fn test_account_block_prefix() {
        let bundle = ExportBundle {
            accounts: vec![Account::with_balance(
                "a1",
                "Checking",
                AccountType::Checking,
                Money::from_cents(100_000),
            )],
            ..Default::default()
        };

        let out = String::from_utf8(generate(&bundle, &options()).unwrap()).unwrap();
        assert!(out.starts_with("!Account\nNChecking\nTBank\n$1000.00\n^\n"));
        assert!(out.contains("!Type:Bank\n"));
    }

    #[test]
    fn test_transaction_fields_and_order() {
        let mut txn = Transaction::new(
            "t1",
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            "Market",
            Money::from_cents(-5025),
            "a1",
        );
        txn.category = "Groceries".to_string();
        txn.memo = Some("weekly shop".to_string());

        let bundle = ExportBundle {
            accounts: vec![Account::new("a1", "Checking", AccountType::Checking)],
            transactions: vec![txn],
            ..Default::default()
        };

        let out = String::from_utf8(generate(&bundle, &options()).unwrap()).unwrap();
        assert!(out.contains("D03/09/2024\nT-50.25\nPMarket\nLGroceries\nMweekly shop\n^\n"));
    }

    #[test]
    fn test_credit_maps_to_ccard() {
        let bundle = ExportBundle {
            accounts: vec![Account::new("a1", "Visa", AccountType::Credit)],
            ..Default::default()
        };
        let out = String::from_utf8(generate(&bundle, &options()).unwrap()).unwrap();
        assert!(out.contains("TCCard\n"));
        assert!(out.contains("!Type:CCard\n"));
    }

    #[test]
    fn test_missing_slice_fails_fast() {
        let mut opts = options();
        opts.include_accounts = false;
        let err = generate(&ExportBundle::default(), &opts).unwrap_err();
        assert!(err.is_validation());
    }
}
