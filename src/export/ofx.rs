//! OFX export
//!
//! A single OFX 102 SGML document: header, signon response, then one
//! `<STMTRS>` per account with a `<STMTTRN>` per transaction. Field names
//! and ordering are a wire contract with consuming tools.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::error::{FinReportError, FinReportResult};
use crate::models::{ExportBundle, Transaction};

use super::ExportOptions;

const OFX_HEADER: &str = "OFXHEADER:100\n\
DATA:OFXSGML\n\
VERSION:102\n\
SECURITY:NONE\n\
ENCODING:USASCII\n\
CHARSET:1252\n\
COMPRESSION:NONE\n\
OLDFILEUID:NONE\n\
NEWFILEUID:NONE\n\n";

/// Generate an OFX document
///
/// Like QIF, both accounts and transactions must be included; an empty
/// transaction list still produces a valid (empty-statement) document.
pub fn generate(
    bundle: &ExportBundle,
    options: &ExportOptions,
    today: NaiveDate,
) -> FinReportResult<Vec<u8>> {
    if !options.include_accounts || !options.include_transactions {
        return Err(FinReportError::Validation(
            "OFX export requires both accounts and transactions".to_string(),
        ));
    }

    let stamp = today.format("%Y%m%d").to_string();

    let mut out = String::from(OFX_HEADER);
    out.push_str("<OFX>\n");
    out.push_str("<SIGNONMSGSRSV1>\n<SONRS>\n");
    out.push_str("<STATUS>\n<CODE>0\n<SEVERITY>INFO\n</STATUS>\n");
    let _ = writeln!(out, "<DTSERVER>{}", stamp);
    out.push_str("<LANGUAGE>ENG\n</SONRS>\n</SIGNONMSGSRSV1>\n");
    out.push_str("<BANKMSGSRSV1>\n");

    for (index, account) in bundle.accounts.iter().enumerate() {
        out.push_str("<STMTTRNRS>\n");
        let _ = writeln!(out, "<TRNUID>{}", index + 1);
        out.push_str("<STATUS>\n<CODE>0\n<SEVERITY>INFO\n</STATUS>\n");
        out.push_str("<STMTRS>\n<CURDEF>USD\n");

        out.push_str("<BANKACCTFROM>\n");
        out.push_str("<BANKID>000000000\n");
        let _ = writeln!(out, "<ACCTID>{}", account.id);
        let _ = writeln!(out, "<ACCTTYPE>{}", account.account_type.ofx_type());
        out.push_str("</BANKACCTFROM>\n");

        out.push_str("<BANKTRANLIST>\n");
        for txn in bundle.transactions_for(&account.id) {
            if !txn.in_range(options.start_date, options.end_date) {
                continue;
            }
            write_transaction(&mut out, txn);
        }
        out.push_str("</BANKTRANLIST>\n");

        out.push_str("<LEDGERBAL>\n");
        let _ = writeln!(out, "<BALAMT>{}", account.balance.to_decimal_string());
        let _ = writeln!(out, "<DTASOF>{}", stamp);
        out.push_str("</LEDGERBAL>\n");

        out.push_str("</STMTRS>\n</STMTTRNRS>\n");
    }

    out.push_str("</BANKMSGSRSV1>\n</OFX>\n");
    Ok(out.into_bytes())
}

fn write_transaction(out: &mut String, txn: &Transaction) {
    let trn_type = if txn.amount.is_negative() {
        "DEBIT"
    } else {
        "CREDIT"
    };

    out.push_str("<STMTTRN>\n");
    let _ = writeln!(out, "<TRNTYPE>{}", trn_type);
    let _ = writeln!(out, "<DTPOSTED>{}", txn.date.format("%Y%m%d"));
    let _ = writeln!(out, "<TRNAMT>{}", txn.amount.to_decimal_string());
    let _ = writeln!(out, "<FITID>{}", txn.id);
    let _ = writeln!(out, "<NAME>{}", txn.description);
    if let Some(memo) = &txn.memo {
        let _ = writeln!(out, "<MEMO>{}", memo);
    }
    out.push_str("</STMTTRN>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportFormat;
    use crate::models::{Account, AccountType, Money};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn bundle() -> ExportBundle {
        let mut txn = Transaction::new(
            "t1",
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            "Market",
            Money::from_cents(-5025),
            "a1",
        );
        txn.memo = Some("weekly".to_string());

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

    #[test]
    fn test_envelope_structure() {
        let out = String::from_utf8(
            generate(&bundle(), &ExportOptions::full(ExportFormat::Ofx), today()).unwrap(),
        )
        .unwrap();

        assert!(out.starts_with("OFXHEADER:100\n"));
        assert!(out.contains("<SIGNONMSGSRSV1>"));
        assert!(out.contains("<ACCTTYPE>CHECKING"));
        assert!(out.contains("<DTSERVER>20240520"));
        assert!(out.ends_with("</BANKMSGSRSV1>\n</OFX>\n"));
    }

    #[test]
    fn test_transaction_fields() {
        let out = String::from_utf8(
            generate(&bundle(), &ExportOptions::full(ExportFormat::Ofx), today()).unwrap(),
        )
        .unwrap();

        assert!(out.contains(
            "<STMTTRN>\n<TRNTYPE>DEBIT\n<DTPOSTED>20240309\n<TRNAMT>-50.25\n<FITID>t1\n<NAME>Market\n<MEMO>weekly\n</STMTTRN>\n"
        ));
    }

    #[test]
    fn test_credit_sign() {
        let mut b = bundle();
        b.transactions[0].amount = Money::from_cents(5025);
        let out = String::from_utf8(
            generate(&b, &ExportOptions::full(ExportFormat::Ofx), today()).unwrap(),
        )
        .unwrap();
        assert!(out.contains("<TRNTYPE>CREDIT\n"));
    }

    #[test]
    fn test_missing_slice_fails_fast() {
        let mut opts = ExportOptions::full(ExportFormat::Ofx);
        opts.include_transactions = false;
        assert!(generate(&bundle(), &opts, today()).is_err());
    }
}
