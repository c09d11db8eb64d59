//! Export bundle: the in-memory snapshot handed to format generators

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Account, BudgetLine, Goal, Investment, Money, Transaction};

/// Everything an export call may draw from
///
/// Collected fresh per run (from storage or injected parameters); format
/// generators treat it as read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportBundle {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub investments: Vec<Investment>,
    #[serde(default)]
    pub budgets: Vec<BudgetLine>,
    #[serde(default)]
    pub goals: Vec<Goal>,
}

impl ExportBundle {
    /// Transactions belonging to one account
    pub fn transactions_for(&self, account_id: &str) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.account_id == account_id)
            .collect()
    }

    /// Per-category (count, total) over all transactions, sorted by name
    pub fn category_totals(&self) -> BTreeMap<String, (usize, Money)> {
        let mut totals: BTreeMap<String, (usize, Money)> = BTreeMap::new();
        for txn in &self.transactions {
            let entry = totals
                .entry(txn.category_or_default().to_string())
                .or_insert((0, Money::zero()));
            entry.0 += 1;
            entry.1 += txn.amount;
        }
        totals
    }

    /// Sum of all account balances
    pub fn total_balance(&self) -> Money {
        self.accounts.iter().map(|a| a.balance).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountType;
    use chrono::NaiveDate;

    fn bundle() -> ExportBundle {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut t1 = Transaction::new("t1", date, "Market", Money::from_cents(-2500), "a1");
        t1.category = "Groceries".to_string();
        let mut t2 = Transaction::new("t2", date, "Market", Money::from_cents(-1500), "a1");
        t2.category = "Groceries".to_string();
        let t3 = Transaction::new("t3", date, "Mystery", Money::from_cents(-100), "a2");

        ExportBundle {
            accounts: vec![
                Account::with_balance("a1", "Checking", AccountType::Checking, Money::from_cents(100_000)),
                Account::with_balance("a2", "Savings", AccountType::Savings, Money::from_cents(250_000)),
            ],
            transactions: vec![t1, t2, t3],
            ..Default::default()
        }
    }

    #[test]
    fn test_category_totals() {
        let totals = bundle().category_totals();
        assert_eq!(totals["Groceries"], (2, Money::from_cents(-4000)));
        assert_eq!(totals["Uncategorized"], (1, Money::from_cents(-100)));
    }

    #[test]
    fn test_transactions_for_account() {
        let b = bundle();
        assert_eq!(b.transactions_for("a1").len(), 2);
        assert_eq!(b.transactions_for("a2").len(), 1);
        assert!(b.transactions_for("a3").is_empty());
    }

    #[test]
    fn test_total_balance() {
        assert_eq!(bundle().total_balance(), Money::from_cents(350_000));
    }
}
