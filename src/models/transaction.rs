//! Transaction model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::money::Money;

/// A single financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier (also used as OFX FITID)
    pub id: String,

    /// Posting date
    pub date: NaiveDate,

    /// Payee or free-text description
    pub description: String,

    /// Category name ("Uncategorized" when absent upstream)
    #[serde(default)]
    pub category: String,

    /// Signed amount: negative for spending, positive for income
    pub amount: Money,

    /// Account this transaction belongs to
    pub account_id: String,

    /// Optional memo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        description: impl Into<String>,
        amount: Money,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            description: description.into(),
            category: String::new(),
            amount,
            account_id: account_id.into(),
            memo: None,
        }
    }

    /// Category name with a fallback for uncategorized transactions
    pub fn category_or_default(&self) -> &str {
        if self.category.is_empty() {
            "Uncategorized"
        } else {
            &self.category
        }
    }

    /// True when the transaction falls inside the (inclusive) date window
    pub fn in_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
        if let Some(s) = start {
            if self.date < s {
                return false;
            }
        }
        if let Some(e) = end {
            if self.date > e {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(date: NaiveDate) -> Transaction {
        Transaction::new("t1", date, "Coffee", Money::from_cents(-450), "a1")
    }

    #[test]
    fn test_in_range() {
        let d = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let t = txn(d);

        assert!(t.in_range(None, None));
        assert!(t.in_range(Some(d), Some(d)));
        assert!(!t.in_range(Some(NaiveDate::from_ymd_opt(2024, 6, 16).unwrap()), None));
        assert!(!t.in_range(None, Some(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap())));
    }

    #[test]
    fn test_category_default() {
        let d = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let mut t = txn(d);
        assert_eq!(t.category_or_default(), "Uncategorized");
        t.category = "Dining".to_string();
        assert_eq!(t.category_or_default(), "Dining");
    }
}
