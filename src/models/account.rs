//! Account model
//!
//! Represents financial accounts (checking, savings, credit cards, etc.)
//! along with the fixed mapping onto QIF account-type codes and OFX
//! account-type tags expected by desktop accounting tools.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Type of financial account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Checking account
    Checking,
    /// Current account (treated like checking)
    Current,
    /// Savings account
    Savings,
    /// Credit card
    Credit,
    /// Loan account
    Loan,
    /// Investment account
    Investment,
    /// Other account type
    Other,
}

impl AccountType {
    /// QIF account-type code used in `!Account` blocks and `!Type:` headers
    ///
    /// Unknown types fall back to `Bank`, matching consumer expectations.
    pub fn qif_type(&self) -> &'static str {
        match self {
            Self::Checking | Self::Current | Self::Savings => "Bank",
            Self::Credit => "CCard",
            Self::Loan => "Liability",
            Self::Investment => "Investment",
            Self::Other => "Bank",
        }
    }

    /// OFX `ACCTTYPE` tag value
    pub fn ofx_type(&self) -> &'static str {
        match self {
            Self::Checking | Self::Current => "CHECKING",
            Self::Savings => "SAVINGS",
            Self::Credit => "CREDITLINE",
            Self::Loan => "LOAN",
            Self::Investment => "INVESTMENT",
            Self::Other => "CHECKING",
        }
    }

    /// Parse account type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "checking" => Some(Self::Checking),
            "current" => Some(Self::Current),
            "savings" => Some(Self::Savings),
            "credit" | "credit_card" | "creditcard" => Some(Self::Credit),
            "loan" => Some(Self::Loan),
            "investment" => Some(Self::Investment),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl Default for AccountType {
    fn default() -> Self {
        Self::Checking
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checking => write!(f, "Checking"),
            Self::Current => write!(f, "Current"),
            Self::Savings => write!(f, "Savings"),
            Self::Credit => write!(f, "Credit Card"),
            Self::Loan => write!(f, "Loan"),
            Self::Investment => write!(f, "Investment"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// A financial account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: String,

    /// Account name (e.g., "Chase Checking")
    pub name: String,

    /// Account type
    #[serde(rename = "type")]
    pub account_type: AccountType,

    /// Current balance
    pub balance: Money,
}

impl Account {
    /// Create a new account
    pub fn new(id: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            account_type,
            balance: Money::zero(),
        }
    }

    /// Create a new account with a balance
    pub fn with_balance(
        id: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
        balance: Money,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            account_type,
            balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qif_type_mapping() {
        assert_eq!(AccountType::Checking.qif_type(), "Bank");
        assert_eq!(AccountType::Current.qif_type(), "Bank");
        assert_eq!(AccountType::Savings.qif_type(), "Bank");
        assert_eq!(AccountType::Credit.qif_type(), "CCard");
        assert_eq!(AccountType::Loan.qif_type(), "Liability");
        assert_eq!(AccountType::Investment.qif_type(), "Investment");
        assert_eq!(AccountType::Other.qif_type(), "Bank");
    }

    #[test]
    fn test_ofx_type_mapping() {
        assert_eq!(AccountType::Checking.ofx_type(), "CHECKING");
        assert_eq!(AccountType::Savings.ofx_type(), "SAVINGS");
        assert_eq!(AccountType::Credit.ofx_type(), "CREDITLINE");
        assert_eq!(AccountType::Loan.ofx_type(), "LOAN");
        assert_eq!(AccountType::Investment.ofx_type(), "INVESTMENT");
        assert_eq!(AccountType::Other.ofx_type(), "CHECKING");
    }

    #[test]
    fn test_serde_type_field_name() {
        let account = Account::new("a1", "Checking", AccountType::Checking);
        let json = serde_json::to_string(&account).unwrap();
        assert!(json.contains("\"type\":\"checking\""));
    }
}
