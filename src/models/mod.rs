//! Core data models for finreport
//!
//! This module contains the data structures that represent the financial
//! records exports draw from: accounts, transactions, investments, budgets
//! and savings goals, plus the bundle type that carries a snapshot of all
//! of them into a format generator.

pub mod account;
pub mod budget;
pub mod bundle;
pub mod investment;
pub mod money;
pub mod transaction;

pub use account::{Account, AccountType};
pub use budget::{BudgetLine, Goal};
pub use bundle::ExportBundle;
pub use investment::Investment;
pub use money::Money;
pub use transaction::Transaction;
