//! Budget and savings-goal models

use serde::{Deserialize, Serialize};

use super::money::Money;

/// A per-category budget line: budgeted versus spent for the period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetLine {
    /// Unique identifier
    pub id: String,

    /// Category this line budgets for
    pub category: String,

    /// Amount budgeted for the period
    pub budgeted: Money,

    /// Amount spent so far
    pub spent: Money,
}

impl BudgetLine {
    /// Spent as a percentage of budgeted (0.0 when nothing is budgeted)
    pub fn percent_used(&self) -> f64 {
        if self.budgeted.cents() == 0 {
            return 0.0;
        }
        self.spent.cents() as f64 / self.budgeted.cents() as f64 * 100.0
    }
}

/// A savings goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier
    pub id: String,

    /// Goal name (e.g., "Emergency Fund")
    pub name: String,

    /// Target amount
    pub target: Money,

    /// Amount saved toward the target
    pub saved: Money,
}
