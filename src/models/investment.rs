//! Investment holding model

use serde::{Deserialize, Serialize};

use super::money::Money;

/// A single investment holding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investment {
    /// Unique identifier
    pub id: String,

    /// Holding name (e.g., "S&P 500 Index Fund")
    pub name: String,

    /// Ticker symbol, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,

    /// Current market value
    pub current_value: Money,

    /// Original purchase cost
    pub purchase_value: Money,
}

impl Investment {
    /// Gain/loss relative to purchase value, as a percentage
    ///
    /// Returns 0.0 for a zero purchase value rather than dividing by zero.
    pub fn gain_loss_percent(&self) -> f64 {
        if self.purchase_value.cents() == 0 {
            return 0.0;
        }
        let gain = self.current_value.cents() - self.purchase_value.cents();
        gain as f64 / self.purchase_value.cents() as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_loss_percent() {
        let inv = Investment {
            id: "i1".into(),
            name: "Index Fund".into(),
            symbol: None,
            current_value: Money::from_cents(110_000),
            purchase_value: Money::from_cents(100_000),
        };
        assert!((inv.gain_loss_percent() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_gain_loss_zero_cost() {
        let inv = Investment {
            id: "i1".into(),
            name: "Gift Shares".into(),
            symbol: None,
            current_value: Money::from_cents(5000),
            purchase_value: Money::zero(),
        };
        assert_eq!(inv.gain_loss_percent(), 0.0);
    }
}
