use crate::model::{saturating_sub, Amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The `kpis` block as the backend sent it. Any field may be missing.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct KpiBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_income: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_expense: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    net_savings: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    budget_used_percentage: Option<Amount>,
}

impl KpiBlock {
    pub fn new(
        total_income: Option<Decimal>,
        total_expense: Option<Decimal>,
        net_savings: Option<Decimal>,
        budget_used_percentage: Option<Decimal>,
    ) -> Self {
        Self {
            total_income: total_income.map(Amount::new),
            total_expense: total_expense.map(Amount::new),
            net_savings: net_savings.map(Amount::new),
            budget_used_percentage: budget_used_percentage.map(Amount::new),
        }
    }

    pub fn total_income(&self) -> Option<Decimal> {
        self.total_income.map(|a| a.value())
    }

    pub fn total_expense(&self) -> Option<Decimal> {
        self.total_expense.map(|a| a.value())
    }

    pub fn net_savings(&self) -> Option<Decimal> {
        self.net_savings.map(|a| a.value())
    }

    pub fn budget_used_percentage(&self) -> Option<Decimal> {
        self.budget_used_percentage.map(|a| a.value())
    }
}

/// The four headline numbers shown to the user.
///
/// `net_savings` is always exactly `total_income - total_expense`; it is the only field that may be
/// negative.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct KpiSnapshot {
    total_income: Decimal,
    total_expense: Decimal,
    net_savings: Decimal,
    budget_used_percentage: Decimal,
}

impl KpiSnapshot {
    pub(crate) fn new(
        total_income: Decimal,
        total_expense: Decimal,
        budget_used_percentage: Decimal,
    ) -> Self {
        Self {
            total_income,
            total_expense,
            net_savings: saturating_sub(total_income, total_expense),
            budget_used_percentage,
        }
    }

    pub fn total_income(&self) -> Decimal {
        self.total_income
    }

    pub fn total_expense(&self) -> Decimal {
        self.total_expense
    }

    pub fn net_savings(&self) -> Decimal {
        self.net_savings
    }

    pub fn budget_used_percentage(&self) -> Decimal {
        self.budget_used_percentage
    }
}
