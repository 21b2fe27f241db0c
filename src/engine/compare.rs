//! Pairs each budget with the actual spending in its category.

use crate::engine::matcher::CategoryIndex;
use crate::model::{saturating_add, saturating_sum, Budget, PeriodBucketMap};
use rust_decimal::Decimal;
use serde::Serialize;

/// One budget-vs-actual pairing.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparatorRow {
    category: String,
    limit_amount: Decimal,
    actual_expense: Decimal,
    /// `actual / limit` as a percentage, rounded to two places. Zero when the limit is zero.
    utilization: Decimal,
    is_active: bool,
}

impl ComparatorRow {
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn limit_amount(&self) -> Decimal {
        self.limit_amount
    }

    pub fn actual_expense(&self) -> Decimal {
        self.actual_expense
    }

    pub fn utilization(&self) -> Decimal {
        self.utilization
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

/// The comparator rows for a period, in budget input order.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct BudgetComparison {
    rows: Vec<ComparatorRow>,
}

impl BudgetComparison {
    pub fn rows(&self) -> &[ComparatorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_active_budget(&self) -> bool {
        self.rows.iter().any(ComparatorRow::is_active)
    }

    /// Matched spending over limits across active rows, as a percentage rounded to two places.
    /// Zero when there is no active limit to divide by. This only counts spending in budgeted
    /// categories, so it is informational and is never used for `budget_used_percentage`.
    pub fn utilization(&self) -> Decimal {
        let (actual, limit) = self
            .rows
            .iter()
            .filter(|r| r.is_active)
            .fold((Decimal::ZERO, Decimal::ZERO), |(a, l), r| {
                (saturating_add(a, r.actual_expense), saturating_add(l, r.limit_amount))
            });
        percentage(actual, limit)
    }
}

/// Builds one row per budget, in budget order. Budgets sharing a category each get their own row.
/// A budget with no matching expense category gets an actual expense of zero.
pub fn compare(budgets: &[Budget], expenses: &PeriodBucketMap) -> BudgetComparison {
    let index = CategoryIndex::new(expenses);
    let rows = budgets
        .iter()
        .map(|budget| {
            let limit_amount = budget.limit_amount().value();
            let actual_expense = index.amount_or_zero(budget.category());
            ComparatorRow {
                category: budget.category().to_string(),
                limit_amount,
                actual_expense,
                utilization: percentage(actual_expense, limit_amount),
                is_active: budget.is_active(),
            }
        })
        .collect();
    BudgetComparison { rows }
}

/// The backend's `budget_used_percentage`: all of the period's spending over the sum of active
/// limits, rounded to two places. Zero when no active budget has a limit.
pub fn budget_used(total_expense: Decimal, budgets: &[Budget]) -> Decimal {
    let limits = saturating_sum(
        budgets
            .iter()
            .filter(|b| b.is_active())
            .map(|b| b.limit_amount().value()),
    );
    percentage(total_expense, limits)
}

fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|p| p.round_dp(2))
        .unwrap_or_default()
}
