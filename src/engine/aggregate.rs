//! Totals and per-bucket series derived from a period's bucket maps.

use crate::engine::matcher::{canonical, CategoryIndex};
use crate::model::{saturating_sub, saturating_sum, PeriodBucketMap, PeriodView};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

/// A bucket map flattened into parallel label and value sequences, plus their sum.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct Aggregate {
    labels: Vec<String>,
    values: Vec<Decimal>,
    total: Decimal,
}

impl Aggregate {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[Decimal] {
        &self.values
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Flattens `map` in its insertion order and sums it. Values were coerced to decimals at
/// deserialization and the sum saturates, so this cannot fail.
pub fn aggregate(map: &PeriodBucketMap) -> Aggregate {
    let mut labels = Vec::with_capacity(map.len());
    let mut values = Vec::with_capacity(map.len());
    for (label, value) in map.iter() {
        labels.push(label.to_string());
        values.push(value);
    }
    let total = saturating_sum(values.iter().copied());
    Aggregate {
        labels,
        values,
        total,
    }
}

/// Income, expense and savings aligned on one set of labels.
///
/// Labels are the union of both maps' categories: expense labels in their order, then any income
/// labels not already present. Each side is looked up by canonical label and a missing side counts
/// as zero, so the two maps may have different label sets or orders.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct MergedSeries {
    labels: Vec<String>,
    income: Vec<Decimal>,
    expenses: Vec<Decimal>,
    savings: Vec<Decimal>,
}

impl MergedSeries {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn income(&self) -> &[Decimal] {
        &self.income
    }

    pub fn expenses(&self) -> &[Decimal] {
        &self.expenses
    }

    /// `income[i] - expenses[i]` for every label.
    pub fn savings(&self) -> &[Decimal] {
        &self.savings
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Aligns `expenses` and `income` by label and derives the savings series.
pub fn merge(expenses: &PeriodBucketMap, income: &PeriodBucketMap) -> MergedSeries {
    let expense_index = CategoryIndex::new(expenses);
    let income_index = CategoryIndex::new(income);

    let mut seen = HashSet::new();
    let mut merged = MergedSeries::default();
    for label in expenses.labels().chain(income.labels()) {
        if !seen.insert(canonical(label)) {
            continue;
        }
        let spent = expense_index.amount_or_zero(label);
        let earned = income_index.amount_or_zero(label);
        merged.labels.push(label.to_string());
        merged.expenses.push(spent);
        merged.income.push(earned);
        merged.savings.push(saturating_sub(earned, spent));
    }
    merged
}

/// The locally recomputed totals for one period view.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub struct DerivedTotals {
    total_income: Decimal,
    total_expense: Decimal,
    active_budgets: usize,
}

impl DerivedTotals {
    pub fn new(total_income: Decimal, total_expense: Decimal, active_budgets: usize) -> Self {
        Self {
            total_income,
            total_expense,
            active_budgets,
        }
    }

    /// Sums both maps of `view` and counts its active budgets.
    pub fn from_view(view: &PeriodView) -> Self {
        Self::new(
            aggregate(view.income()).total(),
            aggregate(view.expenses()).total(),
            view.budget().iter().filter(|b| b.is_active()).count(),
        )
    }

    pub fn total_income(&self) -> Decimal {
        self.total_income
    }

    pub fn total_expense(&self) -> Decimal {
        self.total_expense
    }

    pub fn net_savings(&self) -> Decimal {
        saturating_sub(self.total_income, self.total_expense)
    }

    pub fn active_budgets(&self) -> usize {
        self.active_budgets
    }

    /// Whether there is anything to show for this period.
    pub fn has_data(&self) -> bool {
        !self.total_income.is_zero() || !self.total_expense.is_zero()
    }
}
