//! Shapes engine outputs into plain labeled-values structures for chart rendering.

use crate::engine::aggregate::{Aggregate, DerivedTotals, MergedSeries};
use crate::engine::compare::BudgetComparison;
use crate::model::KpiSnapshot;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The charts the dashboard knows how to build.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Expense per category.
    ExpenseTrend,
    /// Income and expense per category.
    IncomeExpenseTrend,
    /// Income minus expense per category.
    SavingsTrend,
    /// Share of income, expenses and savings.
    Summary,
    /// Budget limit against actual expense per budget.
    BudgetComparison,
    /// Used against remaining budget percentage.
    BudgetUtilization,
}

serde_plain::derive_display_from_serialize!(ChartKind);
serde_plain::derive_fromstr_from_deserialize!(ChartKind);

impl ChartKind {
    /// Every chart, in dashboard order.
    pub const ALL: [ChartKind; 6] = [
        ChartKind::ExpenseTrend,
        ChartKind::IncomeExpenseTrend,
        ChartKind::SavingsTrend,
        ChartKind::Summary,
        ChartKind::BudgetComparison,
        ChartKind::BudgetUtilization,
    ];
}

/// One named sequence of values.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct Series {
    name: String,
    values: Vec<Decimal>,
}

impl Series {
    fn new(name: impl Into<String>, values: impl Into<Vec<Decimal>>) -> Self {
        Self {
            name: name.into(),
            values: values.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Decimal] {
        &self.values
    }
}

/// A chart's labels and series. Every series has one value per label. Built once and never
/// modified.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct DerivedSeries {
    kind: ChartKind,
    labels: Vec<String>,
    series: Vec<Series>,
}

impl DerivedSeries {
    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Looks up a series by name.
    pub fn get(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }
}

/// Everything the charts are built from for one period.
#[derive(Debug, Clone, Copy)]
pub struct SeriesInputs<'a> {
    pub expenses: &'a Aggregate,
    pub merged: &'a MergedSeries,
    pub totals: &'a DerivedTotals,
    pub comparison: &'a BudgetComparison,
    pub kpis: &'a KpiSnapshot,
}

/// Builds the chart `kind` from `inputs`. Pure: equal inputs give equal output.
pub fn build(kind: ChartKind, inputs: SeriesInputs<'_>) -> DerivedSeries {
    let (labels, series) = match kind {
        ChartKind::ExpenseTrend => (
            inputs.expenses.labels().to_vec(),
            vec![Series::new("Expenses", inputs.expenses.values())],
        ),
        ChartKind::IncomeExpenseTrend => (
            inputs.merged.labels().to_vec(),
            vec![
                Series::new("Income", inputs.merged.income()),
                Series::new("Expenses", inputs.merged.expenses()),
            ],
        ),
        ChartKind::SavingsTrend => (
            inputs.merged.labels().to_vec(),
            vec![Series::new("Savings", inputs.merged.savings())],
        ),
        ChartKind::Summary => (
            fixed_labels(&["Income", "Expenses", "Savings"]),
            vec![Series::new(
                "Summary",
                vec![
                    inputs.totals.total_income(),
                    inputs.totals.total_expense(),
                    inputs.totals.net_savings(),
                ],
            )],
        ),
        ChartKind::BudgetComparison => {
            let rows = inputs.comparison.rows();
            (
                rows.iter().map(|r| r.category().to_string()).collect(),
                vec![
                    Series::new(
                        "Budget",
                        rows.iter().map(|r| r.limit_amount()).collect::<Vec<_>>(),
                    ),
                    Series::new(
                        "Actual Expense",
                        rows.iter().map(|r| r.actual_expense()).collect::<Vec<_>>(),
                    ),
                ],
            )
        }
        ChartKind::BudgetUtilization => {
            let used = inputs.kpis.budget_used_percentage();
            let remaining = (Decimal::ONE_HUNDRED - used).max(Decimal::ZERO);
            (
                fixed_labels(&["Used", "Remaining"]),
                vec![Series::new("Budget Used", vec![used, remaining])],
            )
        }
    };
    DerivedSeries {
        kind,
        labels,
        series,
    }
}

fn fixed_labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::aggregate::{aggregate, merge};
    use crate::engine::compare::compare;
    use crate::model::{Budget, PeriodBucketMap};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    struct Fixture {
        expenses: Aggregate,
        merged: MergedSeries,
        totals: DerivedTotals,
        comparison: BudgetComparison,
        kpis: KpiSnapshot,
    }

    impl Fixture {
        fn new(used: &str) -> Self {
            let expenses: PeriodBucketMap = [("Food", dec("100")), ("Transport", dec("50"))]
                .into_iter()
                .collect();
            let income: PeriodBucketMap = [("Salary", dec("500"))].into_iter().collect();
            let budgets = vec![Budget::new("food", dec("80")), Budget::new("Rent", dec("300"))];
            Self {
                expenses: aggregate(&expenses),
                merged: merge(&expenses, &income),
                totals: DerivedTotals::new(dec("500"), dec("150"), 2),
                comparison: compare(&budgets, &expenses),
                kpis: KpiSnapshot::new(dec("500"), dec("150"), dec(used)),
            }
        }

        fn inputs(&self) -> SeriesInputs<'_> {
            SeriesInputs {
                expenses: &self.expenses,
                merged: &self.merged,
                totals: &self.totals,
                comparison: &self.comparison,
                kpis: &self.kpis,
            }
        }
    }

    #[test]
    fn test_every_series_matches_label_count() {
        let f = Fixture::new("37.5");
        for kind in ChartKind::ALL {
            let chart = build(kind, f.inputs());
            assert_eq!(chart.kind(), kind);
            for s in chart.series() {
                assert_eq!(s.values().len(), chart.labels().len(), "{kind} {}", s.name());
            }
        }
    }

    #[test]
    fn test_expense_trend() {
        let f = Fixture::new("0");
        let chart = build(ChartKind::ExpenseTrend, f.inputs());
        assert_eq!(chart.labels(), ["Food", "Transport"]);
        assert_eq!(chart.get("Expenses").unwrap().values(), [dec("100"), dec("50")]);
    }

    #[test]
    fn test_budget_comparison() {
        let f = Fixture::new("0");
        let chart = build(ChartKind::BudgetComparison, f.inputs());
        assert_eq!(chart.labels(), ["food", "Rent"]);
        assert_eq!(chart.get("Budget").unwrap().values(), [dec("80"), dec("300")]);
        assert_eq!(
            chart.get("Actual Expense").unwrap().values(),
            [dec("100"), Decimal::ZERO]
        );
    }

    #[test]
    fn test_summary() {
        let f = Fixture::new("0");
        let chart = build(ChartKind::Summary, f.inputs());
        assert_eq!(chart.labels(), ["Income", "Expenses", "Savings"]);
        assert_eq!(
            chart.series()[0].values(),
            [dec("500"), dec("150"), dec("350")]
        );
    }

    #[test]
    fn test_utilization_remaining_floors_at_zero() {
        let f = Fixture::new("125");
        let chart = build(ChartKind::BudgetUtilization, f.inputs());
        assert_eq!(chart.series()[0].values(), [dec("125"), Decimal::ZERO]);

        let f = Fixture::new("37.5");
        let chart = build(ChartKind::BudgetUtilization, f.inputs());
        assert_eq!(chart.series()[0].values(), [dec("37.5"), dec("62.5")]);
    }

    #[test]
    fn test_build_is_repeatable() {
        let f = Fixture::new("12");
        for kind in ChartKind::ALL {
            assert_eq!(build(kind, f.inputs()), build(kind, f.inputs()));
        }
    }

    #[test]
    fn test_chart_kind_names() {
        assert_eq!(ChartKind::SavingsTrend.to_string(), "savings_trend");
        assert_eq!(
            ChartKind::from_str("budget_comparison").unwrap(),
            ChartKind::BudgetComparison
        );
    }
}
