//! The aggregation and KPI engine.
//!
//! Everything here is synchronous and infallible. A `Dashboard` holds one fetched
//! `PeriodSnapshot` and the selected `Period`; every selection change rebuilds a fresh
//! `DashboardView` from the snapshot rather than patching the previous one.

mod aggregate;
mod compare;
mod kpi;
mod matcher;
mod series;

pub use aggregate::{aggregate, merge, Aggregate, DerivedTotals, MergedSeries};
pub use compare::{budget_used, compare, BudgetComparison, ComparatorRow};
pub use kpi::project;
pub use matcher::{canonical, match_category, CategoryIndex};
pub use series::{build, ChartKind, DerivedSeries, Series, SeriesInputs};

use crate::model::{KpiSnapshot, Period, PeriodSnapshot};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, trace};

/// Everything the presentation layer needs for one period of one snapshot.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct DashboardView {
    period: Period,
    kpis: KpiSnapshot,
    totals: DerivedTotals,
    has_data: bool,
    comparison: BudgetComparison,
    charts: Vec<DerivedSeries>,
}

impl DashboardView {
    pub fn period(&self) -> Period {
        self.period
    }

    pub fn kpis(&self) -> &KpiSnapshot {
        &self.kpis
    }

    pub fn totals(&self) -> &DerivedTotals {
        &self.totals
    }

    pub fn has_data(&self) -> bool {
        self.has_data
    }

    pub fn comparison(&self) -> &BudgetComparison {
        &self.comparison
    }

    pub fn charts(&self) -> &[DerivedSeries] {
        &self.charts
    }

    pub fn chart(&self, kind: ChartKind) -> Option<&DerivedSeries> {
        self.charts.iter().find(|c| c.kind() == kind)
    }

    /// Returns a copy of this view holding only the charts in `kinds`, in dashboard order.
    pub fn only(&self, kinds: &[ChartKind]) -> Self {
        let mut view = self.clone();
        view.charts.retain(|c| kinds.contains(&c.kind()));
        view
    }
}

/// Runs the whole pipeline for `period` of `snapshot`: aggregate, compare, project, build charts.
pub fn render(snapshot: &PeriodSnapshot, period: Period) -> DashboardView {
    let view = snapshot.view(period);

    let expenses = aggregate(view.expenses());
    let income = aggregate(view.income());
    trace!(
        "{period}: {} expense buckets totalling {}, {} income buckets totalling {}",
        expenses.labels().len(),
        expenses.total(),
        income.labels().len(),
        income.total()
    );

    let totals = DerivedTotals::new(
        income.total(),
        expenses.total(),
        view.budget().iter().filter(|b| b.is_active()).count(),
    );
    let merged = merge(view.expenses(), view.income());
    let comparison = compare(view.budget(), view.expenses());
    let kpis = project(snapshot.kpis(), &totals);

    let inputs = SeriesInputs {
        expenses: &expenses,
        merged: &merged,
        totals: &totals,
        comparison: &comparison,
        kpis: &kpis,
    };
    let charts = ChartKind::ALL
        .iter()
        .map(|kind| build(*kind, inputs))
        .collect();

    DashboardView {
        period,
        kpis,
        totals,
        has_data: totals.has_data(),
        comparison,
        charts,
    }
}

/// A loaded snapshot plus the selected period.
///
/// The only state carried between calls is the period. The snapshot is shared read-only and is
/// never modified; a refresh builds a new `Dashboard`.
#[derive(Debug, Clone)]
pub struct Dashboard {
    snapshot: Arc<PeriodSnapshot>,
    period: Period,
    view: DashboardView,
}

impl Dashboard {
    pub fn new(snapshot: impl Into<Arc<PeriodSnapshot>>, period: Period) -> Self {
        let snapshot = snapshot.into();
        let view = render(&snapshot, period);
        Self {
            snapshot,
            period,
            view,
        }
    }

    pub fn snapshot(&self) -> &PeriodSnapshot {
        &self.snapshot
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    /// Selects `period` and recomputes every derived structure from the loaded snapshot. Always
    /// allowed, never fetches.
    pub fn set_period(&mut self, period: Period) -> &DashboardView {
        debug!("Switching period from {} to {period}", self.period);
        self.period = period;
        self.view = render(&self.snapshot, period);
        &self.view
    }

    /// Switches to the other period.
    pub fn toggle_period(&mut self) -> &DashboardView {
        self.set_period(self.period.toggled())
    }
}
