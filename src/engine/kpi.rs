//! Assembles the headline KPI record from the backend's KPI block.

use crate::engine::aggregate::DerivedTotals;
use crate::model::{saturating_sub, KpiBlock, KpiSnapshot};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Projects the backend KPI block into a complete `KpiSnapshot`.
///
/// Backend values win when present and a missing field is zero. Local totals are never substituted
/// for a missing backend field; they are only compared against it for logging. `net_savings` is
/// always recomputed from the projected totals so that it equals `total_income - total_expense`.
/// `budget_used_percentage` is zero when the period has no active budget, may exceed 100, and is
/// floored at zero.
pub fn project(kpis: &KpiBlock, derived: &DerivedTotals) -> KpiSnapshot {
    let total_income = kpis.total_income().unwrap_or_default();
    let total_expense = kpis.total_expense().unwrap_or_default();

    if let Some(backend) = kpis.net_savings() {
        let expected = saturating_sub(total_income, total_expense);
        if backend != expected {
            warn!(
                "Backend net_savings {backend} disagrees with total_income - total_expense \
                ({expected}), using {expected}"
            );
        }
    }
    if kpis.total_income().is_some() && total_income != derived.total_income() {
        debug!(
            "Backend total_income {total_income} differs from the period's buckets ({})",
            derived.total_income()
        );
    }
    if kpis.total_expense().is_some() && total_expense != derived.total_expense() {
        debug!(
            "Backend total_expense {total_expense} differs from the period's buckets ({})",
            derived.total_expense()
        );
    }

    let budget_used = if derived.active_budgets() == 0 {
        Decimal::ZERO
    } else {
        let used = kpis.budget_used_percentage().unwrap_or_default();
        if used.is_sign_negative() && !used.is_zero() {
            warn!("Backend reported a negative budget_used_percentage ({used}), using 0");
            Decimal::ZERO
        } else {
            used
        }
    };

    KpiSnapshot::new(total_income, total_expense, budget_used)
}
