use crate::api::Mode;
use crate::args::DashboardArgs;
use crate::commands::{loader, money, Out};
use crate::engine::{DashboardView, DerivedSeries};
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};

/// Fetches the snapshot and derives the dashboard for the requested period.
///
/// The message is a text rendering of the KPIs, the budget comparison and each chart's series; the
/// structured output is the whole `DashboardView`.
///
/// # Errors
/// - Returns an `Unavailable` error if the snapshot cannot be fetched. No partial dashboard is
///   produced in that case.
pub async fn dashboard(config: Config, mode: Mode, args: &DashboardArgs) -> Result<Out<DashboardView>> {
    let period = args.period().unwrap_or(config.default_period());
    let mut loader = loader(&config, mode, period).await?;
    loader.refresh().await.pub_result(ErrorType::Unavailable)?;
    let view = match loader.dashboard() {
        Some(dashboard) if args.charts().is_empty() => dashboard.view().clone(),
        Some(dashboard) => dashboard.view().only(args.charts()),
        None => anyhow::bail!("The snapshot was not loaded"),
    };
    Ok(Out::new(render(&config, &view), view))
}

fn render(config: &Config, view: &DashboardView) -> String {
    let kpis = view.kpis();
    let mut lines = vec![
        format!("Dashboard for the {} period", view.period()),
        format!("  Total income:  {}", money(config, kpis.total_income())),
        format!("  Total expense: {}", money(config, kpis.total_expense())),
        format!("  Net savings:   {}", money(config, kpis.net_savings())),
        format!("  Budget used:   {}%", kpis.budget_used_percentage()),
    ];

    if !view.has_data() {
        lines.push("No income or expenses recorded for this period".to_string());
    }

    if !view.comparison().is_empty() {
        lines.push("Budgets:".to_string());
        lines.extend(view.comparison().rows().iter().map(|row| {
            format!(
                "  {}: {} of {} ({}%){}",
                row.category(),
                money(config, row.actual_expense()),
                money(config, row.limit_amount()),
                row.utilization(),
                if row.is_active() { "" } else { " inactive" }
            )
        }));
    }

    for chart in view.charts() {
        chart_lines(&mut lines, chart);
    }
    lines.join("\n")
}

fn chart_lines(lines: &mut Vec<String>, chart: &DerivedSeries) {
    lines.push(format!("{}:", chart.kind()));
    if chart.labels().is_empty() {
        lines.push("  (empty)".to_string());
        return;
    }
    for series in chart.series() {
        let points: Vec<String> = chart
            .labels()
            .iter()
            .zip(series.values())
            .map(|(label, value)| format!("{label}={value}"))
            .collect();
        lines.push(format!("  {}: {}", series.name(), points.join(", ")));
    }
}
