//! Add command handlers. Each one validates the input, sends it to the backend and refreshes the
//! snapshot so that the returned KPIs include the new record.

use crate::api::Mode;
use crate::args::{BudgetArgs, ExpenseArgs, IncomeArgs};
use crate::commands::{loader, money, Out};
use crate::error::{ErrorType, IntoResult};
use crate::loader::SnapshotLoader;
use crate::model::{KpiSnapshot, NewBudget, NewTransaction};
use crate::{Config, Result};

/// Records an expense. The category is required and is trimmed before sending.
pub async fn add_expense(config: Config, mode: Mode, args: &ExpenseArgs) -> Result<Out<KpiSnapshot>> {
    let tx = NewTransaction::expense(args.amount(), args.category(), args.description())
        .pub_result(ErrorType::Validation)?;
    let mut loader = loader(&config, mode, config.default_period()).await?;
    loader
        .add_transaction(&tx)
        .await
        .pub_result(ErrorType::Request)?;
    let what = format!(
        "Added an expense of {} in {}",
        money(&config, args.amount().value()),
        args.category().trim()
    );
    refreshed(&config, &loader, what)
}

/// Records income. Income never has a category.
pub async fn add_income(config: Config, mode: Mode, args: &IncomeArgs) -> Result<Out<KpiSnapshot>> {
    let tx = NewTransaction::income(args.amount(), args.source())
        .pub_result(ErrorType::Validation)?;
    let mut loader = loader(&config, mode, config.default_period()).await?;
    loader
        .add_transaction(&tx)
        .await
        .pub_result(ErrorType::Request)?;
    let what = format!("Added income of {}", money(&config, args.amount().value()));
    refreshed(&config, &loader, what)
}

/// Creates an active budget for a category and date range.
pub async fn add_budget(config: Config, mode: Mode, args: &BudgetArgs) -> Result<Out<KpiSnapshot>> {
    let budget = NewBudget::new(
        args.category(),
        args.limit(),
        args.period(),
        args.start(),
        args.end(),
    )
    .pub_result(ErrorType::Validation)?;
    let mut loader = loader(&config, mode, config.default_period()).await?;
    loader
        .add_budget(&budget)
        .await
        .pub_result(ErrorType::Request)?;
    let what = format!(
        "Added a {} budget of {} for {}",
        budget.period().to_string().to_lowercase(),
        money(&config, budget.limit_amount().value()),
        budget.category()
    );
    refreshed(&config, &loader, what)
}

/// Reports `what` along with the KPIs from the refreshed snapshot.
fn refreshed(config: &Config, loader: &SnapshotLoader, what: String) -> Result<Out<KpiSnapshot>> {
    let Some(dashboard) = loader.dashboard() else {
        return Ok(what.into());
    };
    let kpis = *dashboard.view().kpis();
    let message = format!(
        "{what}. {} net savings is now {}",
        dashboard.period(),
        money(config, kpis.net_savings())
    );
    Ok(Out::new(message, kpis))
}
