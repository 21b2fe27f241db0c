//! These structs provide the CLI interface for the finboard CLI.

use crate::engine::ChartKind;
use crate::model::{Amount, BudgetPeriod, Period};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// finboard: A command-line personal finance dashboard.
///
/// finboard fetches a pre-aggregated snapshot of your income, expenses and budgets from a finance
/// backend and derives the dashboard from it: headline KPIs, budget-versus-actual comparisons and
/// the labeled series behind each chart, for either the current month or the current year.
///
/// It can also add transactions and budgets and upload bank exports to the backend.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and the configuration file.
    ///
    /// This is the first command you should run. Pass the base URL of your finance backend as
    /// --api-url and, optionally, your access token as --token. By default the data directory is
    /// $HOME/finboard; pass --finboard-home to put it somewhere else.
    Init(InitArgs),
    /// Fetch the snapshot and show the KPIs, budget comparison and chart series for a period.
    Dashboard(DashboardArgs),
    /// List the categories you can use for expenses and budgets.
    Categories,
    /// Add an expense, an income or a budget.
    Add(AddArgs),
    /// Upload a CSV or Excel bank export for the backend to import.
    Import(ImportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where finboard configuration and secrets are held. Defaults to ~/finboard
    #[arg(long, env = "FINBOARD_HOME", default_value_t = default_finboard_home())]
    finboard_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, finboard_home: PathBuf) -> Self {
        Self {
            log_level,
            finboard_home: finboard_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn finboard_home(&self) -> &DisplayPath {
        &self.finboard_home
    }
}

/// (Not shown): Args for the `finboard init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the finance backend, e.g. https://finance.example.com/api/
    #[arg(long)]
    api_url: String,

    /// An access token for the backend. It is stored in the secrets directory.
    #[arg(long)]
    token: Option<String>,
}

impl InitArgs {
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// (Not shown): Args for the `finboard dashboard` command.
#[derive(Debug, Parser, Clone)]
pub struct DashboardArgs {
    /// The period to show. Defaults to `default_period` from the config file.
    #[arg(long)]
    period: Option<Period>,

    /// Only build these charts. May be repeated. Defaults to every chart.
    #[arg(long = "chart")]
    charts: Vec<ChartKind>,
}

impl DashboardArgs {
    pub fn new(period: Option<Period>, charts: Vec<ChartKind>) -> Self {
        Self { period, charts }
    }

    pub fn period(&self) -> Option<Period> {
        self.period
    }

    pub fn charts(&self) -> &[ChartKind] {
        &self.charts
    }
}

/// (Not shown): Args for the `finboard add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    #[command(subcommand)]
    entity: AddSubcommand,
}

impl AddArgs {
    pub fn new(entity: AddSubcommand) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &AddSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum AddSubcommand {
    /// Record money spent in a category.
    Expense(ExpenseArgs),
    /// Record money received.
    Income(IncomeArgs),
    /// Set a spending limit for a category over a date range.
    Budget(BudgetArgs),
}

/// (Not shown): Args for the `finboard add expense` command.
#[derive(Debug, Parser, Clone)]
pub struct ExpenseArgs {
    /// The amount spent, e.g. 250 or 1,250.50
    amount: Amount,

    /// The expense category, e.g. Food
    #[arg(long)]
    category: String,

    #[arg(long, default_value = "")]
    description: String,
}

impl ExpenseArgs {
    pub fn new(amount: Amount, category: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            amount,
            category: category.into(),
            description: description.into(),
        }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// (Not shown): Args for the `finboard add income` command.
#[derive(Debug, Parser, Clone)]
pub struct IncomeArgs {
    /// The amount received.
    amount: Amount,

    /// Where the money came from, e.g. Salary
    #[arg(long, default_value = "")]
    source: String,
}

impl IncomeArgs {
    pub fn new(amount: Amount, source: impl Into<String>) -> Self {
        Self {
            amount,
            source: source.into(),
        }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// (Not shown): Args for the `finboard add budget` command.
#[derive(Debug, Parser, Clone)]
pub struct BudgetArgs {
    /// The category the limit applies to.
    category: String,

    /// The spending limit.
    limit: Amount,

    #[arg(long, value_enum, default_value_t = BudgetPeriod::Monthly)]
    period: BudgetPeriod,

    /// First day of the budget, YYYY-MM-DD
    #[arg(long)]
    start: NaiveDate,

    /// Last day of the budget, YYYY-MM-DD. Must be after --start.
    #[arg(long)]
    end: NaiveDate,
}

impl BudgetArgs {
    pub fn new(
        category: impl Into<String>,
        limit: Amount,
        period: BudgetPeriod,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            category: category.into(),
            limit,
            period,
            start,
            end,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn limit(&self) -> Amount {
        self.limit
    }

    pub fn period(&self) -> BudgetPeriod {
        self.period
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// (Not shown): Args for the `finboard import` command.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// The .csv, .xlsx or .xls file to upload.
    file: PathBuf,
}

impl ImportArgs {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

fn default_finboard_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("finboard"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --finboard-home or FINBOARD_HOME instead of relying on the \
                default finboard home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("finboard")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["finboard", "--finboard-home", "/tmp/fb"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_dashboard_args() {
        let args = parse(&[
            "dashboard",
            "--period",
            "yearly",
            "--chart",
            "summary",
            "--chart",
            "budget-comparison",
        ]);
        match args.command() {
            Command::Dashboard(d) => {
                assert_eq!(d.period(), Some(Period::Yearly));
                assert_eq!(d.charts(), [ChartKind::Summary, ChartKind::BudgetComparison]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(args.common().finboard_home().path(), Path::new("/tmp/fb"));
    }

    #[test]
    fn test_add_expense_args() {
        let args = parse(&["add", "expense", "1,250.50", "--category", "Food"]);
        let Command::Add(add) = args.command() else {
            panic!("expected add")
        };
        let AddSubcommand::Expense(e) = add.entity() else {
            panic!("expected expense")
        };
        assert_eq!(e.amount().value(), Decimal::new(125050, 2));
        assert_eq!(e.category(), "Food");
        assert_eq!(e.description(), "");
    }

    #[test]
    fn test_add_budget_args() {
        let args = parse(&[
            "add", "budget", "Food", "5000", "--period", "yearly", "--start", "2025-01-01",
            "--end", "2025-12-31",
        ]);
        let Command::Add(add) = args.command() else {
            panic!("expected add")
        };
        let AddSubcommand::Budget(b) = add.entity() else {
            panic!("expected budget")
        };
        assert_eq!(b.period(), BudgetPeriod::Yearly);
        assert_eq!(b.start(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn test_budget_requires_dates() {
        let argv = ["finboard", "add", "budget", "Food", "5000"];
        assert!(Args::try_parse_from(argv).is_err());
    }
}
