//! Implements the `Backend` trait with in-memory data for testing purposes.
//!
//! This is compiled into the production binary too so that the whole app can be run top-to-bottom
//! without a backend server. Set `FINBOARD_IN_TEST_MODE` to use it.

use crate::api::{validate_import_file, Backend, WriteAck};
use crate::engine::{self, match_category};
use crate::model::de::parse_date;
use crate::model::{
    saturating_add, saturating_sub, Amount, Budget, BudgetPeriod, Category, KpiBlock, NewBudget,
    NewTransaction, Period, PeriodBucketMap, PeriodSnapshot, Transaction, TransactionType,
};
use crate::{utils, Result};
use anyhow::{bail, Context};
use chrono::{Datelike, Local, NaiveDate};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// A `Backend` holding one snapshot in memory. Writes update the snapshot the way the real
/// backend's aggregation would, so a refresh after a write shows its effect.
pub(crate) struct TestBackend {
    snapshot: PeriodSnapshot,
    categories: Vec<Category>,
    /// Every transaction written since the backend was created.
    transactions: Vec<Transaction>,
    today: NaiveDate,
    unavailable: bool,
}

impl TestBackend {
    pub(crate) fn new(snapshot: PeriodSnapshot, categories: Vec<Category>) -> Self {
        Self {
            snapshot,
            categories,
            transactions: Vec::new(),
            today: Local::now().date_naive(),
            unavailable: false,
        }
    }

    /// A backend whose every call fails, as if the server were down.
    #[cfg(test)]
    pub(crate) fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new(PeriodSnapshot::default(), Vec::new())
        }
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> &PeriodSnapshot {
        &self.snapshot
    }

    #[cfg(test)]
    pub(crate) fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            bail!("The test backend is unavailable")
        }
        Ok(())
    }

    /// The periods whose buckets include `date`: the current month and the current year.
    fn periods_of(&self, date: NaiveDate) -> Vec<Period> {
        let mut periods = Vec::new();
        if date.year() == self.today.year() {
            if date.month() == self.today.month() {
                periods.push(Period::Monthly);
            }
            periods.push(Period::Yearly);
        }
        periods
    }

    /// Stores `transaction` and adds it to the expense or income buckets of every period it falls
    /// in. Expenses are keyed by category, income by its description.
    fn record(&mut self, transaction: Transaction) {
        let label = match transaction.kind() {
            TransactionType::Expense => match transaction.category().trim() {
                "" => "Miscellaneous",
                category => category,
            },
            TransactionType::Income => match transaction.description().trim() {
                "" => "Income",
                source => source,
            },
        }
        .to_string();
        let periods = self.periods_of(transaction.date());
        if periods.is_empty() {
            debug!(
                "{} on {} is outside the current year",
                transaction.kind(),
                transaction.date()
            );
        }
        for period in periods {
            let view = self.snapshot.view_mut(period);
            let map = match transaction.kind() {
                TransactionType::Expense => view.expenses_mut(),
                TransactionType::Income => view.income_mut(),
            };
            add_to_bucket(map, &label, transaction.amount());
        }
        self.transactions.push(transaction);
    }

    /// Recomputes the KPI block from the monthly view, the way the backend reports it.
    fn recompute_kpis(&mut self) {
        let view = self.snapshot.view(Period::Monthly);
        let income = engine::aggregate(view.income()).total();
        let expense = engine::aggregate(view.expenses()).total();
        let used = engine::budget_used(expense, view.budget());
        *self.snapshot.kpis_mut() = KpiBlock::new(
            Some(income),
            Some(expense),
            Some(saturating_sub(income, expense)),
            Some(used),
        );
    }
}

impl Default for TestBackend {
    /// Loads the seed data from this module.
    fn default() -> Self {
        let snapshot = serde_json::from_str(SNAPSHOT_DATA).unwrap_or_default();
        let categories = serde_json::from_str(CATEGORY_DATA).unwrap_or_default();
        Self::new(snapshot, categories)
    }
}

#[async_trait::async_trait]
impl Backend for TestBackend {
    async fn fetch_snapshot(&mut self) -> Result<PeriodSnapshot> {
        self.check_available()?;
        Ok(self.snapshot.clone())
    }

    async fn fetch_categories(&mut self) -> Result<Vec<Category>> {
        self.check_available()?;
        Ok(self.categories.clone())
    }

    async fn create_transaction(&mut self, transaction: &NewTransaction) -> Result<WriteAck> {
        self.check_available()?;
        self.record(Transaction::from_request(transaction, self.today));
        self.recompute_kpis();
        Ok(WriteAck::new("Transaction added"))
    }

    async fn create_budget(&mut self, budget: &NewBudget) -> Result<WriteAck> {
        self.check_available()?;
        let period = match budget.period() {
            BudgetPeriod::Yearly => Period::Yearly,
            _ => Period::Monthly,
        };
        self.snapshot
            .view_mut(period)
            .budget_mut()
            .push(Budget::from(budget));
        self.recompute_kpis();
        Ok(WriteAck::new("Budget created"))
    }

    async fn import_file(&mut self, path: &Path) -> Result<WriteAck> {
        self.check_available()?;
        validate_import_file(path)?;
        let is_csv = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv {
            bail!("The test backend can only import CSV files")
        }
        let data = utils::read(path).await?;
        let rows = parse_csv(&data).with_context(|| format!("Unable to parse {}", path.display()))?;
        let count = rows.len();
        for row in rows {
            let transaction = row.into_transaction(self.today);
            self.record(transaction);
        }
        self.recompute_kpis();
        debug!("Imported {count} rows from {}", path.display());
        Ok(WriteAck::new(format!("Imported {count} transactions")))
    }
}

/// Adds `amount` to the bucket whose label matches `label` case-insensitively, or appends a new
/// bucket.
fn add_to_bucket(map: &mut PeriodBucketMap, label: &str, amount: Amount) {
    let labels: Vec<String> = map.labels().map(str::to_string).collect();
    let existing = match_category(label, &labels).map(str::to_string);
    let key = existing.unwrap_or_else(|| label.to_string());
    let current = map.get(&key).unwrap_or_default();
    map.insert(key, saturating_add(current, amount.value()));
}

/// One row of an imported bank export. A negative amount is an expense, anything else is income.
#[derive(Debug, Deserialize)]
struct ImportRow {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    amount: Amount,
}

impl ImportRow {
    /// The transaction this row describes. A row without a readable date is dated `today`.
    fn into_transaction(self, today: NaiveDate) -> Transaction {
        let text = |s: Option<String>| {
            s.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty() && s != "None")
        };
        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => today,
            Some(s) => parse_date(s).unwrap_or_else(|| {
                warn!("Unable to parse the import date '{s}', using {today}");
                today
            }),
        };
        let amount = Amount::new(self.amount.value().abs());
        if self.amount.is_negative() {
            let category = text(self.category)
                .map(|c| title_case(&c))
                .unwrap_or_else(|| "Miscellaneous".to_string());
            let description = text(self.description);
            Transaction::new(TransactionType::Expense, amount, Some(category), description, date)
        } else {
            let source = text(self.description).unwrap_or_else(|| "Income".to_string());
            Transaction::new(TransactionType::Income, amount, None, Some(source), date)
        }
    }
}

fn parse_csv(data: &str) -> Result<Vec<ImportRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: ImportRow = result?;
        rows.push(row);
    }
    Ok(rows)
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Seed dashboard snapshot.
const SNAPSHOT_DATA: &str = r#"{
    "monthly": {
        "expenses": {"Food": "4250.00", "Transport": "1200.00", "Bills": "3100.50", "Entertainment": "899.00"},
        "income": {"Salary": "65000.00", "Freelance": "8000.00"},
        "budget": [
            {"category": "Food", "limit_amount": "5000.00", "period": "MONTHLY", "start_date": "2025-10-01", "end_date": "2025-10-31", "is_active": true},
            {"category": "transport", "limit_amount": "1000.00", "period": "MONTHLY", "start_date": "2025-10-01", "end_date": "2025-10-31", "is_active": true},
            {"category": "Health", "limit_amount": "2000.00", "period": "MONTHLY", "start_date": "2025-10-01", "end_date": "2025-10-31", "is_active": false}
        ]
    },
    "yearly": {
        "expenses": {"Food": "48210.75", "Transport": "13480.00", "Bills": "36990.00", "Entertainment": "9120.00", "Health": "5400.00"},
        "income": {"Salary": "780000.00", "Freelance": "52000.00", "Interest": "3150.25"},
        "budget": [
            {"category": "Food", "limit_amount": "60000.00", "period": "YEARLY", "start_date": "2025-01-01", "end_date": "2025-12-31", "is_active": true}
        ]
    },
    "kpis": {
        "total_income": "73000.00",
        "total_expense": "9449.50",
        "net_savings": "63550.50",
        "budget_used_percentage": "157.49"
    }
}"#;

/// Seed category list.
const CATEGORY_DATA: &str = r#"[
    {"name": "Food"},
    {"name": "Transport"},
    {"name": "Bills"},
    {"name": "Shopping"},
    {"name": "Travel"}
]"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_seed_data_parses() {
        let snapshot: PeriodSnapshot = serde_json::from_str(SNAPSHOT_DATA).unwrap();
        let categories: Vec<Category> = serde_json::from_str(CATEGORY_DATA).unwrap();
        assert_eq!(snapshot.view(Period::Monthly).expenses().len(), 4);
        assert_eq!(snapshot.view(Period::Yearly).budget().len(), 1);
        assert_eq!(categories.len(), 5);
    }

    #[test]
    fn test_budget_used_counts_all_spending() {
        let mut backend = TestBackend::default();
        backend.recompute_kpis();
        // 9449.50 / (5000 + 1000), the inactive Health budget excluded
        assert_eq!(
            backend.snapshot().kpis().budget_used_percentage(),
            Some(dec("157.49"))
        );
    }

    #[tokio::test]
    async fn test_expense_is_recorded_as_transaction() {
        let mut backend = TestBackend::default();
        let tx = NewTransaction::expense(Amount::new(dec("50")), "Food", "lunch").unwrap();
        backend.create_transaction(&tx).await.unwrap();
        let recorded = &backend.transactions()[0];
        assert_eq!(recorded.kind(), TransactionType::Expense);
        assert_eq!(recorded.description(), "lunch");
        assert_eq!(recorded.date(), backend.today);
    }

    #[test]
    fn test_seed_kpis_match_seed_buckets() {
        let mut backend = TestBackend::default();
        let seeded = backend.snapshot().kpis().clone();
        backend.recompute_kpis();
        let recomputed = backend.snapshot().kpis();
        assert_eq!(recomputed.total_income(), seeded.total_income());
        assert_eq!(recomputed.total_expense(), seeded.total_expense());
        assert_eq!(recomputed.net_savings(), seeded.net_savings());
        assert_eq!(
            recomputed.budget_used_percentage(),
            seeded.budget_used_percentage()
        );
    }

    #[tokio::test]
    async fn test_expense_updates_matching_bucket() {
        let mut backend = TestBackend::default();
        let tx = NewTransaction::expense(Amount::new(dec("50")), "food", "lunch").unwrap();
        backend.create_transaction(&tx).await.unwrap();
        let snapshot = backend.fetch_snapshot().await.unwrap();
        let monthly = snapshot.view(Period::Monthly).expenses();
        assert_eq!(monthly.get("Food"), Some(dec("4300.00")));
        assert_eq!(monthly.get("food"), None);
        assert_eq!(snapshot.kpis().total_expense(), Some(dec("9499.50")));
    }

    #[tokio::test]
    async fn test_income_keyed_by_source() {
        let mut backend = TestBackend::default();
        let tx = NewTransaction::income(Amount::new(dec("1500")), "Gift").unwrap();
        backend.create_transaction(&tx).await.unwrap();
        let snapshot = backend.fetch_snapshot().await.unwrap();
        assert_eq!(
            snapshot.view(Period::Yearly).income().get("Gift"),
            Some(dec("1500"))
        );
        assert_eq!(snapshot.kpis().net_savings(), Some(dec("65050.50")));
    }

    #[tokio::test]
    async fn test_yearly_budget_goes_to_yearly_view() {
        let mut backend = TestBackend::default();
        let budget = NewBudget::new(
            "Bills",
            Amount::new(dec("40000")),
            BudgetPeriod::Yearly,
            chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        )
        .unwrap();
        backend.create_budget(&budget).await.unwrap();
        let snapshot = backend.fetch_snapshot().await.unwrap();
        assert_eq!(snapshot.view(Period::Yearly).budget().len(), 2);
        assert_eq!(snapshot.view(Period::Monthly).budget().len(), 3);
    }

    #[tokio::test]
    async fn test_import_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bank.csv");
        let mut backend = TestBackend::default();
        let today = backend.today;
        let data = format!(
            "date,description,category,amount\n\
             {today},Cafe,coffee shops,-120.50\n\
             {today}T10:00:00Z,Refund,None,300\n\
             ,ATM,,-200\n"
        );
        std::fs::write(&path, data).unwrap();

        let ack = backend.import_file(&path).await.unwrap();
        assert_eq!(ack.message(), Some("Imported 3 transactions"));
        assert_eq!(backend.transactions().len(), 3);
        assert!(backend.transactions().iter().all(|t| t.date() == today));

        let snapshot = backend.fetch_snapshot().await.unwrap();
        let expenses = snapshot.view(Period::Monthly).expenses();
        assert_eq!(expenses.get("Coffee Shops"), Some(dec("120.50")));
        assert_eq!(expenses.get("Miscellaneous"), Some(dec("200")));
        assert_eq!(
            snapshot.view(Period::Monthly).income().get("Refund"),
            Some(dec("300"))
        );
    }

    #[tokio::test]
    async fn test_import_buckets_by_date() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bank.csv");
        let mut backend = TestBackend::default();
        let today = backend.today;
        let earlier_this_year = if today.month() == 1 {
            None
        } else {
            NaiveDate::from_ymd_opt(today.year(), 1, 15)
        };
        let mut data = String::from("date,description,category,amount\n");
        data.push_str("1999-06-01,Old,Travel,-50\n");
        if let Some(date) = earlier_this_year {
            data.push_str(&format!("{date},Trip,Travel,-70\n"));
        }
        std::fs::write(&path, data).unwrap();

        backend.import_file(&path).await.unwrap();
        let snapshot = backend.fetch_snapshot().await.unwrap();
        assert_eq!(snapshot.view(Period::Monthly).expenses().get("Travel"), None);
        let yearly = snapshot.view(Period::Yearly).expenses().get("Travel");
        assert_eq!(yearly, earlier_this_year.map(|_| dec("70")));
    }

    #[tokio::test]
    async fn test_import_rejects_spreadsheets() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bank.xlsx");
        std::fs::write(&path, [0u8, 1, 2]).unwrap();
        let mut backend = TestBackend::default();
        assert!(backend.import_file(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_unavailable() {
        let mut backend = TestBackend::unavailable();
        assert!(backend.fetch_snapshot().await.is_err());
        assert!(backend.fetch_categories().await.is_err());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("coffee SHOPS"), "Coffee Shops");
        assert_eq!(title_case(""), "");
    }
}
