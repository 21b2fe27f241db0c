use crate::model::de::date_or_datetime;
use crate::model::Amount;
use crate::Result;
use anyhow::{bail, ensure};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether money came in or went out.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    #[default]
    Expense,
    Income,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// A single transaction as the backend stores it. The engine never mutates these; they only reach
/// it already summed into a `PeriodBucketMap`. The date may arrive as `2025-10-20` or as a
/// timestamp, and only the calendar date is kept.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    #[serde(rename = "transaction_type")]
    kind: TransactionType,
    amount: Amount,
    /// Only expenses carry a category, and even then it may be empty.
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(deserialize_with = "date_or_datetime")]
    date: NaiveDate,
}

impl Transaction {
    pub(crate) fn new(
        kind: TransactionType,
        amount: Amount,
        category: Option<String>,
        description: Option<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind,
            amount,
            category,
            description,
            date,
        }
    }

    /// The transaction the backend would store for `request` on `date`.
    pub(crate) fn from_request(request: &NewTransaction, date: NaiveDate) -> Self {
        let description = Some(request.description().to_string()).filter(|d| !d.is_empty());
        Self::new(
            request.transaction_type(),
            request.amount(),
            request.category().map(str::to_string),
            description,
            date,
        )
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// The category label, or an empty string for income and uncategorized expenses.
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// The request body for creating a transaction through the backend.
///
/// Expenses must name a category and income must not; the backend rejects both mistakes, so they
/// are caught here before any request is sent.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct NewTransaction {
    transaction_type: TransactionType,
    amount: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    description: String,
}

impl NewTransaction {
    /// An expense of `amount` in `category`. The category is trimmed.
    pub fn expense(
        amount: Amount,
        category: impl AsRef<str>,
        description: impl Into<String>,
    ) -> Result<Self> {
        let category = category.as_ref().trim();
        if category.is_empty() {
            bail!("Please enter a category for your expense")
        }
        let tx = Self {
            transaction_type: TransactionType::Expense,
            amount,
            category: Some(category.to_string()),
            description: description.into(),
        };
        tx.validate()?;
        Ok(tx)
    }

    /// Income of `amount`, described by its `source`.
    pub fn income(amount: Amount, source: impl Into<String>) -> Result<Self> {
        let tx = Self {
            transaction_type: TransactionType::Income,
            amount,
            category: None,
            description: source.into(),
        };
        tx.validate()?;
        Ok(tx)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.amount.is_positive(),
            "The amount must be greater than zero, got {}",
            self.amount
        );
        match self.transaction_type {
            TransactionType::Expense => ensure!(
                self.category.is_some(),
                "Expense transactions must have a category"
            ),
            TransactionType::Income => ensure!(
                self.category.is_none(),
                "Income transactions should not have a category"
            ),
        }
        Ok(())
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_deserialize_backend_transaction() {
        let json = r#"{
            "id": 7,
            "user": 1,
            "transaction_type": "EXPENSE",
            "amount": "42.50",
            "category": "Food",
            "description": null,
            "date": "2025-10-20"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind(), TransactionType::Expense);
        assert_eq!(tx.amount().value(), Decimal::from_str("42.50").unwrap());
        assert_eq!(tx.category(), "Food");
        assert_eq!(tx.description(), "");
    }

    #[test]
    fn test_income_has_empty_category() {
        let json = r#"{"transaction_type": "INCOME", "amount": 500, "date": "2025-10-01T09:30:00Z"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind(), TransactionType::Income);
        assert_eq!(tx.category(), "");
        assert_eq!(tx.date(), NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
    }

    #[test]
    fn test_new_expense_trims_category() {
        let tx = NewTransaction::expense(amount("12.00"), "  Food ", "lunch").unwrap();
        assert_eq!(tx.category(), Some("Food"));
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["transaction_type"], "EXPENSE");
        assert_eq!(json["category"], "Food");
    }

    #[test]
    fn test_new_expense_requires_category() {
        let err = NewTransaction::expense(amount("12.00"), "   ", "").unwrap_err();
        assert!(err.to_string().contains("category"));
    }

    #[test]
    fn test_new_income_omits_category() {
        let tx = NewTransaction::income(amount("500"), "Salary").unwrap();
        let json = serde_json::to_value(&tx).unwrap();
        assert!(json.get("category").is_none());
        assert_eq!(json["description"], "Salary");
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        assert!(NewTransaction::income(amount("0"), "Salary").is_err());
        assert!(NewTransaction::expense(amount("-3"), "Food", "").is_err());
    }

    #[test]
    fn test_transaction_type_display() {
        assert_eq!(TransactionType::Income.to_string(), "INCOME");
        assert_eq!(
            TransactionType::from_str("EXPENSE").unwrap(),
            TransactionType::Expense
        );
    }

    #[test]
    fn test_from_request_drops_empty_description() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 5).unwrap();
        let tx = Transaction::from_request(
            &NewTransaction::expense(amount("12.00"), "Food", "").unwrap(),
            date,
        );
        assert_eq!(tx.kind(), TransactionType::Expense);
        assert_eq!(tx.category(), "Food");
        assert_eq!(tx.description(), "");
        assert_eq!(tx.date(), date);
    }

    #[test]
    fn test_bad_date_rejected() {
        let json = r#"{"transaction_type": "INCOME", "amount": 5, "date": "yesterday"}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }
}
