use crate::model::de::{lenient_budget_period, lenient_date, null_as_default, true_unless_false};
use crate::model::Amount;
use crate::Result;
use anyhow::{bail, ensure};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How often a budget limit resets.
#[derive(
    Debug,
    Default,
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
#[serde(rename_all = "UPPERCASE")]
pub enum BudgetPeriod {
    #[default]
    Monthly,
    Yearly,
    Weekly,
    Custom,
}

serde_plain::derive_display_from_serialize!(BudgetPeriod);
serde_plain::derive_fromstr_from_deserialize!(BudgetPeriod);

/// A spending limit for one category.
///
/// The snapshot's `budget` arrays only promise `category` and `limit_amount`, so every other field
/// has a default: budgets are active unless the backend says otherwise. A field in an unexpected
/// shape falls back to its default rather than failing the snapshot.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Budget {
    #[serde(default, deserialize_with = "null_as_default")]
    category: String,
    #[serde(default)]
    limit_amount: Amount,
    #[serde(default, deserialize_with = "lenient_budget_period")]
    period: BudgetPeriod,
    #[serde(default, deserialize_with = "lenient_date")]
    start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    end_date: Option<NaiveDate>,
    #[serde(default = "active_by_default", deserialize_with = "true_unless_false")]
    is_active: bool,
}

fn active_by_default() -> bool {
    true
}

impl Budget {
    /// Creates an active budget with no date range.
    pub fn new(category: impl Into<String>, limit_amount: impl Into<Amount>) -> Self {
        Self {
            category: category.into(),
            limit_amount: limit_amount.into(),
            period: BudgetPeriod::default(),
            start_date: None,
            end_date: None,
            is_active: true,
        }
    }

    /// Returns a copy of this budget with `is_active` set.
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn limit_amount(&self) -> Amount {
        self.limit_amount
    }

    pub fn period(&self) -> BudgetPeriod {
        self.period
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

/// The request body for creating a budget through the backend.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct NewBudget {
    category: String,
    limit_amount: Amount,
    period: BudgetPeriod,
    start_date: NaiveDate,
    end_date: NaiveDate,
    is_active: bool,
}

impl NewBudget {
    /// Validates and builds an active budget. The category is trimmed and must not be empty, the
    /// limit must be positive and `end_date` must come after `start_date`.
    pub fn new(
        category: impl AsRef<str>,
        limit_amount: Amount,
        period: BudgetPeriod,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self> {
        let category = category.as_ref().trim();
        if category.is_empty() {
            bail!("Please enter a category for your budget")
        }
        ensure!(
            limit_amount.is_positive(),
            "The budget limit must be greater than zero, got {limit_amount}"
        );
        ensure!(
            start_date < end_date,
            "End date must be after start date ({start_date} >= {end_date})"
        );
        Ok(Self {
            category: category.to_string(),
            limit_amount,
            period,
            start_date,
            end_date,
            is_active: true,
        })
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn limit_amount(&self) -> Amount {
        self.limit_amount
    }

    pub fn period(&self) -> BudgetPeriod {
        self.period
    }
}

impl From<&NewBudget> for Budget {
    fn from(b: &NewBudget) -> Self {
        Self {
            category: b.category.clone(),
            limit_amount: b.limit_amount,
            period: b.period,
            start_date: Some(b.start_date),
            end_date: Some(b.end_date),
            is_active: b.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    #[test]
    fn test_snapshot_budget_defaults() {
        let budget: Budget =
            serde_json::from_str(r#"{"category": "food", "limit_amount": 80}"#).unwrap();
        assert_eq!(budget.category(), "food");
        assert_eq!(budget.limit_amount().value(), Decimal::from(80));
        assert_eq!(budget.period(), BudgetPeriod::Monthly);
        assert!(budget.is_active());
        assert_eq!(budget.start_date(), None);
    }

    #[test]
    fn test_full_budget() {
        let json = r#"{
            "category": "Food",
            "limit_amount": "500.00",
            "period": "YEARLY",
            "start_date": "2025-01-01",
            "end_date": "2025-12-31",
            "is_active": false
        }"#;
        let budget: Budget = serde_json::from_str(json).unwrap();
        assert_eq!(budget.period(), BudgetPeriod::Yearly);
        assert_eq!(budget.end_date(), Some(date("2025-12-31")));
        assert!(!budget.is_active());
    }

    #[test]
    fn test_malformed_limit_is_zero() {
        let budget: Budget =
            serde_json::from_str(r#"{"category": "Food", "limit_amount": "lots"}"#).unwrap();
        assert_eq!(budget.limit_amount().value(), Decimal::ZERO);
    }

    #[test]
    fn test_new_budget_validation() {
        let limit = Amount::from_str("200").unwrap();
        let ok = NewBudget::new(
            " Food ",
            limit,
            BudgetPeriod::Monthly,
            date("2025-10-01"),
            date("2025-10-31"),
        )
        .unwrap();
        assert_eq!(ok.category(), "Food");

        let bad_dates = NewBudget::new(
            "Food",
            limit,
            BudgetPeriod::Monthly,
            date("2025-10-31"),
            date("2025-10-01"),
        );
        assert!(bad_dates.is_err());

        let no_category = NewBudget::new(
            "",
            limit,
            BudgetPeriod::Monthly,
            date("2025-10-01"),
            date("2025-10-31"),
        );
        assert!(no_category.is_err());
    }

    #[test]
    fn test_new_budget_serializes_for_backend() {
        let b = NewBudget::new(
            "Transport",
            Amount::from_str("75.5").unwrap(),
            BudgetPeriod::Weekly,
            date("2025-10-01"),
            date("2025-10-08"),
        )
        .unwrap();
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["period"], "WEEKLY");
        assert_eq!(json["start_date"], "2025-10-01");
        assert_eq!(json["is_active"], true);
    }

    #[test]
    fn test_period_is_case_insensitive() {
        let budget: Budget =
            serde_json::from_str(r#"{"category": "Food", "limit_amount": 1, "period": "yearly"}"#)
                .unwrap();
        assert_eq!(budget.period(), BudgetPeriod::Yearly);
        let budget: Budget =
            serde_json::from_str(r#"{"category": "Food", "limit_amount": 1, "period": 3}"#).unwrap();
        assert_eq!(budget.period(), BudgetPeriod::Monthly);
    }

    #[test]
    fn test_null_category_is_empty() {
        let budget: Budget =
            serde_json::from_str(r#"{"category": null, "limit_amount": 80}"#).unwrap();
        assert_eq!(budget.category(), "");
        assert_eq!(budget.limit_amount().value(), Decimal::from(80));
    }

    #[test]
    fn test_timestamp_and_garbage_dates() {
        let json = r#"{
            "category": "Food",
            "limit_amount": 80,
            "start_date": "2025-10-01T00:00:00+05:30",
            "end_date": "end of month",
            "is_active": "false"
        }"#;
        let budget: Budget = serde_json::from_str(json).unwrap();
        assert_eq!(budget.start_date(), Some(date("2025-10-01")));
        assert_eq!(budget.end_date(), None);
        assert!(!budget.is_active());
    }
}
