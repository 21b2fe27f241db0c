//! Owns the backend and the currently loaded snapshot.
//!
//! The loader is the only place that suspends: it fetches a `PeriodSnapshot` and hands it to the
//! synchronous engine. A refresh discards the old snapshot before installing the new one, so there
//! is never a mix of old and new data.

use crate::api::{validate_import_file, Backend, WriteAck};
use crate::engine::{Dashboard, DashboardView};
use crate::model::{Categories, NewBudget, NewTransaction, Period};
use crate::Result;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Where the loader is in its lifecycle.
#[derive(Debug, Clone)]
pub enum LoadState {
    /// Nothing fetched yet, or a refresh is under way.
    Pending,
    /// A full snapshot is loaded.
    Ready(Dashboard),
    /// The last fetch failed. Nothing is shown and nothing is retried until the next explicit
    /// refresh.
    Unavailable(String),
}

pub struct SnapshotLoader {
    backend: Box<dyn Backend + Send>,
    period: Period,
    state: LoadState,
}

impl SnapshotLoader {
    pub(crate) fn new(backend: Box<dyn Backend + Send>, period: Period) -> Self {
        Self {
            backend,
            period,
            state: LoadState::Pending,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn period(&self) -> Period {
        self.period
    }

    /// The loaded dashboard, if the last fetch succeeded.
    pub fn dashboard(&self) -> Option<&Dashboard> {
        match &self.state {
            LoadState::Ready(dashboard) => Some(dashboard),
            _ => None,
        }
    }

    /// Fetches a new snapshot and replaces the current state with it. On failure the loader moves
    /// to `Unavailable` and the error is returned.
    pub async fn refresh(&mut self) -> Result<()> {
        self.state = LoadState::Pending;
        debug!("Fetching the dashboard snapshot");
        match self.backend.fetch_snapshot().await {
            Ok(snapshot) => {
                self.state = LoadState::Ready(Dashboard::new(snapshot, self.period));
                Ok(())
            }
            Err(e) => {
                error!("The dashboard is unavailable: {e:#}");
                self.state = LoadState::Unavailable(format!("{e:#}"));
                Err(e)
            }
        }
    }

    /// Selects `period`. When a snapshot is loaded the view is recomputed from it without
    /// fetching; otherwise the selection applies to the next refresh.
    pub fn set_period(&mut self, period: Period) -> Option<&DashboardView> {
        self.period = period;
        match &mut self.state {
            LoadState::Ready(dashboard) => Some(dashboard.set_period(period)),
            _ => None,
        }
    }

    /// The categories to offer the user. If the backend cannot be reached the defaults are used.
    pub async fn categories(&mut self) -> Categories {
        match self.backend.fetch_categories().await {
            Ok(fetched) => Categories::merged(fetched),
            Err(e) => {
                warn!("Unable to fetch categories, using the defaults: {e:#}");
                Categories::default()
            }
        }
    }

    /// Creates a transaction and refreshes the snapshot.
    pub async fn add_transaction(&mut self, transaction: &NewTransaction) -> Result<WriteAck> {
        let ack = self.backend.create_transaction(transaction).await?;
        info!(
            "Added {} of {}",
            transaction.transaction_type(),
            transaction.amount()
        );
        self.refresh().await?;
        Ok(ack)
    }

    /// Creates a budget and refreshes the snapshot.
    pub async fn add_budget(&mut self, budget: &NewBudget) -> Result<WriteAck> {
        let ack = self.backend.create_budget(budget).await?;
        info!("Added a {} budget for {}", budget.period(), budget.category());
        self.refresh().await?;
        Ok(ack)
    }

    /// Uploads a transactions file and refreshes the snapshot.
    pub async fn import(&mut self, path: &Path) -> Result<WriteAck> {
        validate_import_file(path)?;
        let ack = self.backend.import_file(path).await?;
        info!("Imported {}", path.display());
        self.refresh().await?;
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestBackend;
    use crate::model::{Amount, DEFAULT_CATEGORIES};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn loader() -> SnapshotLoader {
        SnapshotLoader::new(Box::new(TestBackend::default()), Period::Monthly)
    }

    #[tokio::test]
    async fn test_starts_pending() {
        let loader = loader();
        assert!(matches!(loader.state(), LoadState::Pending));
        assert!(loader.dashboard().is_none());
    }

    #[tokio::test]
    async fn test_refresh_loads() {
        let mut loader = loader();
        loader.refresh().await.unwrap();
        let view = loader.dashboard().unwrap().view();
        assert_eq!(view.period(), Period::Monthly);
        assert_eq!(view.kpis().total_income(), dec("73000.00"));
        assert!(loader.dashboard().is_some());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_unavailable() {
        let mut loader = SnapshotLoader::new(Box::new(TestBackend::unavailable()), Period::Monthly);
        assert!(loader.refresh().await.is_err());
        match loader.state() {
            LoadState::Unavailable(message) => assert!(message.contains("unavailable")),
            other => panic!("expected Unavailable, got {other:?}"),
        }
        assert!(loader.dashboard().is_none());
    }

    #[tokio::test]
    async fn test_period_selected_before_load_applies_to_refresh() {
        let mut loader = loader();
        assert!(loader.set_period(Period::Yearly).is_none());
        loader.refresh().await.unwrap();
        assert_eq!(loader.dashboard().unwrap().period(), Period::Yearly);
    }

    #[tokio::test]
    async fn test_set_period_does_not_fetch() {
        let mut loader = loader();
        loader.refresh().await.unwrap();
        let yearly = loader.set_period(Period::Yearly).unwrap();
        assert_eq!(yearly.period(), Period::Yearly);
        assert_eq!(yearly.totals().total_income(), dec("835150.25"));
    }

    #[tokio::test]
    async fn test_write_refreshes_snapshot() {
        let mut loader = loader();
        loader.refresh().await.unwrap();
        let before = loader.dashboard().unwrap().view().totals().total_expense();

        let tx = NewTransaction::expense(Amount::new(dec("100")), " Food ", "").unwrap();
        loader.add_transaction(&tx).await.unwrap();

        let after = loader.dashboard().unwrap().view().totals().total_expense();
        assert_eq!(after - before, dec("100"));
    }

    #[tokio::test]
    async fn test_categories_merge_with_defaults() {
        let mut loader = loader();
        let categories = loader.categories().await;
        assert_eq!(&categories.names()[..DEFAULT_CATEGORIES.len()], DEFAULT_CATEGORIES);
        assert!(categories.names().iter().any(|c| c == "Shopping"));
        assert_eq!(categories.names().iter().filter(|c| *c == "Food").count(), 1);
    }

    #[tokio::test]
    async fn test_categories_fall_back_to_defaults() {
        let mut loader = SnapshotLoader::new(Box::new(TestBackend::unavailable()), Period::Monthly);
        assert_eq!(loader.categories().await, Categories::default());
    }
}
