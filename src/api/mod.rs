//! The finance backend, behind the `Backend` trait.
//!
//! `HttpBackend` talks to the real service. `TestBackend` holds a seeded snapshot in memory so the
//! whole app can run top-to-bottom without a server; `Mode` picks between them.

mod http;
mod test_backend;

use crate::model::{Category, NewBudget, NewTransaction, PeriodSnapshot};
use crate::{Config, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub(crate) use test_backend::TestBackend;

pub(crate) const DASHBOARD: &str = "auth/transactions/dashboard/";
pub(crate) const CATEGORIES: &str = "auth/categories/";
pub(crate) const TRANSACTIONS: &str = "auth/transactions/";
pub(crate) const BUDGETS: &str = "auth/budgets/";
pub(crate) const UPLOAD: &str = "auth/transactions/upload/";

/// The multipart field name the upload endpoint reads the file from.
pub(crate) const UPLOAD_FIELD: &str = "file";

/// File extensions the upload endpoint accepts.
pub const IMPORT_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls"];

/// Set this environment variable to a non-empty value to run against the in-memory backend.
pub const TEST_MODE_ENV: &str = "FINBOARD_IN_TEST_MODE";

/// Which `Backend` implementation to use.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Http,
    Test,
}

impl Mode {
    /// `Mode::Test` when `FINBOARD_IN_TEST_MODE` is set and non-empty.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(v) if !v.trim().is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// What the backend said about a write. Only success and an optional message are read; the caller
/// refreshes the snapshot to see the effect.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct WriteAck {
    #[serde(default)]
    message: Option<String>,
}

impl WriteAck {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// The operations finboard needs from the finance backend. Reads return whole payloads; writes
/// never return data that the dashboard uses.
#[async_trait::async_trait]
pub trait Backend {
    /// Fetches the dashboard snapshot with both period views and the KPI block.
    async fn fetch_snapshot(&mut self) -> Result<PeriodSnapshot>;

    /// Fetches the user's category list.
    async fn fetch_categories(&mut self) -> Result<Vec<Category>>;

    async fn create_transaction(&mut self, transaction: &NewTransaction) -> Result<WriteAck>;

    async fn create_budget(&mut self, budget: &NewBudget) -> Result<WriteAck>;

    /// Uploads a transactions file for the backend to parse and store.
    async fn import_file(&mut self, path: &Path) -> Result<WriteAck>;
}

/// Creates the `Backend` for `mode`.
pub(crate) async fn backend(config: &Config, mode: Mode) -> Result<Box<dyn Backend + Send>> {
    match mode {
        Mode::Http => Ok(Box::new(http::HttpBackend::new(config).await?)),
        Mode::Test => Ok(Box::new(TestBackend::default())),
    }
}

/// Checks that `path` is a file with one of the `IMPORT_EXTENSIONS`.
pub(crate) fn validate_import_file(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    anyhow::ensure!(
        IMPORT_EXTENSIONS.contains(&extension.as_str()),
        "Only {} files can be imported, got '{}'",
        IMPORT_EXTENSIONS.join(", "),
        path.display()
    );
    anyhow::ensure!(path.is_file(), "No such file '{}'", path.display());
    Ok(())
}
