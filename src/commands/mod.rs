//! Command handlers for the finboard CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod add;
mod categories;
mod dashboard;
mod import;
mod init;

use crate::api::{self, Mode};
use crate::error::{ErrorType, IntoResult};
use crate::loader::SnapshotLoader;
use crate::model::{Amount, AmountFormat, Period};
use crate::{Config, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use add::{add_budget, add_expense, add_income};
pub use categories::categories;
pub use dashboard::dashboard;
pub use import::import;
pub use init::init;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Builds a loader over the backend for `mode`. Nothing is fetched yet.
async fn loader(config: &Config, mode: Mode, period: Period) -> Result<SnapshotLoader> {
    let backend = api::backend(config, mode)
        .await
        .pub_result(ErrorType::Config)?;
    Ok(SnapshotLoader::new(backend, period))
}

/// Formats `value` as money using the configured currency symbol.
fn money(config: &Config, value: Decimal) -> String {
    Amount::new_with_format(value, AmountFormat::with_symbol(config.currency_symbol())).to_string()
}
