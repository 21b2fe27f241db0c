//! finboard: a personal finance dashboard engine.
//!
//! The backend delivers a pre-aggregated `PeriodSnapshot` (monthly and yearly views plus a KPI
//! block). The `engine` turns one snapshot and a selected `Period` into everything a dashboard
//! shows: totals, a budget-versus-actual comparison, headline KPIs and the labeled series for each
//! chart. The `loader` owns the backend and the currently loaded snapshot; `commands` wire both to
//! the CLI.

mod api;
pub mod args;
pub mod commands;
mod config;
pub mod engine;
mod error;
pub mod loader;
pub mod model;
mod utils;

#[cfg(test)]
mod test;

pub use api::{Backend, Mode, WriteAck, IMPORT_EXTENSIONS, TEST_MODE_ENV};
pub use config::Config;
pub use error::{Error, ErrorType, Result};
