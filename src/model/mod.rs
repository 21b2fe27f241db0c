//! Types that represent the core data model, such as `PeriodSnapshot`, `Budget` and `Amount`.
mod amount;
mod budget;
mod category;
pub(crate) mod de;
mod kpi;
mod snapshot;
mod transaction;

pub use amount::{Amount, AmountError, AmountFormat};
pub(crate) use amount::{saturating_add, saturating_sub, saturating_sum};
pub use budget::{Budget, BudgetPeriod, NewBudget};
pub use category::{Categories, Category, DEFAULT_CATEGORIES};
pub use kpi::{KpiBlock, KpiSnapshot};
pub use snapshot::{Period, PeriodBucketMap, PeriodSnapshot, PeriodView};
pub use transaction::{NewTransaction, Transaction, TransactionType};
