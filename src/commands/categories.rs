use crate::api::Mode;
use crate::commands::{loader, Out};
use crate::model::Categories;
use crate::{Config, Result};

/// Lists the categories to offer for expenses and budgets: the defaults first, then any others the
/// backend knows of. Falls back to the defaults when the backend cannot be reached.
pub async fn categories(config: Config, mode: Mode) -> Result<Out<Categories>> {
    let mut loader = loader(&config, mode, config.default_period()).await?;
    let categories = loader.categories().await;
    let message = format!(
        "{} categories: {}",
        categories.len(),
        categories.names().join(", ")
    );
    Ok(Out::new(message, categories))
}
