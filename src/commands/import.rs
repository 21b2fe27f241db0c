use crate::api::{Mode, WriteAck};
use crate::commands::{loader, Out};
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use std::path::Path;

/// Uploads a bank export for the backend to import, then refreshes the snapshot.
pub async fn import(config: Config, mode: Mode, file: &Path) -> Result<Out<WriteAck>> {
    crate::api::validate_import_file(file).pub_result(ErrorType::Validation)?;
    let mut loader = loader(&config, mode, config.default_period()).await?;
    let ack = loader.import(file).await.pub_result(ErrorType::Request)?;
    let message = ack
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Imported {}", file.display()));
    Ok(Out::new(message, ack))
}
