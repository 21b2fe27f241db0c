use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its secrets subdirectory and an initial `config.json` pointing at
/// `api_url`. When `token` is given it is stored as the access token.
///
/// # Errors
/// - Returns an error if `api_url` is not an absolute URL or if any file operations fail.
pub async fn init(finboard_home: &Path, api_url: &str, token: Option<&str>) -> Result<Out<()>> {
    let config = Config::create(finboard_home, api_url)
        .await
        .context("Unable to create the data directory and config")
        .pub_result(ErrorType::Config)?;
    if let Some(token) = token {
        config.save_token(token).await.pub_result(ErrorType::Config)?;
        return Ok(format!(
            "Successfully created the finboard directory at {} and saved the access token",
            config.root().display()
        )
        .into());
    }
    Ok(format!(
        "Successfully created the finboard directory at {}. Put your access token in {}",
        config.root().display(),
        config.token_path().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_with_token() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("finboard");
        let out = init(&home, "http://localhost:8000/api/", Some("tok"))
            .await
            .unwrap();
        assert!(out.message().contains("saved the access token"));
        let config = Config::load(&home).await.unwrap();
        assert!(config.token_path().is_file());
    }

    #[tokio::test]
    async fn test_init_bad_url_is_config_error() {
        let dir = TempDir::new().unwrap();
        let e = init(dir.path(), "not a url", None).await.unwrap_err();
        assert_eq!(ErrorType::of(&e), Some(ErrorType::Config));
    }
}
