//! Configuration file handling for finboard.
//!
//! The configuration file is stored at `$FINBOARD_HOME/config.json` and holds the backend's base
//! URL, the display defaults and the location of the access token.

use crate::model::Period;
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "finboard";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const ACCESS_TOKEN: &str = "access_token";
const CONFIG_JSON: &str = "config.json";
const DEFAULT_CURRENCY_SYMBOL: char = '₹';

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FINBOARD_HOME` and from there it loads `$FINBOARD_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    api_url: Url,
}

impl Config {
    /// Creates the home directory, its secrets subdirectory and an initial `config.json` that
    /// points at `api_url`.
    ///
    /// # Errors
    /// - Returns an error if `api_url` is not an absolute URL or if any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>, api_url: &str) -> Result<Self> {
        let api_url = parse_api_url(api_url)?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the finboard home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            api_url: api_url.to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            secrets,
            config_path,
            config_file,
            api_url,
        })
    }

    /// Validates that `finboard_home` and its config file exist, then loads the config.
    pub async fn load(finboard_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = finboard_home.into();
        if !maybe_relative.is_dir() {
            bail!(
                "The finboard home directory is missing '{}', run 'finboard init' first",
                maybe_relative.display()
            )
        }
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let api_url = parse_api_url(&config_file.api_url)
            .with_context(|| format!("Bad api_url in {}", config_path.display()))?;

        Ok(Self {
            secrets: root.join(SECRETS),
            root,
            config_path,
            config_file,
            api_url,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    /// The backend base URL. Endpoint paths are joined onto it.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn default_period(&self) -> Period {
        self.config_file.default_period
    }

    pub fn currency_symbol(&self) -> char {
        self.config_file.currency_symbol
    }

    /// Returns the stored `token_path` if it is absolute, otherwise resolves it against the home
    /// directory.
    pub fn token_path(&self) -> PathBuf {
        let p = self.config_file.token_path();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }

    /// Stores `token` at `token_path`, readable only by the current user.
    pub async fn save_token(&self, token: &str) -> Result<()> {
        let token = token.trim();
        ensure!(!token.is_empty(), "The access token is empty");
        let path = self.token_path();
        if let Some(parent) = path.parent() {
            utils::make_dir(parent).await?;
        }
        utils::write_private(&path, token)
            .await
            .context("Unable to save the access token")
    }
}

/// Parses the backend base URL. A trailing slash is added so that relative endpoint paths join
/// beneath it instead of replacing its last segment.
fn parse_api_url(s: &str) -> Result<Url> {
    let mut url = Url::parse(s.trim()).with_context(|| format!("Invalid api_url '{s}'"))?;
    ensure!(
        !url.cannot_be_a_base(),
        "The api_url must be an absolute http(s) URL, got '{s}'"
    );
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "finboard",
///   "config_version": 1,
///   "api_url": "https://finance.example.com/api/",
///   "default_period": "monthly",
///   "currency_symbol": "₹",
///   "token_path": ".secrets/access_token"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "finboard"
    app_name: String,

    config_version: u8,

    /// Base URL of the finance backend
    api_url: String,

    #[serde(default)]
    default_period: Period,

    #[serde(default = "default_currency_symbol")]
    currency_symbol: char,

    /// Path to the access token file, relative to `$FINBOARD_HOME` or absolute.
    /// Defaults to $FINBOARD_HOME/.secrets/access_token if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_path: Option<PathBuf>,
}

fn default_currency_symbol() -> char {
    DEFAULT_CURRENCY_SYMBOL
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url: String::new(),
            default_period: Period::default(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL,
            token_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from `path` and checks its `app_name`.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: ConfigFile = utils::deserialize(path.as_ref()).await?;
        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path.as_ref(), data)
            .await
            .context("Unable to write config file")
    }

    fn token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(ACCESS_TOKEN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("finboard_home");
        let created = Config::create(&home, "https://finance.example.com/api")
            .await
            .unwrap();
        assert!(created.secrets().is_dir());
        assert!(created.config_path().is_file());
        assert_eq!(
            created.api_url().as_str(),
            "https://finance.example.com/api/"
        );

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.api_url(), created.api_url());
        assert_eq!(loaded.default_period(), Period::Monthly);
        assert_eq!(loaded.currency_symbol(), '₹');
        assert_eq!(
            loaded.token_path(),
            loaded.root().join(SECRETS).join(ACCESS_TOKEN)
        );
    }

    #[tokio::test]
    async fn test_create_rejects_relative_url() {
        let dir = TempDir::new().unwrap();
        assert!(Config::create(dir.path(), "api/v1").await.is_err());
        assert!(!dir.path().join(CONFIG_JSON).exists());
    }

    #[tokio::test]
    async fn test_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert!(err.to_string().contains("finboard init"));
    }

    #[tokio::test]
    async fn test_load_minimal_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let json = r#"{
            "app_name": "finboard",
            "config_version": 1,
            "api_url": "http://localhost:8000/api/"
        }"#;
        utils::write(dir.path().join(CONFIG_JSON), json).await.unwrap();
        let config = Config::load(dir.path()).await.unwrap();
        assert_eq!(config.default_period(), Period::Monthly);
        assert_eq!(config.currency_symbol(), DEFAULT_CURRENCY_SYMBOL);
    }

    #[tokio::test]
    async fn test_load_custom_settings() {
        let dir = TempDir::new().unwrap();
        let json = r#"{
            "app_name": "finboard",
            "config_version": 1,
            "api_url": "http://localhost:8000/api/",
            "default_period": "yearly",
            "currency_symbol": "$",
            "token_path": "/etc/finboard/token"
        }"#;
        utils::write(dir.path().join(CONFIG_JSON), json).await.unwrap();
        let config = Config::load(dir.path()).await.unwrap();
        assert_eq!(config.default_period(), Period::Yearly);
        assert_eq!(config.currency_symbol(), '$');
        assert_eq!(config.token_path(), PathBuf::from("/etc/finboard/token"));
    }

    #[tokio::test]
    async fn test_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let json = r#"{
            "app_name": "tracker",
            "config_version": 1,
            "api_url": "http://localhost:8000/api/"
        }"#;
        utils::write(dir.path().join(CONFIG_JSON), json).await.unwrap();
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_save_token() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), "http://localhost:8000/api/")
            .await
            .unwrap();
        config.save_token("  abc123\n").await.unwrap();
        assert_eq!(utils::read(&config.token_path()).await.unwrap(), "abc123");
        assert!(config.save_token("   ").await.is_err());
    }

    #[test]
    fn test_serialization_omits_token_path() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("token_path"));
        assert!(json.contains("\"default_period\":\"monthly\""));
    }

    #[test]
    fn test_parse_api_url_appends_slash() {
        let url = parse_api_url("http://localhost:8000/api").unwrap();
        assert_eq!(
            url.join("auth/categories/").unwrap().as_str(),
            "http://localhost:8000/api/auth/categories/"
        );
        assert!(parse_api_url("mailto:someone@example.com").is_err());
    }
}
