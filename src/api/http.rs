//! Implements the `Backend` trait over HTTP with `reqwest`.

use crate::api::{
    Backend, WriteAck, BUDGETS, CATEGORIES, DASHBOARD, TRANSACTIONS, UPLOAD, UPLOAD_FIELD,
};
use crate::model::{Category, NewBudget, NewTransaction, PeriodSnapshot};
use crate::{utils, Config, Result};
use anyhow::{bail, Context};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, trace, warn};
use url::Url;

/// Talks to the finance backend rooted at `Config::api_url`, sending the stored access token as a
/// bearer token when there is one.
pub(super) struct HttpBackend {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl HttpBackend {
    pub(super) async fn new(config: &Config) -> Result<Self> {
        let token_path = config.token_path();
        let token = if token_path.is_file() {
            let token = utils::read(&token_path).await?.trim().to_string();
            (!token.is_empty()).then_some(token)
        } else {
            None
        };
        if token.is_none() {
            warn!(
                "No access token found at {}, requests will be unauthenticated",
                token_path.display()
            );
        }
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Unable to build the HTTP client")?;
        Ok(Self {
            client,
            base: config.api_url().clone(),
            token,
        })
    }

    fn url(&self, endpoint: &str) -> Result<Url> {
        self.base
            .join(endpoint)
            .with_context(|| format!("Unable to join '{endpoint}' onto '{}'", self.base))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.url(endpoint)?;
        trace!("GET {url}");
        let response = self
            .authorized(self.client.get(url.clone()))
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;
        let response = check(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Unable to parse the response from {url}"))
    }

    async fn post<B: Serialize + Sync>(&self, endpoint: &str, body: &B) -> Result<WriteAck> {
        let url = self.url(endpoint)?;
        trace!("POST {url}");
        let response = self
            .authorized(self.client.post(url.clone()).json(body))
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;
        ack(check(response).await?).await
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn fetch_snapshot(&mut self) -> Result<PeriodSnapshot> {
        self.get(DASHBOARD)
            .await
            .context("Failed to fetch the dashboard snapshot")
    }

    async fn fetch_categories(&mut self) -> Result<Vec<Category>> {
        self.get(CATEGORIES)
            .await
            .context("Failed to fetch categories")
    }

    async fn create_transaction(&mut self, transaction: &NewTransaction) -> Result<WriteAck> {
        self.post(TRANSACTIONS, transaction)
            .await
            .context("Failed to create the transaction")
    }

    async fn create_budget(&mut self, budget: &NewBudget) -> Result<WriteAck> {
        self.post(BUDGETS, budget)
            .await
            .context("Failed to create the budget")
    }

    async fn import_file(&mut self, path: &Path) -> Result<WriteAck> {
        let bytes = utils::read_bytes(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        debug!("Uploading {} bytes from {}", bytes.len(), path.display());
        let form = Form::new().part(UPLOAD_FIELD, Part::bytes(bytes).file_name(file_name));

        let url = self.url(UPLOAD)?;
        let response = self
            .authorized(self.client.post(url.clone()).multipart(form))
            .send()
            .await
            .with_context(|| format!("Upload to {url} failed"))?;
        ack(check(response).await?)
            .await
            .with_context(|| format!("Failed to import '{}'", path.display()))
    }
}

/// Turns a non-success status into an error carrying the status and the response body.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    bail!("{url} returned {status}: {body}")
}

/// Reads an optional `message` from a successful write response. An empty or non-JSON body is
/// still a success.
async fn ack(response: Response) -> Result<WriteAck> {
    let body = response
        .text()
        .await
        .context("Unable to read the response body")?;
    Ok(serde_json::from_str(&body).unwrap_or_default())
}
