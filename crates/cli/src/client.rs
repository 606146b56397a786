//! Thin HTTP client over the `/v1` resources.

use std::time::Duration;

use anyhow::{bail, Context};
use libris_db::{Book, Category, RecordId};
use reqwest::{Response, StatusCode};
use serde_json::Value;

pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(server: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            http,
            base: server.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base, path)
    }

    pub async fn books(&self) -> anyhow::Result<Vec<Book>> {
        let response = self.http.get(self.url("books")).send().await?;
        Ok(expect(response, StatusCode::OK)?.json().await?)
    }

    pub async fn categories(&self) -> anyhow::Result<Vec<Category>> {
        let response = self.http.get(self.url("categories")).send().await?;
        Ok(expect(response, StatusCode::OK)?.json().await?)
    }

    /// The raw JSON object, exactly as served.
    pub async fn book(&self, id: RecordId) -> anyhow::Result<Value> {
        let response = self.http.get(self.url(&format!("books/{id}"))).send().await?;
        Ok(expect(response, StatusCode::OK)?.json().await?)
    }

    pub async fn delete_book(&self, id: RecordId) -> anyhow::Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("books/{id}")))
            .send()
            .await?;
        expect(response, StatusCode::NO_CONTENT)?;
        Ok(())
    }

    pub async fn create_book(&self, body: &Value) -> anyhow::Result<Book> {
        let response = self
            .http
            .post(self.url("books/create"))
            .json(body)
            .send()
            .await?;
        Ok(expect(response, StatusCode::CREATED)?.json().await?)
    }

    pub async fn create_category(&self, name: &str) -> anyhow::Result<Category> {
        let response = self
            .http
            .post(self.url("categories/create"))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        Ok(expect(response, StatusCode::CREATED)?.json().await?)
    }
}

fn expect(response: Response, wanted: StatusCode) -> anyhow::Result<Response> {
    let status = response.status();
    if status != wanted {
        tracing::debug!(url = %response.url(), %status, "unexpected status");
        bail!("server answered {status}, expected {wanted}");
    }
    Ok(response)
}
