// Chart backend repository implementation
use crate::application::chart_repository::ChartSource;
use crate::domain::chart_request::ChartKind;
use crate::infrastructure::config::prepare_path;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BackendRepository {
    client: reqwest::Client,
    base_url: String,
    chart_path: String,
}

#[derive(Debug, Serialize)]
struct ChartQuery<'a> {
    name: &'a str,
}

impl BackendRepository {
    pub fn new(base_url: String, chart_path: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build backend HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            chart_path,
        })
    }

    fn build_chart_url(&self, kind: ChartKind) -> String {
        let mut vars = HashMap::new();
        vars.insert("kind".to_string(), kind.as_str().to_string());
        format!("{}{}", self.base_url, prepare_path(&self.chart_path, &vars))
    }
}

#[async_trait]
impl ChartSource for BackendRepository {
    async fn fetch_chart(&self, kind: ChartKind, metric: &str) -> Result<Value> {
        let url = self.build_chart_url(kind);
        tracing::debug!("Requesting {} chart '{}' from {}", kind, metric, url);

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&ChartQuery { name: metric })
            .send()
            .await
            .context("Failed to send chart request to backend")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Backend chart request failed with status {}: {}", status, body);
        }

        response
            .json::<Value>()
            .await
            .context("Failed to parse backend chart payload")
    }
}
