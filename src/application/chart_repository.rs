// Repository trait for chart payload access
use crate::domain::chart_request::ChartKind;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait ChartSource: Send + Sync {
    /// Fetch the raw chart payload `{ data: [...] }` for a metric
    async fn fetch_chart(&self, kind: ChartKind, metric: &str) -> anyhow::Result<Value>;
}
