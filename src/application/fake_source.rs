// In-memory chart source for service and handler tests
use crate::application::chart_repository::ChartSource;
use crate::domain::chart_request::ChartKind;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct FakeChartSource {
    payloads: HashMap<String, Value>,
    delays: HashMap<String, Duration>,
    requested: Mutex<Vec<(ChartKind, String)>>,
}

impl FakeChartSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(mut self, metric: &str, payload: Value) -> Self {
        self.payloads.insert(metric.to_string(), payload);
        self
    }

    pub fn with_delay(mut self, metric: &str, delay: Duration) -> Self {
        self.delays.insert(metric.to_string(), delay);
        self
    }

    pub fn requested(&self) -> Vec<(ChartKind, String)> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChartSource for FakeChartSource {
    async fn fetch_chart(&self, kind: ChartKind, metric: &str) -> anyhow::Result<Value> {
        self.requested
            .lock()
            .unwrap()
            .push((kind, metric.to_string()));

        if let Some(delay) = self.delays.get(metric) {
            tokio::time::sleep(*delay).await;
        }

        self.payloads
            .get(metric)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("backend has no chart for '{}'", metric))
    }
}
