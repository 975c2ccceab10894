// Chart service - fetch, decode and flatten chart payloads, per request or per view
use crate::application::chart_repository::ChartSource;
use crate::application::view_store::ViewStore;
use crate::domain::chart_request::ChartRequest;
use crate::domain::chart_series::{pivot_series, ChartSeries};
use crate::domain::flatten::{
    flatten_with_policy, FlatRecord, FlattenError, FlattenPolicy, FlattenReport,
};
use crate::domain::view::{ViewState, ViewStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("backend request failed: {0:#}")]
    Backend(anyhow::Error),
    #[error(transparent)]
    Flatten(#[from] FlattenError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedChart {
    pub records: Vec<FlatRecord>,
    pub report: FlattenReport,
}

#[derive(Clone)]
pub struct ChartService {
    source: Arc<dyn ChartSource>,
    policy: FlattenPolicy,
    store: Arc<ViewStore>,
    in_flight: Arc<Mutex<HashMap<String, (u64, AbortHandle)>>>,
}

impl ChartService {
    pub fn new(source: Arc<dyn ChartSource>, policy: FlattenPolicy) -> Self {
        Self {
            source,
            policy,
            store: Arc::new(ViewStore::new()),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn load_chart(&self, request: &ChartRequest) -> Result<LoadedChart, ChartError> {
        let metric = request.metric_name();
        let payload = self
            .source
            .fetch_chart(request.kind, &metric)
            .await
            .map_err(ChartError::Backend)?;

        let flattened = flatten_with_policy(&payload, self.policy)?;
        tracing::info!(
            "loaded {} '{}': {} records from {} series ({} skipped)",
            request.kind,
            metric,
            flattened.record_count(),
            flattened.report.series_seen,
            flattened.report.series_skipped
        );

        let report = flattened.report.clone();
        Ok(LoadedChart {
            records: flattened.into_records(),
            report,
        })
    }

    pub async fn load_series(&self, request: &ChartRequest) -> Result<ChartSeries, ChartError> {
        let loaded = self.load_chart(request).await?;
        Ok(pivot_series(&loaded.records))
    }

    /// Start loading `request` into a view, cancelling whatever the view was still waiting on.
    ///
    /// The returned request id identifies this load; only the latest id of a
    /// view is ever committed to its state.
    pub async fn start_view_load(&self, view_id: &str, request: ChartRequest) -> u64 {
        // Held across begin and spawn so ids and handles are registered in the same order
        let mut in_flight = self.in_flight.lock().await;
        let request_id = self.store.begin(view_id, request.clone()).await;

        let service = self.clone();
        let view = view_id.to_string();
        let task = tokio::spawn(async move {
            let status = match service.load_chart(&request).await {
                Ok(loaded) => ViewStatus::Ready {
                    records: loaded.records,
                    report: loaded.report,
                },
                Err(e) => {
                    tracing::error!("view {} request {} failed: {}", view, request_id, e);
                    ViewStatus::Failed {
                        message: e.to_string(),
                    }
                }
            };

            if !service.store.commit(&view, request_id, status).await {
                tracing::debug!(
                    "discarding superseded response for view {} (request {})",
                    view,
                    request_id
                );
            }

            let mut in_flight = service.in_flight.lock().await;
            if matches!(in_flight.get(&view), Some((id, _)) if *id == request_id) {
                in_flight.remove(&view);
            }
        });

        if let Some((previous_id, previous)) =
            in_flight.insert(view_id.to_string(), (request_id, task.abort_handle()))
        {
            tracing::debug!("cancelling request {} for view {}", previous_id, view_id);
            previous.abort();
        }

        request_id
    }

    pub async fn view_state(&self, view_id: &str) -> Option<ViewState> {
        self.store.get(view_id).await
    }

    /// Drop a view's state and cancel its in-flight load. Returns false for unknown views.
    pub async fn close_view(&self, view_id: &str) -> bool {
        // Held across the store close so a concurrent start_view_load lands wholly before or after
        let mut in_flight = self.in_flight.lock().await;
        if let Some((request_id, handle)) = in_flight.remove(view_id) {
            tracing::debug!("cancelling request {} for closed view {}", request_id, view_id);
            handle.abort();
        }
        self.store.close(view_id).await
    }
}
