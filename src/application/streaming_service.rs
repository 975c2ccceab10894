// Streaming chart service - Progressive delivery of flattened series
use crate::application::chart_repository::ChartSource;
use crate::domain::chart_request::ChartRequest;
use crate::domain::chart_series::pivot_series;
use crate::domain::flatten::{flatten_with_policy, FlatRecord, FlattenPolicy};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    /// Axis layout of the whole chart, sent before any series
    Skeleton {
        legend_groups: Vec<String>,
        categories: Vec<String>,
    },
    Series {
        index: usize,
        records: Vec<FlatRecord>,
    },
    Complete {
        series_count: usize,
        series_skipped: usize,
        record_count: usize,
        duration_ms: i64,
    },
    Failed {
        message: String,
    },
}

#[derive(Clone)]
pub struct StreamingChartService {
    source: Arc<dyn ChartSource>,
    policy: FlattenPolicy,
}

impl StreamingChartService {
    pub fn new(source: Arc<dyn ChartSource>, policy: FlattenPolicy) -> Self {
        Self { source, policy }
    }

    pub async fn stream_chart(&self, request: ChartRequest) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(100);
        let source = self.source.clone();
        let policy = self.policy;

        tokio::spawn(async move {
            let start_time = Instant::now();
            let metric = request.metric_name();

            let payload = match source.fetch_chart(request.kind, &metric).await {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!("streaming {} '{}' failed: {:#}", request.kind, metric, e);
                    let _ = tx
                        .send(StreamMessage::Failed {
                            message: format!("backend request failed: {:#}", e),
                        })
                        .await;
                    return;
                }
            };

            let flattened = match flatten_with_policy(&payload, policy) {
                Ok(flattened) => flattened,
                Err(e) => {
                    tracing::warn!("streaming {} '{}' rejected: {}", request.kind, metric, e);
                    let _ = tx
                        .send(StreamMessage::Failed {
                            message: e.to_string(),
                        })
                        .await;
                    return;
                }
            };

            // 1. Skeleton first so the client can lay out axes and legend
            let layout = pivot_series(flattened.records());
            let skeleton = StreamMessage::Skeleton {
                legend_groups: layout.legend_groups(),
                categories: layout.categories,
            };
            if tx.send(skeleton).await.is_err() {
                tracing::debug!("stream client went away before skeleton");
                return;
            }

            // 2. One message per series, in payload order
            let record_count = flattened.record_count();
            let series_count = flattened.report.series_seen;
            let series_skipped = flattened.report.series_skipped;
            for series in flattened.series {
                let msg = StreamMessage::Series {
                    index: series.index,
                    records: series.records,
                };
                if tx.send(msg).await.is_err() {
                    tracing::debug!("stream client went away mid-chart");
                    return;
                }
            }

            // 3. Completion
            let complete = StreamMessage::Complete {
                series_count,
                series_skipped,
                record_count,
                duration_ms: i64::try_from(start_time.elapsed().as_millis()).unwrap_or(i64::MAX),
            };
            let _ = tx.send(complete).await;
        });

        rx
    }
}
