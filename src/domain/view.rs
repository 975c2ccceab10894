// View state domain model - what one chart view currently shows
use super::chart_request::ChartRequest;
use super::flatten::{FlatRecord, FlattenReport};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ViewStatus {
    Loading,
    Ready {
        records: Vec<FlatRecord>,
        report: FlattenReport,
    },
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub request_id: u64,
    pub request: ChartRequest,
    #[serde(flatten)]
    pub status: ViewStatus,
    pub updated_ms: i64,
}

impl ViewState {
    pub fn loading(request_id: u64, request: ChartRequest, updated_ms: i64) -> Self {
        Self {
            request_id,
            request,
            status: ViewStatus::Loading,
            updated_ms,
        }
    }
}
