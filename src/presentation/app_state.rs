// Application state for HTTP handlers
use crate::application::chart_service::ChartService;
use crate::application::streaming_service::StreamingChartService;
use crate::domain::flatten::FlattenPolicy;

#[derive(Clone)]
pub struct AppState {
    pub chart_service: ChartService,
    pub streaming_service: StreamingChartService,
    pub default_policy: FlattenPolicy,
}
