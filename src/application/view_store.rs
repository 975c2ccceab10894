// View store - per-view chart state with latest-request-wins updates
use crate::domain::chart_request::ChartRequest;
use crate::domain::view::{ViewState, ViewStatus};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct ViewStore {
    views: RwLock<HashMap<String, ViewState>>,
    next_request_id: AtomicU64,
}

impl ViewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request for `view_id` and mark it loading.
    /// Returns the request id that must be presented to `commit`.
    pub async fn begin(&self, view_id: &str, request: ChartRequest) -> u64 {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut views = self.views.write().await;
        views.insert(
            view_id.to_string(),
            ViewState::loading(request_id, request, now_ms()),
        );
        request_id
    }

    /// Apply a completed request. Returns false, leaving the view untouched,
    /// if a newer request has begun or the view was closed.
    pub async fn commit(&self, view_id: &str, request_id: u64, status: ViewStatus) -> bool {
        let mut views = self.views.write().await;
        match views.get_mut(view_id) {
            Some(state) if state.request_id == request_id => {
                state.status = status;
                state.updated_ms = now_ms();
                true
            }
            _ => false,
        }
    }

    pub async fn get(&self, view_id: &str) -> Option<ViewState> {
        self.views.read().await.get(view_id).cloned()
    }

    pub async fn close(&self, view_id: &str) -> bool {
        self.views.write().await.remove(view_id).is_some()
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart_request::ChartKind;
    use crate::domain::flatten::{FlatRecord, FlattenReport};

    fn ready(y: f64) -> ViewStatus {
        ViewStatus::Ready {
            records: vec![FlatRecord::new("g", "a", y)],
            report: FlattenReport::default(),
        }
    }

    #[tokio::test]
    async fn test_request_ids_increase() {
        let store = ViewStore::new();
        let first = store.begin("v", ChartRequest::new(ChartKind::Barchart, "wacr")).await;
        let second = store.begin("w", ChartRequest::new(ChartKind::Plot, "tct")).await;
        assert!(second > first);
        assert_eq!(store.get("v").await.unwrap().request_id, first);
    }

    #[tokio::test]
    async fn test_stale_commit_is_rejected() {
        let store = ViewStore::new();
        let stale = store.begin("v", ChartRequest::new(ChartKind::Barchart, "wacr")).await;
        let fresh = store.begin("v", ChartRequest::new(ChartKind::Barchart, "tct")).await;

        assert!(store.commit("v", fresh, ready(2.0)).await);
        assert!(!store.commit("v", stale, ready(1.0)).await);

        let state = store.get("v").await.unwrap();
        assert_eq!(state.request_id, fresh);
        assert_eq!(state.request.option, "tct");
        assert_eq!(state.status, ready(2.0));
    }

    #[tokio::test]
    async fn test_commit_after_close_is_rejected() {
        let store = ViewStore::new();
        let id = store.begin("v", ChartRequest::new(ChartKind::Barchart, "wacr")).await;
        assert!(store.close("v").await);
        assert!(!store.commit("v", id, ready(1.0)).await);
        assert!(store.get("v").await.is_none());
        assert!(!store.close("v").await);
    }

    #[tokio::test]
    async fn test_begin_resets_to_loading() {
        let store = ViewStore::new();
        let id = store.begin("v", ChartRequest::new(ChartKind::Barchart, "wacr")).await;
        store.commit("v", id, ready(1.0)).await;
        store.begin("v", ChartRequest::new(ChartKind::Barchart, "wacr")).await;
        assert_eq!(store.get("v").await.unwrap().status, ViewStatus::Loading);
    }
}
