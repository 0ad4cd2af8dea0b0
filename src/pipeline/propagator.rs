use std::sync::Arc;

use tokio::sync::Mutex;

use crate::models::{AnalysisResult, ViewContext};
use crate::view::ViewSink;

use super::PipelineState;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Fans a finished analysis out into pipeline state and the view.
#[derive(Clone)]
pub struct ResultPropagator {
    state: Arc<Mutex<PipelineState>>,
    view: Arc<dyn ViewSink>,
}

impl ResultPropagator {
    pub fn new(state: Arc<Mutex<PipelineState>>, view: Arc<dyn ViewSink>) -> Self {
        Self { state, view }
    }

    /// Called exactly once per completed analysis. The state update and the
    /// view pushes happen under one lock, so views see updates in the order
    /// they were applied.
    pub async fn on_result_ready(&self, result: AnalysisResult) {
        let mut state = self.state.lock().await;

        if let Some(evicted) = state.apply_result(&result) {
            log_info!("activity log full, dropped '{}'", evicted.description);
        }

        let entries = state.activity.to_vec();
        self.view.on_activity_log_changed(&entries);

        if let Some(snapshot) = state.metrics.as_ref() {
            self.view.on_metrics_changed(snapshot);
        }

        if state.active_view == ViewContext::HealthAnalysis {
            self.view.on_detailed_result(&result);
        }

        log_info!(
            "propagated analysis of '{}' (health score {})",
            result.source_file_name,
            result.health_score
        );
    }
}
