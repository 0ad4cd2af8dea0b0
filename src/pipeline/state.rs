use chrono::Utc;

use crate::models::{
    ActivityIcon, ActivityLog, ActivityLogEntry, AnalysisHistory, AnalysisResult,
    HealthMetricsSnapshot, PipelineStats, ViewContext,
};

pub const ANALYSIS_COMPLETED_TITLE: &str = "New hyperspectral analysis completed";

/// Health scores above this get a success icon in the activity log.
const SUCCESS_SCORE_ABOVE: u32 = 80;

/// Everything the pipeline owns. Only the propagator and the controller
/// mutate it.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    pub activity: ActivityLog,
    /// `None` until the first analysis lands.
    pub metrics: Option<HealthMetricsSnapshot>,
    pub active_view: ViewContext,
    pub stats: PipelineStats,
    pub latest_result: Option<AnalysisResult>,
    /// Per-upload status, keyed by the id handed out at submission.
    pub history: AnalysisHistory,
}

impl PipelineState {
    pub fn new(activity_capacity: usize, status_capacity: usize) -> Self {
        Self {
            activity: ActivityLog::with_capacity(activity_capacity),
            history: AnalysisHistory::with_capacity(status_capacity),
            ..Self::default()
        }
    }

    /// Records one completed analysis: one activity insert (at most one
    /// eviction) and a full overwrite of the metrics snapshot.
    pub fn apply_result(&mut self, result: &AnalysisResult) -> Option<ActivityLogEntry> {
        let evicted = self.activity.push_front(activity_entry_for(result));
        self.metrics = Some(HealthMetricsSnapshot::from_result(result));
        self.stats.record_result(result);
        self.latest_result = Some(result.clone());
        evicted
    }
}

pub fn activity_entry_for(result: &AnalysisResult) -> ActivityLogEntry {
    let icon = if result.health_score > SUCCESS_SCORE_ABOVE {
        ActivityIcon::Success
    } else {
        ActivityIcon::Warning
    };

    ActivityLogEntry {
        title: ANALYSIS_COMPLETED_TITLE.to_string(),
        description: format!(
            "{} analyzed - health score {}%",
            result.source_file_name, result.health_score
        ),
        icon,
        created_at: Utc::now(),
    }
}
