//! Boundary between the pipeline and whatever renders it.
//!
//! The pipeline pushes state into a [`ViewSink`]; views never reach back
//! into pipeline state. Implementations must not call into the pipeline
//! from inside these callbacks.

pub mod log_sink;
pub mod notifications;

pub use log_sink::LogViewSink;
pub use notifications::NotificationCenter;

use uuid::Uuid;

use crate::models::{ActivityLogEntry, AnalysisResult, HealthMetricsSnapshot, Notification};

pub trait ViewSink: Send + Sync {
    /// Full activity log, most recent first.
    fn on_activity_log_changed(&self, entries: &[ActivityLogEntry]);

    fn on_metrics_changed(&self, snapshot: &HealthMetricsSnapshot);

    /// Only pushed while the health analysis view is active.
    fn on_detailed_result(&self, result: &AnalysisResult);

    fn on_notification(&self, notification: &Notification);

    fn on_notification_dismissed(&self, _id: Uuid) {}
}
