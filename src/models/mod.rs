pub mod activity;
pub mod analysis;
pub mod metrics;
pub mod stats;
pub mod status;
pub mod view;

pub use activity::{ActivityIcon, ActivityLog, ActivityLogEntry, DEFAULT_ACTIVITY_CAPACITY};
pub use analysis::{AnalysisResult, HealthStatus, PestType, UploadCandidate};
pub use metrics::{classify_metric, HealthMetricsSnapshot, MetricKind, MetricLevel};
pub use stats::{HealthTrendPoint, PipelineStats};
pub use status::{AnalysisHistory, AnalysisRecord, AnalysisStatus, DEFAULT_STATUS_CAPACITY};
pub use view::{Notification, NotificationKind, ViewContext};
