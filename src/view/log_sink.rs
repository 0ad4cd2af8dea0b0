use log::{error, info, warn};
use uuid::Uuid;

use crate::models::{
    ActivityIcon, ActivityLogEntry, AnalysisResult, HealthMetricsSnapshot, Notification,
    NotificationKind,
};

use super::ViewSink;

fn render_activity(entry: &ActivityLogEntry) -> String {
    format!(
        "[activity] ({}) {}: {}",
        entry.icon.as_str(),
        entry.title,
        entry.description
    )
}

fn render_metrics(snapshot: &HealthMetricsSnapshot) -> String {
    let rendered: Vec<String> = snapshot
        .levels()
        .iter()
        .map(|(kind, level)| {
            format!(
                "{}={} ({})",
                kind.as_str(),
                snapshot.value(*kind),
                level.as_str()
            )
        })
        .collect();
    format!("[metrics] {}", rendered.join(", "))
}

/// Headless view that writes every update to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogViewSink;

impl ViewSink for LogViewSink {
    fn on_activity_log_changed(&self, entries: &[ActivityLogEntry]) {
        if let Some(latest) = entries.first() {
            let line = render_activity(latest);
            match latest.icon {
                ActivityIcon::Success => info!("{line}"),
                ActivityIcon::Warning => warn!("{line}"),
            }
        }
        info!("[activity] {} entries in log", entries.len());
    }

    fn on_metrics_changed(&self, snapshot: &HealthMetricsSnapshot) {
        info!("{}", render_metrics(snapshot));
    }

    fn on_detailed_result(&self, result: &AnalysisResult) {
        info!(
            "[detail] {} scored {} ({}), confidence {:.2}",
            result.source_file_name,
            result.health_score,
            result.health_status().as_str(),
            result.confidence
        );
        if let Some(pest) = result.pest_type {
            warn!(
                "[detail] pest detected in {}: {} ({})",
                result.source_file_name,
                pest.label(),
                pest.treatment_hints().join("; ")
            );
        }
        for recommendation in result.recommendations() {
            info!("[detail]   - {recommendation}");
        }
    }

    fn on_notification(&self, notification: &Notification) {
        match notification.kind {
            NotificationKind::Error => error!("[notify] {}", notification.message),
            NotificationKind::Success | NotificationKind::Info => {
                info!("[notify] {}", notification.message)
            }
        }
    }

    fn on_notification_dismissed(&self, id: Uuid) {
        log::debug!("[notify] dismissed {id}");
    }
}
