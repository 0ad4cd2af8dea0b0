use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::time;
use uuid::Uuid;

use crate::models::Notification;

use super::ViewSink;

/// Shows transient notifications and dismisses each one after a fixed ttl.
#[derive(Clone)]
pub struct NotificationCenter {
    view: Arc<dyn ViewSink>,
    ttl: Duration,
    visible: Arc<Mutex<Vec<Uuid>>>,
}

impl NotificationCenter {
    pub fn new(view: Arc<dyn ViewSink>, ttl: Duration) -> Self {
        Self {
            view,
            ttl,
            visible: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pushes the notification and arms its dismissal timer. Needs a tokio
    /// runtime.
    pub fn show(&self, notification: Notification) -> Uuid {
        let id = notification.id;
        self.lock_visible().push(id);
        self.view.on_notification(&notification);

        let center = self.clone();
        tokio::spawn(async move {
            time::sleep(center.ttl).await;
            center.dismiss(id);
        });

        id
    }

    /// Returns false if the notification was already gone.
    pub fn dismiss(&self, id: Uuid) -> bool {
        let removed = {
            let mut visible = self.lock_visible();
            let before = visible.len();
            visible.retain(|shown| *shown != id);
            visible.len() != before
        };

        if removed {
            self.view.on_notification_dismissed(id);
        }
        removed
    }

    pub fn visible(&self) -> Vec<Uuid> {
        self.lock_visible().clone()
    }

    fn lock_visible(&self) -> std::sync::MutexGuard<'_, Vec<Uuid>> {
        match self.visible.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLogEntry, AnalysisResult, HealthMetricsSnapshot};

    #[derive(Default)]
    struct DismissTracker {
        shown: Mutex<Vec<Uuid>>,
        dismissed: Mutex<Vec<Uuid>>,
    }

    impl ViewSink for DismissTracker {
        fn on_activity_log_changed(&self, _entries: &[ActivityLogEntry]) {}
        fn on_metrics_changed(&self, _snapshot: &HealthMetricsSnapshot) {}
        fn on_detailed_result(&self, _result: &AnalysisResult) {}

        fn on_notification(&self, notification: &Notification) {
            self.shown.lock().unwrap().push(notification.id);
        }

        fn on_notification_dismissed(&self, id: Uuid) {
            self.dismissed.lock().unwrap().push(id);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn dismisses_after_ttl() {
        let tracker = Arc::new(DismissTracker::default());
        let center = NotificationCenter::new(tracker.clone(), Duration::from_millis(3000));

        let id = center.show(Notification::error("bad file"));
        assert_eq!(center.visible(), vec![id]);
        assert_eq!(*tracker.shown.lock().unwrap(), vec![id]);

        time::sleep(Duration::from_millis(2999)).await;
        assert_eq!(center.visible(), vec![id]);

        time::sleep(Duration::from_millis(2)).await;
        assert!(center.visible().is_empty());
        assert_eq!(*tracker.dismissed.lock().unwrap(), vec![id]);
    }

    #[tokio::test(start_paused = true)]
    async fn early_dismiss_is_not_repeated() {
        let tracker = Arc::new(DismissTracker::default());
        let center = NotificationCenter::new(tracker.clone(), Duration::from_millis(100));

        let id = center.show(Notification::error("bad file"));
        assert!(center.dismiss(id));
        assert!(!center.dismiss(id));

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(tracker.dismissed.lock().unwrap().len(), 1);
    }
}
