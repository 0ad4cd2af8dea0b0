use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_STATUS_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Processing,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Processing => "processing",
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self, AnalysisStatus::Processing)
    }
}

/// Lifecycle of one accepted upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub file_name: String,
    pub status: AnalysisStatus,
    pub health_score: Option<u32>,
    pub error_message: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Status records in submission order. Once over capacity the oldest
/// finished record is dropped; records still processing are never evicted.
#[derive(Debug, Clone)]
pub struct AnalysisHistory {
    records: VecDeque<AnalysisRecord>,
    capacity: usize,
}

impl Default for AnalysisHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_STATUS_CAPACITY)
    }
}

impl AnalysisHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn start(&mut self, id: Uuid, file_name: &str) {
        self.records.push_back(AnalysisRecord {
            id,
            file_name: file_name.to_string(),
            status: AnalysisStatus::Processing,
            health_score: None,
            error_message: None,
            submitted_at: Utc::now(),
            finished_at: None,
        });
        self.trim();
    }

    pub fn complete(&mut self, id: Uuid, health_score: u32) -> bool {
        self.finish(id, |record| {
            record.status = AnalysisStatus::Completed;
            record.health_score = Some(health_score);
        })
    }

    pub fn fail(&mut self, id: Uuid, error_message: String) -> bool {
        self.finish(id, |record| {
            record.status = AnalysisStatus::Failed;
            record.error_message = Some(error_message);
        })
    }

    pub fn get(&self, id: Uuid) -> Option<&AnalysisRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn finish(&mut self, id: Uuid, update: impl FnOnce(&mut AnalysisRecord)) -> bool {
        let Some(record) = self.records.iter_mut().find(|record| record.id == id) else {
            return false;
        };
        update(record);
        record.finished_at = Some(Utc::now());
        self.trim();
        true
    }

    fn trim(&mut self) {
        while self.records.len() > self.capacity {
            match self
                .records
                .iter()
                .position(|record| record.status.is_finished())
            {
                Some(index) => {
                    self.records.remove(index);
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_move_from_processing_to_finished() {
        let mut history = AnalysisHistory::default();
        let ok = Uuid::new_v4();
        let bad = Uuid::new_v4();
        history.start(ok, "a.tif");
        history.start(bad, "a.tif");

        assert_eq!(history.get(ok).unwrap().status, AnalysisStatus::Processing);

        assert!(history.complete(ok, 88));
        assert!(history.fail(bad, "timed out".into()));

        let done = history.get(ok).unwrap();
        assert_eq!(done.status, AnalysisStatus::Completed);
        assert_eq!(done.health_score, Some(88));
        assert!(done.finished_at.is_some());

        let failed = history.get(bad).unwrap();
        assert_eq!(failed.status, AnalysisStatus::Failed);
        assert_eq!(failed.error_message.as_deref(), Some("timed out"));
    }

    #[test]
    fn unknown_id_is_ignored() {
        let mut history = AnalysisHistory::default();
        assert!(!history.complete(Uuid::new_v4(), 90));
        assert!(history.is_empty());
    }

    #[test]
    fn evicts_oldest_finished_but_keeps_processing() {
        let mut history = AnalysisHistory::with_capacity(2);
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let third = Uuid::new_v4();

        history.start(first, "1.raw");
        history.start(second, "2.raw");
        history.complete(second, 75);
        history.start(third, "3.raw");

        assert_eq!(history.len(), 2);
        assert!(history.get(first).is_some());
        assert!(history.get(second).is_none());

        // Nothing finished to drop, so the history grows past capacity.
        let fourth = Uuid::new_v4();
        history.start(fourth, "4.raw");
        assert_eq!(history.len(), 3);

        history.complete(first, 80);
        assert_eq!(history.len(), 2);
        assert!(history.get(first).is_none());
    }
}
