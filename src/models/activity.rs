use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ACTIVITY_CAPACITY: usize = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityIcon {
    Success,
    Warning,
}

impl ActivityIcon {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityIcon::Success => "success",
            ActivityIcon::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub title: String,
    pub description: String,
    pub icon: ActivityIcon,
    pub created_at: DateTime<Utc>,
}

/// Most-recent-first list of activity entries with a fixed capacity.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ActivityLogEntry>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ACTIVITY_CAPACITY)
    }
}

impl ActivityLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Inserts at the front. Returns the entry pushed off the back, if any.
    pub fn push_front(&mut self, entry: ActivityLogEntry) -> Option<ActivityLogEntry> {
        self.entries.push_front(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityLogEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<ActivityLogEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(description: &str) -> ActivityLogEntry {
        ActivityLogEntry {
            title: "t".into(),
            description: description.into(),
            icon: ActivityIcon::Success,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn newest_entry_is_first() {
        let mut log = ActivityLog::default();
        log.push_front(entry("a"));
        log.push_front(entry("b"));

        let descriptions: Vec<_> = log.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, ["b", "a"]);
    }

    #[test]
    fn overflow_evicts_only_the_oldest() {
        let mut log = ActivityLog::default();
        for name in ["1", "2", "3", "4", "5"] {
            assert!(log.push_front(entry(name)).is_none());
        }

        let evicted = log.push_front(entry("6")).expect("sixth insert evicts");
        assert_eq!(evicted.description, "1");
        assert_eq!(log.len(), 5);
        assert_eq!(log.iter().next().unwrap().description, "6");
        assert_eq!(log.iter().last().unwrap().description, "2");
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let log = ActivityLog::with_capacity(0);
        assert_eq!(log.capacity(), 1);
    }
}
