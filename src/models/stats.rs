use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AnalysisResult;

/// Number of most recent scores kept for the trend chart.
pub const HEALTH_TREND_LEN: usize = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthTrendPoint {
    pub recorded_at: DateTime<Utc>,
    pub score: u32,
}

/// Running totals for the dashboard header.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStats {
    pub analyses_completed: u64,
    pub analyses_failed: u64,
    pub files_rejected: u64,
    pub pest_alerts: u64,
    pub average_health_score: Option<f64>,
    /// Oldest first.
    pub health_trend: VecDeque<HealthTrendPoint>,
    #[serde(skip)]
    health_score_total: u64,
}

impl PipelineStats {
    pub fn record_result(&mut self, result: &AnalysisResult) {
        self.analyses_completed += 1;
        if result.pest_detected {
            self.pest_alerts += 1;
        }
        self.health_score_total += u64::from(result.health_score);
        self.average_health_score =
            Some(self.health_score_total as f64 / self.analyses_completed as f64);

        self.health_trend.push_back(HealthTrendPoint {
            recorded_at: result.timestamp,
            score: result.health_score,
        });
        if self.health_trend.len() > HEALTH_TREND_LEN {
            self.health_trend.pop_front();
        }
    }

    pub fn record_failure(&mut self) {
        self.analyses_failed += 1;
    }

    pub fn record_rejection(&mut self) {
        self.files_rejected += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PestType;
    use chrono::Utc;

    fn result(health_score: u32, pest: Option<PestType>) -> AnalysisResult {
        AnalysisResult {
            source_file_name: "scan.hdr".into(),
            health_score,
            chlorophyll: 80,
            water_stress: 15,
            nutrient_deficiency: 10,
            disease_risk: 6,
            pest_detected: pest.is_some(),
            pest_type: pest,
            confidence: 0.8,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn average_tracks_all_completed_results() {
        let mut stats = PipelineStats::default();
        assert_eq!(stats.average_health_score, None);

        stats.record_result(&result(80, None));
        stats.record_result(&result(91, Some(PestType::Aphids)));

        assert_eq!(stats.analyses_completed, 2);
        assert_eq!(stats.pest_alerts, 1);
        assert_eq!(stats.average_health_score, Some(85.5));

        let scores: Vec<u32> = stats.health_trend.iter().map(|point| point.score).collect();
        assert_eq!(scores, [80, 91]);
    }

    #[test]
    fn trend_keeps_only_the_latest_scores() {
        let mut stats = PipelineStats::default();
        for i in 0..(HEALTH_TREND_LEN as u32 + 5) {
            stats.record_result(&result(70 + i % 30, None));
        }

        assert_eq!(stats.health_trend.len(), HEALTH_TREND_LEN);
        assert_eq!(stats.health_trend.front().unwrap().score, 75);
        assert_eq!(stats.analyses_completed, HEALTH_TREND_LEN as u64 + 5);
    }
}
