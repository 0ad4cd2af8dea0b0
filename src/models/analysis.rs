use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const HEALTH_SCORE_RANGE: (u32, u32) = (70, 100);
pub const CHLOROPHYLL_RANGE: (u32, u32) = (60, 100);
pub const WATER_STRESS_RANGE: (u32, u32) = (10, 40);
pub const NUTRIENT_DEFICIENCY_RANGE: (u32, u32) = (5, 25);
pub const DISEASE_RISK_RANGE: (u32, u32) = (5, 20);
pub const CONFIDENCE_RANGE: (f64, f64) = (0.7, 1.0);

/// A file handed to the pipeline. Only the name and size are looked at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadCandidate {
    pub file_name: String,
    pub byte_len: u64,
}

impl UploadCandidate {
    pub fn new(file_name: impl Into<String>, byte_len: u64) -> Self {
        Self {
            file_name: file_name.into(),
            byte_len,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PestType {
    Aphids,
    CornBorer,
    LeafRust,
    SpiderMites,
}

impl PestType {
    pub const ALL: [PestType; 4] = [
        PestType::Aphids,
        PestType::CornBorer,
        PestType::LeafRust,
        PestType::SpiderMites,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PestType::Aphids => "Aphids",
            PestType::CornBorer => "Corn Borer",
            PestType::LeafRust => "Leaf Rust",
            PestType::SpiderMites => "Spider Mites",
        }
    }

    /// Field advice shown next to a detection.
    pub fn treatment_hints(&self) -> &'static [&'static str] {
        match self {
            PestType::Aphids => &[
                "Monitor population levels",
                "Consider beneficial insects release",
                "Apply targeted insecticide if needed",
            ],
            PestType::CornBorer => &[
                "Immediate treatment recommended",
                "Apply approved insecticide",
                "Monitor neighboring plants",
            ],
            PestType::LeafRust => &[
                "Apply fungicide treatment",
                "Remove infected plant material",
                "Improve air circulation",
            ],
            PestType::SpiderMites => &[
                "Increase humidity levels",
                "Apply miticide treatment",
                "Monitor for natural predators",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Excellent,
    Healthy,
    AttentionNeeded,
    Poor,
}

impl HealthStatus {
    pub fn from_score(score: u32) -> Self {
        if score >= 90 {
            HealthStatus::Excellent
        } else if score >= 70 {
            HealthStatus::Healthy
        } else if score >= 50 {
            HealthStatus::AttentionNeeded
        } else {
            HealthStatus::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "excellent",
            HealthStatus::Healthy => "healthy",
            HealthStatus::AttentionNeeded => "attention_needed",
            HealthStatus::Poor => "poor",
        }
    }
}

/// Outcome of analysing one accepted upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub source_file_name: String,
    pub health_score: u32,
    pub chlorophyll: u32,
    pub water_stress: u32,
    pub nutrient_deficiency: u32,
    pub disease_risk: u32,
    pub pest_detected: bool,
    /// `Some` exactly when `pest_detected` is set.
    pub pest_type: Option<PestType>,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn health_status(&self) -> HealthStatus {
        HealthStatus::from_score(self.health_score)
    }

    pub fn recommendations(&self) -> Vec<&'static str> {
        let mut recommendations = Vec::new();

        if self.chlorophyll < 60 {
            recommendations
                .push("Consider nitrogen fertilizer application to improve chlorophyll content");
        }
        if self.water_stress > 40 {
            recommendations.push("Implement irrigation or water management strategies");
        }
        if self.nutrient_deficiency > 30 {
            recommendations.push("Conduct soil test and apply appropriate fertilizers");
        }
        if self.disease_risk > 25 {
            recommendations.push("Monitor for disease symptoms and consider preventive treatments");
        }

        if self.health_score < 50 {
            recommendations.push("Immediate attention required - conduct field inspection");
        } else if self.health_score < 70 {
            recommendations.push("Monitor closely and consider management interventions");
        } else {
            recommendations.push("Continue current management practices");
        }

        recommendations
    }

    pub fn within_documented_ranges(&self) -> bool {
        let within = |value: u32, (low, high): (u32, u32)| value >= low && value <= high;

        within(self.health_score, HEALTH_SCORE_RANGE)
            && within(self.chlorophyll, CHLOROPHYLL_RANGE)
            && within(self.water_stress, WATER_STRESS_RANGE)
            && within(self.nutrient_deficiency, NUTRIENT_DEFICIENCY_RANGE)
            && within(self.disease_risk, DISEASE_RISK_RANGE)
            && self.confidence >= CONFIDENCE_RANGE.0
            && self.confidence <= CONFIDENCE_RANGE.1
            && self.pest_detected == self.pest_type.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(health_score: u32) -> AnalysisResult {
        AnalysisResult {
            source_file_name: "field-a.tif".into(),
            health_score,
            chlorophyll: 75,
            water_stress: 20,
            nutrient_deficiency: 10,
            disease_risk: 8,
            pest_detected: false,
            pest_type: None,
            confidence: 0.9,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn health_status_tiers() {
        assert_eq!(HealthStatus::from_score(95), HealthStatus::Excellent);
        assert_eq!(HealthStatus::from_score(90), HealthStatus::Excellent);
        assert_eq!(HealthStatus::from_score(89), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_score(70), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_score(50), HealthStatus::AttentionNeeded);
        assert_eq!(HealthStatus::from_score(49), HealthStatus::Poor);
    }

    #[test]
    fn healthy_result_recommends_current_practices() {
        let result = sample(85);
        assert_eq!(
            result.recommendations(),
            vec!["Continue current management practices"]
        );
    }

    #[test]
    fn stressed_metrics_add_specific_advice() {
        let mut result = sample(60);
        result.chlorophyll = 55;
        result.disease_risk = 30;

        let recommendations = result.recommendations();
        assert_eq!(recommendations.len(), 3);
        assert!(recommendations[0].contains("nitrogen"));
        assert!(recommendations[1].contains("disease"));
        assert!(recommendations[2].starts_with("Monitor closely"));
    }

    #[test]
    fn pest_flag_must_agree_with_type() {
        let mut result = sample(80);
        assert!(result.within_documented_ranges());

        result.pest_detected = true;
        assert!(!result.within_documented_ranges());

        result.pest_type = Some(PestType::LeafRust);
        assert!(result.within_documented_ranges());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(sample(80)).unwrap();
        assert_eq!(json["sourceFileName"], "field-a.tif");
        assert_eq!(json["healthScore"], 80);
        assert!(json["pestType"].is_null());
    }
}
