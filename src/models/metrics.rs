use serde::{Deserialize, Serialize};

use super::AnalysisResult;

/// Chlorophyll above this is good.
const CHLOROPHYLL_GOOD_ABOVE: u32 = 70;
/// Stress-type metrics below this are good.
const STRESS_GOOD_BELOW: u32 = 30;

/// Current field health metrics; replaced wholesale by every new result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetricsSnapshot {
    pub chlorophyll_content: u32,
    pub water_stress: u32,
    pub nutrient_deficiency: u32,
    pub disease_risk: u32,
}

impl HealthMetricsSnapshot {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            chlorophyll_content: result.chlorophyll,
            water_stress: result.water_stress,
            nutrient_deficiency: result.nutrient_deficiency,
            disease_risk: result.disease_risk,
        }
    }

    pub fn value(&self, kind: MetricKind) -> u32 {
        match kind {
            MetricKind::ChlorophyllContent => self.chlorophyll_content,
            MetricKind::WaterStress => self.water_stress,
            MetricKind::NutrientDeficiency => self.nutrient_deficiency,
            MetricKind::DiseaseRisk => self.disease_risk,
        }
    }

    pub fn levels(&self) -> [(MetricKind, MetricLevel); 4] {
        MetricKind::ALL.map(|kind| (kind, classify_metric(kind, self.value(kind))))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    ChlorophyllContent,
    WaterStress,
    NutrientDeficiency,
    DiseaseRisk,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::ChlorophyllContent,
        MetricKind::WaterStress,
        MetricKind::NutrientDeficiency,
        MetricKind::DiseaseRisk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::ChlorophyllContent => "chlorophyllContent",
            MetricKind::WaterStress => "waterStress",
            MetricKind::NutrientDeficiency => "nutrientDeficiency",
            MetricKind::DiseaseRisk => "diseaseRisk",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetricLevel {
    Good,
    Warning,
}

impl MetricLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricLevel::Good => "good",
            MetricLevel::Warning => "warning",
        }
    }
}

/// Colouring rule shared by every view that renders health metrics.
pub fn classify_metric(kind: MetricKind, value: u32) -> MetricLevel {
    let good = match kind {
        MetricKind::ChlorophyllContent => value > CHLOROPHYLL_GOOD_ABOVE,
        MetricKind::WaterStress | MetricKind::NutrientDeficiency | MetricKind::DiseaseRisk => {
            value < STRESS_GOOD_BELOW
        }
    };

    if good {
        MetricLevel::Good
    } else {
        MetricLevel::Warning
    }
}
