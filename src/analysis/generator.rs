use chrono::Utc;

use crate::models::analysis::{
    CHLOROPHYLL_RANGE, CONFIDENCE_RANGE, DISEASE_RISK_RANGE, HEALTH_SCORE_RANGE,
    NUTRIENT_DEFICIENCY_RANGE, WATER_STRESS_RANGE,
};
use crate::models::{AnalysisResult, PestType};

use super::RandomSource;

/// Builds a synthetic result. Every numeric field is drawn inside its
/// documented closed range; the pest flag is an independent draw.
pub fn generate_result(
    file_name: &str,
    source: &mut dyn RandomSource,
    pest_probability: f64,
) -> AnalysisResult {
    let health_score = draw(source, HEALTH_SCORE_RANGE);
    let chlorophyll = draw(source, CHLOROPHYLL_RANGE);
    let water_stress = draw(source, WATER_STRESS_RANGE);
    let nutrient_deficiency = draw(source, NUTRIENT_DEFICIENCY_RANGE);
    let disease_risk = draw(source, DISEASE_RISK_RANGE);

    let pest_detected = source.chance(pest_probability);
    let pest_type = pest_detected.then(|| PestType::ALL[source.pick(PestType::ALL.len())]);

    let confidence = source.uniform_f64(CONFIDENCE_RANGE.0..=CONFIDENCE_RANGE.1);

    AnalysisResult {
        source_file_name: file_name.to_string(),
        health_score,
        chlorophyll,
        water_stress,
        nutrient_deficiency,
        disease_risk,
        pest_detected,
        pest_type,
        confidence,
        timestamp: Utc::now(),
    }
}

fn draw(source: &mut dyn RandomSource, (low, high): (u32, u32)) -> u32 {
    source.uniform_u32(low..=high)
}
