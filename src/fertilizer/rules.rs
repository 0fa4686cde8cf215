//! Rule-Based Fertilizer Advice
//!
//! An ordered list of (predicate, fertilizer) rules. Rules are evaluated top
//! to bottom and the first match wins, so climate rules take precedence over
//! soil rules, which take precedence over nutrient-level rules. The last rule
//! always matches.

use serde::Serialize;

use crate::request::FertilizerRequest;

pub const BALANCED_NPK: &str = "NPK (Various formulations)";

pub struct FertilizerRule {
    pub id: &'static str,
    pub reason: &'static str,
    pub fertilizer: &'static str,
    applies: fn(&FertilizerRequest) -> bool,
}

impl FertilizerRule {
    pub fn applies(&self, req: &FertilizerRequest) -> bool {
        (self.applies)(req)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleMatch {
    pub rule: &'static str,
    pub reason: &'static str,
    pub fertilizer: &'static str,
}

fn soil_is(req: &FertilizerRequest, soil: &str) -> bool {
    req.soil_type.trim().eq_ignore_ascii_case(soil)
}

// ============================================================================
// RULES (priority order)
// ============================================================================

pub static RULES: &[FertilizerRule] = &[
    FertilizerRule {
        id: "cold_climate",
        reason: "Temperature below 15°C favours quick-release nitrogen.",
        fertilizer: "Ammonium Nitrate",
        applies: |req| req.temperature < 15.0,
    },
    FertilizerRule {
        id: "hot_climate",
        reason: "Temperature above 30°C favours slow-release nutrients.",
        fertilizer: "Slow-release NPK",
        applies: |req| req.temperature > 30.0,
    },
    FertilizerRule {
        id: "acidic_soil",
        reason: "Acidic soil benefits from nitrogen with sulfur.",
        fertilizer: "Ammonium Sulfate",
        applies: |req| soil_is(req, "acidic"),
    },
    FertilizerRule {
        id: "alluvial_soil",
        reason: "Alluvial soil benefits from calcium and sulfur to improve structure.",
        fertilizer: "Gypsum",
        applies: |req| soil_is(req, "alluvial"),
    },
    FertilizerRule {
        id: "sandy_soil",
        reason: "Sandy soil needs organic matter to retain water and nutrients.",
        fertilizer: "Organic Matter (Compost)",
        applies: |req| soil_is(req, "sandy"),
    },
    FertilizerRule {
        id: "clayey_soil",
        reason: "Clayey soil benefits from calcium to improve nutrient uptake.",
        fertilizer: "Calcium Nitrate",
        applies: |req| soil_is(req, "clayey"),
    },
    FertilizerRule {
        id: "high_nitrogen",
        reason: "Nitrogen level of 20 or more.",
        fertilizer: "Urea",
        applies: |req| req.nitrogen >= 20.0,
    },
    FertilizerRule {
        id: "high_phosphorus",
        reason: "Phosphorus level of 25 or more.",
        fertilizer: "DAP (Diammonium Phosphate)",
        applies: |req| req.phosphorus >= 25.0,
    },
    FertilizerRule {
        id: "high_potassium",
        reason: "Potassium level of 25 or more.",
        fertilizer: "MOP (Muriate of Potash)",
        applies: |req| req.potassium >= 25.0,
    },
    FertilizerRule {
        id: "balanced",
        reason: "No specific nutrient, soil or climate requirement.",
        fertilizer: BALANCED_NPK,
        applies: |_| true,
    },
];

/// First matching rule
pub fn evaluate(req: &FertilizerRequest) -> RuleMatch {
    RULES
        .iter()
        .find(|rule| rule.applies(req))
        .map(|rule| RuleMatch { rule: rule.id, reason: rule.reason, fertilizer: rule.fertilizer })
        .unwrap_or(RuleMatch {
            rule: "balanced",
            reason: "No specific nutrient, soil or climate requirement.",
            fertilizer: BALANCED_NPK,
        })
}
