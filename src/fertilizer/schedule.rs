//! Growth-stage fertilizer schedule
//!
//! One organic and one non-organic plan per growth stage. Stages that are
//! not recognised get the vegetative plan.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GrowthStage {
    Seedling,
    Vegetative,
    Flowering,
    #[serde(rename = "Fruiting/Grain Filling")]
    FruitingGrainFilling,
    Maturity,
}

impl GrowthStage {
    pub const ALL: [GrowthStage; 5] = [
        GrowthStage::Seedling,
        GrowthStage::Vegetative,
        GrowthStage::Flowering,
        GrowthStage::FruitingGrainFilling,
        GrowthStage::Maturity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthStage::Seedling => "Seedling",
            GrowthStage::Vegetative => "Vegetative",
            GrowthStage::Flowering => "Flowering",
            GrowthStage::FruitingGrainFilling => "Fruiting/Grain Filling",
            GrowthStage::Maturity => "Maturity",
        }
    }

    /// Exact stage name, or `None`
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.as_str() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FertilizerKind {
    Organic,
    NonOrganic,
}

impl FertilizerKind {
    /// "organic" in any case selects organic; anything else is non-organic
    pub fn parse(kind: &str) -> Self {
        if kind.trim().eq_ignore_ascii_case("organic") {
            FertilizerKind::Organic
        } else {
            FertilizerKind::NonOrganic
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePlan {
    pub name: &'static str,
    pub rate: &'static str,
    pub method: &'static str,
}

/// Indexed by `GrowthStage` order
static ORGANIC_PLANS: [StagePlan; 5] = [
    StagePlan { name: "Vermicompost", rate: "2-3 kg/10 sq.m", method: "Mix with soil before transplanting" },
    StagePlan { name: "Neem Cake + Cow Dung", rate: "500g neem cake + 5kg cow dung/10 sq.m", method: "Side dressing around plants" },
    StagePlan { name: "Fish Emulsion + Bone Meal", rate: "2L fish emulsion + 200g bone meal/10 sq.m", method: "Dilute and apply as foliar spray" },
    StagePlan { name: "Seaweed Extract + Wood Ash", rate: "1L seaweed + 500g wood ash/10 sq.m", method: "Foliar application and soil drench" },
    StagePlan { name: "Compost Tea", rate: "5L/10 sq.m", method: "Light soil application to maintain nutrients" },
];

static NON_ORGANIC_PLANS: [StagePlan; 5] = [
    StagePlan { name: "DAP (Di-Ammonium Phosphate)", rate: "100-150g/10 sq.m", method: "Apply in furrows before planting" },
    StagePlan { name: "Urea + MOP", rate: "150g Urea + 100g MOP/10 sq.m", method: "Split application - broadcast and irrigate" },
    StagePlan { name: "NPK 10-26-26", rate: "200g/10 sq.m", method: "Side dressing near root zone" },
    StagePlan { name: "Potassium Sulphate + Micronutrients", rate: "150g KSO4 + foliar micro spray/10 sq.m", method: "Soil application + foliar spray" },
    StagePlan { name: "Light NPK 0-0-50", rate: "100g/10 sq.m", method: "Minimal application for final growth" },
];

pub fn plan(stage: GrowthStage, kind: FertilizerKind) -> &'static StagePlan {
    let plans = match kind {
        FertilizerKind::Organic => &ORGANIC_PLANS,
        FertilizerKind::NonOrganic => &NON_ORGANIC_PLANS,
    };
    &plans[stage as usize]
}

/// Schedule entry as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleAdvice {
    pub crop: String,
    /// Stage as requested
    pub stage: String,
    /// Stage whose plan was used
    pub applied_stage: GrowthStage,
    #[serde(rename = "type")]
    pub kind: FertilizerKind,
    pub fertilizer_name: &'static str,
    pub application_rate: &'static str,
    pub application_method: &'static str,
}

/// Plan for a crop at a stage, falling back to the vegetative plan
pub fn schedule(crop: &str, stage: &str, kind: &str) -> ScheduleAdvice {
    let applied_stage = GrowthStage::parse(stage.trim()).unwrap_or(GrowthStage::Vegetative);
    let kind = FertilizerKind::parse(kind);
    let plan = plan(applied_stage, kind);

    ScheduleAdvice {
        crop: crop.to_string(),
        stage: stage.to_string(),
        applied_stage,
        kind,
        fertilizer_name: plan.name,
        application_rate: plan.rate,
        application_method: plan.method,
    }
}
