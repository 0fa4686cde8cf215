//! Fertilizer Catalog
//!
//! Static agronomic profiles for every fertilizer either recommender can
//! name. Lookup is by exact name; the trained model may also produce names
//! that have no profile here.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FertilizerProfile {
    pub name: &'static str,
    pub nutrient_content: &'static str,
    pub application_rate: &'static str,
    pub benefits: &'static str,
    pub suitable_crops: &'static [&'static str],
    pub usage_tips: &'static str,
}

// ============================================================================
// PROFILES
// ============================================================================

static CATALOG: &[FertilizerProfile] = &[
    FertilizerProfile {
        name: "Urea",
        nutrient_content: "46% Nitrogen (N)",
        application_rate: "50-100 kg/ha",
        benefits: "Provides a high concentration of nitrogen, essential for promoting vegetative growth and green foliage.",
        suitable_crops: &["Rice", "Wheat", "Corn", "Sugarcane"],
        usage_tips: "Best applied in the early growth stages, ideally before or right after planting. Avoid overuse to prevent nitrogen leaching.",
    },
    FertilizerProfile {
        name: "DAP (Diammonium Phosphate)",
        nutrient_content: "18% Nitrogen (N), 46% Phosphorus (P2O5)",
        application_rate: "50-100 kg/ha",
        benefits: "Provides a good balance of nitrogen and phosphorus, essential for root development and initial crop establishment.",
        suitable_crops: &["Cereals", "Oilseeds", "Legumes"],
        usage_tips: "Mix well with soil before planting. Avoid direct contact with seeds to prevent damage.",
    },
    FertilizerProfile {
        name: "MOP (Muriate of Potash)",
        nutrient_content: "60% Potassium (K2O)",
        application_rate: "30-50 kg/ha",
        benefits: "High potassium content, supports plant water balance and enhances fruit quality.",
        suitable_crops: &["Banana", "Potato", "Tomato", "Sugarcane"],
        usage_tips: "Apply at flowering and fruiting stages to support fruit development. Avoid overuse in soils with high salinity.",
    },
    FertilizerProfile {
        name: "NPK (Various formulations)",
        nutrient_content: "Various formulations (e.g., 15-15-15, 20-20-20)",
        application_rate: "100-150 kg/ha",
        benefits: "Balanced nutrient mix for general plant growth and yield improvement.",
        suitable_crops: &["All types of crops, especially vegetables and cereals"],
        usage_tips: "Apply according to soil test results to match crop needs. Ideal for soil amendment in nutrient-poor soils.",
    },
    FertilizerProfile {
        name: "Calcium Nitrate",
        nutrient_content: "15.5% Nitrogen (N), 19% Calcium (Ca)",
        application_rate: "100-200 kg/ha",
        benefits: "Improves fruit quality, prevents blossom-end rot in tomatoes and peppers.",
        suitable_crops: &["Tomato", "Citrus", "Lettuce"],
        usage_tips: "Best applied in split doses throughout the growing season.",
    },
    FertilizerProfile {
        name: "Magnesium Sulfate (Epsom Salt)",
        nutrient_content: "16% Magnesium (Mg), 13% Sulfur (S)",
        application_rate: "30-50 kg/ha",
        benefits: "Helps in chlorophyll production and prevents magnesium deficiency, which causes yellowing of leaves.",
        suitable_crops: &["Potato", "Tomato", "Citrus", "Peppers"],
        usage_tips: "Apply as a foliar spray for quick uptake or mix into the soil for gradual release.",
    },
    FertilizerProfile {
        name: "Ammonium Sulfate",
        nutrient_content: "21% Nitrogen (N), 24% Sulfur (S)",
        application_rate: "50-150 kg/ha",
        benefits: "Reduces soil pH, providing both nitrogen and sulfur, which are essential for protein synthesis.",
        suitable_crops: &["Rice", "Wheat", "Cotton", "Corn"],
        usage_tips: "Apply during planting, especially in soils with high pH. Avoid excessive use on already acidic soils.",
    },
    FertilizerProfile {
        name: "Potassium Chloride (KCl)",
        nutrient_content: "60% Potassium (K2O)",
        application_rate: "50-200 kg/ha",
        benefits: "Supports root development, fruit quality, and disease resistance.",
        suitable_crops: &["Root vegetables", "Fruit crops", "Legumes"],
        usage_tips: "Ideal for soils with low potassium. Avoid high applications on saline soils.",
    },
    FertilizerProfile {
        name: "Monoammonium Phosphate (MAP)",
        nutrient_content: "11% Nitrogen (N), 52% Phosphorus (P2O5)",
        application_rate: "50-150 kg/ha",
        benefits: "High in phosphorus, promotes early root growth and seedling development.",
        suitable_crops: &["Corn", "Wheat", "Barley"],
        usage_tips: "Incorporate into soil at the time of planting to prevent phosphorus fixation.",
    },
    FertilizerProfile {
        name: "Single Superphosphate (SSP)",
        nutrient_content: "16% Phosphorus (P2O5), 12% Sulfur (S)",
        application_rate: "100-300 kg/ha",
        benefits: "Improves soil fertility and increases crop yield. Essential for legumes and pulses.",
        suitable_crops: &["Legumes", "Vegetables", "Forage crops"],
        usage_tips: "Apply before planting and mix well into the soil.",
    },
    FertilizerProfile {
        name: "Sulfur",
        nutrient_content: "90% Sulfur (S)",
        application_rate: "30-60 kg/ha",
        benefits: "Essential for protein synthesis and enzyme activity, improves crop flavor and oil content in oilseeds.",
        suitable_crops: &["Oilseeds", "Onion", "Garlic", "Brassicas"],
        usage_tips: "Can be applied as a soil amendment or foliar spray in crops needing high sulfur.",
    },
    FertilizerProfile {
        name: "Zinc Sulfate",
        nutrient_content: "36% Zinc (Zn)",
        application_rate: "20-50 kg/ha",
        benefits: "Essential for enzyme activation and hormone production, prevents stunted growth and leaf chlorosis.",
        suitable_crops: &["Corn", "Wheat", "Rice", "Citrus"],
        usage_tips: "Apply to soil or as a foliar spray when plants show signs of zinc deficiency.",
    },
    // Soil and climate amendments named by the rule-based recommender
    FertilizerProfile {
        name: "Gypsum",
        nutrient_content: "22% Calcium (Ca), 18% Sulfur (S)",
        application_rate: "100-200 kg/ha",
        benefits: "Reduces soil alkalinity and improves soil structure.",
        suitable_crops: &["Cotton", "Peanuts", "Corn", "Alfalfa", "Soybeans", "Wheat"],
        usage_tips: "Apply before planting; helps with soil permeability.",
    },
    FertilizerProfile {
        name: "Organic Matter (Compost)",
        nutrient_content: "Varies, rich in organic matter",
        application_rate: "1-2 tons/ha",
        benefits: "Improves water retention and nutrient availability.",
        suitable_crops: &["Watermelon", "Pumpkin", "Carrots", "Lettuce", "Tomatoes", "Cucumbers"],
        usage_tips: "Incorporate well into the soil before planting.",
    },
    FertilizerProfile {
        name: "Ammonium Nitrate",
        nutrient_content: "34% Nitrogen (N)",
        application_rate: "50-100 kg/ha",
        benefits: "Quick-release nitrogen, effective in colder temperatures.",
        suitable_crops: &["Wheat", "Barley", "Rye"],
        usage_tips: "Apply in early spring when temperatures are low.",
    },
    FertilizerProfile {
        name: "Slow-release NPK",
        nutrient_content: "20-20-20 (balanced slow-release)",
        application_rate: "50-150 kg/ha",
        benefits: "Slow nutrient release prevents burn in hot climates.",
        suitable_crops: &["Corn", "Soybeans", "Cotton"],
        usage_tips: "Apply to minimize nitrogen loss due to heat.",
    },
];

/// Profile for an exact fertilizer name
pub fn lookup(name: &str) -> Option<&'static FertilizerProfile> {
    CATALOG.iter().find(|profile| profile.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_exact() {
        assert_eq!(lookup("Urea").map(|p| p.nutrient_content), Some("46% Nitrogen (N)"));
        assert!(lookup("urea").is_none());
        assert!(lookup("14-35-14").is_none());
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = CATALOG.iter().map(|p| p.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CATALOG.len());
    }
}
