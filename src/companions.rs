//! Multi-crop companion plans
//!
//! Intercropping suggestions for a main crop: what to grow alongside it,
//! at what spacing, and how to irrigate the combination.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompanionPlan {
    pub main_crop: &'static str,
    pub companions: &'static [&'static str],
    pub spacing_main: &'static str,
    pub spacing_companion: &'static str,
    pub benefits: &'static str,
    pub irrigation: &'static str,
}

static PLANS: &[CompanionPlan] = &[
    CompanionPlan {
        main_crop: "Rice",
        companions: &["Azolla (green manure)", "Fish (Integrated farming)"],
        spacing_main: "20x15 cm",
        spacing_companion: "Continuous cover / 1 fish per 2 sq.m",
        benefits: "Nitrogen fixation, additional protein source, pest control",
        irrigation: "Maintain 5-7 cm water depth, drain before harvest",
    },
    CompanionPlan {
        main_crop: "Maize",
        companions: &["Beans", "Pumpkin", "Squash"],
        spacing_main: "60x25 cm",
        spacing_companion: "Beans: between rows, Pumpkin: 2m apart at field edges",
        benefits: "Three Sisters method - nitrogen fixation, ground cover, vertical space use",
        irrigation: "Drip irrigation every 3-4 days, 2-3 L per plant",
    },
    CompanionPlan {
        main_crop: "Sugarcane",
        companions: &["Onion", "Garlic", "Coriander", "Potato"],
        spacing_main: "90x45 cm",
        spacing_companion: "Inter-row planting at 15cm spacing",
        benefits: "Early income, weed suppression, efficient land use",
        irrigation: "Furrow irrigation weekly, companions benefit from residual moisture",
    },
    CompanionPlan {
        main_crop: "Cotton",
        companions: &["Groundnut", "Soybean", "Black gram"],
        spacing_main: "90x60 cm",
        spacing_companion: "30x10 cm between cotton rows",
        benefits: "Nitrogen fixation, soil health, additional oil/pulse income",
        irrigation: "Alternate row irrigation, 5-7 day interval",
    },
    CompanionPlan {
        main_crop: "Tomato",
        companions: &["Basil", "Marigold", "Carrot", "Onion"],
        spacing_main: "60x45 cm",
        spacing_companion: "Basil: 30cm from tomato, Marigold: border planting",
        benefits: "Pest repellent, pollinator attraction, flavor enhancement",
        irrigation: "Drip irrigation daily, 1.5-2 L per plant",
    },
    CompanionPlan {
        main_crop: "Wheat",
        companions: &["Mustard", "Chickpea", "Lentil"],
        spacing_main: "22.5 cm row spacing",
        spacing_companion: "Every 4th row or border planting",
        benefits: "Additional oilseed/pulse crop, biodiversity, risk distribution",
        irrigation: "Flood irrigation at critical stages (CRI, jointing, flowering)",
    },
    CompanionPlan {
        main_crop: "Potato",
        companions: &["Beans", "Cabbage", "Marigold", "Horseradish"],
        spacing_main: "60x20 cm",
        spacing_companion: "Beans in alternate rows, Marigold as border",
        benefits: "Pest deterrent, space optimization, soil nitrogen",
        irrigation: "Ridge irrigation every 7-10 days, avoid waterlogging",
    },
    CompanionPlan {
        main_crop: "Groundnut",
        companions: &["Sunflower", "Maize", "Sorghum"],
        spacing_main: "30x10 cm",
        spacing_companion: "Tall crops at 2:6 or 2:8 row ratio",
        benefits: "Windbreak, additional oilseed income, erosion control",
        irrigation: "Sprinkler or drip, maintain soil moisture 50-60%",
    },
    CompanionPlan {
        main_crop: "Onion",
        companions: &["Carrot", "Lettuce", "Beet", "Tomato"],
        spacing_main: "15x10 cm",
        spacing_companion: "Alternating beds or rows",
        benefits: "Pest confusion, efficient space use, harvest timing diversity",
        irrigation: "Light frequent irrigation, drip preferred",
    },
    CompanionPlan {
        main_crop: "Cabbage",
        companions: &["Celery", "Onion", "Dill", "Chamomile"],
        spacing_main: "45x45 cm",
        spacing_companion: "Border and inter-row planting",
        benefits: "Pest repellent, beneficial insect attraction",
        irrigation: "Consistent moisture, drip or sprinkler every 2-3 days",
    },
];

/// Companion plan for a main crop (case-insensitive)
pub fn companion_plan(main_crop: &str) -> Option<&'static CompanionPlan> {
    let wanted = main_crop.trim();
    PLANS.iter().find(|plan| plan.main_crop.eq_ignore_ascii_case(wanted))
}

/// Main crops that have a plan, in table order
pub fn main_crops() -> impl Iterator<Item = &'static str> {
    PLANS.iter().map(|plan| plan.main_crop)
}
