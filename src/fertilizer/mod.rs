//! Fertilizer knowledge: catalog, ordered advice rules and stage schedules

pub mod catalog;
pub mod rules;
pub mod schedule;

pub use catalog::FertilizerProfile;
pub use rules::{RuleMatch, BALANCED_NPK};
pub use schedule::{FertilizerKind, GrowthStage, ScheduleAdvice};
