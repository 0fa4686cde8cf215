//! Category Lookup Tables
//!
//! Maps categorical inputs (soil, season, crop, duration) to the integer codes
//! the trained models were fitted with, and back again for display.
//!
//! Two kinds of table exist:
//! - Fixed dictionaries embedded below (crop model inputs and outputs)
//! - Label-encoder tables shipped inside a model artifact, where codes follow
//!   sorted label order starting at 0 (fertilizer model)

use rustc_hash::FxHashMap;

use crate::error::RecommendError;

/// Code returned for values missing from a table. Never fed to a model.
pub const UNKNOWN_CODE: i64 = -1;

/// How a raw value is normalised before lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCase {
    /// Compare as given (soil, season)
    Exact,
    /// Lower-case before lookup (crop names, durations)
    Lowercase,
}

/// Immutable name → code table with its inverse
#[derive(Debug, Clone)]
pub struct CategoryTable {
    field: &'static str,
    case: KeyCase,
    codes: FxHashMap<String, i64>,
    /// (code, label) sorted by code ascending
    labels: Vec<(i64, String)>,
}

impl CategoryTable {
    /// Build from fixed (label, code) pairs
    pub fn from_entries(field: &'static str, case: KeyCase, entries: &[(&str, i64)]) -> Self {
        let mut codes = FxHashMap::default();
        let mut labels = Vec::with_capacity(entries.len());

        for &(label, code) in entries {
            codes.insert(normalise(label, case), code);
            labels.push((code, label.to_string()));
        }
        labels.sort_by_key(|(code, _)| *code);

        Self { field, case, codes, labels }
    }

    /// Build with label-encoder semantics: labels sorted, de-duplicated, coded 0..n
    pub fn from_labels<S: AsRef<str>>(field: &'static str, case: KeyCase, labels: &[S]) -> Self {
        let mut sorted: Vec<&str> = labels.iter().map(|s| s.as_ref()).collect();
        sorted.sort_unstable();
        sorted.dedup();

        let entries: Vec<(&str, i64)> = sorted
            .into_iter()
            .enumerate()
            .map(|(idx, label)| (label, idx as i64))
            .collect();

        Self::from_entries(field, case, &entries)
    }

    /// Code for a value, or `UNKNOWN_CODE`
    pub fn code(&self, value: &str) -> i64 {
        self.codes
            .get(&normalise(value, self.case))
            .copied()
            .unwrap_or(UNKNOWN_CODE)
    }

    /// Code for a value, rejecting unknown values
    pub fn encode(&self, value: &str) -> Result<i64, RecommendError> {
        match self.code(value) {
            UNKNOWN_CODE => Err(RecommendError::UnknownCategory {
                field: self.field,
                value: value.to_string(),
            }),
            code => Ok(code),
        }
    }

    /// Original label for a code
    pub fn label(&self, code: i64) -> Option<&str> {
        self.labels
            .binary_search_by_key(&code, |(c, _)| *c)
            .ok()
            .map(|idx| self.labels[idx].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn normalise(value: &str, case: KeyCase) -> String {
    match case {
        KeyCase::Exact => value.to_string(),
        KeyCase::Lowercase => value.to_lowercase(),
    }
}

// ============================================================================
// EMBEDDED DICTIONARIES
// Codes are baked into the trained crop model; do not renumber.
// ============================================================================

static CROP_ENTRIES: &[(&str, i64)] = &[
    ("rice", 1), ("maize", 2), ("jute", 3), ("cotton", 4), ("coconut", 5),
    ("papaya", 6), ("orange", 7), ("apple", 8), ("muskmelon", 9), ("watermelon", 10),
    ("grapes", 11), ("mango", 12), ("banana", 13), ("pomegranate", 14),
    ("lentil", 15), ("blackgram", 16), ("mungbean", 17), ("mothbeans", 18),
    ("pigeonpeas", 19), ("kidneybeans", 20), ("chickpea", 21), ("coffee", 22),
    ("groundnut", 23), ("wheat", 24), ("onion", 25), ("barley", 26), ("clover", 27),
    ("oats", 28),
];

static SOIL_ENTRIES: &[(&str, i64)] = &[
    ("Clayey", 1), ("Sandy", 2), ("Loam", 3), ("Silty", 4), ("Peaty", 5),
    ("Saline", 6), ("Red", 7), ("Black", 8), ("Alluvial", 9),
];

static SEASON_ENTRIES: &[(&str, i64)] = &[
    ("Kharif", 1), ("Rabi", 2),
];

static DURATION_ENTRIES: &[(&str, i64)] = &[
    ("short", 0), ("long", 1),
];

/// Duration code used when a duration is anything other than "long"
pub const SHORT_DURATION: i64 = 0;

/// The fixed tables used by the crop and yield pipelines
#[derive(Debug, Clone)]
pub struct EncodingTables {
    pub crop: CategoryTable,
    pub soil: CategoryTable,
    pub season: CategoryTable,
    pub duration: CategoryTable,
}

impl EncodingTables {
    pub fn new() -> Self {
        Self {
            crop: CategoryTable::from_entries("crop", KeyCase::Lowercase, CROP_ENTRIES),
            soil: CategoryTable::from_entries("soil type", KeyCase::Exact, SOIL_ENTRIES),
            season: CategoryTable::from_entries("season", KeyCase::Exact, SEASON_ENTRIES),
            duration: CategoryTable::from_entries("duration", KeyCase::Lowercase, DURATION_ENTRIES),
        }
    }

    /// "long" → 1, anything else → 0
    pub fn duration_code(&self, value: &str) -> i64 {
        match self.duration.code(value) {
            UNKNOWN_CODE => SHORT_DURATION,
            code => code,
        }
    }
}

impl Default for EncodingTables {
    fn default() -> Self {
        Self::new()
    }
}
