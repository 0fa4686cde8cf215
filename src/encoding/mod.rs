//! Categorical encoding and feature vector assembly

pub mod category_table;
pub mod encoder;

pub use category_table::{CategoryTable, EncodingTables, KeyCase, UNKNOWN_CODE};
pub use encoder::{
    crop_codes, encode_crop_request, encode_fertilizer_request, encode_yield_request, CropCodes,
    FeatureVector, CROP_FEATURES, FERTILIZER_FEATURES, YIELD_FEATURES,
};
