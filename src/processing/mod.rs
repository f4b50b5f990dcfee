//! Match scoring pipeline: normalization, factors, aggregation and explanations

pub mod aggregator;
pub mod analyzer;
pub mod bidirectional;
pub mod confidence;
pub mod context;
pub mod explanation;
pub mod factors;
pub mod learning_path;
pub mod mentions;
pub mod normalizer;
pub mod records;
pub mod skill_gap;
pub mod taxonomy;
pub mod text_processor;
