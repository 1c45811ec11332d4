// Feature pipeline, fitted-model lifecycle and inference
pub mod ml;
