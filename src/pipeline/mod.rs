// Document processing pipeline: bronze extraction, gold normalization, batch audit

pub mod processing;

pub use processing::{extract, normalize, outliers};
