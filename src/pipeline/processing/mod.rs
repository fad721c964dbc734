// Pipeline processing: extraction, normalization and outlier detection

pub mod extract;
pub mod normalize;
pub mod outliers;
