// Observability: stage metrics (logging setup lives in crate::logging)

pub mod metrics;
