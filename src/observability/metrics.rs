//! Stage metrics for the extraction pipeline
//!
//! Thin wrappers over the `metrics` facade using Prometheus naming
//! conventions. Nothing is exported unless the host installs a recorder.

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Extract metrics
    ExtractDocumentsProcessed,
    ExtractStrategyHits,
    ExtractFieldsExtracted,

    // Normalize metrics
    NormalizeRecordsProcessed,
    NormalizeConfidence,
    NormalizeFieldsMissing,

    // Outlier metrics
    OutliersDatasetsAudited,
    OutliersFindings,
    OutliersQualityScore,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::ExtractDocumentsProcessed => "cultivar_extract_documents_processed_total",
            MetricName::ExtractStrategyHits => "cultivar_extract_strategy_hits_total",
            MetricName::ExtractFieldsExtracted => "cultivar_extract_fields_extracted",

            MetricName::NormalizeRecordsProcessed => "cultivar_normalize_records_processed_total",
            MetricName::NormalizeConfidence => "cultivar_normalize_confidence_score",
            MetricName::NormalizeFieldsMissing => "cultivar_normalize_fields_missing_total",

            MetricName::OutliersDatasetsAudited => "cultivar_outliers_datasets_audited_total",
            MetricName::OutliersFindings => "cultivar_outliers_findings_total",
            MetricName::OutliersQualityScore => "cultivar_outliers_quality_score",
        }
    }
}

impl std::fmt::Display for MetricName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod extract {
    use super::MetricName;

    /// Record that a document went through every extraction strategy
    pub fn document_processed(fields: usize) {
        ::metrics::counter!(MetricName::ExtractDocumentsProcessed.as_str()).increment(1);
        ::metrics::histogram!(MetricName::ExtractFieldsExtracted.as_str()).record(fields as f64);
    }

    /// Record that a strategy produced at least one field
    pub fn strategy_hit(strategy: &'static str) {
        ::metrics::counter!(MetricName::ExtractStrategyHits.as_str(), "strategy" => strategy)
            .increment(1);
    }
}

pub mod normalize {
    use super::MetricName;

    pub fn record_normalized(confidence_score: u8) {
        ::metrics::counter!(MetricName::NormalizeRecordsProcessed.as_str()).increment(1);
        ::metrics::histogram!(MetricName::NormalizeConfidence.as_str())
            .record(f64::from(confidence_score));
    }

    /// Raw text was present but matched no numeric pattern
    pub fn field_missing(field: &'static str) {
        ::metrics::counter!(MetricName::NormalizeFieldsMissing.as_str(), "field" => field)
            .increment(1);
    }
}

pub mod outliers {
    use super::MetricName;

    pub fn dataset_audited(quality_score: f64) {
        ::metrics::counter!(MetricName::OutliersDatasetsAudited.as_str()).increment(1);
        ::metrics::histogram!(MetricName::OutliersQualityScore.as_str()).record(quality_score);
    }

    pub fn finding_detected(violation_type: &'static str, severity: &'static str) {
        ::metrics::counter!(
            MetricName::OutliersFindings.as_str(),
            "violation_type" => violation_type,
            "severity" => severity
        )
        .increment(1);
    }
}
