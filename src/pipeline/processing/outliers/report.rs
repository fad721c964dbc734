use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pipeline::processing::extract::naming::UNKNOWN_STRAIN;

/// Kind of plausibility problem a finding describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    BelowMinimum,
    AboveMaximum,
    BelowTypical,
    AboveTypical,
    MinGreaterThanMax,
    #[serde(rename = "genetics_not_100_percent")]
    GeneticsNot100Percent,
    HighThcAndCbd,
    TooManyRoundNumbers,
    HighDuplicateRate,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::BelowMinimum => "below_minimum",
            ViolationKind::AboveMaximum => "above_maximum",
            ViolationKind::BelowTypical => "below_typical",
            ViolationKind::AboveTypical => "above_typical",
            ViolationKind::MinGreaterThanMax => "min_greater_than_max",
            ViolationKind::GeneticsNot100Percent => "genetics_not_100_percent",
            ViolationKind::HighThcAndCbd => "high_thc_and_cbd",
            ViolationKind::TooManyRoundNumbers => "too_many_round_numbers",
            ViolationKind::HighDuplicateRate => "high_duplicate_rate",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single data-quality finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierFinding {
    /// Offending row; `None` for batch-wide patterns
    pub row_index: Option<usize>,
    pub strain_name: Option<String>,
    /// Columns involved, in the order their values appear in `values`
    pub fields: Vec<String>,
    pub values: Vec<f64>,
    pub violation_type: ViolationKind,
    pub severity: Severity,
    /// Human-readable bound or relationship that was violated
    pub expected: String,
    pub note: Option<String>,
}

impl OutlierFinding {
    pub fn for_row(
        row_index: usize,
        strain_name: Option<&str>,
        violation_type: ViolationKind,
        severity: Severity,
    ) -> Self {
        Self {
            row_index: Some(row_index),
            strain_name: Some(strain_name.unwrap_or(UNKNOWN_STRAIN).to_string()),
            fields: Vec::new(),
            values: Vec::new(),
            violation_type,
            severity,
            expected: String::new(),
            note: None,
        }
    }

    pub fn for_batch(violation_type: ViolationKind, severity: Severity) -> Self {
        Self {
            row_index: None,
            strain_name: None,
            fields: Vec::new(),
            values: Vec::new(),
            violation_type,
            severity,
            expected: String::new(),
            note: None,
        }
    }

    pub fn with_field(mut self, field: &str, value: f64) -> Self {
        self.fields.push(field.to_string());
        self.values.push(value);
        self
    }

    pub fn expecting(mut self, expected: impl Into<String>) -> Self {
        self.expected = expected.into();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    fn display_name(&self) -> &str {
        self.strain_name.as_deref().unwrap_or(UNKNOWN_STRAIN)
    }
}

/// Aggregate counts over the row-level findings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub total_records: usize,
    /// Row-level findings across the three row lists
    pub total_outliers: usize,
    pub critical_outliers: usize,
    pub warnings: usize,
    pub suspicious_patterns: usize,
    /// `total_records` minus `total_outliers`, floored at 0
    pub clean_records: usize,
    /// Row-level findings per record, as a percentage; exceeds 100 when
    /// records carry several findings
    pub outlier_percentage: f64,
    /// 100 minus `outlier_percentage`, floored at 0
    pub data_quality_score: f64,
}

impl OutlierSummary {
    pub fn from_findings(total_records: usize, report: &OutlierReport) -> Self {
        if total_records == 0 {
            return Self::default();
        }

        let row_findings: Vec<&OutlierFinding> = report.row_findings().collect();
        let outlier_percentage = row_findings.len() as f64 / total_records as f64 * 100.0;

        Self {
            total_records,
            total_outliers: row_findings.len(),
            critical_outliers: row_findings
                .iter()
                .filter(|f| f.severity == Severity::Critical)
                .count(),
            warnings: row_findings
                .iter()
                .filter(|f| f.severity == Severity::Warning)
                .count(),
            suspicious_patterns: report.suspicious_patterns.len(),
            clean_records: total_records.saturating_sub(row_findings.len()),
            outlier_percentage,
            data_quality_score: (100.0 - outlier_percentage).max(0.0),
        }
    }
}

/// Full detector output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    /// Hard-bound violations
    pub critical_outliers: Vec<OutlierFinding>,
    /// Values inside the hard bounds but outside the typical band
    pub warnings: Vec<OutlierFinding>,
    /// Cross-field contradictions
    pub impossible_values: Vec<OutlierFinding>,
    /// Batch-wide anomalies
    pub suspicious_patterns: Vec<OutlierFinding>,
    pub summary: OutlierSummary,
}

impl OutlierReport {
    pub fn row_findings(&self) -> impl Iterator<Item = &OutlierFinding> {
        self.critical_outliers
            .iter()
            .chain(self.warnings.iter())
            .chain(self.impossible_values.iter())
    }

    pub fn all_findings(&self) -> impl Iterator<Item = &OutlierFinding> {
        self.row_findings().chain(self.suspicious_patterns.iter())
    }

    pub fn is_clean(&self) -> bool {
        self.all_findings().next().is_none()
    }
}

pub const REPORT_HEADER: &str = "=== CULTIVAR DATA OUTLIER DETECTION REPORT ===";
pub const REPORT_FOOTER: &str = "=== END REPORT ===";

/// Renders the report with the default section limits (10 critical, 5 impossible).
pub fn render_report(report: &OutlierReport) -> String {
    render_report_limited(report, 10, 5)
}

pub fn render_report_limited(
    report: &OutlierReport,
    critical_limit: usize,
    impossible_limit: usize,
) -> String {
    let summary = &report.summary;
    let mut lines = vec![
        REPORT_HEADER.to_string(),
        String::new(),
        format!("Total Records Analyzed: {}", summary.total_records),
        format!(
            "Clean Records: {} ({:.1}%)",
            summary.clean_records,
            (100.0 - summary.outlier_percentage).max(0.0)
        ),
        format!(
            "Total Outliers: {} ({:.1}%)",
            summary.total_outliers, summary.outlier_percentage
        ),
        format!("  - Critical: {}", summary.critical_outliers),
        format!("  - Warnings: {}", summary.warnings),
        format!("Data Quality Score: {:.1}/100", summary.data_quality_score),
        String::new(),
    ];

    if !report.critical_outliers.is_empty() {
        lines.push("CRITICAL OUTLIERS (Impossible Values):".to_string());
        for finding in report.critical_outliers.iter().take(critical_limit) {
            let field = finding.fields.first().map(String::as_str).unwrap_or("Unknown");
            let value = finding
                .values
                .first()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            lines.push(format!(
                "  - {}: {} = {} ({})",
                finding.display_name(),
                field,
                value,
                finding.violation_type
            ));
        }
        push_truncation(&mut lines, report.critical_outliers.len(), critical_limit);
        lines.push(String::new());
    }

    if !report.impossible_values.is_empty() {
        lines.push("IMPOSSIBLE VALUE COMBINATIONS:".to_string());
        for finding in report.impossible_values.iter().take(impossible_limit) {
            lines.push(format!(
                "  - {}: {}",
                finding.display_name(),
                finding.violation_type
            ));
        }
        push_truncation(&mut lines, report.impossible_values.len(), impossible_limit);
        lines.push(String::new());
    }

    if !report.suspicious_patterns.is_empty() {
        lines.push("SUSPICIOUS PATTERNS:".to_string());
        for finding in &report.suspicious_patterns {
            lines.push(format!(
                "  - {}: {}",
                finding.violation_type,
                finding.note.as_deref().unwrap_or("")
            ));
        }
        lines.push(String::new());
    }

    lines.push(REPORT_FOOTER.to_string());
    lines.join("\n")
}

fn push_truncation(lines: &mut Vec<String>, total: usize, shown: usize) {
    if total > shown {
        lines.push(format!("  ... and {} more", total - shown));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound_finding(row: usize) -> OutlierFinding {
        OutlierFinding::for_row(
            row,
            Some("Impossible Strain"),
            ViolationKind::AboveMaximum,
            Severity::Critical,
        )
        .with_field("height_cm_max", 600.0)
        .expecting("30-300")
    }

    #[test]
    fn violation_kinds_serialize_to_wire_names() {
        let json = serde_json::to_string(&ViolationKind::GeneticsNot100Percent).unwrap();
        assert_eq!(json, "\"genetics_not_100_percent\"");
        let json = serde_json::to_string(&ViolationKind::MinGreaterThanMax).unwrap();
        assert_eq!(json, "\"min_greater_than_max\"");
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"warning\"");
    }

    #[test]
    fn summary_counts_every_row_finding() {
        let mut report = OutlierReport {
            critical_outliers: vec![bound_finding(1), bound_finding(1)],
            warnings: vec![OutlierFinding::for_row(
                2,
                None,
                ViolationKind::AboveTypical,
                Severity::Warning,
            )],
            ..Default::default()
        };
        report.suspicious_patterns.push(OutlierFinding::for_batch(
            ViolationKind::TooManyRoundNumbers,
            Severity::Warning,
        ));
        let summary = OutlierSummary::from_findings(4, &report);

        assert_eq!(summary.total_outliers, 3);
        assert_eq!(summary.critical_outliers, 2);
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.suspicious_patterns, 1);
        assert_eq!(summary.clean_records, 1);
        assert_eq!(summary.outlier_percentage, 75.0);
        assert_eq!(summary.data_quality_score, 25.0);
    }

    #[test]
    fn more_findings_than_records_floor_the_score() {
        let mut report = OutlierReport {
            critical_outliers: (0..7).map(|i| bound_finding(i % 4)).collect(),
            ..Default::default()
        };
        report.summary = OutlierSummary::from_findings(4, &report);

        assert_eq!(report.summary.total_outliers, 7);
        assert_eq!(report.summary.clean_records, 0);
        assert_eq!(report.summary.outlier_percentage, 175.0);
        assert_eq!(report.summary.data_quality_score, 0.0);

        let text = render_report(&report);
        assert!(text.contains("Clean Records: 0 (0.0%)"));
        assert!(text.contains("Total Outliers: 7 (175.0%)"));
        assert!(text.contains("Data Quality Score: 0.0/100"));
    }

    #[test]
    fn empty_dataset_summary_is_all_zero() {
        let summary = OutlierSummary::from_findings(0, &OutlierReport::default());
        assert_eq!(summary, OutlierSummary::default());
        assert_eq!(summary.data_quality_score, 0.0);
    }

    #[test]
    fn rendering_truncates_long_sections() {
        let mut report = OutlierReport {
            critical_outliers: (0..12).map(bound_finding).collect(),
            ..Default::default()
        };
        report.summary = OutlierSummary::from_findings(12, &report);
        let text = render_report(&report);

        assert!(text.starts_with(REPORT_HEADER));
        assert!(text.ends_with(REPORT_FOOTER));
        assert!(text.contains("Data Quality Score: 0.0/100"));
        assert!(text.contains("  - Impossible Strain: height_cm_max = 600 (above_maximum)"));
        assert_eq!(text.matches("(above_maximum)").count(), 10);
        assert!(text.contains("  ... and 2 more"));
        assert!(!text.contains("IMPOSSIBLE VALUE COMBINATIONS:"));
    }

    #[test]
    fn suspicious_patterns_print_their_notes() {
        let mut report = OutlierReport::default();
        report.suspicious_patterns.push(
            OutlierFinding::for_batch(ViolationKind::HighDuplicateRate, Severity::Warning)
                .with_note("40 of 120 rows share key values"),
        );
        let text = render_report(&report);
        assert!(text.contains("SUSPICIOUS PATTERNS:"));
        assert!(text.contains("  - high_duplicate_rate: 40 of 120 rows share key values"));
    }
}
