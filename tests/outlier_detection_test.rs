use anyhow::Result;
use serde_json::json;

use cultivar_index::pipeline::processing::outliers::{
    render_report, Dataset, OutlierDetector, Severity, ViolationKind,
};

/// Four rows: two plausible, one impossible on almost every axis, one flat 20% THC
fn mixed_batch() -> Result<Dataset> {
    let rows = vec![
        json!({"strain_name": "Blue Dream", "thc_percentage_min": 18, "thc_percentage_max": 24,
               "cbd_percentage_min": 0.1, "cbd_percentage_max": 0.3, "height_cm_min": 120, "height_cm_max": 180,
               "flowering_days_min": 56, "flowering_days_max": 70, "sativa_percentage": 60,
               "indica_percentage": 40, "confidence_score": 4}),
        json!({"strain_name": "Impossible Strain", "thc_percentage_min": 60, "thc_percentage_max": 70,
               "cbd_percentage_min": 0.1, "cbd_percentage_max": 0.2, "height_cm_min": 500, "height_cm_max": 600,
               "flowering_days_min": 200, "flowering_days_max": 250, "sativa_percentage": 70,
               "indica_percentage": 20, "confidence_score": 2}),
        json!({"strain_name": "Normal Strain", "thc_percentage_min": 15, "thc_percentage_max": 20,
               "cbd_percentage_min": 1.0, "cbd_percentage_max": 2.0, "height_cm_min": 80, "height_cm_max": 120,
               "flowering_days_min": 49, "flowering_days_max": 63, "sativa_percentage": 50,
               "indica_percentage": 50, "confidence_score": 5}),
        json!({"strain_name": "Suspicious Strain", "thc_percentage_min": 20, "thc_percentage_max": 20,
               "cbd_percentage_min": 0.5, "cbd_percentage_max": 1.0, "height_cm_min": 100, "height_cm_max": 150,
               "flowering_days_min": 63, "flowering_days_max": 70, "sativa_percentage": 60,
               "indica_percentage": 40, "confidence_score": 3}),
    ];
    Ok(Dataset::from_json_rows(rows)?)
}

#[test]
fn impossible_row_is_reported_critical_in_rule_order() -> Result<()> {
    let report = OutlierDetector::new().detect(&mixed_batch()?);

    let fields: Vec<&str> = report
        .critical_outliers
        .iter()
        .map(|f| f.fields[0].as_str())
        .collect();
    assert_eq!(
        fields,
        vec![
            "thc_percentage_min",
            "thc_percentage_max",
            "height_cm_min",
            "height_cm_max",
            "flowering_days_min",
            "flowering_days_max",
        ]
    );
    assert!(report.critical_outliers.iter().all(|f| {
        f.violation_type == ViolationKind::AboveMaximum
            && f.severity == Severity::Critical
            && f.row_index == Some(1)
    }));
    assert!(report.warnings.is_empty());

    let genetics = &report.impossible_values[0];
    assert_eq!(genetics.violation_type, ViolationKind::GeneticsNot100Percent);
    assert_eq!(genetics.severity, Severity::Critical);
    assert_eq!(genetics.strain_name.as_deref(), Some("Impossible Strain"));
    assert_eq!(report.impossible_values.len(), 1);
    assert!(report.suspicious_patterns.is_empty());
    Ok(())
}

#[test]
fn summary_scores_the_batch_by_finding_count() -> Result<()> {
    let report = OutlierDetector::new().detect(&mixed_batch()?);
    let summary = &report.summary;

    assert_eq!(summary.total_records, 4);
    assert_eq!(summary.total_outliers, 7);
    assert_eq!(summary.critical_outliers, 7);
    assert_eq!(summary.warnings, 0);
    assert_eq!(summary.clean_records, 0);
    assert_eq!(summary.outlier_percentage, 175.0);
    assert_eq!(summary.data_quality_score, 0.0);
    Ok(())
}

#[test]
fn text_report_lists_counts_and_findings() -> Result<()> {
    let report = OutlierDetector::new().detect(&mixed_batch()?);
    let text = render_report(&report);

    assert!(text.contains("Total Records Analyzed: 4"));
    assert!(text.contains("Clean Records: 0 (0.0%)"));
    assert!(text.contains("Total Outliers: 7 (175.0%)"));
    assert!(text.contains("  - Critical: 7"));
    assert!(text.contains("Data Quality Score: 0.0/100"));
    assert!(text.contains("  - Impossible Strain: height_cm_min = 500 (above_maximum)"));
    assert!(text.contains("IMPOSSIBLE VALUE COMBINATIONS:\n  - Impossible Strain: genetics_not_100_percent"));
    assert!(!text.contains("SUSPICIOUS PATTERNS:"));
    assert!(!text.contains("more"));
    Ok(())
}

#[test]
fn report_serializes_with_snake_case_kinds() -> Result<()> {
    let report = OutlierDetector::new().detect(&mixed_batch()?);
    let value = serde_json::to_value(&report)?;

    assert_eq!(value["critical_outliers"][0]["violation_type"], "above_maximum");
    assert_eq!(value["critical_outliers"][0]["severity"], "critical");
    assert_eq!(value["impossible_values"][0]["values"], json!([70.0, 20.0]));
    assert_eq!(value["summary"]["clean_records"], 0);
    Ok(())
}

#[test]
fn extra_columns_are_checked_when_a_rule_exists() -> Result<()> {
    let dataset = Dataset::from_json_rows(vec![
        json!({"strain_name": "Heavy", "yield_grams_per_m2_min": 700, "yield_grams_per_m2_max": 650}),
        json!({"strain_name": "Light", "yield_grams_per_m2_min": 20}),
    ])?;
    let report = OutlierDetector::new().detect(&dataset);

    assert_eq!(report.warnings.len(), 2);
    assert!(report
        .warnings
        .iter()
        .all(|f| f.violation_type == ViolationKind::AboveTypical));
    assert_eq!(report.critical_outliers.len(), 1);
    assert_eq!(report.critical_outliers[0].violation_type, ViolationKind::BelowMinimum);
    assert_eq!(report.impossible_values[0].violation_type, ViolationKind::MinGreaterThanMax);
    Ok(())
}
