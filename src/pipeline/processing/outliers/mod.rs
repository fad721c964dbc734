//! Plausibility audit over a normalized batch.
//!
//! Row-level checks compare each value against hard and typical bounds and
//! look for contradictory field combinations. Batch-level checks look for
//! patterns that only show up across many rows (invented-looking round
//! numbers, repeated key tuples), so detection runs once the whole batch has
//! been normalized.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::observability::metrics;

pub mod dataset;
pub mod report;
pub mod rules;

pub use dataset::Dataset;
pub use report::{
    render_report, render_report_limited, OutlierFinding, OutlierReport, OutlierSummary, Severity,
    ViolationKind,
};
pub use rules::{OutlierConfig, RuleSet, TypicalRange, ValidationRule};

use rules::{DUPLICATE_KEY_COLUMNS, RANGE_PAIRS, ROUND_NUMBER_COLUMNS};

/// Rule-table outlier detector
#[derive(Debug, Clone, Default)]
pub struct OutlierDetector {
    pub rules: RuleSet,
    pub config: OutlierConfig,
}

impl OutlierDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OutlierConfig) -> Self {
        Self {
            rules: RuleSet::default(),
            config,
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn detect(&self, dataset: &Dataset) -> OutlierReport {
        let (critical_outliers, warnings) = self.check_bounds(dataset);
        let mut report = OutlierReport {
            critical_outliers,
            warnings,
            impossible_values: self.check_impossible_combinations(dataset),
            suspicious_patterns: self.check_suspicious_patterns(dataset),
            summary: OutlierSummary::default(),
        };
        report.summary = OutlierSummary::from_findings(dataset.len(), &report);

        for finding in report.all_findings() {
            metrics::outliers::finding_detected(
                finding.violation_type.as_str(),
                finding.severity.as_str(),
            );
        }
        metrics::outliers::dataset_audited(report.summary.data_quality_score);

        info!(
            "Audited {} records: {} findings ({} critical, {} warnings), {} suspicious patterns, quality {:.1}/100",
            report.summary.total_records,
            report.summary.total_outliers,
            report.summary.critical_outliers,
            report.summary.warnings,
            report.summary.suspicious_patterns,
            report.summary.data_quality_score
        );

        report
    }

    /// Text report using the configured section limits
    pub fn render(&self, report: &OutlierReport) -> String {
        render_report_limited(
            report,
            self.config.report_critical_limit,
            self.config.report_impossible_limit,
        )
    }

    /// Hard-bound violations and typical-band warnings, in rule order
    fn check_bounds(&self, dataset: &Dataset) -> (Vec<OutlierFinding>, Vec<OutlierFinding>) {
        let mut critical = Vec::new();
        let mut warnings = Vec::new();

        for (field, rule) in self.rules.iter() {
            let candidates = [format!("{}_min", field), format!("{}_max", field), field.to_string()];
            for column_name in candidates {
                let Some(column) = dataset.column(&column_name) else {
                    continue;
                };

                for (row, value) in column.iter().enumerate() {
                    let Some(value) = *value else { continue };
                    let strain = dataset.strain_name(row);

                    if value < rule.min {
                        critical.push(
                            OutlierFinding::for_row(row, strain, ViolationKind::BelowMinimum, Severity::Critical)
                                .with_field(&column_name, value)
                                .expecting(format!(">= {}", rule.min)),
                        );
                    } else if value > rule.max {
                        critical.push(
                            OutlierFinding::for_row(row, strain, ViolationKind::AboveMaximum, Severity::Critical)
                                .with_field(&column_name, value)
                                .expecting(format!("<= {}", rule.max)),
                        );
                    } else if let Some(kind) = typical_violation(value, rule.typical) {
                        warnings.push(
                            OutlierFinding::for_row(row, strain, kind, Severity::Warning)
                                .with_field(&column_name, value)
                                .expecting(format!("typical {}", rule.typical_range())),
                        );
                    }
                }
            }
        }

        (critical, warnings)
    }

    fn check_impossible_combinations(&self, dataset: &Dataset) -> Vec<OutlierFinding> {
        let mut findings = Vec::new();

        for field in RANGE_PAIRS {
            let min_name = format!("{}_min", field);
            let max_name = format!("{}_max", field);
            let (Some(mins), Some(maxes)) = (dataset.column(&min_name), dataset.column(&max_name))
            else {
                continue;
            };

            for (row, pair) in mins.iter().zip(maxes).enumerate() {
                if let (Some(min), Some(max)) = pair {
                    if min > max {
                        findings.push(
                            OutlierFinding::for_row(
                                row,
                                dataset.strain_name(row),
                                ViolationKind::MinGreaterThanMax,
                                Severity::Critical,
                            )
                            .with_field(&min_name, *min)
                            .with_field(&max_name, *max)
                            .expecting(format!("{} <= {}", min_name, max_name)),
                        );
                    }
                }
            }
        }

        findings.extend(self.check_genetics(dataset));
        findings.extend(self.check_high_thc_and_cbd(dataset));
        findings
    }

    fn check_genetics(&self, dataset: &Dataset) -> Vec<OutlierFinding> {
        let (Some(sativa), Some(indica)) = (
            dataset.column("sativa_percentage"),
            dataset.column("indica_percentage"),
        ) else {
            return Vec::new();
        };

        sativa
            .iter()
            .zip(indica)
            .enumerate()
            .filter_map(|(row, pair)| match pair {
                (Some(s), Some(i)) => Some((row, *s, *i)),
                _ => None,
            })
            .filter_map(|(row, s, i)| {
                let total = s + i;
                let deviation = (total - 100.0).abs();
                if deviation <= self.config.genetics_tolerance {
                    return None;
                }

                let severity = if deviation <= self.config.genetics_critical_deviation {
                    Severity::Warning
                } else {
                    Severity::Critical
                };
                Some(
                    OutlierFinding::for_row(
                        row,
                        dataset.strain_name(row),
                        ViolationKind::GeneticsNot100Percent,
                        severity,
                    )
                    .with_field("sativa_percentage", s)
                    .with_field("indica_percentage", i)
                    .expecting(format!("sativa + indica = 100 (+/- {})", self.config.genetics_tolerance))
                    .with_note(format!("total {}%", total)),
                )
            })
            .collect()
    }

    fn check_high_thc_and_cbd(&self, dataset: &Dataset) -> Vec<OutlierFinding> {
        let (Some(thc), Some(cbd)) = (
            dataset.column("thc_percentage_max"),
            dataset.column("cbd_percentage_max"),
        ) else {
            return Vec::new();
        };

        thc.iter()
            .zip(cbd)
            .enumerate()
            .filter_map(|(row, pair)| match pair {
                (Some(t), Some(c)) if *t > self.config.high_thc_max && *c > self.config.high_cbd_max => {
                    Some(
                        OutlierFinding::for_row(
                            row,
                            dataset.strain_name(row),
                            ViolationKind::HighThcAndCbd,
                            Severity::Warning,
                        )
                        .with_field("thc_percentage_max", *t)
                        .with_field("cbd_percentage_max", *c)
                        .expecting(format!(
                            "not both thc > {} and cbd > {}",
                            self.config.high_thc_max, self.config.high_cbd_max
                        ))
                        .with_note("Rare but possible, verify source data"),
                    )
                }
                _ => None,
            })
            .collect()
    }

    fn check_suspicious_patterns(&self, dataset: &Dataset) -> Vec<OutlierFinding> {
        let mut findings: Vec<OutlierFinding> = ROUND_NUMBER_COLUMNS
            .iter()
            .filter_map(|name| self.check_round_numbers(dataset, name))
            .collect();

        if let Some(finding) = self.check_duplicate_rate(dataset) {
            findings.push(finding);
        }
        findings
    }

    fn check_round_numbers(&self, dataset: &Dataset, name: &str) -> Option<OutlierFinding> {
        let values: Vec<f64> = dataset.column(name)?.iter().flatten().copied().collect();
        if values.is_empty() {
            return None;
        }

        let round = values.iter().filter(|v| *v % 5.0 == 0.0).count();
        let ratio = round as f64 / values.len() as f64;
        if ratio <= self.config.round_number_ratio {
            return None;
        }

        debug!("{} of {} values in {} are multiples of 5", round, values.len(), name);
        Some(
            OutlierFinding::for_batch(ViolationKind::TooManyRoundNumbers, Severity::Warning)
                .with_field(name, ratio * 100.0)
                .expecting(format!(
                    "at most {}% multiples of 5",
                    self.config.round_number_ratio * 100.0
                ))
                .with_note(format!(
                    "{:.1}% of {} values in {} are multiples of 5, which may indicate estimated data",
                    ratio * 100.0,
                    values.len(),
                    name
                )),
        )
    }

    fn check_duplicate_rate(&self, dataset: &Dataset) -> Option<OutlierFinding> {
        if dataset.len() <= self.config.duplicate_min_rows {
            return None;
        }

        let key_columns: Vec<(&str, &[Option<f64>])> = DUPLICATE_KEY_COLUMNS
            .iter()
            .filter_map(|name| dataset.column(name).map(|column| (*name, column)))
            .collect();
        if key_columns.len() < 2 {
            return None;
        }

        // Keys compare by bit pattern so missing values match each other.
        let keys: Vec<Vec<Option<u64>>> = (0..dataset.len())
            .map(|row| {
                key_columns
                    .iter()
                    .map(|(_, column)| column[row].map(f64::to_bits))
                    .collect()
            })
            .collect();

        let mut occurrences: HashMap<&[Option<u64>], usize> = HashMap::new();
        for key in &keys {
            *occurrences.entry(key.as_slice()).or_insert(0) += 1;
        }
        let duplicate_count = keys
            .iter()
            .filter(|key| occurrences.get(key.as_slice()).copied().unwrap_or(0) > 1)
            .count();

        if duplicate_count as f64 <= dataset.len() as f64 * self.config.duplicate_rate {
            return None;
        }

        let rate = duplicate_count as f64 / dataset.len() as f64 * 100.0;
        let mut finding = OutlierFinding::for_batch(ViolationKind::HighDuplicateRate, Severity::Warning)
            .expecting(format!(
                "at most {}% of rows sharing key values",
                self.config.duplicate_rate * 100.0
            ))
            .with_note(format!(
                "{} of {} rows ({:.1}%) share identical key values, which may indicate data quality issues",
                duplicate_count,
                dataset.len(),
                rate
            ));
        for (name, _) in &key_columns {
            finding.fields.push((*name).to_string());
        }
        finding.values.push(rate);
        Some(finding)
    }
}

fn typical_violation(value: f64, typical: Option<TypicalRange>) -> Option<ViolationKind> {
    let typical = typical?;
    if typical.min.is_some_and(|min| value < min) {
        Some(ViolationKind::BelowTypical)
    } else if typical.max.is_some_and(|max| value > max) {
        Some(ViolationKind::AboveTypical)
    } else {
        None
    }
}
