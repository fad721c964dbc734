use serde::{Deserialize, Serialize};

/// Band inside the hard bounds where values are considered ordinary
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypicalRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl TypicalRange {
    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub const fn up_to(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }
}

/// Hard plausibility bounds for one measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub typical: Option<TypicalRange>,
}

impl ValidationRule {
    pub const fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            typical: None,
        }
    }

    pub fn with_typical(mut self, typical: TypicalRange) -> Self {
        self.typical = Some(typical);
        self
    }

    pub fn typical_range(&self) -> String {
        match self.typical {
            Some(TypicalRange {
                min: Some(min),
                max: Some(max),
            }) => format!("{}-{}", min, max),
            Some(TypicalRange {
                min: None,
                max: Some(max),
            }) => format!("<={}", max),
            Some(TypicalRange {
                min: Some(min),
                max: None,
            }) => format!(">={}", min),
            _ => String::from("any"),
        }
    }
}

/// Ordered field -> rule table. Iteration order is the order findings are
/// produced in, so it stays a list rather than a map.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    rules: Vec<(String, ValidationRule)>,
}

impl Default for RuleSet {
    fn default() -> Self {
        let rules = [
            (
                "thc_percentage",
                ValidationRule::new(0.0, 45.0).with_typical(TypicalRange::up_to(35.0)),
            ),
            (
                "cbd_percentage",
                ValidationRule::new(0.0, 30.0).with_typical(TypicalRange::up_to(25.0)),
            ),
            (
                "height_cm",
                ValidationRule::new(30.0, 300.0).with_typical(TypicalRange::between(60.0, 200.0)),
            ),
            (
                "flowering_days",
                ValidationRule::new(35.0, 120.0).with_typical(TypicalRange::between(49.0, 84.0)),
            ),
            (
                "yield_grams_per_m2",
                ValidationRule::new(50.0, 1000.0)
                    .with_typical(TypicalRange::between(300.0, 600.0)),
            ),
            ("sativa_percentage", ValidationRule::new(0.0, 100.0)),
            ("indica_percentage", ValidationRule::new(0.0, 100.0)),
            ("confidence_score", ValidationRule::new(1.0, 5.0)),
        ];

        Self {
            rules: rules
                .into_iter()
                .map(|(field, rule)| (field.to_string(), rule))
                .collect(),
        }
    }
}

impl RuleSet {
    /// Replaces the rule for `field` in place, or appends it when new
    pub fn with_rule(mut self, field: &str, rule: ValidationRule) -> Self {
        match self.rules.iter_mut().find(|(name, _)| name == field) {
            Some((_, existing)) => *existing = rule,
            None => self.rules.push((field.to_string(), rule)),
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&ValidationRule> {
        self.rules
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, rule)| rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidationRule)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Thresholds for the cross-field and batch-wide checks
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    /// Share of multiple-of-5 values above which a column looks invented
    pub round_number_ratio: f64,
    /// Duplicate check only runs on datasets with more rows than this
    pub duplicate_min_rows: usize,
    pub duplicate_rate: f64,
    /// Allowed |sativa + indica - 100|
    pub genetics_tolerance: f64,
    pub genetics_critical_deviation: f64,
    pub high_thc_max: f64,
    pub high_cbd_max: f64,
    /// Entries shown per section in the text report
    pub report_critical_limit: usize,
    pub report_impossible_limit: usize,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            round_number_ratio: 0.8,
            duplicate_min_rows: 100,
            duplicate_rate: 0.1,
            genetics_tolerance: 1.0,
            genetics_critical_deviation: 5.0,
            high_thc_max: 20.0,
            high_cbd_max: 15.0,
            report_critical_limit: 10,
            report_impossible_limit: 5,
        }
    }
}

/// Measurements whose `_min` column must not exceed the `_max` column
pub const RANGE_PAIRS: &[&str] = &[
    "thc_percentage",
    "cbd_percentage",
    "height_cm",
    "flowering_days",
    "yield_grams_per_m2",
];

/// Columns screened for invented-looking round numbers
pub const ROUND_NUMBER_COLUMNS: &[&str] = &[
    "thc_percentage_min",
    "thc_percentage_max",
    "cbd_percentage_min",
    "cbd_percentage_max",
];

/// Key used to spot repeated rows
pub const DUPLICATE_KEY_COLUMNS: &[&str] =
    &["thc_percentage_max", "cbd_percentage_max", "flowering_days_max"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_keeps_declared_order() {
        let rules = RuleSet::default();
        let fields: Vec<&str> = rules.iter().map(|(f, _)| f).collect();
        assert_eq!(
            fields,
            vec![
                "thc_percentage",
                "cbd_percentage",
                "height_cm",
                "flowering_days",
                "yield_grams_per_m2",
                "sativa_percentage",
                "indica_percentage",
                "confidence_score",
            ]
        );
    }

    #[test]
    fn override_keeps_position_and_new_rules_append() {
        let rules = RuleSet::default()
            .with_rule("height_cm", ValidationRule::new(10.0, 400.0))
            .with_rule("terpene_percentage", ValidationRule::new(0.0, 10.0));

        assert_eq!(rules.len(), 9);
        assert_eq!(rules.iter().nth(2).map(|(f, _)| f), Some("height_cm"));
        assert_eq!(rules.get("height_cm").unwrap().max, 400.0);
        assert_eq!(rules.iter().last().map(|(f, _)| f), Some("terpene_percentage"));
    }

    #[test]
    fn ranges_render_for_reports() {
        let rules = RuleSet::default();
        assert_eq!(rules.get("thc_percentage").unwrap().typical_range(), "<=35");
        assert_eq!(rules.get("height_cm").unwrap().typical_range(), "60-200");
        assert_eq!(rules.get("confidence_score").unwrap().typical_range(), "any");
    }

    #[test]
    fn partial_config_keeps_other_thresholds() {
        let config: OutlierConfig = toml::from_str("duplicate_rate = 0.25").unwrap();
        assert_eq!(config.duplicate_rate, 0.25);
        assert_eq!(config.round_number_ratio, 0.8);
        assert_eq!(config.report_critical_limit, 10);
    }
}
