//! Bronze-to-gold normalization.
//!
//! Pure functions of the bronze record and the static rule tables: verbatim
//! text becomes numeric ranges, standardized labels and a confidence score.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::common::constants::{
    CBD_CONTENT, CONFIDENCE_WEIGHTS, EFFECTS, EFFECT_LABELS, FLAVORS, FLAVOR_LABELS,
    FLOWERING_TIME, GENETICS, HEIGHT, THC_CONTENT,
};
use crate::common::units;
use crate::domain::{BronzeRecord, GoldRecord};
use crate::observability::metrics;

static CM_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*-?\s*(\d+(?:\.\d+)?)?\s*cm").expect("cm pattern")
});
static FEET_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*-?\s*(\d+(?:\.\d+)?)?\s*(?:feet|ft)").expect("feet pattern")
});
static WEEK_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*-?\s*(\d+)?\s*(?:weeks?|wks?)").expect("week pattern"));
static DAY_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*-?\s*(\d+)?\s*days?").expect("day pattern"));
static PERCENT_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*-?\s*(\d+(?:\.\d+)?)?\s*%").expect("percent pattern")
});
static SATIVA_SHARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*%\s*sativa").expect("sativa pattern"));
static INDICA_SHARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*%\s*indica").expect("indica pattern"));

/// Which end of a captured range to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

/// A captured "a" or "a-b" measurement before bound selection
#[derive(Debug, Clone, Copy, PartialEq)]
struct Captured<T> {
    first: T,
    second: Option<T>,
}

impl<T: Copy> Captured<T> {
    /// Max asks for the second number when there is one; everything else gets the first
    fn pick(self, bound: Bound) -> T {
        match (bound, self.second) {
            (Bound::Max, Some(second)) => second,
            _ => self.first,
        }
    }

    fn map<U>(self, f: impl Fn(T) -> U) -> Captured<U> {
        Captured {
            first: f(self.first),
            second: self.second.map(f),
        }
    }
}

fn capture<T: std::str::FromStr>(pattern: &Regex, text: &str) -> Option<Captured<T>> {
    let caps = pattern.captures(text)?;
    let first = caps.get(1)?.as_str().parse().ok()?;
    let second = caps.get(2).and_then(|m| m.as_str().parse().ok());
    Some(Captured { first, second })
}

/// Trait for turning bronze records into gold records
pub trait Normalizer {
    fn normalize(&self, bronze: &BronzeRecord) -> GoldRecord;
}

/// Rule-table normalizer used by the pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNormalizer;

impl DefaultNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, bronze: &BronzeRecord) -> GoldRecord {
        let height = bronze.raw(HEIGHT);
        let flowering = bronze.raw(FLOWERING_TIME);
        let thc = bronze.raw(THC_CONTENT);
        let cbd = bronze.raw(CBD_CONTENT);
        let genetics = bronze.raw(GENETICS);

        let gold = GoldRecord {
            height_cm_min: height.and_then(|t| height_cm(t, Bound::Min)),
            height_cm_max: height.and_then(|t| height_cm(t, Bound::Max)),
            flowering_days_min: flowering.and_then(|t| flowering_days(t, Bound::Min)),
            flowering_days_max: flowering.and_then(|t| flowering_days(t, Bound::Max)),
            thc_percentage_min: thc.and_then(|t| percentage(t, Bound::Min)),
            thc_percentage_max: thc.and_then(|t| percentage(t, Bound::Max)),
            cbd_percentage_min: cbd.and_then(|t| percentage(t, Bound::Min)),
            cbd_percentage_max: cbd.and_then(|t| percentage(t, Bound::Max)),
            sativa_percentage: genetics.and_then(sativa_percentage),
            indica_percentage: genetics.and_then(indica_percentage),
            effects_standardized: bronze.raw(EFFECTS).and_then(|t| standardize(t, EFFECT_LABELS)),
            flavors_standardized: bronze.raw(FLAVORS).and_then(|t| standardize(t, FLAVOR_LABELS)),
            confidence_score: confidence_score(bronze),
        };

        report_misses(bronze, &gold);
        metrics::normalize::record_normalized(gold.confidence_score);
        gold
    }
}

/// Raw text present but nothing numeric recovered
fn report_misses(bronze: &BronzeRecord, gold: &GoldRecord) {
    let misses = [
        (HEIGHT, gold.height_cm_min.is_none()),
        (FLOWERING_TIME, gold.flowering_days_min.is_none()),
        (THC_CONTENT, gold.thc_percentage_min.is_none()),
        (CBD_CONTENT, gold.cbd_percentage_min.is_none()),
        (
            GENETICS,
            gold.sativa_percentage.is_none() && gold.indica_percentage.is_none(),
        ),
    ];

    for (field, missing) in misses {
        if missing && bronze.raw(field).is_some() {
            debug!("No numeric value recovered for {} in {}", field, bronze.source_url);
            metrics::normalize::field_missing(field);
        }
    }
}

/// Height in cm: qualitative bucket, then a cm measurement, then feet converted.
pub fn height_cm(text: &str, bound: Bound) -> Option<f64> {
    if let Some(cm) = units::qualitative_height_cm(text) {
        return Some(cm);
    }

    capture::<f64>(&CM_RANGE, text)
        .or_else(|| capture::<f64>(&FEET_RANGE, text).map(|feet| feet.map(units::feet_to_cm)))
        .map(|range| range.pick(bound))
}

/// Flowering duration in days: weeks first (converted), then days.
pub fn flowering_days(text: &str, bound: Bound) -> Option<u32> {
    capture::<u32>(&WEEK_RANGE, text)
        .map(|weeks| weeks.map(units::weeks_to_days))
        .or_else(|| capture::<u32>(&DAY_RANGE, text))
        .map(|range| range.pick(bound))
}

pub fn percentage(text: &str, bound: Bound) -> Option<f64> {
    capture::<f64>(&PERCENT_RANGE, text).map(|range| range.pick(bound))
}

fn genetics_share(text: &str, pattern: &Regex) -> Option<u32> {
    pattern.captures(text)?.get(1)?.as_str().parse().ok()
}

fn sativa_percentage(text: &str) -> Option<u32> {
    genetics_share(text, &SATIVA_SHARE)
}

fn indica_percentage(text: &str) -> Option<u32> {
    genetics_share(text, &INDICA_SHARE)
}

/// Canonical labels whose keyword occurs in `text`, in table order, joined by ", "
pub fn standardize(text: &str, table: &[(&str, &str)]) -> Option<String> {
    let lower = text.to_lowercase();
    let labels: Vec<&str> = table
        .iter()
        .filter(|(keyword, _)| lower.contains(keyword))
        .map(|(_, label)| *label)
        .collect();

    if labels.is_empty() {
        None
    } else {
        Some(labels.join(", "))
    }
}

/// Share (0-100) of the weighted key fields carrying more than two characters
pub fn confidence_percentage(bronze: &BronzeRecord) -> f64 {
    let total: u32 = CONFIDENCE_WEIGHTS.iter().map(|(_, weight)| weight).sum();
    let present: u32 = CONFIDENCE_WEIGHTS
        .iter()
        .filter(|(field, _)| {
            bronze
                .raw(field)
                .map(|raw| raw.trim().chars().count() > 2)
                .unwrap_or(false)
        })
        .map(|(_, weight)| weight)
        .sum();

    f64::from(present) / f64::from(total) * 100.0
}

/// Boundaries belong to the higher bucket
pub fn confidence_bucket(percentage: f64) -> u8 {
    match percentage {
        p if p >= 90.0 => 5,
        p if p >= 70.0 => 4,
        p if p >= 50.0 => 3,
        p if p >= 30.0 => 2,
        _ => 1,
    }
}

pub fn confidence_score(bronze: &BronzeRecord) -> u8 {
    confidence_bucket(confidence_percentage(bronze))
}
