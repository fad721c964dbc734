//! Unit conversion constants and descriptive-to-numeric mappings.

/// 2.54 cm per inch, 12 inches per foot
pub const FEET_TO_CM: f64 = 2.54 * 12.0;
pub const WEEKS_TO_DAYS: u32 = 7;

/// Qualitative height buckets in cm, checked in this order
pub const HEIGHT_BUCKETS_CM: &[(&str, f64)] = &[("short", 80.0), ("medium", 120.0), ("tall", 180.0)];

pub fn feet_to_cm(feet: f64) -> f64 {
    feet * FEET_TO_CM
}

pub fn weeks_to_days(weeks: u32) -> u32 {
    weeks.saturating_mul(WEEKS_TO_DAYS)
}

/// Fixed cm value for the first qualitative term found in `text`.
pub fn qualitative_height_cm(text: &str) -> Option<f64> {
    let lower = text.to_lowercase();
    HEIGHT_BUCKETS_CM
        .iter()
        .find(|(term, _)| lower.contains(term))
        .map(|(_, cm)| *cm)
}
