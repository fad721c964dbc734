use once_cell::sync::Lazy;
use regex::Regex;

use crate::common::constants::{PAGE_TITLE, STRUCTURED_NAME};
use crate::domain::BronzeRecord;

static TITLE_AFTER_DASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*-\s*.*$").expect("title dash pattern"));
static TITLE_PRODUCT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+(seeds?|feminized|auto).*$").expect("title suffix pattern"));
static PAGE_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(html?|php)$").expect("page extension pattern"));

pub const UNKNOWN_STRAIN: &str = "Unknown";

/// Human-readable cultivar name for a record: structured data first, then the
/// page title, then the last meaningful URL segment.
pub fn derive_strain_name(record: &BronzeRecord) -> String {
    record
        .raw(STRUCTURED_NAME)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .or_else(|| record.raw(PAGE_TITLE).and_then(name_from_title))
        .or_else(|| name_from_url(&record.source_url))
        .unwrap_or_else(|| UNKNOWN_STRAIN.to_string())
}

/// "Blue Dream Feminized Seeds - Shop" -> "Blue Dream"
pub fn name_from_title(title: &str) -> Option<String> {
    let without_dash = TITLE_AFTER_DASH.replace(title.trim(), "");
    let name = TITLE_PRODUCT_SUFFIX.replace(&without_dash, "");
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// "https://shop.example/strains/blue-dream.html" -> "Blue Dream"
pub fn name_from_url(url: &str) -> Option<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    // Only the path takes part; scheme and host never name a cultivar
    let path = match without_query.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, path)| path).unwrap_or(""),
        None => without_query,
    };
    path.rsplit('/')
        .find(|segment| segment.len() > 3)
        .map(|segment| PAGE_EXTENSION.replace(segment, ""))
        .map(|segment| title_case(&segment.replace(['-', '_'], " ")))
        .filter(|name| !name.trim().is_empty())
}

/// Upper-cases the first letter of every alphabetic run, lower-cases the rest
fn title_case(text: &str) -> String {
    let mut previous_alphabetic = false;
    text.chars()
        .map(|c| {
            let mapped: String = if previous_alphabetic {
                c.to_lowercase().collect()
            } else {
                c.to_uppercase().collect()
            };
            previous_alphabetic = c.is_alphabetic();
            mapped
        })
        .collect()
}
