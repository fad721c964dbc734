use once_cell::sync::Lazy;
use regex::Regex;

use crate::app::ports::DocumentTree;
use crate::common::constants::{
    CBD_CONTENT, FLOWERING_TIME, GENETICS, HEIGHT, SOURCE_PATTERN, THC_CONTENT, YIELD,
};
use crate::domain::{PartialRecord, SourcedValue};

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?im){}", p)).expect("static field pattern"))
        .collect()
}

/// Ordered expressions per field; the first expression with a usable capture wins.
static FIELD_PATTERNS: Lazy<Vec<(&'static str, Vec<Regex>)>> = Lazy::new(|| {
    vec![
        (
            THC_CONTENT,
            compile(&[
                r"THC:?\s*([^\n\.]+?)(?:\.|\n|$)",
                r"THC\s*(?:content|level|percentage)?:?\s*([^\n\.]+?)(?:\.|\n|$)",
                r"([0-9]+(?:\.[0-9]+)?(?:\s*-\s*[0-9]+(?:\.[0-9]+)?)?\s*%\s*THC)",
            ]),
        ),
        (
            CBD_CONTENT,
            compile(&[
                r"CBD:?\s*([^\n\.]+?)(?:\.|\n|$)",
                r"CBD\s*(?:content|level|percentage)?:?\s*([^\n\.]+?)(?:\.|\n|$)",
                r"([0-9]+(?:\.[0-9]+)?(?:\s*-\s*[0-9]+(?:\.[0-9]+)?)?\s*%\s*CBD)",
            ]),
        ),
        (
            FLOWERING_TIME,
            compile(&[
                r"(?:flowering|flower)\s+(?:time|period):?\s*([^\n\.]+?)(?:\.|\n|$)",
                r"(?:blooms?|flowers?)\s+(?:in|for|after)\s*([^\n\.]+?)(?:\.|\n|$)",
                r"([0-9]+(?:\s*-\s*[0-9]+)?\s*(?:weeks?|days?|wks?)\s*(?:flowering|flower|bloom))",
            ]),
        ),
        (
            HEIGHT,
            compile(&[
                r"(?:height|tall|grows?):?\s*([^\n\.]+?)(?:\.|\n|$)",
                r"(?:reaches|up to|grows to)\s*([^\n\.]+?)(?:\.|\n|$)",
                r"([0-9]+(?:\s*-\s*[0-9]+)?\s*(?:cm|feet?|ft|inches?|in)\s*(?:tall|high|height))",
            ]),
        ),
        (
            YIELD,
            compile(&[
                r"(?:yield|harvest|produces?):?\s*([^\n\.]+?)(?:\.|\n|$)",
                r"(?:up to|around|approximately)\s*([^\n\.]+?)(?:\.|\n|$)",
                r"([0-9]+(?:\s*-\s*[0-9]+)?\s*(?:g|grams?|oz|ounces?)\s*(?:per|/|m2|plant))",
            ]),
        ),
        (
            GENETICS,
            compile(&[
                r"(?:genetics|lineage|cross|bred from):?\s*([^\n\.]+?)(?:\.|\n|$)",
                r"([0-9]+\s*%\s*(?:sativa|indica)(?:\s*[^\n\.]*?)?)(?:\.|\n|$)",
                r"(?:hybrid|cross)\s+(?:of|between)\s*([^\n\.]+?)(?:\.|\n|$)",
            ]),
        ),
    ]
});

/// Runs the per-field expression lists against the visible page text.
pub fn extract<D: DocumentTree>(doc: &D) -> PartialRecord {
    extract_from_text(&doc.text())
}

pub fn extract_from_text(page_text: &str) -> PartialRecord {
    FIELD_PATTERNS
        .iter()
        .filter_map(|(field, patterns)| {
            first_capture(patterns, page_text)
                .map(|value| (field.to_string(), SourcedValue::new(value, SOURCE_PATTERN)))
        })
        .collect()
}

/// Trimmed first capture group of the earliest pattern that yields a non-blank one.
/// Later patterns are never evaluated once an earlier one succeeds.
pub fn first_capture<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns.iter().find_map(|pattern| {
        pattern.captures_iter(text).find_map(|caps| {
            caps.get(1)
                .map(|m| m.as_str().trim())
                .filter(|value| !value.is_empty())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_expression_with_a_match_wins() {
        let data = extract_from_text("Lab tested. THC: 22% and rising\nCBD 1%");
        assert_eq!(data["thc_content"].raw, "22% and rising");
        assert_eq!(data["cbd_content"].raw, "1%");
        assert_eq!(data["thc_content"].source, "Pattern matching");
    }

    #[test]
    fn later_expressions_are_fallbacks() {
        let data = extract_from_text("Harvest after it blooms in 8-9 weeks\nMostly 70% Sativa");
        assert_eq!(data["flowering_time"].raw, "8-9 weeks");
        assert_eq!(data["genetics"].raw, "70% Sativa");
    }

    #[test]
    fn percent_then_marker_pattern_catches_reversed_order() {
        let data = extract_from_text("Potent at 18-20 % THC");
        assert_eq!(data["thc_content"].raw, "18-20 % THC");
    }

    #[test]
    fn nothing_found_leaves_fields_absent() {
        assert!(extract_from_text("Nothing useful on this page").is_empty());
    }
}
