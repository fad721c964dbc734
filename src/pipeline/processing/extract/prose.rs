use once_cell::sync::Lazy;
use regex::Regex;

use crate::app::ports::{DocumentNode, DocumentTree};
use crate::common::constants::{
    CONTEXT_CATEGORIES, DESCRIPTION, DESCRIPTION_SELECTORS, SOURCE_DESCRIPTIONS,
    SOURCE_DESCRIPTION_CONTEXT,
};
use crate::domain::{PartialRecord, SourcedValue};

static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("sentence break pattern"));

/// Mines description blocks into `description_raw` plus the first sentence
/// mentioning each context category.
pub fn extract<D: DocumentTree>(doc: &D, min_len: usize) -> PartialRecord {
    let descriptions: Vec<String> = DESCRIPTION_SELECTORS
        .iter()
        .flat_map(|selector| doc.select(selector))
        .map(|element| element.text())
        .filter(|text| text.chars().count() > min_len)
        .collect();

    if descriptions.is_empty() {
        return PartialRecord::new();
    }

    let full_description = descriptions.join(" ");
    let mut data = contextual_mentions(&full_description);
    data.insert(
        DESCRIPTION.to_string(),
        SourcedValue::new(full_description, SOURCE_DESCRIPTIONS),
    );
    data
}

/// First sentence per category containing one of the category's keywords.
pub fn contextual_mentions(text: &str) -> PartialRecord {
    let sentences: Vec<&str> = SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    CONTEXT_CATEGORIES
        .iter()
        .filter_map(|(field, keywords)| {
            sentences
                .iter()
                .find(|sentence| {
                    let lower = sentence.to_lowercase();
                    keywords.iter().any(|keyword| lower.contains(keyword))
                })
                .map(|sentence| {
                    (
                        field.to_string(),
                        SourcedValue::new(*sentence, SOURCE_DESCRIPTION_CONTEXT),
                    )
                })
        })
        .collect()
}
