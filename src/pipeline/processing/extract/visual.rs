use once_cell::sync::Lazy;
use regex::Regex;

use crate::app::ports::{DocumentNode, DocumentTree};
use crate::common::constants::{
    DIFFICULTY, RATING_VISUAL, SOURCE_IMAGE_ALT, SOURCE_VISUAL_ELEMENTS, SOURCE_VISUAL_INDICATOR,
};
use crate::domain::{PartialRecord, SourcedValue};

static RATING_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(star|rating|score)").expect("rating class pattern"));
static STAR_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)star").expect("star class pattern"));
static DIFFICULTY_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(difficulty|easy|hard|beginner)").expect("difficulty class pattern")
});

const RATING_TAGS: &[&str] = &["img", "span", "div"];

/// Describes rating widgets and difficulty badges as text.
pub fn extract<D: DocumentTree>(doc: &D) -> PartialRecord {
    let mut data = PartialRecord::new();

    // Later widgets overwrite earlier descriptions
    for element in doc.find_by_class(&RATING_CLASS) {
        if !RATING_TAGS.contains(&element.tag_name()) {
            continue;
        }

        if let Some(description) = describe_rating(&element) {
            data.insert(RATING_VISUAL.to_string(), description);
        }
    }

    let difficulty = doc
        .find_by_class(&DIFFICULTY_CLASS)
        .into_iter()
        .map(|element| element.text())
        .find(|text| !text.is_empty());
    if let Some(text) = difficulty {
        data.insert(
            DIFFICULTY.to_string(),
            SourcedValue::new(text, SOURCE_VISUAL_INDICATOR),
        );
    }

    data
}

fn describe_rating<'a, N: DocumentNode<'a>>(element: &N) -> Option<SourcedValue> {
    if element.tag_name() == "img" {
        let alt = element.attr("alt").unwrap_or("");
        let lower = alt.to_lowercase();
        if lower.contains("star") || lower.contains("rating") {
            return Some(SourcedValue::new(format!("[Image: {}]", alt), SOURCE_IMAGE_ALT));
        }
        return None;
    }

    let stars = element.find_by_class(&STAR_CLASS).len();
    if stars > 0 {
        Some(SourcedValue::new(
            format!("[Visual: {} star elements]", stars),
            SOURCE_VISUAL_ELEMENTS,
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::html_document::HtmlDocument;

    #[test]
    fn star_spans_are_counted() {
        let doc = HtmlDocument::parse(
            r#"<div class="product-rating"><i class="star"></i><i class="star"></i><i class="star half"></i></div>"#,
        );
        let data = extract(&doc);
        assert_eq!(data["rating_visual"].raw, "[Visual: 3 star elements]");
        assert_eq!(data["rating_visual"].source, "Visual elements");
    }

    #[test]
    fn image_alt_text_describes_rating() {
        let doc = HtmlDocument::parse(
            r#"<img class="rating-img" src="/r.png" alt="4.5 Stars"><img class="score" alt="logo">"#,
        );
        let data = extract(&doc);
        assert_eq!(data["rating_visual"].raw, "[Image: 4.5 Stars]");
        assert_eq!(data["rating_visual"].source, "Image alt text");
    }

    #[test]
    fn first_non_empty_difficulty_badge_wins() {
        let doc = HtmlDocument::parse(
            r#"<span class="difficulty-icon"></span><span class="grow-difficulty">Easy</span><span class="hard">Hard</span>"#,
        );
        let data = extract(&doc);
        assert_eq!(data["difficulty"], SourcedValue::new("Easy", "Visual indicator"));
        assert!(!data.contains_key("rating_visual"));
    }
}
