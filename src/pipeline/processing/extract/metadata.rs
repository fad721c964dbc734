use serde_json::Value;
use tracing::debug;

use crate::app::ports::{DocumentNode, DocumentTree};
use crate::common::constants::{
    META_DESCRIPTION, PAGE_TITLE, SOURCE_JSON_LD, SOURCE_META_TAG, SOURCE_TITLE_TAG,
    STRUCTURED_DESCRIPTION, STRUCTURED_NAME,
};
use crate::domain::{PartialRecord, SourcedValue};

/// JSON-LD keys copied into `structured_*` fields
const JSON_LD_KEYS: &[(&str, &str)] = &[
    ("name", STRUCTURED_NAME),
    ("description", STRUCTURED_DESCRIPTION),
];

/// Reads the title tag, the description meta tag and embedded JSON-LD blocks.
pub fn extract<D: DocumentTree>(doc: &D) -> PartialRecord {
    let mut data = PartialRecord::new();

    let meta_description = doc
        .select(r#"meta[name="description"]"#)
        .into_iter()
        .next()
        .and_then(|meta| meta.attr("content"))
        .filter(|content| !content.is_empty());
    if let Some(content) = meta_description {
        data.insert(
            META_DESCRIPTION.to_string(),
            SourcedValue::new(content, SOURCE_META_TAG),
        );
    }

    if let Some(title) = doc.select("title").into_iter().next() {
        let text = title.text();
        if !text.is_empty() {
            data.insert(PAGE_TITLE.to_string(), SourcedValue::new(text, SOURCE_TITLE_TAG));
        }
    }

    for script in doc.select(r#"script[type="application/ld+json"]"#) {
        let body = script.raw_text();
        let structured: Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(e) => {
                debug!("Skipping unparsable JSON-LD block: {}", e);
                continue;
            }
        };

        let Some(object) = structured.as_object() else {
            continue;
        };

        for (key, field) in JSON_LD_KEYS {
            if let Some(value) = object.get(*key) {
                data.insert(
                    field.to_string(),
                    SourcedValue::new(json_text(value), SOURCE_JSON_LD),
                );
            }
        }
    }

    data
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::html_document::HtmlDocument;

    #[test]
    fn head_tags_and_json_ld_are_read() {
        let doc = HtmlDocument::parse(
            r#"<html><head>
                <title>Gelato Seeds - Shop</title>
                <meta name="description" content="Dessert hybrid">
                <script type="application/ld+json">{"@type": "Product", "name": "Gelato", "description": "Sweet"}</script>
                <script type="application/ld+json">{not json</script>
                <script type="application/ld+json">["array", "ignored"]</script>
            </head><body></body></html>"#,
        );

        let data = extract(&doc);
        assert_eq!(data["page_title"], SourcedValue::new("Gelato Seeds - Shop", "HTML title tag"));
        assert_eq!(data["meta_description"].raw, "Dessert hybrid");
        assert_eq!(data["meta_description"].source, "HTML meta tag");
        assert_eq!(data["structured_name"], SourcedValue::new("Gelato", "JSON-LD structured data"));
        assert_eq!(data["structured_description"].raw, "Sweet");
    }

    #[test]
    fn empty_meta_content_is_omitted() {
        let doc = HtmlDocument::parse(r#"<head><meta name="description" content=""></head>"#);
        assert!(extract(&doc).is_empty());
    }

    #[test]
    fn non_string_json_values_are_rendered_as_json() {
        let doc = HtmlDocument::parse(
            r#"<script type="application/ld+json">{"name": {"en": "Gelato"}}</script>"#,
        );
        assert_eq!(extract(&doc)["structured_name"].raw, r#"{"en":"Gelato"}"#);
    }
}
