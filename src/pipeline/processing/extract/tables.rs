use crate::app::ports::{DocumentNode, DocumentTree};
use crate::common::constants::{
    table_source, SPEC_TABLE_KEYWORDS, SPEC_TABLE_MIN_KEYWORDS, TABLE_FIELD_SYNONYMS,
};
use crate::domain::{PartialRecord, SourcedValue};

/// Reads (label, value) row pairs out of every specification table.
pub fn extract<D: DocumentTree>(doc: &D) -> PartialRecord {
    let mut data = PartialRecord::new();

    for (table_idx, table) in doc.find_by_tag(&["table"]).into_iter().enumerate() {
        if !is_specification_table(&table.text()) {
            continue;
        }

        for row in table.select("tr") {
            let cells = row.select("td, th");
            if cells.len() < 2 {
                continue;
            }

            let label = cells[0].text();
            let value = cells[1].text();
            if label.is_empty() || value.is_empty() {
                continue;
            }

            if let Some(field) = map_table_label(&label) {
                data.insert(
                    field.to_string(),
                    SourcedValue::new(value, table_source(table_idx + 1)),
                );
            }
        }
    }

    data
}

pub fn is_specification_table(table_text: &str) -> bool {
    let lower = table_text.to_lowercase();
    let hits = SPEC_TABLE_KEYWORDS
        .iter()
        .filter(|keyword| lower.contains(*keyword))
        .count();
    hits >= SPEC_TABLE_MIN_KEYWORDS
}

/// Canonical field for a table label; the first field whose synonym list
/// has a substring of the label wins.
pub fn map_table_label(label: &str) -> Option<&'static str> {
    let lower = label.trim().to_lowercase();
    TABLE_FIELD_SYNONYMS
        .iter()
        .find(|(_, synonyms)| synonyms.iter().any(|s| lower.contains(s)))
        .map(|(field, _)| *field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::html_document::HtmlDocument;

    #[test]
    fn labels_map_to_canonical_fields() {
        assert_eq!(map_table_label("THC Content"), Some("thc_content"));
        assert_eq!(map_table_label(" CBD % "), Some("cbd_content"));
        assert_eq!(map_table_label("Flowering Time"), Some("flowering_time"));
        assert_eq!(map_table_label("Plant Height"), Some("height"));
        assert_eq!(map_table_label("Indoor Yield"), Some("yield"));
        assert_eq!(map_table_label("Lineage"), Some("genetics"));
        assert_eq!(map_table_label("Aroma"), Some("flavors"));
        assert_eq!(map_table_label("Price"), None);
    }

    #[test]
    fn specification_table_needs_two_keywords() {
        assert!(is_specification_table("THC 20% Height tall"));
        assert!(!is_specification_table("THC 20% Price $10"));
    }

    #[test]
    fn only_qualifying_tables_contribute_and_keep_their_document_index() {
        let doc = HtmlDocument::parse(
            r#"<table><tr><td>Price</td><td>$40</td></tr><tr><td>Height</td><td>Tall</td></tr></table>
               <table>
                 <tr><th>THC</th><td>20%</td></tr>
                 <tr><th>Yield</th><td>500 g/m2</td></tr>
                 <tr><th>Notes</th></tr>
                 <tr><th>Effects</th><td></td></tr>
               </table>"#,
        );

        let data = extract(&doc);
        assert_eq!(data.len(), 2);
        assert_eq!(data["thc_content"], SourcedValue::new("20%", "Table 2"));
        assert_eq!(data["yield"].raw, "500 g/m2");
        assert!(!data.contains_key("height"));
    }
}
