//! Multi-strategy fact extraction (bronze layer).
//!
//! Strategies run in a fixed order and each one's output is merged over the
//! accumulated record, so a later strategy replaces an earlier value for the
//! same field: tables, prose, patterns, visual indicators, metadata.

pub mod links;
pub mod metadata;
pub mod naming;
pub mod patterns;
pub mod prose;
pub mod tables;
pub mod visual;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::ports::DocumentTree;
use crate::config::ExtractionConfig;
use crate::domain::{BronzeRecord, PartialRecord};
use crate::observability::metrics;

pub use links::discover_strain_urls;
pub use naming::derive_strain_name;

/// Per-category counters: how many documents each strategy contributed to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub documents_processed: u64,
    pub tables_found: u64,
    pub descriptions_found: u64,
    pub patterns_matched: u64,
    pub images_processed: u64,
    pub metadata_found: u64,
}

impl ExtractionStats {
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.documents_processed += other.documents_processed;
        self.tables_found += other.tables_found;
        self.descriptions_found += other.descriptions_found;
        self.patterns_matched += other.patterns_matched;
        self.images_processed += other.images_processed;
        self.metadata_found += other.metadata_found;
    }
}

/// A bronze record together with the counters produced while extracting it
#[derive(Debug, Clone)]
pub struct Extraction {
    pub record: BronzeRecord,
    pub stats: ExtractionStats,
}

#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractionConfig,
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn extract<D: DocumentTree>(&self, doc: &D, source_url: &str) -> Extraction {
        let mut stats = ExtractionStats::default();
        let record = self.extract_into(doc, source_url, &mut stats);
        Extraction { record, stats }
    }

    /// Extracts one document, adding its counters to `stats`.
    pub fn extract_into<D: DocumentTree>(
        &self,
        doc: &D,
        source_url: &str,
        stats: &mut ExtractionStats,
    ) -> BronzeRecord {
        let mut fields = PartialRecord::new();

        merge(&mut fields, tables::extract(doc), &mut stats.tables_found, "tables");
        merge(
            &mut fields,
            prose::extract(doc, self.config.min_description_len),
            &mut stats.descriptions_found,
            "descriptions",
        );
        merge(&mut fields, patterns::extract(doc), &mut stats.patterns_matched, "patterns");
        merge(&mut fields, visual::extract(doc), &mut stats.images_processed, "visual");
        merge(&mut fields, metadata::extract(doc), &mut stats.metadata_found, "metadata");

        stats.documents_processed += 1;
        metrics::extract::document_processed(fields.len());
        debug!("Extracted {} fields from {}", fields.len(), source_url);

        BronzeRecord::new(source_url, Utc::now(), fields)
    }
}

/// Last writer wins: `output` replaces any field already present.
fn merge(
    fields: &mut PartialRecord,
    output: PartialRecord,
    counter: &mut u64,
    strategy: &'static str,
) {
    if output.is_empty() {
        return;
    }
    *counter += 1;
    metrics::extract::strategy_hit(strategy);
    fields.extend(output);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::html_document::HtmlDocument;

    #[test]
    fn later_strategies_overwrite_table_values() {
        let doc = HtmlDocument::parse(
            r#"<table>
                 <tr><td>THC</td><td>20%</td></tr>
                 <tr><td>Height</td><td>100cm</td></tr>
               </table>
               <p>Height: 3 feet outdoors.</p>"#,
        );

        let extraction = Extractor::new().extract(&doc, "https://x.test/a");
        let record = &extraction.record;

        // patterns read "THC 20% Height 100cm Height: 3 feet outdoors"
        assert_eq!(record.source("thc_content"), Some("Pattern matching"));
        assert_eq!(record.raw("height"), Some("100cm Height: 3 feet outdoors"));
        assert_eq!(record.source("height"), Some("Pattern matching"));
    }

    #[test]
    fn table_values_survive_when_nothing_later_matches() {
        let doc = HtmlDocument::parse(
            r#"<table><tr><td>Aroma</td><td>Lemon zest</td></tr><tr><td>Sativa</td><td>Indica</td></tr></table>"#,
        );
        let record = Extractor::new().extract(&doc, "s").record;
        assert_eq!(record.raw("flavors"), Some("Lemon zest"));
        assert_eq!(record.source("flavors"), Some("Table 1"));
    }

    #[test]
    fn counters_are_returned_and_accumulate() {
        let doc = HtmlDocument::parse(
            r#"<html><head><title>Kush</title></head><body><div class="rating"><b class="star"></b></div></body></html>"#,
        );
        let extractor = Extractor::new();

        let first = extractor.extract(&doc, "a").stats;
        assert_eq!(first.documents_processed, 1);
        assert_eq!(first.images_processed, 1);
        assert_eq!(first.metadata_found, 1);
        assert_eq!(first.tables_found, 0);

        let mut total = ExtractionStats::default();
        extractor.extract_into(&doc, "a", &mut total);
        extractor.extract_into(&doc, "b", &mut total);
        assert_eq!(total.documents_processed, 2);
        assert_eq!(total.images_processed, 2);

        total.merge(&first);
        assert_eq!(total.metadata_found, 3);
    }

    #[test]
    fn malformed_markup_yields_an_empty_record() {
        let doc = HtmlDocument::parse("<<<table><tr><td");
        let extraction = Extractor::new().extract(&doc, "broken");
        assert!(extraction.record.is_empty());
        assert_eq!(extraction.stats.documents_processed, 1);
    }
}
