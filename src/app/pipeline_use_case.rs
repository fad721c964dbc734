use anyhow::Result;
use tracing::{debug, info};

use crate::app::ports::{DocumentTree, ProcessedRecordOutputPort};
use crate::config::Config;
use crate::domain::{BronzeRecord, GoldRecord};
use crate::pipeline::processing::extract::{derive_strain_name, ExtractionStats, Extractor};
use crate::pipeline::processing::normalize::{DefaultNormalizer, Normalizer};
use crate::pipeline::processing::outliers::{Dataset, OutlierDetector, OutlierReport};

/// One document after extraction and normalization
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub bronze: BronzeRecord,
    pub gold: GoldRecord,
    pub strain_name: String,
    pub stats: ExtractionStats,
}

/// Result of a full batch run
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub documents: Vec<ProcessedDocument>,
    pub stats: ExtractionStats,
    pub dataset: Dataset,
    pub report: OutlierReport,
}

/// Use case driving documents through extract -> normalize, then auditing
/// the batch once every row has been normalized.
pub struct PipelineUseCase {
    extractor: Extractor,
    normalizer: Box<dyn Normalizer + Send + Sync>,
    detector: OutlierDetector,
    output: Option<Box<dyn ProcessedRecordOutputPort>>,
}

impl Default for PipelineUseCase {
    fn default() -> Self {
        Self::new(
            Extractor::new(),
            Box::new(DefaultNormalizer::new()),
            OutlierDetector::new(),
        )
    }
}

impl PipelineUseCase {
    pub fn new(
        extractor: Extractor,
        normalizer: Box<dyn Normalizer + Send + Sync>,
        detector: OutlierDetector,
    ) -> Self {
        Self {
            extractor,
            normalizer,
            detector,
            output: None,
        }
    }

    /// Builds the stages from loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Extractor::with_config(config.extraction.clone()),
            Box::new(DefaultNormalizer::new()),
            OutlierDetector::with_config(config.outliers.clone()).with_rules(config.rule_set()),
        )
    }

    /// Every processed document is also handed to `output`
    pub fn with_output(mut self, output: Box<dyn ProcessedRecordOutputPort>) -> Self {
        self.output = Some(output);
        self
    }

    pub fn detector(&self) -> &OutlierDetector {
        &self.detector
    }

    pub fn process_document<D: DocumentTree>(&self, doc: &D, source_url: &str) -> ProcessedDocument {
        let extraction = self.extractor.extract(doc, source_url);
        let gold = self.normalizer.normalize(&extraction.record);
        let strain_name = derive_strain_name(&extraction.record);

        debug!(
            "Processed {} as '{}' (confidence {})",
            source_url, strain_name, gold.confidence_score
        );

        ProcessedDocument {
            bronze: extraction.record,
            gold,
            strain_name,
            stats: extraction.stats,
        }
    }

    /// Processes every document, writes each to the output port when one is
    /// set, and audits the collected dataset at the end.
    pub fn run_batch<S, D, I>(&self, documents: I) -> Result<BatchOutcome>
    where
        S: AsRef<str>,
        D: DocumentTree,
        I: IntoIterator<Item = (S, D)>,
    {
        let mut processed = Vec::new();
        let mut stats = ExtractionStats::default();
        let mut dataset = Dataset::new();

        for (source_url, doc) in documents {
            let document = self.process_document(&doc, source_url.as_ref());

            if let Some(output) = &self.output {
                output.write_processed(&document)?;
            }

            stats.merge(&document.stats);
            dataset.push_gold(&document.strain_name, &document.gold);
            processed.push(document);
        }

        info!(
            "Extracted {} documents: {} with tables, {} with descriptions, {} with pattern matches, {} with visual indicators, {} with metadata",
            stats.documents_processed,
            stats.tables_found,
            stats.descriptions_found,
            stats.patterns_matched,
            stats.images_processed,
            stats.metadata_found
        );

        let report = self.audit(&dataset);

        Ok(BatchOutcome {
            documents: processed,
            stats,
            dataset,
            report,
        })
    }

    pub fn audit(&self, dataset: &Dataset) -> OutlierReport {
        self.detector.detect(dataset)
    }

    pub fn render(&self, report: &OutlierReport) -> String {
        self.detector.render(report)
    }
}
