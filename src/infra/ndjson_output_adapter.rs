use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use crate::app::pipeline_use_case::ProcessedDocument;
use crate::app::ports::ProcessedRecordOutputPort;
use crate::error::Result;
use crate::pipeline::processing::outliers::Dataset;

pub const BRONZE_FILE: &str = "bronze.ndjson";
pub const GOLD_FILE: &str = "gold.ndjson";

/// File-based implementation of ProcessedRecordOutputPort.
/// Writes bronze and gold records to sibling NDJSON files.
pub struct NdjsonOutputAdapter {
    bronze_writer: Mutex<BufWriter<File>>,
    gold_writer: Mutex<BufWriter<File>>,
}

fn create_truncated(path: &Path) -> Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    Ok(BufWriter::new(file))
}

impl NdjsonOutputAdapter {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)?;

        info!("Writing processed records under {}", output_dir.display());

        Ok(Self {
            bronze_writer: Mutex::new(create_truncated(&output_dir.join(BRONZE_FILE))?),
            gold_writer: Mutex::new(create_truncated(&output_dir.join(GOLD_FILE))?),
        })
    }
}

/// Row written to the gold file: the normalized record plus the name the
/// audit stage reports it under.
#[derive(serde::Serialize)]
pub struct GoldLine {
    pub strain_name: String,
    pub source_url: String,
    #[serde(flatten)]
    pub gold: crate::domain::GoldRecord,
}

impl ProcessedRecordOutputPort for NdjsonOutputAdapter {
    fn write_processed(&self, record: &ProcessedDocument) -> anyhow::Result<()> {
        let bronze_line = serde_json::to_string(&record.bronze)?;
        let gold_line = serde_json::to_string(&GoldLine {
            strain_name: record.strain_name.clone(),
            source_url: record.bronze.source_url.clone(),
            gold: record.gold.clone(),
        })?;

        let mut bronze = self
            .bronze_writer
            .lock()
            .map_err(|_| anyhow::anyhow!("bronze writer lock poisoned"))?;
        writeln!(bronze, "{}", bronze_line)?;
        bronze.flush()?;

        let mut gold = self
            .gold_writer
            .lock()
            .map_err(|_| anyhow::anyhow!("gold writer lock poisoned"))?;
        writeln!(gold, "{}", gold_line)?;
        gold.flush()?;

        Ok(())
    }
}

/// Reads a gold NDJSON file into an audit dataset; blank lines are skipped.
/// Rows only need `strain_name` and numeric columns, so exports from other
/// tools audit the same way.
pub fn read_gold_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let content = std::fs::read_to_string(path)?;
    let rows = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(serde_json::from_str::<serde_json::Value>)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Dataset::from_json_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline_use_case::PipelineUseCase;
    use crate::infra::html_document::HtmlDocument;

    #[test]
    fn writes_and_reads_back_gold_rows() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = NdjsonOutputAdapter::new(dir.path()).unwrap();
        let use_case = PipelineUseCase::default();

        let doc = HtmlDocument::parse(
            "<html><head><title>Lemon Haze Seeds</title></head><body>\
             <table><tr><td>THC</td><td>20%</td></tr><tr><td>Height</td><td>Tall</td></tr></table>\
             </body></html>",
        );
        let processed = use_case.process_document(&doc, "https://example.com/lemon-haze");
        adapter.write_processed(&processed).unwrap();

        let dataset = read_gold_dataset(dir.path().join(GOLD_FILE)).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.strain_name(0), Some("Lemon Haze"));
        assert_eq!(dataset.column("thc_percentage_min"), Some(&[Some(20.0)][..]));
        assert_eq!(dataset.column("height_cm_max"), Some(&[Some(180.0)][..]));

        let bronze = std::fs::read_to_string(dir.path().join(BRONZE_FILE)).unwrap();
        assert!(bronze.contains("lemon-haze"));
    }
}
