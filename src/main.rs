use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use cultivar_index::app::pipeline_use_case::PipelineUseCase;
use cultivar_index::config::{Config, DEFAULT_CONFIG_PATH};
use cultivar_index::domain::BronzeRecord;
use cultivar_index::infra::html_document::HtmlDocument;
use cultivar_index::infra::ndjson_output_adapter::{read_gold_dataset, NdjsonOutputAdapter};
use cultivar_index::logging;
use cultivar_index::pipeline::processing::extract::discover_strain_urls;
use cultivar_index::pipeline::processing::normalize::{DefaultNormalizer, Normalizer};

const REPORT_JSON_FILE: &str = "report.json";
const REPORT_TEXT_FILE: &str = "report.txt";

#[derive(Parser)]
#[command(name = "cultivar_index")]
#[command(about = "Extract, normalize and audit cultivar product pages")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a bronze record from one saved product page
    Extract {
        /// HTML file to read
        #[arg(long)]
        html: PathBuf,
        /// Source identifier recorded on the record (defaults to the file path)
        #[arg(long)]
        source: Option<String>,
    },
    /// Normalize a flat bronze mapping ({field}_raw / {field}_source) into a gold record
    Normalize {
        /// JSON file holding the flat bronze mapping
        #[arg(long)]
        bronze: PathBuf,
        #[arg(long, default_value = "")]
        source: String,
    },
    /// Run extraction, normalization and the outlier audit over a directory of pages
    Run {
        #[arg(long)]
        input_dir: PathBuf,
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
        /// Prefix joined to each file name to form its source identifier
        #[arg(long)]
        source_prefix: Option<String>,
    },
    /// List cultivar page URLs linked from a saved listing page
    Links {
        #[arg(long)]
        html: PathBuf,
        /// Site root joined to root-relative hrefs
        #[arg(long)]
        base_url: String,
        /// Substring a link must contain to be kept; repeatable
        #[arg(long = "pattern", required = true)]
        patterns: Vec<String>,
    },
    /// Audit a gold NDJSON file and print the text report
    Audit {
        #[arg(long)]
        gold: PathBuf,
        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    let _guard = logging::init_logging(&config.logging);

    match cli.command {
        Commands::Extract { html, source } => {
            let source = source.unwrap_or_else(|| html.display().to_string());
            let doc = read_document(&html)?;
            let processed = PipelineUseCase::from_config(&config).process_document(&doc, &source);
            println!("{}", serde_json::to_string_pretty(&processed.bronze.flat_fields())?);
        }
        Commands::Normalize { bronze, source } => {
            let content = fs::read_to_string(&bronze)
                .with_context(|| format!("reading {}", bronze.display()))?;
            let flat: BTreeMap<String, String> = serde_json::from_str(&content)
                .with_context(|| format!("parsing flat bronze mapping in {}", bronze.display()))?;
            let record = BronzeRecord::from_flat(&source, &flat);
            let gold = DefaultNormalizer::new().normalize(&record);
            println!("{}", serde_json::to_string_pretty(&gold)?);
        }
        Commands::Run {
            input_dir,
            output_dir,
            source_prefix,
        } => run(&config, &input_dir, &output_dir, source_prefix.as_deref())?,
        Commands::Links {
            html,
            base_url,
            patterns,
        } => {
            let doc = read_document(&html)?;
            let patterns: Vec<&str> = patterns.iter().map(String::as_str).collect();
            let urls = discover_strain_urls(&doc, &base_url, &patterns);
            info!("Found {} cultivar links in {}", urls.len(), html.display());
            for url in urls {
                println!("{}", url);
            }
        }
        Commands::Audit { gold, json } => {
            let dataset = read_gold_dataset(&gold)
                .with_context(|| format!("reading gold rows from {}", gold.display()))?;
            let use_case = PipelineUseCase::from_config(&config);
            let report = use_case.audit(&dataset);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", use_case.render(&report));
            }
        }
    }

    Ok(())
}

fn read_document(path: &Path) -> Result<HtmlDocument> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(HtmlDocument::from_bytes(&bytes))
}

/// Saved pages in `dir`, sorted by file name
fn html_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

fn run(config: &Config, input_dir: &Path, output_dir: &Path, source_prefix: Option<&str>) -> Result<()> {
    let files = html_files(input_dir)?;
    if files.is_empty() {
        warn!("No HTML files found in {}", input_dir.display());
    }
    info!("Processing {} pages from {}", files.len(), input_dir.display());

    let mut documents = Vec::with_capacity(files.len());
    for path in &files {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let source = match source_prefix {
            Some(prefix) => format!("{}/{}", prefix.trim_end_matches('/'), file_name),
            None => path.display().to_string(),
        };
        documents.push((source, read_document(path)?));
    }

    let output = NdjsonOutputAdapter::new(output_dir)?;
    let use_case = PipelineUseCase::from_config(config).with_output(Box::new(output));
    let outcome = use_case.run_batch(documents)?;

    let text = use_case.render(&outcome.report);
    fs::write(
        output_dir.join(REPORT_JSON_FILE),
        serde_json::to_string_pretty(&outcome.report)?,
    )?;
    fs::write(output_dir.join(REPORT_TEXT_FILE), &text)?;

    info!(
        "Wrote {} records and reports to {}",
        outcome.documents.len(),
        output_dir.display()
    );
    println!("{}", text);
    Ok(())
}
