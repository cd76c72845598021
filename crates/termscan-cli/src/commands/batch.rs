//! Batch command - extract many documents and count key terms.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use termscan_core::{count_key_terms, DocumentFormat, KeyTermHits, LoadedDocument, KEY_TERMS};

use super::load_config;
use crate::input::load_document;
use crate::output::{format_extracted, ExtractFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching the input files
    #[arg(required = true)]
    input: String,

    /// Write each document's extracted text into this directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each document
    #[arg(short, long, value_enum, default_value = "json")]
    format: ExtractFormat,

    /// Also generate a summary CSV of key-term counts
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome of one file.
struct BatchResult {
    path: PathBuf,
    document: Option<LoadedDocument>,
    hits: KeyTermHits,
    error: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| DocumentFormat::from_path(p).is_supported())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!("{} Found {} files to process", style("ℹ").blue(), files.len());

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());
    let mut totals = KeyTermHits::default();

    for path in files {
        let loaded = load_document(&path.to_string_lossy(), None, &config, &ProgressBar::hidden()).await;

        match loaded {
            Ok(document) => {
                let hits = count_key_terms(&document.full_text());
                debug!("{}: {} key term occurrences", path.display(), hits.total());
                totals.merge(&hits);

                if let Some(ref output_dir) = args.output_dir {
                    write_document(output_dir, &path, &document, args.format)?;
                }

                results.push(BatchResult {
                    path,
                    document: Some(document),
                    hits,
                    error: None,
                });
            }
            Err(e) => {
                let message = format!("{} ({})", e.user_message(), e);
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), e);
                    results.push(BatchResult {
                        path,
                        document: None,
                        hits: KeyTermHits::default(),
                        error: Some(message),
                    });
                } else {
                    overall_pb.abandon();
                    error!("Failed to process {}: {}", path.display(), e);
                    anyhow::bail!("Processing {} failed: {}", path.display(), message);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!("{} Summary written to {}", style("✓").green(), summary_path.display());
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    println!();
    println!("{}", style("Key term occurrences:").bold());
    for (term, count) in totals.iter().filter(|(_, c)| *c > 0) {
        println!("  {:<14} {}", term, count);
    }
    println!("  {:<14} {}", "total", totals.total());

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_document(
    output_dir: &Path,
    path: &Path,
    document: &LoadedDocument,
    format: ExtractFormat,
) -> anyhow::Result<()> {
    let output_path = output_dir.join(output_file_name(path, format));
    fs::write(&output_path, format_extracted(document, format)?)?;
    debug!("Wrote output to {}", output_path.display());
    Ok(())
}

/// Output name keeping the source extension, so `report.pdf` and `report.docx` do not collide.
fn output_file_name(path: &Path, format: ExtractFormat) -> String {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("document");
    let extension = match format {
        ExtractFormat::Json => "json",
        ExtractFormat::Csv => "csv",
        ExtractFormat::Text => "txt",
    };
    format!("{}.{}", name, extension)
}

fn write_summary(path: &Path, results: &[BatchResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["file", "format", "pages"];
    header.extend(KEY_TERMS.iter().copied());
    header.extend(["total", "error"]);
    wtr.write_record(&header)?;

    for result in results {
        let file = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let (format, pages) = match &result.document {
            Some(document) => (document.format.to_string(), document.segments.len().to_string()),
            None => (String::new(), String::new()),
        };

        let mut record = vec![file.to_string(), format, pages];
        record.extend(result.hits.iter().map(|(_, count)| count.to_string()));
        record.push(result.hits.total().to_string());
        record.push(result.error.clone().unwrap_or_default());
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
