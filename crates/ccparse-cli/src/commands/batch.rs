//! Batch processing command for multiple statement files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use ccparse_core::{parse_amount, StatementPipeline, StatementRecord, TextSource, UNKNOWN};
use rust_decimal::Decimal;

use super::config::load_config;
use super::output::{format_record, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern selecting PDF statements
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Per-document time limit in seconds
    #[arg(long, default_value = "120")]
    timeout_secs: u64,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Skip OCR and use only the PDF text layer
    #[arg(long)]
    text_only: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    record: Option<StatementRecord>,
    source: Option<TextSource>,
    error: Option<String>,
    processing_time_ms: u64,
}

impl ProcessResult {
    fn failed(path: PathBuf, error: String, elapsed: Duration) -> Self {
        Self {
            path,
            record: None,
            source: None,
            error: Some(error),
            processing_time_ms: elapsed.as_millis() as u64,
        }
    }

    fn status(&self) -> &'static str {
        match (&self.record, &self.error) {
            (_, Some(_)) => "error",
            (Some(record), None) if record.is_empty() => "empty",
            _ => "success",
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.text_only {
        config.ocr.enabled = false;
    }

    let files = find_statements(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pipeline = Arc::new(StatementPipeline::from_config(&config)?);
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let timeout = Duration::from_secs(args.timeout_secs);

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut tasks = JoinSet::new();
    for (index, path) in files.into_iter().enumerate() {
        let pipeline = Arc::clone(&pipeline);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(permit) => process_single_file(path, pipeline, timeout, permit).await,
                Err(e) => ProcessResult::failed(path, e.to_string(), Duration::ZERO),
            };
            (index, result)
        });
    }

    let mut results: Vec<(usize, ProcessResult)> = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined?;
        overall_pb.inc(1);

        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                tasks.abort_all();
                overall_pb.abandon();
                anyhow::bail!("Processing failed for {}: {}", result.path.display(), error_msg);
            }
        }

        results.push((index, result));
    }

    overall_pb.finish_and_clear();

    results.sort_by_key(|(index, _)| *index);
    let results: Vec<ProcessResult> = results.into_iter().map(|(_, r)| r).collect();

    if let Some(output_dir) = &args.output_dir {
        write_outputs(output_dir, &results, args.format)?;
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful = results.iter().filter(|r| r.error.is_none()).count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    let amount_due = total_amount_due(&results);
    if !amount_due.is_zero() {
        eprintln!("   total amount due across statements: {}", amount_due);
    }

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for result in &failed {
            eprintln!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Sum of the "Total Amount Due" of every statement that reported one.
fn total_amount_due(results: &[ProcessResult]) -> Decimal {
    results
        .iter()
        .filter_map(|r| r.record.as_ref()?.total_amount_due.as_deref())
        .filter_map(parse_amount)
        .sum()
}

/// PDFs matching the pattern, in glob order.
fn find_statements(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    Ok(glob(pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect())
}

/// Process one file while holding a worker slot.
///
/// The slot is released when the blocking work ends, not when the timeout
/// fires, so `--jobs` also bounds workers left running after a timeout.
async fn process_single_file(
    path: PathBuf,
    pipeline: Arc<StatementPipeline>,
    timeout: Duration,
    permit: OwnedSemaphorePermit,
) -> ProcessResult {
    let file_start = Instant::now();

    let data = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(e) => return ProcessResult::failed(path, e.to_string(), file_start.elapsed()),
    };

    let work = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        pipeline.process(&data)
    });
    match tokio::time::timeout(timeout, work).await {
        Ok(Ok(output)) => {
            debug!(
                "{}: {} warnings, text from {:?}",
                path.display(),
                output.warnings.len(),
                output.source
            );
            ProcessResult {
                path,
                record: Some(output.record),
                source: output.source,
                error: None,
                processing_time_ms: file_start.elapsed().as_millis() as u64,
            }
        }
        Ok(Err(e)) => {
            ProcessResult::failed(path, format!("worker failed: {}", e), file_start.elapsed())
        }
        Err(_) => ProcessResult::failed(
            path,
            format!("timed out after {}s", timeout.as_secs()),
            file_start.elapsed(),
        ),
    }
}

fn write_outputs(
    output_dir: &Path,
    results: &[ProcessResult],
    format: OutputFormat,
) -> anyhow::Result<()> {
    for result in results {
        let Some(record) = &result.record else {
            continue;
        };

        let output_name = result
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("statement");
        let output_path = output_dir.join(format!("{}.{}", output_name, format.extension()));

        fs::write(&output_path, format_record(record, format, true)?)?;
        debug!("Wrote output to {}", output_path.display());
    }
    Ok(())
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "source",
        "issuer",
        "card_number",
        "payment_due_date",
        "total_amount_due",
        "transactions",
        "total_debits",
        "total_credits",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let source = result.source.map(|s| s.as_str()).unwrap_or("");
        let time = result.processing_time_ms.to_string();

        match &result.record {
            Some(record) => {
                let card = record
                    .card_number
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| UNKNOWN.to_string());
                wtr.write_record([
                    filename,
                    result.status(),
                    source,
                    record.issuer.as_deref().unwrap_or(UNKNOWN),
                    &card,
                    record.payment_due_date.as_deref().unwrap_or(UNKNOWN),
                    record.total_amount_due.as_deref().unwrap_or(UNKNOWN),
                    &record.transactions.len().to_string(),
                    &record.total_debits().to_string(),
                    &record.total_credits().to_string(),
                    &time,
                    "",
                ])?;
            }
            None => {
                wtr.write_record([
                    filename,
                    result.status(),
                    source,
                    "",
                    "",
                    "",
                    "",
                    "",
                    "",
                    "",
                    &time,
                    result.error.as_deref().unwrap_or(""),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
