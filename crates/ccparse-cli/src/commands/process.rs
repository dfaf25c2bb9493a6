//! Process command - extract data from a single statement file.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use ccparse_core::{PipelineOutput, StatementPipeline};

use super::config::load_config;
use super::output::{format_record, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, or text with --raw-text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Treat the input as already-extracted text
    #[arg(long)]
    raw_text: bool,

    /// Skip OCR and use only the PDF text layer
    #[arg(long)]
    text_only: bool,

    /// Report where the text came from and which fields were missed
    #[arg(long)]
    show_source: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.text_only {
        config.ocr.enabled = false;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Loading pipeline...");
    let pipeline = Arc::new(StatementPipeline::from_config(&config)?);

    let result = if args.raw_text {
        pb.set_message("Parsing text...");
        let text = fs::read_to_string(&args.input)?;
        pipeline.process_text(&text)
    } else {
        pb.set_message("Extracting text...");
        let data = fs::read(&args.input)?;
        let pipeline = Arc::clone(&pipeline);
        tokio::task::spawn_blocking(move || pipeline.process(&data)).await?
    };

    pb.finish_and_clear();

    let output = format_record(&result.record, args.format, args.pretty)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_source {
        print_source(&result);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn print_source(result: &PipelineOutput) {
    eprintln!();
    let source = result
        .source
        .map(|s| s.to_string())
        .unwrap_or_else(|| "raw_text".to_string());
    eprintln!("{} Text source: {}", style("ℹ").blue(), source);

    if let Some(trigger) = &result.fallback {
        eprintln!("{} OCR fallback: {}", style("ℹ").blue(), trigger);
    }

    eprintln!(
        "{} Processing time: {}ms",
        style("ℹ").blue(),
        result.processing_time_ms
    );

    for warning in &result.warnings {
        eprintln!("  {} {}", style("!").yellow(), warning);
    }
}
