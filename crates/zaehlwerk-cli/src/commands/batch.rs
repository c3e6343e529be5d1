//! Batch command - process multiple OCR text dumps.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, warn};

use zaehlwerk_core::{InvoiceFieldParser, InvoiceParser};

use super::extract::{format_data, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern (e.g. "dumps/*.txt")
    #[arg(required = true)]
    input: String,

    /// Output directory for per-file results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write a summary CSV to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Continue when a file cannot be read
    #[arg(long)]
    continue_on_error: bool,
}

/// One row of the summary CSV.
#[derive(Serialize)]
struct SummaryRow {
    file: String,
    address: Option<String>,
    meter_point_id: Option<String>,
    current_consumption_kwh: Option<String>,
    warnings: usize,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "txt" | "text" | "ocr")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching text files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let parser = InvoiceFieldParser::with_config(&config);
    let mut rows = Vec::with_capacity(files.len());
    let mut failed = 0usize;

    for path in &files {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if args.continue_on_error => {
                warn!("Skipping {}: {}", path.display(), e);
                failed += 1;
                pb.inc(1);
                continue;
            }
            Err(e) => {
                pb.finish_and_clear();
                return Err(anyhow::anyhow!("Failed to read {}: {}", path.display(), e));
            }
        };

        let result = parser.parse(&text);
        debug!(
            "Processed {} ({} warnings)",
            path.display(),
            result.warnings.len()
        );

        if let Some(ref output_dir) = args.output_dir {
            let extension = match args.format {
                OutputFormat::Json => "json",
                OutputFormat::Csv => "csv",
                OutputFormat::Text => "txt",
            };
            let file_name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("result");
            let output_path = output_dir.join(format!("{file_name}.{extension}"));
            fs::write(&output_path, format_data(&result.data, args.format)?)?;
        }

        rows.push(SummaryRow {
            file: path.display().to_string(),
            address: result.data.address,
            meter_point_id: result.data.meter_point_id,
            current_consumption_kwh: result.data.current_consumption_kwh,
            warnings: result.warnings.len(),
        });

        pb.inc(1);
    }

    pb.finish_with_message("Done");

    if let Some(ref summary_path) = args.summary {
        let mut wtr = csv::Writer::from_path(summary_path)?;
        for row in &rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let complete = rows
        .iter()
        .filter(|r| r.warnings == 0)
        .count();
    println!(
        "{} Processed {} files ({} with all fields, {} skipped) in {:.1?}",
        style("✓").green(),
        rows.len(),
        complete,
        failed,
        start.elapsed()
    );

    Ok(())
}
