//! Extract command - extract fields from a single OCR text dump.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::{debug, info};

use zaehlwerk_core::{ExtractedInvoiceData, InvoiceFieldParser, InvoiceParser};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input text file ("-" or omitted reads stdin)
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print extraction warnings to stderr
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let text = read_input(args.input.as_deref())?;

    info!("Read {} characters of OCR text", text.len());

    let parser = InvoiceFieldParser::with_config(&config);
    let result = parser.parse(&text);

    if args.show_warnings && !result.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {warning}");
        }
    }

    let output = format_data(&result.data, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{output}");
    }

    debug!("Processing time: {}ms", result.processing_time_ms);

    Ok(())
}

fn read_input(input: Option<&Path>) -> anyhow::Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => {
            if !path.exists() {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            Ok(fs::read_to_string(path)?)
        }
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

pub fn format_data(data: &ExtractedInvoiceData, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(data)?),
        OutputFormat::Csv => format_csv(data),
        OutputFormat::Text => Ok(format_text(data)),
    }
}

fn format_csv(data: &ExtractedInvoiceData) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["address", "meter_point_id", "current_consumption_kwh"])?;
    wtr.write_record([
        data.address.as_deref().unwrap_or_default(),
        data.meter_point_id.as_deref().unwrap_or_default(),
        data.current_consumption_kwh.as_deref().unwrap_or_default(),
    ])?;

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(data: &ExtractedInvoiceData) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Address:         {}\n",
        data.address.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "Meter point:     {}\n",
        data.meter_point_id.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "Consumption:     {}\n",
        data.current_consumption_kwh
            .as_deref()
            .map(|kwh| format!("{kwh} kWh"))
            .unwrap_or_else(|| "-".to_string())
    ));

    output
}
