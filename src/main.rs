//! Noshow Prep - command line front end
//!
//! Loads an appointment CSV, reports its shape, missing values and
//! statistics, then runs the preprocessing pipeline and reports the result.

use anyhow::{Context as _, Result};
use clap::Parser;
use noshow_prep::stats::{preview, DatasetSummary};
use noshow_prep::{DataLoader, PreprocessConfig, Preprocessor};
use polars::prelude::DataFrame;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "noshow-prep", version, about = "Clean and feature-engineer clinical appointment data")]
struct Cli {
    /// Appointment data (CSV with a header row)
    input: PathBuf,

    /// JSON file overriding the default column names and labels
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the raw and processed summaries as JSON
    #[arg(long)]
    json: bool,

    /// Rows shown in the data previews
    #[arg(long, default_value_t = 5)]
    preview: usize,
}

#[derive(Serialize)]
struct Report<'a> {
    raw: &'a DatasetSummary,
    processed: &'a DatasetSummary,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PreprocessConfig::from_json_file(path)?,
        None => PreprocessConfig::default(),
    };

    let raw = DataLoader::load_path(&cli.input)
        .with_context(|| format!("Error loading file {}", cli.input.display()))?;
    let raw_summary = DatasetSummary::from_frame(&raw);
    if !cli.json {
        print!("{}", raw_report(&raw, &raw_summary, cli.preview));
    }

    let processed = Preprocessor::new(config)
        .preprocess(&raw)
        .context("Error preprocessing data")?;
    let processed_summary = DatasetSummary::from_frame(&processed);

    if cli.json {
        let report = Report {
            raw: &raw_summary,
            processed: &processed_summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "\nProcessed dataset has {} records and {} columns.",
        processed_summary.rows, processed_summary.columns
    );
    if processed_summary.rows == 0 {
        println!("Warning: every record was dropped during preprocessing.");
    } else {
        println!("\nProcessed Preview\n{}", preview(&processed, cli.preview));
    }

    Ok(())
}

/// Load summary shown as soon as the file is read, before preprocessing.
fn raw_report(raw: &DataFrame, summary: &DatasetSummary, preview_rows: usize) -> String {
    let mut out = format!(
        "Successfully loaded dataset with {} records and {} columns.\n",
        summary.rows, summary.columns
    );
    out.push_str(&format!("\nData Preview\n{}\n", preview(raw, preview_rows)));

    if !summary.numeric.is_empty() {
        out.push_str("\nDataset Statistics\n");
        out.push_str(&format!(
            "  {:<24} {:>8} {:>12} {:>12} {:>12} {:>12}\n",
            "column", "count", "mean", "std", "min", "max"
        ));
        for stats in &summary.numeric {
            out.push_str(&format!(
                "  {:<24} {:>8} {:>12.4} {:>12.4} {:>12.4} {:>12.4}\n",
                stats.column, stats.count, stats.mean, stats.std, stats.min, stats.max
            ));
        }
    }

    let missing = summary.columns_with_nulls();
    if missing.is_empty() {
        out.push_str("\nNo missing values detected in the dataset.\n");
    } else {
        out.push_str("\nThis dataset contains missing values:\n");
        for count in missing {
            out.push_str(&format!("  {:<24} {}\n", count.column, count.nulls));
        }
    }
    out
}
