//! Scan command - extract fuel fields from a receipt photo.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use fuelscan_core::{
    AdapterError, OpenAiVisionExtractor, PureOcrSource, ReceiptScanner, ScanConfig,
};

use super::{format_result, load_config, OutputFormat};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Receipt image (PNG, JPEG, ...)
    #[arg(required = true)]
    image: PathBuf,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Never call the AI fallback
    #[arg(long)]
    no_ai: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(model_dir) = &args.model_dir {
        config.ocr.model_dir = model_dir.clone();
    }
    if args.no_ai {
        config.ai.enabled = false;
    }

    if !args.image.exists() {
        anyhow::bail!("Input file not found: {}", args.image.display());
    }

    info!("Scanning receipt: {}", args.image.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Loading image...");
    let image = image::open(&args.image)?;

    pb.set_message("Loading OCR models...");
    let scanner = build_scanner(config)?;
    debug!("{:?}", scanner);

    pb.set_message("Reading receipt...");
    let outcome = scanner.scan(&image).await.map_err(|e| {
        pb.finish_and_clear();
        anyhow::anyhow!(
            "{}\n\nModels are loaded from the directory given by --model-dir or the ocr.model_dir setting.",
            e
        )
    })?;

    pb.finish_and_clear();

    let mut notes = Vec::new();
    if let Some(reason) = &outcome.escalation {
        notes.push(format!("AI fallback requested: {}", reason));
    }
    if let Some(error) = &outcome.adapter_error {
        notes.push(format!("AI fallback unavailable: {}", error));
    }

    let output = format_result(&outcome.result, &notes, args.format)?;

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

    let summary = outcome.summary();
    if summary.is_failure() {
        eprintln!("{} {}", style("✗").yellow(), summary);
    } else {
        eprintln!("{} {}", style("✓").green(), summary);
    }
    for note in &notes {
        eprintln!("{} {}", style("ℹ").blue(), note);
    }

    debug!("Scan took {:?}", outcome.elapsed);

    Ok(())
}

fn build_scanner(config: ScanConfig) -> anyhow::Result<ReceiptScanner> {
    let source = PureOcrSource::from_config(config.ocr.clone())
        .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))?;

    let mut builder = ReceiptScanner::builder().source(Arc::new(source));

    if config.ai.enabled {
        match OpenAiVisionExtractor::from_config(&config.ai) {
            Ok(backend) => builder = builder.vision(Arc::new(backend)),
            Err(AdapterError::NotConfigured) => warn!(
                "AI fallback disabled: set {} to enable it",
                config.ai.api_key_env
            ),
            Err(e) => warn!("AI fallback disabled: {}", e),
        }
    }

    Ok(builder.config(config).build()?)
}
