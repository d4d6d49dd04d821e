//! Parse command - run the heuristic pass over recognized text.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use fuelscan_core::{
    CandidateSet, CoverageEvaluator, HeuristicParser, ResultMerger, ScanConfig, ScanSummary,
    ScannedReceiptResult, StaticTextSource,
};

use super::{format_result, load_config, OutputFormat};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Text file with one recognized fragment per line
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let text = fs::read_to_string(&args.input)?;
    info!("Parsing {} lines from {}", text.lines().count(), args.input.display());

    let (result, notes) = parse_text(&text, &config);

    println!("{}", format_result(&result, &notes, args.format)?);
    eprintln!("{} {}", style("ℹ").blue(), ScanSummary::of(&result));
    for note in &notes {
        eprintln!("{} {}", style("ℹ").blue(), note);
    }

    Ok(())
}

/// Heuristic-only extraction over lines of text.
fn parse_text(text: &str, config: &ScanConfig) -> (ScannedReceiptResult, Vec<String>) {
    let source = StaticTextSource::from_text(text);
    let heuristic = HeuristicParser::new(&config.extraction).parse(source.fragments());

    let notes = CoverageEvaluator::from_config(&config.extraction)
        .evaluate(&heuristic)
        .map(|reason| vec![format!("A full scan would request the AI fallback: {}", reason)])
        .unwrap_or_default();

    let result = ResultMerger::from_config(&config.extraction).merge(&heuristic, &CandidateSet::new());
    (result, notes)
}
