//! CLI commands and shared output helpers.

pub mod config;
pub mod parse;
pub mod scan;

use std::path::{Path, PathBuf};

use serde::Serialize;

use fuelscan_core::{FuelEntryDraft, ScanConfig, ScanSummary, ScannedReceiptResult};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fuelscan")
        .join("config.json")
}

/// Load the config named on the command line, else the default file if it
/// exists, else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ScanConfig> {
    if let Some(path) = config_path {
        return ScanConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        Ok(ScanConfig::from_file(&default_path)?)
    } else {
        Ok(ScanConfig::default())
    }
}

#[derive(Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    result: &'a ScannedReceiptResult,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<Vec<String>>,
}

/// Render a scan result in the requested format.
pub fn format_result(
    result: &ScannedReceiptResult,
    notes: &[String],
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let report = Report {
                result,
                summary: ScanSummary::of(result).to_string(),
                notes: (!notes.is_empty()).then(|| notes.to_vec()),
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_text(result: &ScannedReceiptResult) -> String {
    fn or_dash(value: Option<String>) -> String {
        value.unwrap_or_else(|| "-".to_string())
    }

    let mut draft = FuelEntryDraft::new();
    draft.apply_scan(result.clone());

    let mut output = String::new();
    output.push_str(&format!("Date:           {}\n", or_dash(result.date().map(|d| d.to_string()))));
    output.push_str(&format!("Station:        {}\n", or_dash(result.station_name().map(str::to_string))));
    output.push_str(&format!("Fuel grade:     {}\n", or_dash(result.fuel_grade().map(|g| g.to_string()))));
    output.push_str(&format!("Quantity:       {}\n", or_dash(result.quantity().map(|q| q.to_string()))));
    output.push_str(&format!("Price per unit: {}\n", or_dash(result.price_per_unit().map(|p| p.to_string()))));
    output.push_str(&format!("Total:          {}\n", or_dash(draft.total_cost().map(|t| t.to_string()))));
    output.push_str(&format!("Method:         {}\n", result.method()));
    output
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use fuelscan_core::{HeuristicParser, ResultMerger, CandidateSet, TextFragment};

    use super::*;

    fn sample() -> ScannedReceiptResult {
        let fragments = TextFragment::from_lines(["STATION: Shell", "QTY 10.5 L", "RATE $1.42/L", "HSD"]);
        let heuristic = HeuristicParser::default().parse(&fragments);
        ResultMerger::new().merge(&heuristic, &CandidateSet::new())
    }

    #[test]
    fn test_text_output() {
        let text = format_result(&sample(), &[], OutputFormat::Text).unwrap();
        assert!(text.contains("Station:        Shell"));
        assert!(text.contains("Fuel grade:     Diesel"));
        assert!(text.contains("Total:          14.91"));
        assert!(text.contains("Date:           -"));
        assert!(text.contains("Method:         OCR"));
    }

    #[test]
    fn test_json_output() {
        let json = format_result(&sample(), &["note".to_string()], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["station_name"], "Shell");
        assert_eq!(value["fuel_grade"], "diesel");
        assert_eq!(value["method"], "ocr");
        assert_eq!(value["summary"], "4 fields auto-filled (OCR)");
        assert!(value.get("date").is_none());
        assert_eq!(value["notes"][0], "note");
    }

    #[test]
    fn test_load_explicit_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "ai": {{ "enabled": false }} }}"#).unwrap();

        let config = load_config(file.path().to_str()).unwrap();
        assert!(!config.ai.enabled);
        assert_eq!(config.extraction.min_heuristic_fields, 3);

        assert!(load_config(Some("/nonexistent/fuelscan.json")).is_err());
    }
}
