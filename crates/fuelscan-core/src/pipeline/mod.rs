//! Scan orchestration: observe, parse, gate, escalate, merge.

mod orchestrator;
mod summary;

pub use orchestrator::{ReceiptScanner, ReceiptScannerBuilder, ScanOutcome, ScanState};
pub use summary::{ScanSummary, MANUAL_ENTRY_PROMPT};
