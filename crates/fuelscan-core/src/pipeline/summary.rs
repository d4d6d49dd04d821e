//! User-facing scan summary.

use std::fmt;

use crate::models::receipt::{ScanMethod, ScannedReceiptResult};

/// Shown when nothing could be extracted.
pub const MANUAL_ENTRY_PROMPT: &str = "No fields recognized. Please fill in the details manually.";

/// What a scan filled in, as reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub fields: usize,
    pub method: ScanMethod,
}

impl ScanSummary {
    pub fn of(result: &ScannedReceiptResult) -> Self {
        Self {
            fields: result.field_count(),
            method: result.method(),
        }
    }

    /// Nothing was extracted; the caller should prompt for manual entry.
    pub fn is_failure(&self) -> bool {
        self.fields == 0
    }
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_failure() {
            return f.write_str(MANUAL_ENTRY_PROMPT);
        }
        let noun = if self.fields == 1 { "field" } else { "fields" };
        write!(f, "{} {} auto-filled ({})", self.fields, noun, self.method)
    }
}
