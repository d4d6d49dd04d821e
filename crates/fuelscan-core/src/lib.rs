//! Core library for fuel receipt scanning.
//!
//! This crate provides:
//! - Text observation over receipt photos (on-device OCR behind `native`)
//! - Rule-based extraction of date, quantity, unit price, station and fuel grade
//! - Coverage gating and an AI vision fallback with defensive response parsing
//! - Merging, normalization and form pre-fill that never overwrites user input

pub mod ai;
pub mod error;
pub mod form;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod receipt;

pub use ai::{AiExtractionAdapter, OpenAiVisionExtractor, PartialFieldSet, StubVisionExtractor, VisionExtractor};
pub use error::{AdapterError, FuelscanError, RecognitionError, Result};
pub use form::FuelEntryDraft;
pub use models::config::{AiConfig, ExtractionConfig, OcrConfig, ScanConfig};
pub use models::receipt::{
    CandidateField, CandidateSource, Confidence, FieldKind, FieldValue, FuelGrade, ScanMethod,
    ScannedReceiptResult,
};
pub use ocr::{StaticTextSource, TextFragment, TextObservationSource};
#[cfg(feature = "native")]
pub use ocr::PureOcrSource;
pub use pipeline::{ReceiptScanner, ReceiptScannerBuilder, ScanOutcome, ScanState, ScanSummary};
pub use receipt::{CandidateSet, CoverageEvaluator, EscalationReason, HeuristicParser, ResultMerger};
