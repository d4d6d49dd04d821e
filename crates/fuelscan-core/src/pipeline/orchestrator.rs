//! Receipt scan orchestrator.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use image::DynamicImage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ai::{AiExtractionAdapter, VisionExtractor};
use crate::error::{AdapterError, FuelscanError, RecognitionError};
use crate::models::config::ScanConfig;
use crate::models::receipt::ScannedReceiptResult;
use crate::ocr::{joined_text, TextFragment, TextObservationSource};
use crate::receipt::{
    CandidateSet, CoverageEvaluator, EscalationReason, HeuristicParser, Plausibility, ResultMerger,
};

use super::summary::ScanSummary;

/// States a scan moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning,
    HeuristicOnly,
    Escalated,
    Done,
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::HeuristicOnly => "heuristic-only",
            Self::Escalated => "escalated",
            Self::Done => "done",
        })
    }
}

/// Everything one scan produced.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// The merged result.
    pub result: ScannedReceiptResult,
    /// States visited, `Idle` first and `Done` last.
    pub states: Vec<ScanState>,
    /// Why the AI path ran, if it did.
    pub escalation: Option<EscalationReason>,
    /// AI failure that was absorbed into a heuristic-only result.
    pub adapter_error: Option<AdapterError>,
    /// Wall time of the scan.
    pub elapsed: Duration,
}

impl ScanOutcome {
    pub fn summary(&self) -> ScanSummary {
        ScanSummary::of(&self.result)
    }

    pub fn escalated(&self) -> bool {
        self.states.contains(&ScanState::Escalated)
    }

    pub fn into_result(self) -> ScannedReceiptResult {
        self.result
    }
}

/// Stateless scan pipeline. Each call to [`scan`](Self::scan) is an
/// independent run; concurrent scans share nothing mutable.
pub struct ReceiptScanner {
    source: Arc<dyn TextObservationSource>,
    adapter: Option<AiExtractionAdapter>,
    parser: HeuristicParser,
    coverage: CoverageEvaluator,
    merger: ResultMerger,
    ai_timeout: Duration,
}

impl ReceiptScanner {
    pub fn builder() -> ReceiptScannerBuilder {
        ReceiptScannerBuilder::default()
    }

    /// Run the full pipeline on one image.
    ///
    /// Recognition errors are returned to the caller. AI errors and
    /// timeouts are absorbed and leave a heuristic-only result.
    pub async fn scan(&self, image: &DynamicImage) -> Result<ScanOutcome, RecognitionError> {
        let started = Instant::now();
        let mut states = vec![ScanState::Idle, ScanState::Scanning];

        info!(
            "Scanning {}x{} image with {}",
            image.width(),
            image.height(),
            self.source.name()
        );

        let fragments = self.source.observe(image).await?;
        debug!("Observed {} text fragments", fragments.len());

        let heuristic = self.parser.parse(&fragments);
        let escalation = self.coverage.evaluate(&heuristic);

        let (ai, adapter_error) = match escalation {
            None => {
                states.push(ScanState::HeuristicOnly);
                (CandidateSet::new(), None)
            }
            Some(reason) => {
                states.push(ScanState::Escalated);
                info!("Escalating to AI extraction: {}", reason);
                self.escalate(image, &fragments).await
            }
        };

        let result = self.merger.merge(&heuristic, &ai);
        states.push(ScanState::Done);

        let elapsed = started.elapsed();
        info!(
            "Scan finished in {:?}: {}",
            elapsed,
            ScanSummary::of(&result)
        );

        Ok(ScanOutcome {
            result,
            states,
            escalation,
            adapter_error,
            elapsed,
        })
    }

    /// Like [`scan`](Self::scan), but gives up when `token` is cancelled.
    /// Returns `None` in that case; any in-flight AI call is dropped.
    pub async fn scan_until_cancelled(
        &self,
        image: &DynamicImage,
        token: CancellationToken,
    ) -> Option<Result<ScanOutcome, RecognitionError>> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!("Scan cancelled");
                None
            }
            outcome = self.scan(image) => Some(outcome),
        }
    }

    async fn escalate(
        &self,
        image: &DynamicImage,
        fragments: &[TextFragment],
    ) -> (CandidateSet, Option<AdapterError>) {
        let Some(adapter) = &self.adapter else {
            debug!("No AI adapter configured; keeping heuristic results");
            return (CandidateSet::new(), None);
        };

        let observed = joined_text(fragments);
        let request = adapter.try_extract(image, Some(&observed));

        match tokio::time::timeout(self.ai_timeout, request).await {
            Ok(Ok(fields)) => {
                info!("AI extraction returned {} fields", fields.len());
                (fields.into_candidates(), None)
            }
            Ok(Err(e)) => {
                warn!("AI extraction failed, keeping heuristic results: {}", e);
                (CandidateSet::new(), Some(e))
            }
            Err(_) => {
                let e = AdapterError::Timeout(self.ai_timeout);
                warn!("{}, keeping heuristic results", e);
                (CandidateSet::new(), Some(e))
            }
        }
    }
}

impl fmt::Debug for ReceiptScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiptScanner")
            .field("source", &self.source.name())
            .field("adapter", &self.adapter)
            .field("parser", &self.parser)
            .field("coverage", &self.coverage)
            .field("merger", &self.merger)
            .field("ai_timeout", &self.ai_timeout)
            .finish()
    }
}

/// Builder for [`ReceiptScanner`].
#[derive(Default)]
pub struct ReceiptScannerBuilder {
    source: Option<Arc<dyn TextObservationSource>>,
    adapter: Option<AiExtractionAdapter>,
    config: ScanConfig,
    reference_date: Option<NaiveDate>,
    ai_timeout: Option<Duration>,
}

impl ReceiptScannerBuilder {
    /// Text recognition capability (required).
    pub fn source(mut self, source: Arc<dyn TextObservationSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// AI fallback. Without one, escalation keeps heuristic results.
    pub fn adapter(mut self, adapter: AiExtractionAdapter) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// AI fallback from a bare backend.
    pub fn vision(self, backend: Arc<dyn VisionExtractor>) -> Self {
        self.adapter(AiExtractionAdapter::new(backend))
    }

    pub fn config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// Anchor date checks at a fixed day instead of today.
    pub fn reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Override the configured AI ceiling.
    pub fn ai_timeout(mut self, timeout: Duration) -> Self {
        self.ai_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<ReceiptScanner, FuelscanError> {
        let source = self
            .source
            .ok_or_else(|| FuelscanError::Config("no text observation source".to_string()))?;

        let extraction = &self.config.extraction;
        let plausibility = match self.reference_date {
            Some(date) => Plausibility::with_reference_date(extraction, date),
            None => Plausibility::from_config(extraction),
        };

        let adapter = if self.config.ai.enabled {
            self.adapter.map(|a| {
                a.with_plausibility(plausibility.clone())
                    .with_observed_text(self.config.ai.send_observed_text)
            })
        } else {
            debug!("AI extraction disabled by configuration");
            None
        };

        Ok(ReceiptScanner {
            source,
            adapter,
            parser: HeuristicParser::with_plausibility(plausibility),
            coverage: CoverageEvaluator::from_config(extraction),
            merger: ResultMerger::from_config(extraction),
            ai_timeout: self.ai_timeout.unwrap_or_else(|| self.config.ai_timeout()),
        })
    }
}
