//! Escalation gate between the heuristic pass and the AI fallback.

use std::fmt;

use crate::models::config::ExtractionConfig;
use crate::models::receipt::FieldKind;

use super::candidates::CandidateSet;

/// Why the AI fallback is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationReason {
    /// Quantity and unit price are both missing; without them no total can
    /// be computed, whatever else was found.
    QuantityAndPriceMissing { found: usize },
    /// Too few fields overall.
    LowCoverage { found: usize, required: usize },
}

impl fmt::Display for EscalationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuantityAndPriceMissing { found } => {
                write!(f, "quantity and price per unit both missing ({} fields found)", found)
            }
            Self::LowCoverage { found, required } => {
                write!(f, "only {} of {} required fields found", found, required)
            }
        }
    }
}

/// Decides whether heuristic results are actionable on their own.
#[derive(Debug, Clone, Copy)]
pub struct CoverageEvaluator {
    min_fields: usize,
}

impl CoverageEvaluator {
    pub fn new(min_fields: usize) -> Self {
        Self { min_fields }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.min_heuristic_fields)
    }

    /// `Some(reason)` when the AI fallback should run.
    pub fn evaluate(&self, heuristic: &CandidateSet) -> Option<EscalationReason> {
        let found = heuristic.len();

        if !heuristic.contains(FieldKind::Quantity) && !heuristic.contains(FieldKind::PricePerUnit) {
            return Some(EscalationReason::QuantityAndPriceMissing { found });
        }

        if found < self.min_fields {
            return Some(EscalationReason::LowCoverage {
                found,
                required: self.min_fields,
            });
        }

        None
    }
}

impl Default for CoverageEvaluator {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}
