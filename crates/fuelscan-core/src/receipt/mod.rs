//! Receipt field extraction module.

mod candidates;
mod coverage;
mod merge;
mod parser;
pub mod rules;

pub use candidates::CandidateSet;
pub use coverage::{CoverageEvaluator, EscalationReason};
pub use merge::ResultMerger;
pub use parser::HeuristicParser;
pub use rules::Plausibility;
