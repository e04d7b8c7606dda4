//! Aggregation pipeline over a registry snapshot.
//!
//! Every entry point is a pure function of its inputs: the same records and
//! filter state always produce the same cohort, summaries and scores.

pub mod comparison;
pub mod completeness;
pub mod distribution;
pub mod filter;
pub mod summary;

pub use comparison::SnapshotComparison;
pub use completeness::{
    CRITICAL_FIELDS, CompletenessOverview, CompletenessScore, CompletionLevel, FieldSets,
    SECONDARY_FIELDS, ScoredRecord, score_completeness, score_completeness_with,
};
pub use distribution::{Bucket, Distribution};
pub use filter::{apply_filters, matches};
pub use summary::{
    AGE_BANDS, AgeBand, AgeSpan, CognitivePoint, GeneticConfirmation, NO_SPECIFIC_SYMPTOMS,
    RiskFactorShare, Summaries, summarize,
};
