// From squad to final answer: scoring, the transfer scan and the pipeline
// that ties the optimisers together.

pub mod pipeline;
pub mod scoring;
pub mod transfer;

pub use pipeline::{evaluate, select_roster, select_squad, SelectionMethod, SquadSelection};
pub use scoring::{annotate, AnnotatedCandidate, AnnotatedRoster, Armband, TransferPenalty};
pub use transfer::{
    scan_transfers, substitution_range, ScanOptions, TransferDecision, TransferEvaluation,
};
