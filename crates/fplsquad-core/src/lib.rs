// Library root: the squad selection engine and the narrow interfaces it
// consumes (score prediction, candidate data) and produces (persisted CSV).

pub mod cache;
pub mod candidate;
pub mod error;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod optimise;
pub mod persist;
pub mod predict;
pub mod provider;
pub mod ruleset;
pub mod selection;

pub use candidate::{Candidate, CandidatePool, Position};
pub use error::{ProblemKind, SelectionError};
pub use ruleset::Ruleset;
