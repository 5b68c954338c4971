// Transfer scan: evaluate every allowed substitution count against the prior
// squad and keep the best-scoring one.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::candidate::CandidatePool;
use crate::error::{ProblemKind, Result, SelectionError};
use crate::ruleset::Ruleset;
use crate::selection::pipeline::{evaluate, SelectionMethod};
use crate::selection::scoring::AnnotatedRoster;

/// Knobs for a selection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Transfers not charged a penalty.
    pub free_transfers: usize,
    /// Upper limit on substitution counts tried; `None` tries up to one less
    /// than the prior squad size.
    pub max_substitutions: Option<usize>,
    /// Evaluate counts on the rayon pool.
    pub parallel: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            free_transfers: 1,
            max_substitutions: None,
            parallel: true,
        }
    }
}

/// What happened at one substitution count.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferEvaluation {
    pub substitutions: usize,
    /// Final score, or the reason the count was dropped.
    pub outcome: std::result::Result<f64, String>,
}

impl TransferEvaluation {
    pub fn score(&self) -> Option<f64> {
        self.outcome.as_ref().ok().copied()
    }
}

/// The chosen substitution count and everything that was tried.
#[derive(Debug, Clone)]
pub struct TransferDecision {
    pub substitutions: usize,
    pub squad: AnnotatedRoster,
    /// One record per count, ascending.
    pub evaluations: Vec<TransferEvaluation>,
}

/// Substitution counts to try for a prior squad of `prior_size`.
pub fn substitution_range(prior_size: usize, max_substitutions: Option<usize>) -> Result<Vec<usize>> {
    if prior_size < 2 {
        return Err(SelectionError::config(
            "current_squad",
            format!("a prior squad of {prior_size} players leaves no substitution count to try"),
        ));
    }
    let upper = match max_substitutions {
        Some(max) => max.min(prior_size - 1),
        None => prior_size - 1,
    };
    if upper == 0 {
        return Err(SelectionError::config(
            "max_substitutions",
            "must allow at least one substitution",
        ));
    }
    Ok((1..=upper).collect())
}

/// Run the pipeline for every substitution count and keep the best squad.
/// Ties go to the smaller count. Infeasible counts are dropped; any other
/// failure aborts the scan.
pub fn scan_transfers(
    pool: &CandidatePool,
    rules: &Ruleset,
    method: &SelectionMethod,
    prior: &CandidatePool,
    options: &ScanOptions,
) -> Result<TransferDecision> {
    let counts = substitution_range(prior.len(), options.max_substitutions)?;
    let upper = counts.len();

    let run = |s: usize| {
        (
            s,
            evaluate(pool, rules, method, Some(prior), Some(s), options.free_transfers),
        )
    };
    let results: Vec<(usize, Result<AnnotatedRoster>)> = if options.parallel {
        counts.into_par_iter().map(run).collect()
    } else {
        counts.into_iter().map(run).collect()
    };

    let mut evaluations = Vec::with_capacity(results.len());
    let mut best: Option<(usize, AnnotatedRoster)> = None;
    for (s, result) in results {
        match result {
            Ok(squad) => {
                evaluations.push(TransferEvaluation {
                    substitutions: s,
                    outcome: Ok(squad.total_score),
                });
                let better = match &best {
                    Some((_, current)) => squad.total_score > current.total_score,
                    None => true,
                };
                if better {
                    best = Some((s, squad));
                }
            }
            Err(err) if err.is_infeasible() => {
                warn!(substitutions = s, error = %err, "substitution count infeasible");
                evaluations.push(TransferEvaluation {
                    substitutions: s,
                    outcome: Err(err.to_string()),
                });
            }
            Err(err) => return Err(err),
        }
    }

    let (substitutions, squad) = best.ok_or_else(|| SelectionError::Infeasible {
        kind: ProblemKind::Roster,
        reason: format!("no substitution count between 1 and {upper} yields a feasible squad"),
    })?;
    info!(
        substitutions,
        transfers = squad.transfers.unwrap_or(0),
        score = squad.total_score,
        "transfer decision"
    );
    Ok(TransferDecision {
        substitutions,
        squad,
        evaluations,
    })
}
