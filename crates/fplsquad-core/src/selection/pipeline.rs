// Squad selection pipeline: squad solve (naive or with preselection), then
// lineup, then annotation. The transfer scan runs this once per count.

use std::fmt;

use tracing::info;

use crate::candidate::CandidatePool;
use crate::error::{Result, SelectionError};
use crate::optimise::lineup::{optimise_lineup, LineupProblem};
use crate::optimise::preselect::{optimise_with_preselection, worst_teams};
use crate::optimise::roster::{optimise_roster, Continuity, RosterProblem, SquadLimits};
use crate::ruleset::Ruleset;
use crate::selection::scoring::{annotate, AnnotatedRoster, TransferPenalty};
use crate::selection::transfer::{scan_transfers, ScanOptions, TransferDecision};

/// How the squad solve is set up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMethod {
    /// Solve the whole squad in one go.
    Naive,
    /// Commit `players` cheap bench players first, skipping the
    /// `worst_teams` lowest-scoring teams.
    PreselectCheapest { players: usize, worst_teams: usize },
}

impl SelectionMethod {
    pub const KNOWN: [&'static str; 2] = ["preselect_cheapest_players", "naive"];

    /// Resolve a method identifier. The preselection settings are ignored by
    /// the naive method.
    pub fn parse(id: &str, players: usize, worst_teams: usize) -> Result<Self> {
        match id.trim() {
            "naive" => Ok(SelectionMethod::Naive),
            "preselect_cheapest_players" => Ok(SelectionMethod::PreselectCheapest {
                players,
                worst_teams,
            }),
            other => Err(SelectionError::config(
                "selection_method",
                format!(
                    "unknown method `{other}`, must be one of {}",
                    Self::KNOWN.join(", ")
                ),
            )),
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            SelectionMethod::Naive => "naive",
            SelectionMethod::PreselectCheapest { .. } => "preselect_cheapest_players",
        }
    }
}

impl fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Choose a squad for one period with the given method.
pub fn select_roster(
    pool: &CandidatePool,
    rules: &Ruleset,
    method: &SelectionMethod,
    continuity: Option<Continuity>,
) -> Result<CandidatePool> {
    match method {
        SelectionMethod::Naive => {
            let problem = RosterProblem::new(pool, SquadLimits::from_ruleset(rules));
            let problem = match continuity {
                Some(c) => problem.with_continuity(c),
                None => problem,
            };
            optimise_roster(&problem)
        }
        SelectionMethod::PreselectCheapest {
            players,
            worst_teams: n_worst,
        } => {
            let excluded = worst_teams(pool, *n_worst);
            optimise_with_preselection(pool, rules, *players, &excluded, continuity)
        }
    }
}

/// Squad, lineup and score for one scenario. `prior` and `substitutions`
/// must be given together; the transfer count charged is the number of
/// squad members that were not in `prior`.
pub fn evaluate(
    pool: &CandidatePool,
    rules: &Ruleset,
    method: &SelectionMethod,
    prior: Option<&CandidatePool>,
    substitutions: Option<usize>,
    free_transfers: usize,
) -> Result<AnnotatedRoster> {
    let continuity = match (prior, substitutions) {
        (Some(prior), Some(n)) => Some(Continuity::new(prior, n)),
        (None, None) => None,
        _ => {
            return Err(SelectionError::config(
                "substitutions",
                "a prior squad and a substitution count must be given together",
            ))
        }
    };

    let roster = select_roster(pool, rules, method, continuity)?;
    let lineup = optimise_lineup(&LineupProblem::from_ruleset(&roster, rules))?;
    let transfers = prior.map(|p| roster.iter().filter(|c| !p.contains(c.id)).count());
    let penalty = TransferPenalty {
        free_transfers,
        points_per_transfer: rules.transfer_penalty,
    };
    Ok(annotate(&roster, &lineup, transfers, &penalty))
}

/// The outcome of a full selection run.
#[derive(Debug, Clone)]
pub struct SquadSelection {
    pub squad: AnnotatedRoster,
    /// Present when a prior squad was given and transfers were scanned.
    pub decision: Option<TransferDecision>,
}

impl SquadSelection {
    pub fn total_score(&self) -> f64 {
        self.squad.total_score
    }
}

/// Entry point: pick the best squad for the next period. Without a prior
/// squad this is a single evaluation; with one, every substitution count is
/// scanned.
pub fn select_squad(
    pool: &CandidatePool,
    rules: &Ruleset,
    method: &SelectionMethod,
    prior: Option<&CandidatePool>,
    options: &ScanOptions,
) -> Result<SquadSelection> {
    rules.validate()?;
    info!(
        method = %method,
        candidates = pool.len(),
        with_prior = prior.is_some(),
        "selecting squad"
    );
    match prior {
        None => {
            let squad = evaluate(pool, rules, method, None, None, options.free_transfers)?;
            Ok(SquadSelection {
                squad,
                decision: None,
            })
        }
        Some(prior) => {
            let decision = scan_transfers(pool, rules, method, prior, options)?;
            Ok(SquadSelection {
                squad: decision.squad.clone(),
                decision: Some(decision),
            })
        }
    }
}
