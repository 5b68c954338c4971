// Starting lineup selection from an already chosen squad.

use std::collections::BTreeMap;

use tracing::debug;

use crate::candidate::{CandidatePool, Position};
use crate::error::{ProblemKind, Result};
use crate::optimise::constraint::{self, LinearConstraint};
use crate::optimise::problem::{optimise, SelectionProblem};
use crate::ruleset::{FormationBounds, Ruleset};

/// Pick `lineup_size` starters from a squad within the formation bounds.
/// Budget and team limits were settled when the squad was chosen.
#[derive(Debug, Clone)]
pub struct LineupProblem<'a> {
    roster: &'a CandidatePool,
    lineup_size: usize,
    formation: BTreeMap<Position, FormationBounds>,
}

impl<'a> LineupProblem<'a> {
    pub fn new(
        roster: &'a CandidatePool,
        lineup_size: usize,
        formation: BTreeMap<Position, FormationBounds>,
    ) -> Self {
        Self {
            roster,
            lineup_size,
            formation,
        }
    }

    pub fn from_ruleset(roster: &'a CandidatePool, rules: &Ruleset) -> Self {
        Self::new(roster, rules.lineup_size, rules.formation.clone())
    }
}

impl SelectionProblem for LineupProblem<'_> {
    fn kind(&self) -> ProblemKind {
        ProblemKind::Lineup
    }

    fn pool(&self) -> &CandidatePool {
        self.roster
    }

    fn cardinality(&self) -> usize {
        self.lineup_size
    }

    fn constraints(&self) -> Result<Vec<LinearConstraint>> {
        Ok(vec![
            constraint::position_bounds(self.roster, &self.formation)?,
            constraint::cardinality(self.roster, self.lineup_size),
        ])
    }
}

pub fn optimise_lineup(problem: &LineupProblem<'_>) -> Result<CandidatePool> {
    let lineup = optimise(problem)?;
    debug!(
        starters = lineup.len(),
        score = lineup.total_score(),
        "lineup selected"
    );
    Ok(lineup)
}
