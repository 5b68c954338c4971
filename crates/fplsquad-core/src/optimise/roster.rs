// Squad (roster) selection: budget, quotas, team cap and continuity with a
// previous squad.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::candidate::{CandidatePool, Position};
use crate::error::{ProblemKind, Result, SelectionError};
use crate::optimise::constraint::{self, LinearConstraint};
use crate::optimise::problem::{optimise, SelectionProblem};
use crate::ruleset::Ruleset;

/// The squad-level limits a roster solve must meet. Produced from a
/// [`Ruleset`] and, after preselection, from the players already committed.
#[derive(Debug, Clone, PartialEq)]
pub struct SquadLimits {
    pub squad_size: usize,
    pub budget: f64,
    pub quota: BTreeMap<Position, usize>,
    pub team_cap: usize,
    /// Team slots already taken by players committed outside the pool.
    pub team_usage: BTreeMap<u32, usize>,
}

impl SquadLimits {
    pub fn from_ruleset(rules: &Ruleset) -> Self {
        Self {
            squad_size: rules.squad_size,
            budget: rules.budget,
            quota: rules.quota.clone(),
            team_cap: rules.team_cap,
            team_usage: BTreeMap::new(),
        }
    }

    /// The limits left for the rest of the squad once `committed` is in it.
    /// Cost, size, quota and team usage all reduce additively, so a solve of
    /// the reduced limits plus `committed` meets the original limits.
    pub fn reduced_by(&self, committed: &CandidatePool) -> Result<SquadLimits> {
        let squad_size = self
            .squad_size
            .checked_sub(committed.len())
            .ok_or_else(|| SelectionError::Infeasible {
                kind: ProblemKind::Roster,
                reason: format!(
                    "{} committed players exceed the squad size {}",
                    committed.len(),
                    self.squad_size
                ),
            })?;

        let mut quota = self.quota.clone();
        for (pos, count) in committed.position_counts() {
            let slot = quota.entry(pos).or_insert(0);
            *slot = slot.checked_sub(count).ok_or_else(|| SelectionError::Infeasible {
                kind: ProblemKind::Roster,
                reason: format!("{count} committed {pos} players exceed the quota"),
            })?;
        }

        let mut team_usage = self.team_usage.clone();
        for (team, count) in committed.team_counts() {
            *team_usage.entry(team).or_insert(0) += count;
        }

        Ok(SquadLimits {
            squad_size,
            budget: self.budget - committed.total_cost(),
            quota,
            team_cap: self.team_cap,
            team_usage,
        })
    }
}

/// How much of a previous squad must be kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Continuity {
    prior_ids: HashSet<u32>,
    prior_size: usize,
    substitutions: usize,
    /// Prior-squad players already committed outside the pool.
    retained_outside: usize,
}

impl Continuity {
    pub fn new(prior: &CandidatePool, substitutions: usize) -> Self {
        Self {
            prior_ids: prior.ids(),
            prior_size: prior.len(),
            substitutions,
            retained_outside: 0,
        }
    }

    pub fn substitutions(&self) -> usize {
        self.substitutions
    }

    pub fn prior_ids(&self) -> &HashSet<u32> {
        &self.prior_ids
    }

    pub fn min_retained(&self) -> usize {
        self.prior_size
            .saturating_sub(self.substitutions)
            .saturating_sub(self.retained_outside)
    }

    pub fn max_retained(&self) -> usize {
        self.prior_size.saturating_sub(self.retained_outside)
    }

    /// Shift both bounds by the prior-squad players inside `committed`.
    pub fn reduced_by(&self, committed: &CandidatePool) -> Continuity {
        let kept = committed
            .iter()
            .filter(|c| self.prior_ids.contains(&c.id))
            .count();
        Continuity {
            retained_outside: self.retained_outside + kept,
            ..self.clone()
        }
    }
}

/// A squad solve over a pool.
#[derive(Debug, Clone)]
pub struct RosterProblem<'a> {
    pool: &'a CandidatePool,
    limits: SquadLimits,
    continuity: Option<Continuity>,
}

impl<'a> RosterProblem<'a> {
    pub fn new(pool: &'a CandidatePool, limits: SquadLimits) -> Self {
        Self {
            pool,
            limits,
            continuity: None,
        }
    }

    pub fn with_continuity(mut self, continuity: Continuity) -> Self {
        self.continuity = Some(continuity);
        self
    }

    /// Build a problem from optional prior-squad settings. The prior squad and
    /// substitution count must be given together.
    pub fn from_options(
        pool: &'a CandidatePool,
        limits: SquadLimits,
        prior: Option<&CandidatePool>,
        substitutions: Option<usize>,
    ) -> Result<Self> {
        let problem = Self::new(pool, limits);
        match (prior, substitutions) {
            (Some(prior), Some(n)) => Ok(problem.with_continuity(Continuity::new(prior, n))),
            (None, None) => Ok(problem),
            (Some(_), None) => Err(SelectionError::config(
                "substitutions",
                "a prior squad was given without a substitution count",
            )),
            (None, Some(_)) => Err(SelectionError::config(
                "substitutions",
                "a substitution count was given without a prior squad",
            )),
        }
    }

    pub fn limits(&self) -> &SquadLimits {
        &self.limits
    }

    pub fn continuity(&self) -> Option<&Continuity> {
        self.continuity.as_ref()
    }
}

impl SelectionProblem for RosterProblem<'_> {
    fn kind(&self) -> ProblemKind {
        ProblemKind::Roster
    }

    fn pool(&self) -> &CandidatePool {
        self.pool
    }

    fn cardinality(&self) -> usize {
        self.limits.squad_size
    }

    fn constraints(&self) -> Result<Vec<LinearConstraint>> {
        let mut constraints = vec![
            constraint::position_quota(self.pool, &self.limits.quota)?,
            constraint::cardinality(self.pool, self.cardinality()),
            constraint::budget(self.pool, self.limits.budget),
            constraint::team_cap(self.pool, self.limits.team_cap, &self.limits.team_usage),
        ];
        if let Some(c) = &self.continuity {
            constraints.push(constraint::continuity(
                self.pool,
                c.prior_ids(),
                c.min_retained(),
                c.max_retained(),
            ));
        }
        Ok(constraints)
    }
}

/// Solve for the highest-scoring squad.
pub fn optimise_roster(problem: &RosterProblem<'_>) -> Result<CandidatePool> {
    let roster = optimise(problem)?;
    debug!(
        players = roster.len(),
        cost = roster.total_cost(),
        score = roster.total_score(),
        "roster selected"
    );
    Ok(roster)
}
