// Cheapest-bench preselection.
//
// Commits a few of the cheapest players to bench-only slots before the squad
// solve, then solves the smaller problem that is left. The reduction is exact:
// budget, squad size, quotas, team usage and continuity all shrink by what was
// committed, so the union meets the original limits.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::candidate::{Candidate, CandidatePool, Position};
use crate::error::Result;
use crate::optimise::roster::{optimise_roster, Continuity, RosterProblem, SquadLimits};
use crate::ruleset::Ruleset;

/// The `n` teams with the lowest total predicted score, lowest first. Ties
/// go to the lower team id.
pub fn worst_teams(pool: &CandidatePool, n: usize) -> Vec<u32> {
    let mut totals: Vec<(u32, f64)> = pool.team_scores().into_iter().collect();
    totals.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    totals.into_iter().take(n).map(|(team, _)| team).collect()
}

/// Walk candidates from cheapest up, taking each one whose position still has
/// bench room and whose team is under the cap, until `count` are taken.
/// Candidates from `excluded_teams` are skipped. Returns fewer than `count`
/// when eligible candidates run out.
pub fn preselect_cheapest(
    pool: &CandidatePool,
    rules: &Ruleset,
    count: usize,
    excluded_teams: &[u32],
) -> CandidatePool {
    let mut eligible: Vec<&Candidate> = pool
        .iter()
        .filter(|c| !excluded_teams.contains(&c.team_id))
        .collect();
    // Stable: equal costs keep pool order.
    eligible.sort_by(|a, b| a.cost.total_cmp(&b.cost));

    let mut per_position: BTreeMap<Position, usize> = BTreeMap::new();
    let mut per_team: BTreeMap<u32, usize> = BTreeMap::new();
    let mut chosen = Vec::with_capacity(count);
    for c in eligible {
        if chosen.len() == count {
            break;
        }
        let taken = per_position.entry(c.position).or_insert(0);
        let team_taken = per_team.entry(c.team_id).or_insert(0);
        if *taken < rules.bench_cap(c.position) && *team_taken < rules.team_cap {
            *taken += 1;
            *team_taken += 1;
            chosen.push(c.clone());
        }
    }

    CandidatePool::from_validated(chosen)
}

/// A squad problem with some players already committed.
#[derive(Debug, Clone)]
pub struct Preselection {
    pub preselected: CandidatePool,
    pub remaining: CandidatePool,
    pub limits: SquadLimits,
    pub continuity: Option<Continuity>,
}

impl Preselection {
    /// Preselect from `pool` and build the reduced problem.
    pub fn new(
        pool: &CandidatePool,
        rules: &Ruleset,
        count: usize,
        excluded_teams: &[u32],
        continuity: Option<Continuity>,
    ) -> Result<Self> {
        let preselected = preselect_cheapest(pool, rules, count, excluded_teams);
        if preselected.len() < count {
            debug!(
                requested = count,
                taken = preselected.len(),
                "fewer preselection candidates than requested"
            );
        }
        let ids: HashSet<u32> = preselected.ids();
        let remaining = pool.without(&ids);
        let limits = SquadLimits::from_ruleset(rules).reduced_by(&preselected)?;
        let continuity = continuity.map(|c| c.reduced_by(&preselected));
        Ok(Self {
            preselected,
            remaining,
            limits,
            continuity,
        })
    }

    pub fn problem(&self) -> RosterProblem<'_> {
        let problem = RosterProblem::new(&self.remaining, self.limits.clone());
        match &self.continuity {
            Some(c) => problem.with_continuity(c.clone()),
            None => problem,
        }
    }

    /// Solve the reduced problem and add the preselected players back.
    pub fn solve(&self) -> Result<CandidatePool> {
        let rest = optimise_roster(&self.problem())?;
        rest.union(&self.preselected)
    }
}

/// Preselect the cheapest bench players, then optimise the rest of the squad.
pub fn optimise_with_preselection(
    pool: &CandidatePool,
    rules: &Ruleset,
    count: usize,
    excluded_teams: &[u32],
    continuity: Option<Continuity>,
) -> Result<CandidatePool> {
    Preselection::new(pool, rules, count, excluded_teams, continuity)?.solve()
}
