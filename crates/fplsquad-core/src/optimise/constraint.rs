// Linear constraints over a 0/1 decision vector indexed by pool position.
//
// Every builder here is a pure function of the pool and the rule values it is
// handed. Problems collect the builders they need into a single list.

use std::collections::{BTreeMap, HashSet};

use crate::candidate::{CandidatePool, Position};
use crate::error::Result;
use crate::optimise::encoder::OneHotEncoding;
use crate::ruleset::FormationBounds;

/// `lower[i] <= rows[i] · x <= upper[i]` for every row. Equality is
/// `lower == upper`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub label: &'static str,
    pub rows: Vec<Vec<f64>>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl LinearConstraint {
    pub fn single(label: &'static str, weights: Vec<f64>, lower: f64, upper: f64) -> Self {
        Self {
            label,
            rows: vec![weights],
            lower: vec![lower],
            upper: vec![upper],
        }
    }

    /// Check a decision vector against every row, with a small tolerance for
    /// fractional weights such as costs.
    pub fn is_satisfied_by(&self, decisions: &[bool]) -> bool {
        const EPS: f64 = 1e-6;
        self.rows
            .iter()
            .zip(self.lower.iter().zip(&self.upper))
            .all(|(row, (&lo, &hi))| {
                let total: f64 = row
                    .iter()
                    .zip(decisions)
                    .filter(|(_, picked)| **picked)
                    .map(|(w, _)| w)
                    .sum();
                total >= lo - EPS && total <= hi + EPS
            })
    }
}

/// Total cost within `[0, budget]`.
pub fn budget(pool: &CandidatePool, budget: f64) -> LinearConstraint {
    let weights = pool.iter().map(|c| c.cost).collect();
    LinearConstraint::single("budget", weights, 0.0, budget)
}

/// At most `cap` selections per team, less any slots a team has already used
/// outside this pool. All teams are covered by one joint constraint.
pub fn team_cap(pool: &CandidatePool, cap: usize, used: &BTreeMap<u32, usize>) -> LinearConstraint {
    let teams: Vec<u32> = pool.iter().map(|c| c.team_id).collect();
    let encoding = OneHotEncoding::fit(&teams);
    let upper = encoding
        .categories
        .iter()
        .map(|team| cap.saturating_sub(used.get(team).copied().unwrap_or(0)) as f64)
        .collect::<Vec<_>>();
    LinearConstraint {
        label: "team",
        lower: vec![0.0; upper.len()],
        upper,
        rows: encoding.transposed(),
    }
}

/// Exactly `quota[p]` selections of each position.
pub fn position_quota(
    pool: &CandidatePool,
    quota: &BTreeMap<Position, usize>,
) -> Result<LinearConstraint> {
    let bounds = Position::ALL
        .iter()
        .map(|pos| {
            let q = quota.get(pos).copied().unwrap_or(0);
            FormationBounds { min: q, max: q }
        })
        .collect::<Vec<_>>();
    position_rows(pool, &bounds)
}

/// Between `min` and `max` selections of each position.
pub fn position_bounds(
    pool: &CandidatePool,
    formation: &BTreeMap<Position, FormationBounds>,
) -> Result<LinearConstraint> {
    let bounds = Position::ALL
        .iter()
        .map(|pos| {
            formation
                .get(pos)
                .copied()
                .unwrap_or(FormationBounds { min: 0, max: 0 })
        })
        .collect::<Vec<_>>();
    position_rows(pool, &bounds)
}

fn position_rows(pool: &CandidatePool, bounds: &[FormationBounds]) -> Result<LinearConstraint> {
    let positions: Vec<Position> = pool.iter().map(|c| c.position).collect();
    let encoding = OneHotEncoding::fit_with(&positions, &Position::ALL)?;
    Ok(LinearConstraint {
        label: "position",
        rows: encoding.transposed(),
        lower: bounds.iter().map(|b| b.min as f64).collect(),
        upper: bounds.iter().map(|b| b.max as f64).collect(),
    })
}

/// Exactly `n` selections.
pub fn cardinality(pool: &CandidatePool, n: usize) -> LinearConstraint {
    LinearConstraint::single("cardinality", vec![1.0; pool.len()], n as f64, n as f64)
}

/// Between `min_retained` and `max_retained` selections drawn from the prior
/// roster.
pub fn continuity(
    pool: &CandidatePool,
    prior_ids: &HashSet<u32>,
    min_retained: usize,
    max_retained: usize,
) -> LinearConstraint {
    let weights = pool
        .iter()
        .map(|c| if prior_ids.contains(&c.id) { 1.0 } else { 0.0 })
        .collect();
    LinearConstraint::single(
        "continuity",
        weights,
        min_retained as f64,
        max_retained as f64,
    )
}
