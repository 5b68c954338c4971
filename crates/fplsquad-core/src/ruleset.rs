// Game rules the optimisers enforce: squad shape, budget, formation and
// transfer penalties.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::candidate::Position;
use crate::error::{Result, SelectionError};

/// Inclusive `[min, max]` count of a position in a starting lineup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormationBounds {
    pub min: usize,
    pub max: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    /// Players in a full squad.
    pub squad_size: usize,
    /// Players in the starting lineup.
    pub lineup_size: usize,
    pub budget: f64,
    /// Maximum squad members from any one team.
    pub team_cap: usize,
    /// Points deducted for each transfer beyond the free allowance.
    pub transfer_penalty: f64,
    /// Exact number of squad members per position.
    pub quota: BTreeMap<Position, usize>,
    pub formation: BTreeMap<Position, FormationBounds>,
}

impl Default for Ruleset {
    fn default() -> Self {
        let quota = BTreeMap::from([
            (Position::Goalkeeper, 2),
            (Position::Defender, 5),
            (Position::Midfielder, 5),
            (Position::Forward, 3),
        ]);
        let formation = BTreeMap::from([
            (Position::Goalkeeper, FormationBounds { min: 1, max: 1 }),
            (Position::Defender, FormationBounds { min: 3, max: 5 }),
            (Position::Midfielder, FormationBounds { min: 0, max: 5 }),
            (Position::Forward, FormationBounds { min: 1, max: 3 }),
        ]);
        Ruleset {
            squad_size: 15,
            lineup_size: 11,
            budget: 100.0,
            team_cap: 3,
            transfer_penalty: 4.0,
            quota,
            formation,
        }
    }
}

impl Ruleset {
    pub fn quota(&self, pos: Position) -> usize {
        self.quota.get(&pos).copied().unwrap_or(0)
    }

    pub fn formation(&self, pos: Position) -> FormationBounds {
        self.formation
            .get(&pos)
            .copied()
            .unwrap_or(FormationBounds { min: 0, max: 0 })
    }

    /// How many squad members of a position can sit on the bench in every
    /// valid lineup. These are the slots preselection may fill.
    pub fn bench_cap(&self, pos: Position) -> usize {
        self.quota(pos).saturating_sub(self.formation(pos).min)
    }

    /// Check the ruleset is internally consistent. A ruleset that passes can
    /// always field a lineup from any squad that meets its quotas.
    pub fn validate(&self) -> Result<()> {
        if !(self.budget.is_finite() && self.budget > 0.0) {
            return Err(SelectionError::config(
                "ruleset.budget",
                format!("must be a positive number, got {}", self.budget),
            ));
        }
        if self.team_cap == 0 {
            return Err(SelectionError::config("ruleset.team_cap", "must be > 0"));
        }
        if !(self.transfer_penalty.is_finite() && self.transfer_penalty >= 0.0) {
            return Err(SelectionError::config(
                "ruleset.transfer_penalty",
                format!("must be >= 0, got {}", self.transfer_penalty),
            ));
        }
        if self.lineup_size == 0 || self.lineup_size > self.squad_size {
            return Err(SelectionError::config(
                "ruleset.lineup_size",
                format!(
                    "must be between 1 and squad_size ({}), got {}",
                    self.squad_size, self.lineup_size
                ),
            ));
        }

        for pos in Position::ALL {
            if !self.quota.contains_key(&pos) {
                return Err(SelectionError::config(
                    format!("ruleset.quota.{pos}"),
                    "missing position",
                ));
            }
            let Some(bounds) = self.formation.get(&pos) else {
                return Err(SelectionError::config(
                    format!("ruleset.formation.{pos}"),
                    "missing position",
                ));
            };
            if bounds.min > bounds.max {
                return Err(SelectionError::config(
                    format!("ruleset.formation.{pos}"),
                    format!("min ({}) exceeds max ({})", bounds.min, bounds.max),
                ));
            }
            if bounds.max > self.quota(pos) {
                return Err(SelectionError::config(
                    format!("ruleset.formation.{pos}"),
                    format!("max ({}) exceeds quota ({})", bounds.max, self.quota(pos)),
                ));
            }
        }

        let quota_total: usize = self.quota.values().sum();
        if quota_total != self.squad_size {
            return Err(SelectionError::config(
                "ruleset.quota",
                format!(
                    "quotas sum to {quota_total} but squad_size is {}",
                    self.squad_size
                ),
            ));
        }

        let min_total: usize = self.formation.values().map(|b| b.min).sum();
        let max_total: usize = self.formation.values().map(|b| b.max).sum();
        if !(min_total..=max_total).contains(&self.lineup_size) {
            return Err(SelectionError::config(
                "ruleset.formation",
                format!(
                    "lineup_size {} is outside the formation range {min_total}..={max_total}",
                    self.lineup_size
                ),
            ));
        }

        Ok(())
    }
}
