// Candidate players and the pool a selection is made over.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SelectionError};

/// Playing positions. Declaration order is the category order used when
/// encoding positions, so it must stay GKP, DEF, MID, FWD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GKP", alias = "GK")]
    Goalkeeper,
    #[serde(rename = "DEF")]
    Defender,
    #[serde(rename = "MID")]
    Midfielder,
    #[serde(rename = "FWD", alias = "FW")]
    Forward,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    /// Parse a position abbreviation. Accepts the FPL short names
    /// ("GKP", "DEF", "MID", "FWD") plus "GK" and "FW", the same set the
    /// serde form accepts (case-insensitively here).
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GKP" | "GK" => Some(Position::Goalkeeper),
            "DEF" => Some(Position::Defender),
            "MID" => Some(Position::Midfielder),
            "FWD" | "FW" => Some(Position::Forward),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GKP",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// One selectable player for a single optimisation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: u32,
    pub team_id: u32,
    pub position: Position,
    pub cost: f64,
    pub predicted_score: f64,
}

/// An ordered collection of candidates with unique ids. Decision vectors
/// produced by the solver are indexed positionally against this order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
}

impl CandidatePool {
    /// Build a pool, rejecting duplicate ids and unusable numbers.
    pub fn new(candidates: Vec<Candidate>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(candidates.len());
        for c in &candidates {
            if !seen.insert(c.id) {
                return Err(SelectionError::DataPrecondition(format!(
                    "duplicate candidate id {}",
                    c.id
                )));
            }
            if !c.cost.is_finite() || c.cost < 0.0 {
                return Err(SelectionError::DataPrecondition(format!(
                    "candidate {} has invalid cost {}",
                    c.id, c.cost
                )));
            }
            if !c.predicted_score.is_finite() {
                return Err(SelectionError::DataPrecondition(format!(
                    "candidate {} has non-finite predicted score",
                    c.id
                )));
            }
        }
        Ok(Self { candidates })
    }

    /// Wrap candidates drawn from an already validated pool.
    pub(crate) fn from_validated(candidates: Vec<Candidate>) -> Self {
        debug_assert!(Self::new(candidates.clone()).is_ok());
        Self { candidates }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.candidates.iter().any(|c| c.id == id)
    }

    pub fn ids(&self) -> HashSet<u32> {
        self.candidates.iter().map(|c| c.id).collect()
    }

    pub fn total_cost(&self) -> f64 {
        self.candidates.iter().map(|c| c.cost).sum()
    }

    pub fn total_score(&self) -> f64 {
        self.candidates.iter().map(|c| c.predicted_score).sum()
    }

    /// Keep the candidates whose decision is `true`. The mask must be the
    /// same length as the pool.
    pub fn select(&self, mask: &[bool]) -> CandidatePool {
        debug_assert_eq!(mask.len(), self.candidates.len());
        let candidates = self
            .candidates
            .iter()
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|(c, _)| c.clone())
            .collect();
        CandidatePool { candidates }
    }

    /// A copy of the pool without the given ids.
    pub fn without(&self, ids: &HashSet<u32>) -> CandidatePool {
        let candidates = self
            .candidates
            .iter()
            .filter(|c| !ids.contains(&c.id))
            .cloned()
            .collect();
        CandidatePool { candidates }
    }

    /// Concatenate two pools. Fails if they share an id.
    pub fn union(&self, other: &CandidatePool) -> Result<CandidatePool> {
        let mut candidates = self.candidates.clone();
        candidates.extend(other.candidates.iter().cloned());
        CandidatePool::new(candidates)
    }

    pub fn position_counts(&self) -> BTreeMap<Position, usize> {
        let mut counts = BTreeMap::new();
        for c in &self.candidates {
            *counts.entry(c.position).or_insert(0) += 1;
        }
        counts
    }

    pub fn team_counts(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for c in &self.candidates {
            *counts.entry(c.team_id).or_insert(0) += 1;
        }
        counts
    }

    /// Sum of predicted scores per team.
    pub fn team_scores(&self) -> BTreeMap<u32, f64> {
        let mut scores = BTreeMap::new();
        for c in &self.candidates {
            *scores.entry(c.team_id).or_insert(0.0) += c.predicted_score;
        }
        scores
    }
}

impl<'a> IntoIterator for &'a CandidatePool {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}
