// Squad annotation and final score: starters, captaincy and transfer penalty.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, CandidatePool};

/// Captaincy tag on a starting player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Armband {
    Captain,
    ViceCaptain,
}

impl Armband {
    pub fn as_str(&self) -> &'static str {
        match self {
            Armband::Captain => "captain",
            Armband::ViceCaptain => "vice_captain",
        }
    }

    pub fn from_str_tag(s: &str) -> Option<Self> {
        match s.trim() {
            "captain" => Some(Armband::Captain),
            "vice_captain" => Some(Armband::ViceCaptain),
            _ => None,
        }
    }
}

impl fmt::Display for Armband {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How transfers beyond the free allowance are charged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferPenalty {
    pub free_transfers: usize,
    pub points_per_transfer: f64,
}

impl TransferPenalty {
    pub fn none() -> Self {
        Self {
            free_transfers: 0,
            points_per_transfer: 0.0,
        }
    }

    pub fn cost(&self, transfers: usize) -> f64 {
        transfers.saturating_sub(self.free_transfers) as f64 * self.points_per_transfer
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedCandidate {
    pub candidate: Candidate,
    pub starting: bool,
    pub armband: Option<Armband>,
}

/// A squad ready to present: starters first, best first, captain doubled and
/// penalties taken off.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRoster {
    pub entries: Vec<AnnotatedCandidate>,
    pub total_score: f64,
    pub transfers: Option<usize>,
    pub penalty: f64,
}

impl AnnotatedRoster {
    pub fn captain(&self) -> Option<&Candidate> {
        self.with_armband(Armband::Captain)
    }

    pub fn vice_captain(&self) -> Option<&Candidate> {
        self.with_armband(Armband::ViceCaptain)
    }

    fn with_armband(&self, armband: Armband) -> Option<&Candidate> {
        self.entries
            .iter()
            .find(|e| e.armband == Some(armband))
            .map(|e| &e.candidate)
    }

    pub fn starters(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.iter().filter(|e| e.starting).map(|e| &e.candidate)
    }

    pub fn bench(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.iter().filter(|e| !e.starting).map(|e| &e.candidate)
    }

    /// The squad as a plain pool, in presentation order.
    pub fn roster(&self) -> CandidatePool {
        let candidates = self.entries.iter().map(|e| e.candidate.clone()).collect();
        CandidatePool::from_validated(candidates)
    }
}

/// Mark starters, hand out the armbands and compute the squad's score.
///
/// The score is every starter's predicted score plus the captain's a second
/// time, less `penalty.cost(transfers)` when a transfer count is given.
pub fn annotate(
    roster: &CandidatePool,
    lineup: &CandidatePool,
    transfers: Option<usize>,
    penalty: &TransferPenalty,
) -> AnnotatedRoster {
    let starting_ids = lineup.ids();
    let mut entries: Vec<AnnotatedCandidate> = roster
        .iter()
        .map(|c| AnnotatedCandidate {
            starting: starting_ids.contains(&c.id),
            candidate: c.clone(),
            armband: None,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.starting
            .cmp(&a.starting)
            .then(b.candidate.predicted_score.total_cmp(&a.candidate.predicted_score))
    });

    let mut armbands = [Armband::Captain, Armband::ViceCaptain].into_iter();
    for entry in entries.iter_mut().filter(|e| e.starting) {
        match armbands.next() {
            Some(armband) => entry.armband = Some(armband),
            None => break,
        }
    }

    let starters: f64 = entries
        .iter()
        .filter(|e| e.starting)
        .map(|e| e.candidate.predicted_score)
        .sum();
    let captain_bonus = entries
        .iter()
        .find(|e| e.armband == Some(Armband::Captain))
        .map_or(0.0, |e| e.candidate.predicted_score);
    let penalty_points = transfers.map_or(0.0, |n| penalty.cost(n));

    AnnotatedRoster {
        entries,
        total_score: starters + captain_bonus - penalty_points,
        transfers,
        penalty: penalty_points,
    }
}
