// Shared unit-test fixtures.

use std::collections::HashSet;

use crate::candidate::{Candidate, CandidatePool, Position};
use crate::ruleset::Ruleset;

/// Ten teams, each with one goalkeeper, two defenders, two midfielders and
/// one forward. Costs and scores are spread so the budget binds.
pub fn league_pool() -> CandidatePool {
    let layout = [
        (Position::Goalkeeper, 0u32),
        (Position::Defender, 1),
        (Position::Defender, 2),
        (Position::Midfielder, 3),
        (Position::Midfielder, 4),
        (Position::Forward, 5),
    ];
    let mut candidates = Vec::new();
    for team in 1..=10u32 {
        for &(position, slot) in &layout {
            let id = team * 10 + slot;
            let cost = match position {
                Position::Goalkeeper => 4.0 + (team % 4) as f64 * 0.5,
                Position::Defender => 4.0 + ((team + slot) % 5) as f64 * 0.5,
                Position::Midfielder => 5.0 + ((team * 3 + slot) % 9) as f64 * 0.5,
                Position::Forward => 5.5 + ((team * 7) % 12) as f64 * 0.5,
            };
            let predicted_score = 1.2 * cost + ((id * 37) % 11) as f64 * 0.3;
            candidates.push(Candidate {
                id,
                team_id: team,
                position,
                cost,
                predicted_score,
            });
        }
    }
    CandidatePool::new(candidates).expect("fixture ids are unique")
}

/// Assert every squad invariant of `rules` holds for `roster`.
pub fn assert_valid_roster(roster: &CandidatePool, rules: &Ruleset) {
    assert_eq!(roster.len(), rules.squad_size, "squad size");
    assert!(
        roster.total_cost() <= rules.budget + 1e-6,
        "cost {} exceeds budget {}",
        roster.total_cost(),
        rules.budget
    );
    let counts = roster.position_counts();
    for pos in Position::ALL {
        assert_eq!(
            counts.get(&pos).copied().unwrap_or(0),
            rules.quota(pos),
            "quota for {pos}"
        );
    }
    for (team, count) in roster.team_counts() {
        assert!(count <= rules.team_cap, "team {team} has {count} players");
    }
}

/// Assert `lineup` is a valid formation drawn from `roster`.
pub fn assert_valid_lineup(lineup: &CandidatePool, roster: &CandidatePool, rules: &Ruleset) {
    assert_eq!(lineup.len(), rules.lineup_size, "lineup size");
    let roster_ids: HashSet<u32> = roster.ids();
    assert!(lineup.iter().all(|c| roster_ids.contains(&c.id)));
    let counts = lineup.position_counts();
    for pos in Position::ALL {
        let n = counts.get(&pos).copied().unwrap_or(0);
        let bounds = rules.formation(pos);
        assert!(
            bounds.min <= n && n <= bounds.max,
            "{pos} count {n} outside {}..={}",
            bounds.min,
            bounds.max
        );
    }
}
