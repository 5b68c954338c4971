// End-to-end: records and history in, annotated squad out, then a second
// period with the saved squad as the prior.

use std::collections::HashSet;

use fplsquad_core::cache::{PoolCache, PoolKey};
use fplsquad_core::persist::{read_prior_roster, write_selection};
use fplsquad_core::predict::{MedianPastScore, PointsHistory, PointsRecord, PredictionMethod};
use fplsquad_core::provider::{build_pool, CandidateDataProvider, CandidateRecord};
use fplsquad_core::selection::{select_squad, Armband, ScanOptions, SelectionMethod};
use fplsquad_core::{CandidatePool, Position, Ruleset, SelectionError};

struct League {
    records: Vec<CandidateRecord>,
    injured: HashSet<u32>,
}

impl CandidateDataProvider for League {
    fn candidates(&self) -> Result<Vec<CandidateRecord>, SelectionError> {
        Ok(self.records.clone())
    }

    fn unavailable(&self, _period: u32) -> Result<HashSet<u32>, SelectionError> {
        Ok(self.injured.clone())
    }
}

struct History {
    finished_through: u32,
    points: Vec<PointsRecord>,
}

impl PointsHistory for History {
    fn is_finished(&self, period: u32) -> Result<bool, SelectionError> {
        Ok(period <= self.finished_through)
    }

    fn records(&self, periods: &[u32]) -> Result<Vec<PointsRecord>, SelectionError> {
        Ok(self
            .points
            .iter()
            .filter(|r| periods.contains(&r.gameweek))
            .copied()
            .collect())
    }
}

/// 12 teams of 2 GKP, 4 DEF, 4 MID, 3 FWD with six weeks of points.
fn league() -> (League, History) {
    let layout = [
        (Position::Goalkeeper, 2, 4.0),
        (Position::Defender, 4, 4.5),
        (Position::Midfielder, 4, 6.0),
        (Position::Forward, 3, 6.5),
    ];
    let mut records = Vec::new();
    let mut points = Vec::new();
    for team in 1..=12u32 {
        let mut slot = 0u32;
        for (position, count, base_cost) in layout {
            for _ in 0..count {
                slot += 1;
                let id = team * 100 + slot;
                let cost = base_cost + ((team + slot) % 6) as f64 * 0.5;
                records.push(CandidateRecord {
                    id,
                    team_id: team,
                    position: Some(position),
                    cost: Some(cost),
                    name: Some(format!("P{id}")),
                });
                for gw in 1..=6u32 {
                    let pts = ((id * 31 + gw * 17) % 9) as f64 + cost / 2.0;
                    points.push(PointsRecord {
                        player_id: id,
                        gameweek: gw,
                        gameweek_points: pts,
                    });
                }
            }
        }
    }
    let injured = HashSet::from([105, 210, 311]);
    (
        League { records, injured },
        History {
            finished_through: 6,
            points,
        },
    )
}

fn check_squad(roster: &CandidatePool, rules: &Ruleset) {
    assert_eq!(roster.len(), rules.squad_size);
    assert!(roster.total_cost() <= rules.budget + 1e-6);
    for pos in Position::ALL {
        assert_eq!(
            roster.position_counts().get(&pos).copied().unwrap_or(0),
            rules.quota(pos)
        );
    }
    assert!(roster.team_counts().values().all(|&n| n <= rules.team_cap));
}

#[test]
fn first_squad_then_transfers() {
    let rules = Ruleset::default();
    let (league, history) = league();
    let predictor = MedianPastScore::new(history, 5, 3);
    let cache = PoolCache::new();
    let key = PoolKey::new(7, PredictionMethod::MedianPastScore)
        .with_param("n_previous_weeks", 5)
        .with_param("min_required_weeks", 3);
    let pool = cache
        .get_or_build(&key, || build_pool(&league, &predictor, 7))
        .unwrap();
    assert!(pool.iter().all(|c| !league.injured.contains(&c.id)));

    let method = SelectionMethod::PreselectCheapest {
        players: 4,
        worst_teams: 5,
    };
    let options = ScanOptions {
        free_transfers: 1,
        max_substitutions: Some(4),
        parallel: true,
    };
    let first = select_squad(&pool, &rules, &method, None, &options).unwrap();
    check_squad(&first.squad.roster(), &rules);
    assert_eq!(first.squad.starters().count(), rules.lineup_size);
    assert!(first.squad.captain().is_some());
    assert!(first.squad.vice_captain().is_some());
    assert_eq!(first.squad.entries[0].armband, Some(Armband::Captain));

    let mut saved = Vec::new();
    write_selection(&mut saved, &first.squad).unwrap();
    let prior = read_prior_roster(saved.as_slice()).unwrap();
    assert_eq!(prior.ids(), first.squad.roster().ids());

    let next = select_squad(&pool, &rules, &method, Some(&prior), &options).unwrap();
    let decision = next.decision.as_ref().unwrap();
    assert!((1..=4).contains(&decision.substitutions));
    assert_eq!(decision.evaluations.len(), 4);
    let roster = next.squad.roster();
    check_squad(&roster, &rules);
    let kept = roster.ids().intersection(&prior.ids()).count();
    assert!(kept >= rules.squad_size - decision.substitutions);
    let transfers = next.squad.transfers.unwrap();
    assert_eq!(transfers, rules.squad_size - kept);
    let best = decision
        .evaluations
        .iter()
        .filter_map(|e| e.score())
        .fold(f64::NEG_INFINITY, f64::max);
    assert!((next.total_score() - best).abs() < 1e-9);
}

#[test]
fn naive_and_preselect_both_respect_rules() {
    let rules = Ruleset::default();
    let (league, history) = league();
    let predictor = MedianPastScore::new(history, 4, 2);
    let pool = build_pool(&league, &predictor, 7).unwrap();
    for method in [
        SelectionMethod::Naive,
        SelectionMethod::parse("preselect_cheapest_players", 3, 4).unwrap(),
    ] {
        let selection = select_squad(&pool, &rules, &method, None, &ScanOptions::default()).unwrap();
        check_squad(&selection.squad.roster(), &rules);
    }
}

#[test]
fn unfinished_history_stops_the_run() {
    let (league, history) = league();
    let predictor = MedianPastScore::new(history, 5, 3);
    let err = build_pool(&league, &predictor, 9).unwrap_err();
    assert!(matches!(err, SelectionError::DataPrecondition(_)));
}
