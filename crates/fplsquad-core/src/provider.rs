// Candidate data interface and assembly of the pool a selection runs over.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::candidate::{Candidate, CandidatePool, Position};
use crate::error::{Result, SelectionError};
use crate::predict::ScorePredictor;

/// A player as the data source describes it. Position and cost can be
/// missing in raw data; a pool cannot be built from such a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: u32,
    pub team_id: u32,
    pub position: Option<Position>,
    pub cost: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Where candidate players and their availability come from.
pub trait CandidateDataProvider {
    fn candidates(&self) -> Result<Vec<CandidateRecord>>;

    /// Ids of players who cannot play in `period`.
    fn unavailable(&self, period: u32) -> Result<HashSet<u32>>;
}

/// Join the provider's records with the predictor's scores for `period`.
/// Players without a prediction and unavailable players are left out.
pub fn build_pool<D, P>(provider: &D, predictor: &P, period: u32) -> Result<CandidatePool>
where
    D: CandidateDataProvider + ?Sized,
    P: ScorePredictor + ?Sized,
{
    let records = provider.candidates()?;
    let scores = predictor.predict_scores(period)?;
    let unavailable = provider.unavailable(period)?;

    let mut candidates = Vec::with_capacity(scores.len());
    for record in records {
        if unavailable.contains(&record.id) {
            continue;
        }
        let Some(&predicted_score) = scores.get(&record.id) else {
            continue;
        };
        let position = record.position.ok_or_else(|| {
            SelectionError::DataPrecondition(format!("player {} has no position", record.id))
        })?;
        let cost = record.cost.ok_or_else(|| {
            SelectionError::DataPrecondition(format!("player {} has no cost", record.id))
        })?;
        candidates.push(Candidate {
            id: record.id,
            team_id: record.team_id,
            position,
            cost,
            predicted_score,
        });
    }

    debug!(
        predicted = scores.len(),
        unavailable = unavailable.len(),
        "candidate records joined"
    );
    let pool = CandidatePool::new(candidates)?;
    info!(period, candidates = pool.len(), "candidate pool built");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Static {
        records: Vec<CandidateRecord>,
        out: HashSet<u32>,
    }

    impl CandidateDataProvider for Static {
        fn candidates(&self) -> Result<Vec<CandidateRecord>> {
            Ok(self.records.clone())
        }

        fn unavailable(&self, _period: u32) -> Result<HashSet<u32>> {
            Ok(self.out.clone())
        }
    }

    struct Scores(HashMap<u32, f64>);

    impl ScorePredictor for Scores {
        fn predict_scores(&self, _period: u32) -> Result<HashMap<u32, f64>> {
            Ok(self.0.clone())
        }
    }

    fn record(id: u32, position: Option<Position>, cost: Option<f64>) -> CandidateRecord {
        CandidateRecord {
            id,
            team_id: id % 3,
            position,
            cost,
            name: None,
        }
    }

    #[test]
    fn joins_predictions_and_drops_unavailable() {
        let provider = Static {
            records: vec![
                record(1, Some(Position::Defender), Some(4.5)),
                record(2, Some(Position::Forward), Some(8.0)),
                record(3, Some(Position::Midfielder), Some(6.0)),
                record(4, Some(Position::Goalkeeper), Some(4.0)),
            ],
            out: HashSet::from([2]),
        };
        let predictor = Scores(HashMap::from([(1, 3.0), (2, 9.0), (4, 2.5), (99, 1.0)]));
        let pool = build_pool(&provider, &predictor, 10).unwrap();
        let ids: Vec<u32> = pool.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(pool.candidates()[0].predicted_score, 3.0);
        assert_eq!(pool.candidates()[1].cost, 4.0);
    }

    #[test]
    fn missing_position_is_a_data_error() {
        let provider = Static {
            records: vec![record(1, None, Some(4.5))],
            out: HashSet::new(),
        };
        let predictor = Scores(HashMap::from([(1, 3.0)]));
        let err = build_pool(&provider, &predictor, 1).unwrap_err();
        assert!(matches!(err, SelectionError::DataPrecondition(_)));
    }

    #[test]
    fn missing_cost_is_ignored_when_player_is_unavailable() {
        let provider = Static {
            records: vec![record(1, Some(Position::Defender), None)],
            out: HashSet::from([1]),
        };
        let predictor = Scores(HashMap::from([(1, 3.0)]));
        let pool = build_pool(&provider, &predictor, 1).unwrap();
        assert!(pool.is_empty());
    }
}
