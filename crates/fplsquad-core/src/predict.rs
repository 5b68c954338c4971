// Score prediction: the predictor interface and the historical median
// predictor.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SelectionError};

/// Produces a predicted score per candidate id for an upcoming period.
pub trait ScorePredictor {
    fn predict_scores(&self, period: u32) -> Result<HashMap<u32, f64>>;
}

/// Identifiers of the prediction methods that can be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredictionMethod {
    MedianPastScore,
}

impl PredictionMethod {
    pub const KNOWN: [&'static str; 1] = ["median_past_score"];

    pub fn parse(id: &str) -> Result<Self> {
        match id.trim() {
            "median_past_score" => Ok(PredictionMethod::MedianPastScore),
            other => Err(SelectionError::config(
                "prediction.method",
                format!(
                    "unknown prediction method `{other}`, must be one of {}",
                    Self::KNOWN.join(", ")
                ),
            )),
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            PredictionMethod::MedianPastScore => "median_past_score",
        }
    }
}

impl fmt::Display for PredictionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Points one player scored in one finished period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointsRecord {
    pub player_id: u32,
    pub gameweek: u32,
    pub gameweek_points: f64,
}

/// Past results a predictor learns from.
pub trait PointsHistory {
    /// Whether `period` has been played and its points are final.
    fn is_finished(&self, period: u32) -> Result<bool>;

    /// Every record whose gameweek lies in `periods`.
    fn records(&self, periods: &[u32]) -> Result<Vec<PointsRecord>>;
}

/// Predicts a player's next score as the median of their recent scores.
#[derive(Debug, Clone)]
pub struct MedianPastScore<H> {
    history: H,
    n_previous_weeks: u32,
    min_required_weeks: usize,
}

impl<H: PointsHistory> MedianPastScore<H> {
    pub fn new(history: H, n_previous_weeks: u32, min_required_weeks: usize) -> Self {
        Self {
            history,
            n_previous_weeks,
            min_required_weeks,
        }
    }

    /// Periods looked back at when predicting `period`.
    pub fn window(&self, period: u32) -> Vec<u32> {
        let start = period.saturating_sub(self.n_previous_weeks).max(1);
        (start..period).collect()
    }
}

impl<H: PointsHistory> ScorePredictor for MedianPastScore<H> {
    fn predict_scores(&self, period: u32) -> Result<HashMap<u32, f64>> {
        let window = self.window(period);
        if window.is_empty() {
            return Err(SelectionError::DataPrecondition(format!(
                "no past periods to predict period {period} from"
            )));
        }
        for &p in &window {
            if !self.history.is_finished(p)? {
                return Err(SelectionError::DataPrecondition(format!(
                    "period {p} is not finished, cannot predict period {period}"
                )));
            }
        }

        let mut by_player: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for record in self.history.records(&window)? {
            by_player
                .entry(record.player_id)
                .or_default()
                .push(record.gameweek_points);
        }

        let predictions: HashMap<u32, f64> = by_player
            .into_iter()
            .filter(|(_, points)| points.len() > self.min_required_weeks)
            .map(|(id, mut points)| (id, median(&mut points)))
            .collect();
        debug!(
            period,
            window = window.len(),
            players = predictions.len(),
            "median scores predicted"
        );
        Ok(predictions)
    }
}

/// Median of a non-empty slice; mean of the middle two for even lengths.
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
