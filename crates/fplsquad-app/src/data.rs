// File-backed candidate data and points history: the FPL bootstrap snapshot
// (JSON) plus points and availability CSVs.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use fplsquad_core::predict::{PointsHistory, PointsRecord};
use fplsquad_core::provider::{CandidateDataProvider, CandidateRecord};
use fplsquad_core::{Position, SelectionError};
use serde::Deserialize;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

// ---------------------------------------------------------------------------
// Bootstrap snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct RawElement {
    id: u32,
    team: u32,
    element_type: u32,
    /// Price in tenths.
    now_cost: Option<u32>,
    #[serde(default)]
    web_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawElementType {
    id: u32,
    singular_name_short: String,
}

/// One gameweek of the season calendar.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Event {
    pub id: u32,
    pub finished: bool,
    #[serde(default)]
    pub deadline_time: Option<DateTime<Utc>>,
}

/// The parts of the FPL `bootstrap-static` snapshot the selector reads.
/// Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Bootstrap {
    elements: Vec<RawElement>,
    element_types: Vec<RawElementType>,
    pub events: Vec<Event>,
}

impl Bootstrap {
    pub fn event(&self, id: u32) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Players as candidate records. An element type that is not a known
    /// position leaves the record's position empty.
    pub fn records(&self) -> Vec<CandidateRecord> {
        let positions: HashMap<u32, Option<Position>> = self
            .element_types
            .iter()
            .map(|t| (t.id, Position::from_str_pos(&t.singular_name_short)))
            .collect();
        self.elements
            .iter()
            .map(|e| CandidateRecord {
                id: e.id,
                team_id: e.team,
                position: positions.get(&e.element_type).copied().flatten(),
                cost: e.now_cost.map(|c| c as f64 / 10.0),
                name: e.web_name.clone(),
            })
            .collect()
    }
}

pub fn parse_bootstrap<R: Read>(rdr: R) -> Result<Bootstrap, serde_json::Error> {
    serde_json::from_reader(rdr)
}

pub fn load_bootstrap(path: &Path) -> Result<Bootstrap, DataError> {
    let file = open(path)?;
    let bootstrap = parse_bootstrap(file).map_err(|source| DataError::Json {
        path: path.display().to_string(),
        source,
    })?;
    info!(
        "Loaded bootstrap with {} players, {} events",
        bootstrap.elements.len(),
        bootstrap.events.len()
    );
    Ok(bootstrap)
}

// ---------------------------------------------------------------------------
// Points and availability CSVs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawUnavailable {
    player_id: u32,
    #[serde(default)]
    until_gameweek: Option<u32>,
}

/// A player ruled out until a gameweek, or indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unavailability {
    pub player_id: u32,
    pub until_gameweek: Option<u32>,
}

impl Unavailability {
    pub fn rules_out(&self, period: u32) -> bool {
        self.until_gameweek.map_or(true, |until| period <= until)
    }
}

fn load_points_from_reader<R: Read>(rdr: R) -> Result<Vec<PointsRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut records = Vec::new();
    for result in reader.deserialize::<PointsRecord>() {
        match result {
            Ok(raw) => {
                if !raw.gameweek_points.is_finite() {
                    warn!("skipping points for player {}: non-finite value", raw.player_id);
                    continue;
                }
                records.push(raw);
            }
            Err(e) => {
                warn!("skipping malformed points row: {}", e);
            }
        }
    }
    Ok(records)
}

fn load_unavailable_from_reader<R: Read>(rdr: R) -> Result<Vec<Unavailability>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut out = Vec::new();
    for result in reader.deserialize::<RawUnavailable>() {
        match result {
            Ok(raw) => out.push(Unavailability {
                player_id: raw.player_id,
                until_gameweek: raw.until_gameweek,
            }),
            Err(e) => {
                warn!("skipping malformed unavailable row: {}", e);
            }
        }
    }
    Ok(out)
}

pub fn load_points(path: &Path) -> Result<Vec<PointsRecord>, DataError> {
    let records = load_points_from_reader(open(path)?).map_err(|source| DataError::Csv {
        path: path.display().to_string(),
        source,
    })?;
    info!("Loaded {} points records from {}", records.len(), path.display());
    Ok(records)
}

/// A missing file means nobody is ruled out.
pub fn load_unavailable(path: &Path) -> Result<Vec<Unavailability>, DataError> {
    if !path.exists() {
        warn!("no unavailable list at {}, assuming everyone is fit", path.display());
        return Ok(Vec::new());
    }
    load_unavailable_from_reader(open(path)?).map_err(|source| DataError::Csv {
        path: path.display().to_string(),
        source,
    })
}

fn open(path: &Path) -> Result<File, DataError> {
    File::open(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Collaborator implementations
// ---------------------------------------------------------------------------

/// Candidates from a bootstrap snapshot, availability from a CSV list.
#[derive(Debug, Clone)]
pub struct FileProvider {
    bootstrap: Bootstrap,
    unavailable: Vec<Unavailability>,
}

impl FileProvider {
    pub fn new(bootstrap: Bootstrap, unavailable: Vec<Unavailability>) -> Self {
        Self {
            bootstrap,
            unavailable,
        }
    }
}

impl CandidateDataProvider for FileProvider {
    fn candidates(&self) -> Result<Vec<CandidateRecord>, SelectionError> {
        Ok(self.bootstrap.records())
    }

    fn unavailable(&self, period: u32) -> Result<HashSet<u32>, SelectionError> {
        Ok(self
            .unavailable
            .iter()
            .filter(|u| u.rules_out(period))
            .map(|u| u.player_id)
            .collect())
    }
}

/// Points history checked against the bootstrap's event calendar.
#[derive(Debug, Clone)]
pub struct FileHistory {
    events: Vec<Event>,
    points: Vec<PointsRecord>,
}

impl FileHistory {
    pub fn new(events: Vec<Event>, points: Vec<PointsRecord>) -> Self {
        Self { events, points }
    }
}

impl PointsHistory for FileHistory {
    fn is_finished(&self, period: u32) -> Result<bool, SelectionError> {
        Ok(self
            .events
            .iter()
            .any(|e| e.id == period && e.finished))
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

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const BOOTSTRAP: &str = r#"{
        "elements": [
            {"id": 1, "team": 3, "element_type": 1, "now_cost": 45, "web_name": "Keeper", "form": "2.0"},
            {"id": 2, "team": 3, "element_type": 4, "now_cost": 120, "web_name": "Striker"},
            {"id": 3, "team": 7, "element_type": 5, "now_cost": 10, "web_name": "Boss"},
            {"id": 4, "team": 7, "element_type": 2, "now_cost": null}
        ],
        "element_types": [
            {"id": 1, "singular_name_short": "GKP"},
            {"id": 2, "singular_name_short": "DEF"},
            {"id": 3, "singular_name_short": "MID"},
            {"id": 4, "singular_name_short": "FWD"},
            {"id": 5, "singular_name_short": "AM"}
        ],
        "events": [
            {"id": 1, "finished": true, "deadline_time": "2024-08-16T17:30:00Z"},
            {"id": 2, "finished": false, "deadline_time": "2024-08-24T10:00:00Z"}
        ],
        "teams": []
    }"#;

    #[test]
    fn bootstrap_maps_positions_and_costs() {
        let bootstrap = parse_bootstrap(BOOTSTRAP.as_bytes()).unwrap();
        let records = bootstrap.records();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].position, Some(Position::Goalkeeper));
        assert_eq!(records[0].cost, Some(4.5));
        assert_eq!(records[0].name.as_deref(), Some("Keeper"));
        assert_eq!(records[1].position, Some(Position::Forward));
        assert_eq!(records[1].cost, Some(12.0));
        // Manager element type is not a playing position.
        assert_eq!(records[2].position, None);
        assert_eq!(records[3].cost, None);
    }

    #[test]
    fn events_carry_deadlines() {
        let bootstrap = parse_bootstrap(BOOTSTRAP.as_bytes()).unwrap();
        let event = bootstrap.event(1).unwrap();
        assert!(event.finished);
        assert_eq!(
            event.deadline_time,
            Some(Utc.with_ymd_and_hms(2024, 8, 16, 17, 30, 0).unwrap())
        );
        assert!(bootstrap.event(9).is_none());
    }

    #[test]
    fn history_follows_event_calendar() {
        let bootstrap = parse_bootstrap(BOOTSTRAP.as_bytes()).unwrap();
        let history = FileHistory::new(bootstrap.events.clone(), Vec::new());
        assert!(history.is_finished(1).unwrap());
        assert!(!history.is_finished(2).unwrap());
        assert!(!history.is_finished(3).unwrap());
    }

    #[test]
    fn points_csv_skips_bad_rows() {
        let csv_data = "\
player_id,gameweek,gameweek_points
1,1,6
2,1,not-a-number
2,2,3
x,2,1
";
        let records = load_points_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].player_id, 2);
        assert_eq!(records[1].gameweek_points, 3.0);
    }

    #[test]
    fn unavailable_until_gameweek_inclusive() {
        let csv_data = "\
player_id,until_gameweek
10,5
11,
";
        let list = load_unavailable_from_reader(csv_data.as_bytes()).unwrap();
        let bootstrap = parse_bootstrap(BOOTSTRAP.as_bytes()).unwrap();
        let provider = FileProvider::new(bootstrap, list);
        assert_eq!(provider.unavailable(5).unwrap(), HashSet::from([10, 11]));
        assert_eq!(provider.unavailable(6).unwrap(), HashSet::from([11]));
    }

    #[test]
    fn missing_unavailable_file_is_empty_list() {
        let path = std::env::temp_dir().join("fplsquad_data_missing/unavailable.csv");
        assert!(load_unavailable(&path).unwrap().is_empty());
    }

    #[test]
    fn missing_bootstrap_is_io_error() {
        let path = std::env::temp_dir().join("fplsquad_data_missing/bootstrap.json");
        assert!(matches!(load_bootstrap(&path).unwrap_err(), DataError::Io { .. }));
    }
}
