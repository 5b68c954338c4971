// Persisted selection format: one CSV row per squad member.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::candidate::{Candidate, CandidatePool, Position};
use crate::selection::scoring::{AnnotatedRoster, Armband};

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid selection file: {0}")]
    Invalid(String),
}

/// A squad member as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRecord {
    pub player_id: u32,
    pub team_id: u32,
    pub position: Position,
    pub cost: f64,
    pub predicted_score: f64,
    pub starting: bool,
    pub annotation: Option<Armband>,
}

impl SelectionRecord {
    pub fn candidate(&self) -> Candidate {
        Candidate {
            id: self.player_id,
            team_id: self.team_id,
            position: self.position,
            cost: self.cost,
            predicted_score: self.predicted_score,
        }
    }
}

impl From<&AnnotatedRoster> for Vec<SelectionRecord> {
    fn from(roster: &AnnotatedRoster) -> Self {
        roster
            .entries
            .iter()
            .map(|e| SelectionRecord {
                player_id: e.candidate.id,
                team_id: e.candidate.team_id,
                position: e.candidate.position,
                cost: e.candidate.cost,
                predicted_score: e.candidate.predicted_score,
                starting: e.starting,
                annotation: e.armband,
            })
            .collect()
    }
}

pub fn write_selection<W: Write>(writer: W, roster: &AnnotatedRoster) -> Result<(), PersistError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in Vec::<SelectionRecord>::from(roster) {
        wtr.serialize(record)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Read every well-formed record; malformed rows are skipped with a warning.
pub fn read_selection<R: Read>(reader: R) -> Result<Vec<SelectionRecord>, PersistError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for result in rdr.deserialize::<SelectionRecord>() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => warn!("skipping malformed selection row: {}", e),
        }
    }
    Ok(records)
}

/// A previously saved squad, as the prior roster of a transfer scan. Unlike
/// [`read_selection`], the first malformed row fails the whole load.
pub fn read_prior_roster<R: Read>(reader: R) -> Result<CandidatePool, PersistError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut candidates = Vec::new();
    for result in rdr.deserialize::<SelectionRecord>() {
        let record = result.map_err(|e| {
            let line = e.position().map_or(0, |p| p.line());
            PersistError::Invalid(format!("malformed row at line {line}: {e}"))
        })?;
        candidates.push(record.candidate());
    }
    CandidatePool::new(candidates).map_err(|e| PersistError::Invalid(e.to_string()))
}

pub fn save_selection(path: &Path, roster: &AnnotatedRoster) -> Result<(), PersistError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| PersistError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let file = File::create(path).map_err(|source| PersistError::Io {
        path: path.display().to_string(),
        source,
    })?;
    write_selection(file, roster)?;
    info!(path = %path.display(), players = roster.entries.len(), "selection saved");
    Ok(())
}

pub fn load_prior_roster(path: &Path) -> Result<CandidatePool, PersistError> {
    let file = File::open(path).map_err(|source| PersistError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_prior_roster(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::league_pool;
    use crate::optimise::lineup::{optimise_lineup, LineupProblem};
    use crate::optimise::roster::{optimise_roster, RosterProblem, SquadLimits};
    use crate::ruleset::Ruleset;
    use crate::selection::scoring::{annotate, TransferPenalty};

    fn annotated() -> AnnotatedRoster {
        let rules = Ruleset::default();
        let pool = league_pool();
        let roster =
            optimise_roster(&RosterProblem::new(&pool, SquadLimits::from_ruleset(&rules))).unwrap();
        let lineup = optimise_lineup(&LineupProblem::from_ruleset(&roster, &rules)).unwrap();
        annotate(&roster, &lineup, None, &TransferPenalty::none())
    }

    #[test]
    fn written_file_has_header_and_one_row_per_player() {
        let mut buf = Vec::new();
        write_selection(&mut buf, &annotated()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("player_id,team_id,position,cost,predicted_score,starting,annotation")
        );
        let rows: Vec<&str> = lines.collect();
        assert_eq!(rows.len(), 15);
        assert!(rows[0].ends_with(",true,captain"));
        assert!(rows[1].ends_with(",true,vice_captain"));
        assert!(rows[14].ends_with(",false,"));
    }

    #[test]
    fn saved_squad_reads_back_as_prior_roster() {
        let squad = annotated();
        let mut buf = Vec::new();
        write_selection(&mut buf, &squad).unwrap();
        let prior = read_prior_roster(buf.as_slice()).unwrap();
        assert_eq!(prior.ids(), squad.roster().ids());
        let records = read_selection(buf.as_slice()).unwrap();
        assert_eq!(records.iter().filter(|r| r.starting).count(), 11);
        assert_eq!(
            records.iter().filter(|r| r.annotation == Some(Armband::Captain)).count(),
            1
        );
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let data = "\
player_id,team_id,position,cost,predicted_score,starting,annotation
1,4,GKP,4.5,3.2,true,captain
2,4,XYZ,4.5,3.2,true,
3,5,DEF,not-a-number,3.2,false,
4,6,FWD,7.0,5.5,false,
";
        let records = read_selection(data.as_bytes()).unwrap();
        let ids: Vec<u32> = records.iter().map(|r| r.player_id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(records[1].annotation, None);
    }

    #[test]
    fn one_malformed_row_fails_the_prior_roster() {
        let mut buf = Vec::new();
        write_selection(&mut buf, &annotated()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines: Vec<String> = text.lines().map(str::to_owned).collect();
        assert_eq!(lines.len(), 16);
        // Sixth squad member gets a cost nobody can parse.
        let fields: Vec<&str> = lines[6].split(',').collect();
        let mut broken: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        broken[3] = "cheap".into();
        lines[6] = broken.join(",");
        let data = lines.join("\n") + "\n";

        match read_prior_roster(data.as_bytes()).unwrap_err() {
            PersistError::Invalid(message) => assert!(message.contains("line 7"), "{message}"),
            other => panic!("expected Invalid, got: {other}"),
        }
        // The reporting reader still returns the other fourteen.
        assert_eq!(read_selection(data.as_bytes()).unwrap().len(), 14);
    }

    #[test]
    fn short_position_names_are_accepted() {
        let data = "\
player_id,team_id,position,cost,predicted_score,starting,annotation
1,4,GK,4.5,3.2,true,
2,5,FW,7.0,5.5,false,
";
        let prior = read_prior_roster(data.as_bytes()).unwrap();
        assert_eq!(prior.candidates()[0].position, Position::Goalkeeper);
        assert_eq!(prior.candidates()[1].position, Position::Forward);
    }

    #[test]
    fn duplicate_players_are_rejected_as_prior() {
        let data = "\
player_id,team_id,position,cost,predicted_score,starting,annotation
1,4,GKP,4.5,3.2,true,
1,4,GKP,4.5,3.2,false,
";
        let err = read_prior_roster(data.as_bytes()).unwrap_err();
        assert!(matches!(err, PersistError::Invalid(_)));
    }

    #[test]
    fn save_and_load_through_temp_dir() {
        let dir = std::env::temp_dir().join("fplsquad_test_persist");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("out").join("squad.csv");
        let squad = annotated();
        save_selection(&path, &squad).unwrap();
        let prior = load_prior_roster(&path).unwrap();
        assert_eq!(prior.len(), 15);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("fplsquad_test_persist_missing/none.csv");
        match load_prior_roster(&path).unwrap_err() {
            PersistError::Io { path: p, .. } => assert!(p.ends_with("none.csv")),
            other => panic!("expected Io, got: {other}"),
        }
    }
}
