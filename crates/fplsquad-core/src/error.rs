// Error taxonomy shared by every selection component.

use std::fmt;

use thiserror::Error;

/// Which kind of selection problem a solve was working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemKind {
    Roster,
    Lineup,
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemKind::Roster => write!(f, "roster"),
            ProblemKind::Lineup => write!(f, "lineup"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SelectionError {
    /// No 0/1 assignment satisfies the constraints handed to the solver.
    #[error("no feasible {kind} selection: {reason}")]
    Infeasible { kind: ProblemKind, reason: String },

    #[error("configuration error for `{field}`: {message}")]
    Configuration { field: String, message: String },

    #[error("data precondition failed: {0}")]
    DataPrecondition(String),

    /// The solver backend failed for a reason other than infeasibility.
    #[error("solver failure: {0}")]
    Solver(String),
}

impl SelectionError {
    pub(crate) fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        SelectionError::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self, SelectionError::Infeasible { .. })
    }
}

pub type Result<T> = std::result::Result<T, SelectionError>;
