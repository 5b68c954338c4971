// Integer selection engine: encoding, constraints, the 0/1 solver and the
// roster/lineup problems built on top of it.

pub mod constraint;
pub mod encoder;
pub mod lineup;
pub mod preselect;
pub mod problem;
pub mod roster;
pub mod solver;

pub use lineup::{optimise_lineup, LineupProblem};
pub use preselect::{optimise_with_preselection, preselect_cheapest, worst_teams, Preselection};
pub use problem::{optimise, SelectionProblem};
pub use roster::{optimise_roster, Continuity, RosterProblem, SquadLimits};
