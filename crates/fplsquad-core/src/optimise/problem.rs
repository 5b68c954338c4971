// The selection problem capability shared by roster and lineup solves.

use crate::candidate::CandidatePool;
use crate::error::{ProblemKind, Result};
use crate::optimise::constraint::LinearConstraint;
use crate::optimise::solver::solve_binary;

/// Everything the solver needs to pick a subset of a pool.
pub trait SelectionProblem {
    fn kind(&self) -> ProblemKind;

    /// The pool the decision vector is indexed against.
    fn pool(&self) -> &CandidatePool;

    /// Number of candidates a solution must contain.
    fn cardinality(&self) -> usize;

    /// Per-candidate value to maximise, in pool order.
    fn objective(&self) -> Vec<f64> {
        self.pool().iter().map(|c| c.predicted_score).collect()
    }

    /// Every constraint a solution must satisfy.
    fn constraints(&self) -> Result<Vec<LinearConstraint>>;
}

/// Solve a selection problem and return the chosen candidates in pool order.
pub fn optimise<P: SelectionProblem + ?Sized>(problem: &P) -> Result<CandidatePool> {
    let constraints = problem.constraints()?;
    let decisions = solve_binary(problem.kind(), &problem.objective(), &constraints)?;
    Ok(problem.pool().select(&decisions))
}
