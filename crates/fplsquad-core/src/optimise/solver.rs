// Exact 0/1 selection solve over a list of linear constraints.
//
// The objective is maximised by minimising its negation, with every decision
// variable declared binary so the solution is integral, never relaxed.

use good_lp::{
    default_solver, variable, variables, Expression, ResolutionError, Solution, SolverModel,
    Variable,
};
use tracing::debug;

use crate::error::{ProblemKind, Result, SelectionError};
use crate::optimise::constraint::LinearConstraint;

/// Find the 0/1 vector maximising `objective · x` subject to every row of
/// every constraint.
pub fn solve_binary(
    kind: ProblemKind,
    objective: &[f64],
    constraints: &[LinearConstraint],
) -> Result<Vec<bool>> {
    let n = objective.len();
    for c in constraints {
        if c.rows.len() != c.lower.len() || c.rows.len() != c.upper.len() {
            return Err(SelectionError::config(
                c.label,
                "row count does not match bound count",
            ));
        }
        if let Some(row) = c.rows.iter().find(|row| row.len() != n) {
            return Err(SelectionError::config(
                c.label,
                format!("row has {} weights for {n} candidates", row.len()),
            ));
        }
    }

    let mut vars = variables!();
    let decisions: Vec<Variable> = (0..n).map(|_| vars.add(variable().binary())).collect();

    let mut negated = Expression::with_capacity(n);
    for (&value, &x) in objective.iter().zip(&decisions) {
        negated.add_mul(-value, x);
    }

    let mut problem = vars.minimise(negated).using(default_solver);
    let mut row_count = 0usize;
    for c in constraints {
        for (row, (&lo, &hi)) in c.rows.iter().zip(c.lower.iter().zip(&c.upper)) {
            // A row with no members sums to zero whatever is picked.
            if row.iter().all(|&w| w == 0.0) {
                if lo > 0.0 || hi < 0.0 {
                    return Err(SelectionError::Infeasible {
                        kind,
                        reason: format!(
                            "`{}` needs between {lo} and {hi} but no candidate contributes",
                            c.label
                        ),
                    });
                }
                continue;
            }
            let mut expr = Expression::with_capacity(n);
            for (&w, &x) in row.iter().zip(&decisions) {
                if w != 0.0 {
                    expr.add_mul(w, x);
                }
            }
            if lo == hi {
                problem = problem.with(expr.eq(lo));
            } else {
                problem = problem.with(expr.clone().geq(lo)).with(expr.leq(hi));
            }
            row_count += 1;
        }
    }
    if n == 0 {
        return Ok(Vec::new());
    }
    debug!(%kind, candidates = n, rows = row_count, "solving binary selection");

    let solution = problem.solve().map_err(|e| match e {
        ResolutionError::Infeasible => SelectionError::Infeasible {
            kind,
            reason: describe_constraints(constraints),
        },
        other => SelectionError::Solver(other.to_string()),
    })?;

    Ok(decisions.iter().map(|&x| solution.value(x) > 0.5).collect())
}

fn describe_constraints(constraints: &[LinearConstraint]) -> String {
    let labels: Vec<&str> = constraints.iter().map(|c| c.label).collect();
    format!("constraints [{}] cannot be met together", labels.join(", "))
}
