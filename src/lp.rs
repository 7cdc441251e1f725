//! restricted master LP: a thin trait over an external solver plus a
//! `highs`-backed implementation, modeled on the `ColProblem`/`Model` usage
//! from the pack's `highs` example: constraints are declared up front (each
//! with empty entries), handed out as `Row` handles, and every later
//! `add_col` references those handles directly. `Model::solve` consumes the
//! model but `solved.into()` hands one back, so column generation can keep
//! appending columns across iterations instead of rebuilding the LP.

use highs::{ColProblem, HighsModelStatus, Model, Row, Sense};

use crate::error::{Result, SolverError};

/// opaque id of a covering-constraint row.
pub type ConstraintId = usize;

/// opaque id of a column as seen by the LP.
pub type ColumnId = usize;

/// the solved LP: objective value plus dual prices and primal values keyed
/// the same way columns/constraints were added.
#[derive(Debug, Clone)]
pub struct LpSolution {
    /// objective value (set-cover LP is a minimization).
    pub objective: f64,
    /// dual price of each covering constraint, indexed by `ConstraintId`.
    pub duals: Vec<f64>,
    /// primal value of each column, indexed by `ColumnId`.
    pub primal: Vec<f64>,
}

/// the restricted master LP seen by column generation: a pure set-cover
/// relaxation, `min sum x_s s.t. sum_{s containing v} x_s >= 1 for all v,
/// x >= 0`.
pub trait LpModel {
    /// a fresh, empty minimization model.
    fn new_minimize() -> Self
    where
        Self: Sized;
    /// adds a `>= 1` covering constraint for `vertex`; returns its id.
    fn add_covering_constraint(&mut self, vertex: usize) -> ConstraintId;
    /// adds a column (an independent set) with objective coefficient
    /// `coeff` (always 1.0 for set-cover) and `1.0` entries in the given rows.
    fn add_column(&mut self, coeff: f64, rows: &[(ConstraintId, f64)]) -> ColumnId;
    /// solves the current LP relaxation.
    fn solve(&mut self) -> Result<LpSolution>;
}

/// `highs`-backed [`LpModel`].
#[derive(Debug)]
pub struct HighsLpModel {
    model: Option<Model>,
    rows: Vec<Row>,
    obj_coeffs: Vec<f64>,
}

impl LpModel for HighsLpModel {
    fn new_minimize() -> Self {
        let mut model = ColProblem::default().optimise(Sense::Minimise);
        // concurrent evaluation is out of scope (see crate-level design notes):
        // pin highs to a single thread rather than let it fork internally.
        model.set_option("threads", 1);
        model.set_option("primal_feasibility_tolerance", crate::EPS);
        model.set_option("dual_feasibility_tolerance", crate::EPS);
        Self { model: Some(model), rows: Vec::new(), obj_coeffs: Vec::new() }
    }

    fn add_covering_constraint(&mut self, _vertex: usize) -> ConstraintId {
        let model = self.model.as_mut().expect("model consumed without being restored");
        let row = model.add_row(1.0.., []);
        let id = self.rows.len();
        self.rows.push(row);
        id
    }

    fn add_column(&mut self, coeff: f64, rows: &[(ConstraintId, f64)]) -> ColumnId {
        let entries: Vec<(Row, f64)> = rows.iter().map(|&(r, v)| (self.rows[r], v)).collect();
        let model = self.model.as_mut().expect("model consumed without being restored");
        model.add_col(coeff, 0.0.., entries);
        let id = self.obj_coeffs.len();
        self.obj_coeffs.push(coeff);
        id
    }

    fn solve(&mut self) -> Result<LpSolution> {
        let model = self.model.take().expect("model consumed without being restored");
        let solved = model.solve();
        let status = solved.status();
        if status != HighsModelStatus::Optimal {
            self.model = Some(solved.into());
            return Err(SolverError::Lp(format!("highs returned status {status:?}")));
        }
        let solution = solved.get_solution();
        let primal: Vec<f64> = solution.columns().to_vec();
        let duals: Vec<f64> = solution.dual_rows().to_vec();
        let objective: f64 = primal.iter().zip(self.obj_coeffs.iter()).map(|(&x, &c)| c * x).sum();
        self.model = Some(solved.into());
        Ok(LpSolution { objective, duals, primal })
    }
}
