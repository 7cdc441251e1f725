//! column-generation loop tying the restricted master LP to pricing.
//!
//! at a fixed branch node the graph's topology is frozen, so the LP and the
//! pricing subproblem alternate against the same vertex set: solve the LP,
//! read off dual prices as pricing weights, ask pricing for violating
//! independent sets, add any it finds as new columns, and repeat until
//! pricing comes back empty (the restricted master is then LP-optimal for
//! this node).

use std::collections::HashMap;

use crate::error::Result;
use crate::formulation::{ColumnId, Formulation};
use crate::lp::{ConstraintId, HighsLpModel, LpModel};
use crate::pricing;

/// the outcome of running column generation to convergence at one node.
#[derive(Debug, Clone)]
pub struct ColumnGenResult {
    /// the set-cover LP objective value (a lower bound on the chromatic number).
    pub objective: f64,
    /// primal value of each active column, keyed by [`ColumnId`].
    pub x: HashMap<ColumnId, f64>,
}

/// runs column generation to convergence, mutating `formulation` in place
/// (new columns get appended, and every vertex's weight is left holding the
/// final dual price).
pub fn column_generation(formulation: &mut Formulation) -> Result<ColumnGenResult> {
    let mut lp = HighsLpModel::new_minimize();
    let mut row_of_vertex: HashMap<usize, ConstraintId> = HashMap::new();
    for v in formulation.graph().active_vertices() {
        row_of_vertex.insert(v, lp.add_covering_constraint(v));
    }

    let mut lp_col_of: HashMap<ColumnId, usize> = HashMap::new();
    register_new_columns(formulation, &mut lp, &row_of_vertex, &mut lp_col_of);

    loop {
        let solved = lp.solve()?;

        for (&v, &row) in &row_of_vertex {
            formulation.set_weight(v, solved.duals[row]);
        }

        let new_sets = pricing::solve(formulation.graph());
        let mut added_any = false;
        for nodes in new_sets {
            if formulation.add_column(nodes).is_ok() {
                added_any = true;
            }
        }
        if !added_any {
            let x = lp_col_of.iter().map(|(&col, &lp_id)| (col, solved.primal[lp_id])).collect();
            return Ok(ColumnGenResult { objective: solved.objective, x });
        }
        register_new_columns(formulation, &mut lp, &row_of_vertex, &mut lp_col_of);
    }
}

fn register_new_columns(
    formulation: &Formulation,
    lp: &mut HighsLpModel,
    row_of_vertex: &HashMap<usize, ConstraintId>,
    lp_col_of: &mut HashMap<ColumnId, usize>,
) {
    for (id, column) in formulation.active_columns() {
        if lp_col_of.contains_key(&id) {
            continue;
        }
        let rows: Vec<(ConstraintId, f64)> = column
            .nodes
            .iter()
            .filter_map(|v| row_of_vertex.get(v))
            .map(|&r| (r, 1.0))
            .collect();
        let lp_id = lp.add_column(1.0, &rows);
        lp_col_of.insert(id, lp_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    #[test]
    fn converges_to_the_clique_cover_bound_on_a_triangle() {
        let g = Graph::new(3, &[(0, 1), (0, 2), (1, 2)]);
        let mut form = Formulation::new(g, &[vec![0], vec![1], vec![2]]);
        let result = column_generation(&mut form).unwrap();
        // a triangle needs 3 singleton columns: the LP bound is 3.
        assert!((result.objective - 3.0).abs() < 1e-6);
    }

    #[test]
    fn converges_to_two_on_a_bipartite_graph() {
        let g = Graph::new(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let mut form = Formulation::new(g, &[vec![0, 2], vec![1, 3]]);
        let result = column_generation(&mut form).unwrap();
        assert!((result.objective - 2.0).abs() < 1e-6);
    }
}
