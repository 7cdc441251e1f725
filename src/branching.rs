//! Zykov branch-and-bound: at each node, pick a non-adjacent pair (u, v) and
//! explore two children — Conflict (u and v must take different colors) and
//! Contract (u and v must take the same color) — until every remaining pair
//! is adjacent, i.e. the graph is a clique and the node is a leaf coloring.
//!
//! modeled on `original_source/src/branching.cpp`'s explicit state machine
//! (`branching::node`, `find_vertexes`, `next`): an iterative stack rather
//! than recursion, so the undo log on [`crate::graph::Graph`] stays the only
//! thing that needs reversing on backtrack.

use std::collections::HashMap;

use crate::error::Result;
use crate::formulation::{ColumnId, Formulation};
use crate::graph::ModKind;
use crate::EPS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Conflict,
    Contract,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    u: usize,
    v: usize,
    side: Side,
    /// the LP lower bound in effect when this node was created; used by the
    /// driver to decide whether a node is worth exploring at all.
    lower_bound: f64,
}

/// the explicit branch-and-bound stack: the path from the root to the
/// current node.
#[derive(Debug, Default)]
pub struct Branching {
    stack: Vec<Frame>,
}

impl Branching {
    /// an empty stack, positioned at the root.
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// current search depth (root is depth 0).
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// the lower bound recorded for the current node, if any.
    pub fn current_lower_bound(&self) -> Option<f64> {
        self.stack.last().map(|f| f.lower_bound)
    }

    /// descends into a new branch node on the pair `(u, v)`: applies and
    /// explores the Conflict child first.
    pub fn branch(&mut self, form: &mut Formulation, u: usize, v: usize, lower_bound: f64) -> Result<()> {
        form.change(ModKind::Conflict, u, v)?;
        self.stack.push(Frame { u, v, side: Side::Conflict, lower_bound });
        Ok(())
    }

    /// backtracks from the current node. if it was the Conflict child,
    /// undoes it and descends into the Contract sibling. if it was the
    /// Contract child, both children are exhausted: undo it and keep
    /// popping upward. returns `false` once the whole tree is exhausted.
    pub fn backtrack(&mut self, form: &mut Formulation) -> Result<bool> {
        while let Some(frame) = self.stack.pop() {
            match frame.side {
                Side::Conflict => {
                    form.undo(ModKind::Conflict, frame.u, frame.v)?;
                    form.change(ModKind::Contract, frame.u, frame.v)?;
                    self.stack.push(Frame { side: Side::Contract, ..frame });
                    return Ok(true);
                }
                Side::Contract => {
                    form.undo(ModKind::Contract, frame.u, frame.v)?;
                }
            }
        }
        Ok(false)
    }
}

/// picks the active, non-adjacent pair whose column-generation similarity
/// is closest to 0.5 (the most fractional pair), the branching candidate
/// most likely to cut off the current LP solution in both children.
/// `None` means every active pair is adjacent: the graph is a clique and
/// the node's LP solution is already an integral coloring.
pub fn find_branch_pair(form: &Formulation, x: &HashMap<ColumnId, f64>) -> Option<(usize, usize)> {
    let sim = form.similarity(x);
    let mut best: Option<(usize, usize)> = None;
    let mut best_diff = f64::INFINITY;
    for (u, v) in form.graph().active_non_adjacent_pairs() {
        let diff = (sim[u][v] - 0.5).abs();
        if diff < best_diff {
            best_diff = diff;
            best = Some((u, v));
            if best_diff <= EPS {
                return best;
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    fn path4() -> Graph {
        Graph::new(4, &[(0, 1), (1, 2), (2, 3)])
    }

    #[test]
    fn branch_then_backtrack_round_trips() {
        let g = path4();
        let mut form = Formulation::new(g, &[vec![0, 2], vec![1, 3]]);
        let mut tree = Branching::new();
        tree.branch(&mut form, 0, 3, 2.0).unwrap();
        assert!(form.graph().are_adjacent(0, 3));
        assert_eq!(tree.depth(), 1);

        assert!(tree.backtrack(&mut form).unwrap()); // -> Contract(0, 3)
        assert!(!form.graph().is_active(3));

        assert!(!tree.backtrack(&mut form).unwrap()); // both children done, tree exhausted
        assert!(form.graph().is_active(3));
        assert!(!form.graph().are_adjacent(0, 3));
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn find_branch_pair_skips_adjacent_vertices() {
        let g = Graph::new(3, &[(0, 1), (0, 2), (1, 2)]); // triangle: no non-adjacent pairs
        let form = Formulation::new(g, &[vec![0], vec![1], vec![2]]);
        let x = HashMap::new();
        assert_eq!(find_branch_pair(&form, &x), None);
    }

    #[test]
    fn find_branch_pair_picks_the_most_fractional_pair() {
        let g = path4();
        let mut form = Formulation::new(g, &[vec![0, 2], vec![1, 3]]);
        let id = form.add_column(vec![0, 3]).unwrap();
        let mut x = HashMap::new();
        for (cid, _) in form.active_columns() {
            x.insert(cid, if cid == id { 0.5 } else { 0.25 });
        }
        let pair = find_branch_pair(&form, &x);
        assert!(pair.is_some());
    }
}
