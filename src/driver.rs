//! the outer branch-cut-and-price search: seed a primal bound with DSATUR,
//! then repeatedly solve the column-generation LP at a node, prune against
//! the incumbent, re-run DSATUR periodically for a better primal bound, and
//! branch on the most fractional non-adjacent pair until the search tree is
//! exhausted or the time limit is hit.

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::branching::{self, Branching};
use crate::error::Result;
use crate::formulation::Formulation;
use crate::graph::Graph;
use crate::heuristic;
use crate::instance::Instance;
use crate::master;
use crate::EPS;

/// re-run the DSATUR primal heuristic every this many tree levels.
const HEURISTIC_CADENCE: usize = 10;

/// the final result of a full search.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// the best (possibly optimal) number of colors found.
    pub chromatic_number: usize,
    /// a proper coloring of the original instance achieving `chromatic_number`.
    pub coloring: Vec<Vec<usize>>,
    /// number of branch-and-bound nodes explored.
    pub nodes_explored: usize,
    /// true if the search stopped because of the time limit rather than
    /// exhausting the tree (so `chromatic_number` may not be optimal).
    pub time_limit_reached: bool,
}

fn ceil_tol(v: f64) -> usize {
    (v - EPS).ceil().max(0.0) as usize
}

/// solves the vertex coloring instance within `time_limit`.
pub fn solve(instance: &Instance, time_limit: Duration) -> Result<SolveOutcome> {
    let graph = Graph::new(instance.n(), instance.edges());
    let initial = heuristic::dsatur(&graph);
    info!("initial DSATUR coloring uses {} colors", initial.num_colors());

    let mut best_classes = initial.classes.clone();
    let mut best_colors = initial.num_colors();

    let mut form = Formulation::new(graph, &initial.classes);
    let mut tree = Branching::new();
    let start = Instant::now();
    let mut nodes_explored = 0usize;
    let mut time_limit_reached = false;

    loop {
        if start.elapsed() > time_limit {
            time_limit_reached = true;
            info!("time limit reached after {nodes_explored} nodes");
            break;
        }
        nodes_explored += 1;

        // the parent's LP bound (recorded when this node was branched into)
        // only ever holds or increases for a restricted child, so a node
        // already dominated by the incumbent can be pruned before paying for
        // its own column generation.
        if let Some(parent_lb) = tree.current_lower_bound() {
            if ceil_tol(parent_lb) >= best_colors {
                if !tree.backtrack(&mut form)? {
                    break;
                }
                continue;
            }
        }

        let result = master::column_generation(&mut form)?;
        let lb = ceil_tol(result.objective);
        debug!(
            "node {nodes_explored} depth {} lp_bound {:.4} incumbent {best_colors}",
            tree.depth(),
            result.objective
        );

        if lb >= best_colors {
            if !tree.backtrack(&mut form)? {
                break;
            }
            continue;
        }

        if tree.depth() % HEURISTIC_CADENCE == 0 {
            let local = heuristic::dsatur(form.graph());
            if local.num_colors() < best_colors {
                let mut projected = local.classes.clone();
                form.graph().apply_changes_to_solution(&mut projected);
                if projected.len() < best_colors {
                    info!("periodic DSATUR improved incumbent to {} colors", projected.len());
                    best_colors = projected.len();
                    best_classes = projected;
                }
            }
        }

        match branching::find_branch_pair(&form, &result.x) {
            None => {
                // every active pair is adjacent: the active graph is a
                // clique and the columns with x ~= 1 partition it exactly.
                let mut classes: Vec<Vec<usize>> = result
                    .x
                    .iter()
                    .filter(|&(_, &val)| val > 1.0 - EPS)
                    .map(|(&id, _)| form.column(id).nodes.clone())
                    .collect();
                form.graph().apply_changes_to_solution(&mut classes);
                if classes.len() < best_colors {
                    info!("integral leaf improved incumbent to {} colors", classes.len());
                    best_colors = classes.len();
                    best_classes = classes;
                }
                if !tree.backtrack(&mut form)? {
                    break;
                }
            }
            Some((u, v)) => {
                tree.branch(&mut form, u, v, result.objective)?;
            }
        }
    }

    Ok(SolveOutcome {
        chromatic_number: best_colors,
        coloring: best_classes,
        nodes_explored,
        time_limit_reached,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proper(inst: &Instance, classes: &[Vec<usize>]) -> bool {
        for class in classes {
            for (i, &u) in class.iter().enumerate() {
                for &v in &class[i + 1..] {
                    if inst.are_adjacent(u, v) {
                        return false;
                    }
                }
            }
        }
        let mut covered: Vec<usize> = classes.iter().flatten().copied().collect();
        covered.sort_unstable();
        covered.dedup();
        covered.len() == inst.n()
    }

    #[test]
    fn empty_graph_needs_zero_colors() {
        let inst = Instance::from_dimacs_str("p edge 0 0\n").unwrap();
        let outcome = solve(&inst, Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.chromatic_number, 0);
        assert!(outcome.coloring.is_empty());
        assert!(proper(&inst, &outcome.coloring));
    }

    #[test]
    fn single_vertex_needs_one_color() {
        let inst = Instance::from_dimacs_str("p edge 1 0\n").unwrap();
        let outcome = solve(&inst, Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.chromatic_number, 1);
        assert!(proper(&inst, &outcome.coloring));
    }

    #[test]
    fn edgeless_graph_needs_one_color() {
        let inst = Instance::from_dimacs_str("p edge 6 0\n").unwrap();
        let outcome = solve(&inst, Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.chromatic_number, 1);
        assert!(proper(&inst, &outcome.coloring));
    }

    #[test]
    fn complete_graph_needs_n_colors() {
        let n = 6;
        let mut edges = String::new();
        let mut m = 0;
        for u in 1..=n {
            for v in (u + 1)..=n {
                edges.push_str(&format!("e {u} {v}\n"));
                m += 1;
            }
        }
        let dimacs = format!("p edge {n} {m}\n{edges}");
        let inst = Instance::from_dimacs_str(&dimacs).unwrap();
        let outcome = solve(&inst, Duration::from_secs(10)).unwrap();
        assert_eq!(outcome.chromatic_number, n);
        assert!(proper(&inst, &outcome.coloring));
    }

    #[test]
    fn solves_a_triangle_optimally() {
        let inst = Instance::from_dimacs_str("p edge 3 3\ne 1 2\ne 1 3\ne 2 3\n").unwrap();
        let outcome = solve(&inst, Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.chromatic_number, 3);
        assert!(proper(&inst, &outcome.coloring));
    }

    #[test]
    fn solves_c4_optimally() {
        let inst = Instance::from_dimacs_str("p edge 4 4\ne 1 2\ne 2 3\ne 3 4\ne 4 1\n").unwrap();
        let outcome = solve(&inst, Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.chromatic_number, 2);
        assert!(proper(&inst, &outcome.coloring));
    }

    #[test]
    fn solves_c5_optimally() {
        let inst =
            Instance::from_dimacs_str("p edge 5 5\ne 1 2\ne 2 3\ne 3 4\ne 4 5\ne 5 1\n").unwrap();
        let outcome = solve(&inst, Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.chromatic_number, 3);
        assert!(proper(&inst, &outcome.coloring));
    }

    #[test]
    fn solves_petersen_graph_optimally() {
        // Petersen graph: 10 vertices, chromatic number 3.
        let edges = "e 1 2\ne 2 3\ne 3 4\ne 4 5\ne 5 1\n\
                     e 6 8\ne 8 10\ne 10 7\ne 7 9\ne 9 6\n\
                     e 1 6\ne 2 7\ne 3 8\ne 4 9\ne 5 10\n";
        let dimacs = format!("p edge 10 15\n{edges}");
        let inst = Instance::from_dimacs_str(&dimacs).unwrap();
        let outcome = solve(&inst, Duration::from_secs(10)).unwrap();
        assert_eq!(outcome.chromatic_number, 3);
        assert!(proper(&inst, &outcome.coloring));
    }

    #[test]
    fn solves_myciel3_optimally() {
        // Mycielski graph on 11 vertices: triangle-free, chromatic number 4.
        let edges = "e 1 2\ne 1 4\ne 1 7\ne 1 9\n\
                     e 2 3\ne 2 6\ne 2 8\n\
                     e 3 4\ne 3 6\ne 3 9\n\
                     e 4 5\ne 4 8\n\
                     e 5 6\ne 5 7\ne 5 10\n\
                     e 6 11\ne 7 11\ne 8 11\ne 9 11\ne 10 11\n";
        let dimacs = format!("p edge 11 20\n{edges}");
        let inst = Instance::from_dimacs_str(&dimacs).unwrap();
        let outcome = solve(&inst, Duration::from_secs(30)).unwrap();
        assert_eq!(outcome.chromatic_number, 4);
        assert!(proper(&inst, &outcome.coloring));
    }

    #[test]
    fn solves_queen5_5_optimally() {
        // 5x5 queen graph: cells are vertices, edges between any two cells a
        // queen could attack in one move (same row, column, or diagonal).
        // known chromatic number 5.
        let side = 5usize;
        let mut edges: Vec<(usize, usize)> = Vec::new();
        for r1 in 0..side {
            for c1 in 0..side {
                let v1 = r1 * side + c1;
                for r2 in 0..side {
                    for c2 in 0..side {
                        let v2 = r2 * side + c2;
                        if v2 <= v1 {
                            continue;
                        }
                        let same_row = r1 == r2;
                        let same_col = c1 == c2;
                        let same_diag = (r1 as isize - c1 as isize) == (r2 as isize - c2 as isize)
                            || (r1 + c1) == (r2 + c2);
                        if same_row || same_col || same_diag {
                            edges.push((v1 + 1, v2 + 1));
                        }
                    }
                }
            }
        }
        let mut dimacs = format!("p edge {} {}\n", side * side, edges.len());
        for (u, v) in &edges {
            dimacs.push_str(&format!("e {u} {v}\n"));
        }
        let inst = Instance::from_dimacs_str(&dimacs).unwrap();
        let outcome = solve(&inst, Duration::from_secs(60)).unwrap();
        assert_eq!(outcome.chromatic_number, 5);
        assert!(proper(&inst, &outcome.coloring));
    }

    /// smallest k for which `n` vertices with `edges` admit a proper
    /// k-coloring, found by plain backtracking. used only to cross-check the
    /// driver on graphs small enough that this is fast.
    fn brute_force_chromatic_number(n: usize, edges: &[(usize, usize)]) -> usize {
        let mut adj = vec![vec![false; n]; n];
        for &(u, v) in edges {
            adj[u][v] = true;
            adj[v][u] = true;
        }
        fn backtrack(v: usize, n: usize, k: usize, adj: &[Vec<bool>], colors: &mut [usize]) -> bool {
            if v == n {
                return true;
            }
            for c in 0..k {
                if (0..v).all(|u| !(adj[v][u] && colors[u] == c)) {
                    colors[v] = c;
                    if backtrack(v + 1, n, k, adj, colors) {
                        return true;
                    }
                }
            }
            false
        }
        for k in 1..=n {
            let mut colors = vec![usize::MAX; n];
            if backtrack(0, n, k, &adj, &mut colors) {
                return k;
            }
        }
        n
    }

    #[test]
    fn matches_brute_force_on_random_graphs() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let n = 8;
        for (seed, p) in [(1u64, 0.3), (2, 0.5), (3, 0.7)] {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut edges = Vec::new();
            for u in 0..n {
                for v in (u + 1)..n {
                    if rng.gen_bool(p) {
                        edges.push((u, v));
                    }
                }
            }
            let expected = brute_force_chromatic_number(n, &edges);

            let dimacs_edges: String =
                edges.iter().map(|(u, v)| format!("e {} {}\n", u + 1, v + 1)).collect();
            let dimacs = format!("p edge {n} {}\n{dimacs_edges}", edges.len());
            let inst = Instance::from_dimacs_str(&dimacs).unwrap();
            let outcome = solve(&inst, Duration::from_secs(15)).unwrap();

            assert_eq!(
                outcome.chromatic_number, expected,
                "seed {seed} p {p}: driver found {} vs brute force {expected}",
                outcome.chromatic_number
            );
            assert!(proper(&inst, &outcome.coloring));
        }
    }
}
