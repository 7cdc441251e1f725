//! mutable graph with reversible modifications.
//!
//! this is the data structure underpinning the branch-and-bound tree: rather
//! than cloning the whole graph at every branch (as the pricing subgraphs
//! do, since those are disposable and short-lived), the main search graph is
//! mutated in place and every mutation is logged so it can be undone in
//! strict LIFO order when the branching driver backtracks.

use bit_set::BitSet;

use crate::error::{Result, SolverError};

/// the two kinds of modification that are pushed onto the undo log.
///
/// `Deactivate` is a third conceptual operation on the graph (used by
/// pricing on its own disposable subgraph clones) but it is never logged:
/// it has no matching `undo` call in the branching driver, which only ever
/// applies `Conflict`/`Contract` (see `branching.rs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModKind {
    /// add an edge between u and v.
    Conflict,
    /// merge v into u, transferring v's edges onto u and deactivating v.
    Contract,
}

/// a single applied modification, as pushed onto the undo log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modification {
    /// which kind of modification this is.
    pub kind: ModKind,
    /// first vertex operand (kept, in the Contract case).
    pub u: usize,
    /// second vertex operand (deactivated, in the Contract case).
    pub v: usize,
}

/// the current graph: the original instance with a sequence of
/// conflict/contract/deactivate modifications applied.
#[derive(Debug, Clone)]
pub struct Graph {
    n_total: usize,
    active: Vec<bool>,
    adj_count: Vec<Vec<u32>>,
    adj_bit: Vec<BitSet>,
    deg: Vec<usize>,
    weights: Vec<f64>,
    mods: Vec<Modification>,
}

impl Graph {
    /// builds a graph from a vertex count and an undirected edge list.
    pub fn new(n: usize, edges: &[(usize, usize)]) -> Self {
        let mut adj_count = vec![vec![0u32; n]; n];
        let mut adj_bit = vec![BitSet::with_capacity(n); n];
        let mut deg = vec![0usize; n];
        for &(u, v) in edges {
            if u == v {
                continue;
            }
            if adj_count[u][v] == 0 {
                deg[u] += 1;
                deg[v] += 1;
                adj_bit[u].insert(v);
                adj_bit[v].insert(u);
            }
            adj_count[u][v] += 1;
            adj_count[v][u] += 1;
        }
        Self {
            n_total: n,
            active: vec![true; n],
            adj_count,
            adj_bit,
            deg,
            weights: vec![0.0; n],
            mods: Vec::new(),
        }
    }

    /// the original vertex count (stable across mutations).
    pub fn n_total(&self) -> usize {
        self.n_total
    }

    /// whether `u` is currently present in the graph.
    pub fn is_active(&self, u: usize) -> bool {
        self.active[u]
    }

    /// active vertices, in increasing order.
    pub fn active_vertices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.n_total).filter(move |&v| self.active[v])
    }

    /// number of currently active vertices.
    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    /// edge multiplicity between u and v; 0 if u==v or either is inactive.
    pub fn adjacency(&self, u: usize, v: usize) -> u32 {
        if u == v || !self.active[u] || !self.active[v] {
            return 0;
        }
        self.adj_count[u][v]
    }

    /// whether u and v are adjacent (adjacency(u, v) > 0).
    pub fn are_adjacent(&self, u: usize, v: usize) -> bool {
        self.adjacency(u, v) > 0
    }

    /// active neighbors of u (empty if u is inactive).
    pub fn neighbors(&self, u: usize) -> impl Iterator<Item = usize> + '_ {
        self.adj_bit[u].iter()
    }

    /// degree of u (0 if inactive).
    pub fn degree(&self, u: usize) -> usize {
        if !self.active[u] {
            return 0;
        }
        self.deg[u]
    }

    /// dual price / weight of u, used by pricing.
    pub fn weight(&self, u: usize) -> f64 {
        self.weights[u]
    }

    /// sets the dual price / weight of u.
    pub fn set_weight(&mut self, u: usize, w: f64) {
        self.weights[u] = w;
    }

    /// the undo log (applied modifications, oldest first).
    pub fn mods(&self) -> &[Modification] {
        &self.mods
    }

    /// active vertex of maximum degree, if any.
    pub fn max_degree_vertex(&self) -> Option<usize> {
        self.active_vertices().max_by_key(|&v| self.deg[v])
    }

    /// applies a modification and appends it to the undo log.
    ///
    /// preconditions: u != v, both active. `Contract` additionally requires
    /// u and v to be non-adjacent (debug-asserted in `do_contract`): the
    /// branching driver only ever contracts the non-adjacent pair it just
    /// picked, and `do_contract` does not clear `u`'s own adjacency entry
    /// for `v` on the adjacent-pair path, which would leave `neighbors(u)`
    /// yielding the now-inactive `v`.
    pub fn change(&mut self, kind: ModKind, u: usize, v: usize) -> Result<()> {
        if u == v {
            return Err(SolverError::Contract(format!("change: u == v == {u}")));
        }
        if !self.active[u] || !self.active[v] {
            return Err(SolverError::Contract(format!(
                "change: {:?} on inactive vertex ({u}, {v})",
                kind
            )));
        }
        match kind {
            ModKind::Conflict => self.do_conflict(u, v),
            ModKind::Contract => self.do_contract(u, v),
        }
        self.mods.push(Modification { kind, u, v });
        Ok(())
    }

    /// reverses the top of the undo log; preconditions: it matches (kind, u, v).
    pub fn undo(&mut self, kind: ModKind, u: usize, v: usize) -> Result<()> {
        let top = self.mods.pop().ok_or_else(|| {
            SolverError::Contract("undo: log is empty".to_string())
        })?;
        if top.kind != kind || top.u != u || top.v != v {
            return Err(SolverError::Contract(format!(
                "undo: mismatch, top is {:?}({}, {}), requested {:?}({u}, {v})",
                top.kind, top.u, top.v, kind
            )));
        }
        match kind {
            ModKind::Conflict => self.undo_conflict(u, v),
            ModKind::Contract => self.undo_contract(u, v),
        }
        Ok(())
    }

    fn do_conflict(&mut self, u: usize, v: usize) {
        if self.adj_count[u][v] == 0 {
            self.deg[u] += 1;
            self.deg[v] += 1;
            self.adj_bit[u].insert(v);
            self.adj_bit[v].insert(u);
        }
        self.adj_count[u][v] += 1;
        self.adj_count[v][u] += 1;
    }

    fn undo_conflict(&mut self, u: usize, v: usize) {
        debug_assert!(self.adj_count[u][v] > 0, "undo_conflict on a non-edge");
        self.adj_count[u][v] -= 1;
        self.adj_count[v][u] -= 1;
        if self.adj_count[u][v] == 0 {
            self.deg[u] -= 1;
            self.deg[v] -= 1;
            self.adj_bit[u].remove(v);
            self.adj_bit[v].remove(u);
        }
    }

    /// merges v into u: v's edges are added onto u (additively), v is
    /// deactivated. v's own adjacency row is left untouched (frozen) so
    /// `undo_contract` can read it back.
    ///
    /// requires u and v non-adjacent: an adjacent pair would need `u`'s own
    /// row entry for `v` cleared too (mirroring what the loop below does for
    /// every other neighbor `w`), which this function does not do.
    fn do_contract(&mut self, u: usize, v: usize) {
        debug_assert!(
            self.adj_count[u][v] == 0,
            "do_contract: {u} and {v} are adjacent; Contract must only be applied \
             to non-adjacent pairs"
        );
        let neighbors_of_v: Vec<usize> = self
            .active_vertices()
            .filter(|&w| w != u && w != v && self.adj_count[v][w] > 0)
            .collect();

        for w in neighbors_of_v {
            let add = self.adj_count[v][w];
            let prev_uw = self.adj_count[u][w];
            self.adj_count[u][w] += add;
            self.adj_count[w][u] += add;
            if prev_uw == 0 {
                self.deg[u] += 1;
                self.deg[w] += 1;
                self.adj_bit[u].insert(w);
                self.adj_bit[w].insert(u);
            }
            // the w<->v edge is gone now that v is deactivated; v's own row
            // (adj_count[v][w]) is left untouched so undo can read it back.
            self.adj_count[w][v] = 0;
            self.adj_bit[w].remove(v);
            self.deg[w] -= 1;
        }

        if self.adj_count[u][v] > 0 {
            self.deg[u] -= 1;
        }

        self.active[v] = false;
    }

    fn undo_contract(&mut self, u: usize, v: usize) {
        self.active[v] = true;

        let neighbors_of_v: Vec<usize> = (0..self.n_total)
            .filter(|&w| w != u && w != v && self.adj_count[v][w] > 0)
            .collect();

        for w in neighbors_of_v {
            let add = self.adj_count[v][w];
            debug_assert!(self.adj_count[u][w] >= add, "undo_contract: weight underflow");
            self.adj_count[u][w] -= add;
            self.adj_count[w][u] -= add;
            if self.adj_count[u][w] == 0 {
                self.deg[u] -= 1;
                self.deg[w] -= 1;
                self.adj_bit[u].remove(w);
                self.adj_bit[w].remove(u);
            }
            self.adj_count[w][v] = add;
            self.adj_bit[w].insert(v);
            self.deg[w] += 1;
        }

        if self.adj_count[u][v] > 0 {
            self.deg[u] += 1;
        }
    }

    /// marks u absent; zeroes the mirrored entries in other active vertices'
    /// rows without touching u's own row. idempotent. not logged: callers
    /// that need this reversed should clone the graph first (as pricing
    /// does) rather than relying on `undo`.
    pub fn deactivate(&mut self, u: usize) {
        if !self.active[u] {
            return;
        }
        let neighbors: Vec<usize> = self
            .active_vertices()
            .filter(|&w| w != u && self.adj_count[u][w] > 0)
            .collect();
        for w in neighbors {
            self.adj_count[w][u] = 0;
            self.adj_bit[w].remove(u);
            self.deg[w] -= 1;
        }
        self.active[u] = false;
    }

    /// active vertices adjacent to some vertex of `s`, excluding `s` itself.
    pub fn open_neighborhood(&self, s: &[usize]) -> Vec<usize> {
        let in_s: BitSet = s.iter().copied().collect();
        let mut seen = BitSet::with_capacity(self.n_total);
        for &v in s {
            if !self.active[v] {
                continue;
            }
            for w in self.adj_bit[v].iter() {
                if self.active[w] && !in_s.contains(w) {
                    seen.insert(w);
                }
            }
        }
        let mut res: Vec<usize> = seen.iter().collect();
        res.sort_unstable();
        res
    }

    /// open_neighborhood(s) ∪ s.
    pub fn closed_neighborhood(&self, s: &[usize]) -> Vec<usize> {
        let mut res = self.open_neighborhood(s);
        res.extend_from_slice(s);
        res.sort_unstable();
        res.dedup();
        res
    }

    /// whether the active subgraph is connected (trivially true if empty).
    pub fn is_connected(&self) -> bool {
        self.bfs_reaches_all(|a, b| self.are_adjacent(a, b))
    }

    /// whether the complement of the active subgraph is connected.
    pub fn is_connected_complement(&self) -> bool {
        self.bfs_reaches_all(|a, b| a != b && !self.are_adjacent(a, b))
    }

    fn bfs_reaches_all(&self, adj: impl Fn(usize, usize) -> bool) -> bool {
        let actives: Vec<usize> = self.active_vertices().collect();
        if actives.len() <= 1 {
            return true;
        }
        let mut visited = BitSet::with_capacity(self.n_total);
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(actives[0]);
        visited.insert(actives[0]);
        let mut count = 1;
        while let Some(u) = queue.pop_front() {
            for &v in &actives {
                if v != u && !visited.contains(v) && adj(u, v) {
                    visited.insert(v);
                    count += 1;
                    queue.push_back(v);
                }
            }
        }
        count == actives.len()
    }

    /// replays the contract log (most recent first) onto a partition of
    /// vertex ids, re-inserting each contracted-away vertex into whichever
    /// set currently holds the vertex it was merged into. used to translate
    /// a coloring of the *current* (branched) graph back into a coloring of
    /// the *original* instance.
    pub fn apply_changes_to_solution(&self, sets: &mut [Vec<usize>]) {
        for m in self.mods.iter().rev() {
            if m.kind != ModKind::Contract {
                continue;
            }
            if let Some(set) = sets.iter_mut().find(|s| s.contains(&m.u)) {
                set.push(m.v);
            }
        }
    }

    /// active, pairwise non-adjacent vertex pairs (u < v), in lexicographic order.
    pub fn active_non_adjacent_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let actives: Vec<usize> = self.active_vertices().collect();
        (0..actives.len()).flat_map(move |i| {
            let actives = actives.clone();
            (i + 1..actives.len())
                .map(move |j| (actives[i], actives[j]))
                .filter(move |&(u, v)| !self.are_adjacent(u, v))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Graph {
        Graph::new(3, &[(0, 1), (0, 2), (1, 2)])
    }

    #[test]
    fn degrees_match_edges() {
        let g = triangle();
        assert_eq!(g.degree(0), 2);
        assert_eq!(g.degree(1), 2);
        assert_eq!(g.degree(2), 2);
    }

    #[test]
    fn conflict_then_undo_is_identity() {
        let mut g = Graph::new(4, &[(0, 1)]);
        let before = g.clone();
        g.change(ModKind::Conflict, 2, 3).unwrap();
        assert!(g.are_adjacent(2, 3));
        g.undo(ModKind::Conflict, 2, 3).unwrap();
        assert_eq!(g.degree(0), before.degree(0));
        assert_eq!(g.degree(2), before.degree(2));
        assert!(!g.are_adjacent(2, 3));
        assert_eq!(g.mods().len(), 0);
    }

    #[test]
    fn contract_then_undo_is_identity() {
        // path 0-1-2-3: 0 and 2 are non-adjacent, the only pair Contract is
        // ever applied to (the branching driver only contracts non-adjacent
        // vertices).
        let mut g = Graph::new(4, &[(0, 1), (1, 2), (2, 3)]);
        let deg_before: Vec<usize> = (0..4).map(|v| g.degree(v)).collect();
        g.change(ModKind::Contract, 0, 2).unwrap();
        assert!(!g.is_active(2));
        assert!(g.are_adjacent(0, 3)); // 2's edge to 3 moved onto 0
        g.undo(ModKind::Contract, 0, 2).unwrap();
        assert!(g.is_active(2));
        for v in 0..4 {
            assert_eq!(g.degree(v), deg_before[v], "vertex {v} degree mismatch after undo");
        }
        assert!(!g.are_adjacent(0, 3));
        assert!(g.are_adjacent(2, 3));
    }

    #[test]
    fn contract_accumulates_parallel_edges() {
        // 0 and 1 are non-adjacent but share two neighbors, 2 and 3:
        // contracting them should leave 0 adjacent to both with accumulated
        // multiplicity (conceptually), presence-only query still true.
        let mut g = Graph::new(4, &[(0, 2), (0, 3), (1, 2), (1, 3)]);
        g.change(ModKind::Contract, 0, 1).unwrap();
        assert!(g.are_adjacent(0, 2));
        assert!(g.are_adjacent(0, 3));
        assert_eq!(g.adjacency(0, 2), 2); // both 0-2 and (merged) 1-2 contribute
        assert_eq!(g.adjacency(0, 3), 2); // both 0-3 and (merged) 1-3 contribute
    }

    #[test]
    fn undo_mismatch_is_an_error() {
        let mut g = triangle();
        g.change(ModKind::Conflict, 0, 1).unwrap(); // already adjacent, still legal (accumulates)
        assert!(g.undo(ModKind::Contract, 0, 1).is_err());
    }

    #[test]
    fn deactivate_is_idempotent_and_freezes_own_row() {
        let mut g = Graph::new(3, &[(0, 1), (1, 2)]);
        g.deactivate(1);
        assert!(!g.is_active(1));
        assert_eq!(g.degree(0), 0);
        assert_eq!(g.degree(2), 0);
        g.deactivate(1); // idempotent
        assert!(!g.is_active(1));
    }

    #[test]
    fn apply_changes_to_solution_replays_contracts() {
        let mut g = Graph::new(3, &[(0, 1)]);
        g.change(ModKind::Contract, 0, 2).unwrap(); // 2 merged into 0
        let mut sets = vec![vec![0], vec![1]];
        g.apply_changes_to_solution(&mut sets);
        assert!(sets[0].contains(&2));
    }

    #[test]
    fn reversibility_under_random_sequences() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let n = 10;
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let mut g = Graph::new(n, &[(0, 1), (2, 3), (4, 5), (1, 2), (3, 4)]);
            let snapshot = g.clone();
            let mut applied: Vec<(ModKind, usize, usize)> = Vec::new();
            for _ in 0..5 {
                let actives: Vec<usize> = g.active_vertices().collect();
                if actives.len() < 2 {
                    break;
                }
                let i = rng.gen_range(0..actives.len());
                let mut j = rng.gen_range(0..actives.len());
                while j == i {
                    j = rng.gen_range(0..actives.len());
                }
                let (u, v) = (actives[i], actives[j]);
                // Contract requires a non-adjacent pair (see `do_contract`);
                // fall back to Conflict when the draw would violate that.
                let kind = if g.are_adjacent(u, v) || rng.gen_bool(0.5) {
                    ModKind::Conflict
                } else {
                    ModKind::Contract
                };
                if g.change(kind, u, v).is_ok() {
                    applied.push((kind, u, v));
                }
            }
            for (kind, u, v) in applied.into_iter().rev() {
                g.undo(kind, u, v).unwrap();
            }
            for v in 0..n {
                assert_eq!(g.is_active(v), snapshot.is_active(v));
                assert_eq!(g.degree(v), snapshot.degree(v));
                for w in 0..n {
                    assert_eq!(g.adjacency(v, w), snapshot.adjacency(v, w));
                }
            }
        }
    }
}
