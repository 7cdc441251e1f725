//! the generated independent sets (columns) and triangle cuts, kept
//! activation-consistent with the underlying graph across every mutation.
//!
//! columns are never removed once added — only marked inactive — so
//! `ColumnId`s handed out by `add_column` stay valid for the lifetime of the
//! formulation. this is the "arena + integer id" strategy from the design
//! notes: the column store is an append-only `Vec`, and the per-vertex /
//! per-pair indices hold ids, not owning references.

use std::collections::HashMap;

use crate::error::{Result, SolverError};
use crate::graph::{Graph, ModKind};

/// id of a column in the formulation's arena.
pub type ColumnId = usize;

/// an independent set used as a variable in the set-cover LP.
#[derive(Debug, Clone)]
pub struct Column {
    /// sorted, deduplicated member vertex ids.
    pub nodes: Vec<usize>,
    /// true iff every member is active and no two members are adjacent.
    pub active: bool,
}

/// a triangle cut (a, b, c). kept activation-consistent but never
/// separated or fed into the LP — see DESIGN.md for why cuts are
/// pricing-only in this implementation.
#[derive(Debug, Clone, Copy)]
pub struct Cut {
    /// first vertex.
    pub a: usize,
    /// second vertex.
    pub b: usize,
    /// third vertex.
    pub c: usize,
    /// true iff a, b and c are all active.
    pub active: bool,
}

fn pair_key(u: usize, v: usize) -> (usize, usize) {
    if u < v {
        (u, v)
    } else {
        (v, u)
    }
}

/// owns the graph and the catalog of columns/cuts generated against it.
#[derive(Debug)]
pub struct Formulation {
    graph: Graph,
    columns: Vec<Column>,
    cuts: Vec<Cut>,
    by_vertex: Vec<Vec<ColumnId>>,
    by_pair: HashMap<(usize, usize), Vec<ColumnId>>,
}

impl Formulation {
    /// seeds the formulation from an initial (e.g. DSATUR) coloring: every
    /// color class becomes a column, and any vertex left uncovered (should
    /// not happen for a proper coloring, but kept as a safety net) is added
    /// as a singleton so the restricted master LP starts feasible.
    pub fn new(graph: Graph, initial_classes: &[Vec<usize>]) -> Self {
        let n = graph.n_total();
        let mut form = Self {
            graph,
            columns: Vec::new(),
            cuts: Vec::new(),
            by_vertex: vec![Vec::new(); n],
            by_pair: HashMap::new(),
        };
        let mut covered = vec![false; n];
        for class in initial_classes {
            for &v in class {
                covered[v] = true;
            }
            form.insert_column_unchecked(class.clone());
        }
        for v in form.graph.active_vertices().collect::<Vec<_>>() {
            if !covered[v] {
                form.insert_column_unchecked(vec![v]);
            }
        }
        form
    }

    /// the underlying graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// sets the pricing weight (dual price) of a vertex. does not go
    /// through the undo log: weights are pricing bookkeeping, not a
    /// structural modification of the graph.
    pub fn set_weight(&mut self, v: usize, w: f64) {
        self.graph.set_weight(v, w);
    }

    /// number of columns ever inserted (active or not).
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// number of cuts ever inserted (active or not).
    pub fn num_cuts(&self) -> usize {
        self.cuts.len()
    }

    /// a column by id.
    pub fn column(&self, id: ColumnId) -> &Column {
        &self.columns[id]
    }

    /// active columns, in insertion order.
    pub fn active_columns(&self) -> impl Iterator<Item = (ColumnId, &Column)> {
        self.columns.iter().enumerate().filter(|(_, c)| c.active)
    }

    /// active columns containing vertex `v`, in insertion order.
    pub fn active_columns_with(&self, v: usize) -> impl Iterator<Item = ColumnId> + '_ {
        self.by_vertex[v].iter().copied().filter(move |&id| self.columns[id].active)
    }

    fn check_active(&self, nodes: &[usize]) -> bool {
        nodes.iter().all(|&v| self.graph.is_active(v))
            && nodes
                .iter()
                .enumerate()
                .all(|(i, &u)| nodes[i + 1..].iter().all(|&v| !self.graph.are_adjacent(u, v)))
    }

    fn insert_column_unchecked(&mut self, mut nodes: Vec<usize>) -> ColumnId {
        nodes.sort_unstable();
        nodes.dedup();
        let active = self.check_active(&nodes);
        let id = self.columns.len();
        for (i, &u) in nodes.iter().enumerate() {
            self.by_vertex[u].push(id);
            for &v in &nodes[i + 1..] {
                self.by_pair.entry(pair_key(u, v)).or_default().push(id);
            }
        }
        self.columns.push(Column { nodes, active });
        id
    }

    /// inserts a new column. fails if `nodes` is not independent in the
    /// current graph, or if an identical set has already been inserted.
    pub fn add_column(&mut self, mut nodes: Vec<usize>) -> Result<ColumnId> {
        nodes.sort_unstable();
        nodes.dedup();
        if !self.check_active(&nodes) {
            return Err(SolverError::Contract(format!(
                "add_column: {nodes:?} is not independent in the current graph"
            )));
        }
        if self.columns.iter().any(|c| c.nodes == nodes) {
            return Err(SolverError::Contract(format!("add_column: {nodes:?} already present")));
        }
        Ok(self.insert_column_unchecked(nodes))
    }

    /// inserts a new triangle cut.
    pub fn add_cut(&mut self, a: usize, b: usize, c: usize) {
        let active = [a, b, c].iter().all(|&v| self.graph.is_active(v));
        self.cuts.push(Cut { a, b, c, active });
    }

    /// active cuts, in insertion order.
    pub fn active_cuts(&self) -> impl Iterator<Item = &Cut> {
        self.cuts.iter().filter(|c| c.active)
    }

    /// applies a modification to the graph and refreshes activation of
    /// every column/cut it could have touched.
    pub fn change(&mut self, kind: ModKind, u: usize, v: usize) -> Result<()> {
        self.graph.change(kind, u, v)?;
        self.refresh_after(kind, u, v);
        Ok(())
    }

    /// undoes the top graph modification and refreshes activation the same way.
    pub fn undo(&mut self, kind: ModKind, u: usize, v: usize) -> Result<()> {
        self.graph.undo(kind, u, v)?;
        self.refresh_after(kind, u, v);
        Ok(())
    }

    fn refresh_after(&mut self, kind: ModKind, u: usize, v: usize) {
        let affected: Vec<ColumnId> = match kind {
            ModKind::Conflict => self.by_pair.get(&pair_key(u, v)).cloned().unwrap_or_default(),
            ModKind::Contract => {
                let mut ids = self.by_vertex[v].clone();
                ids.extend(self.by_vertex[u].iter().copied());
                ids.sort_unstable();
                ids.dedup();
                ids
            }
        };
        for id in affected {
            let active = self.check_active(&self.columns[id].nodes);
            self.columns[id].active = active;
        }
        for cut in &mut self.cuts {
            cut.active = [cut.a, cut.b, cut.c].iter().all(|&w| self.graph.is_active(w));
        }
    }

    /// S[u][v] = sum of x_s over active columns s containing both u and v.
    pub fn similarity(&self, x: &HashMap<ColumnId, f64>) -> Vec<Vec<f64>> {
        let n = self.graph.n_total();
        let mut sim = vec![vec![0.0; n]; n];
        for (id, col) in self.active_columns() {
            let Some(&val) = x.get(&id) else { continue };
            if val <= 0.0 {
                continue;
            }
            for (i, &u) in col.nodes.iter().enumerate() {
                for &v in &col.nodes[i + 1..] {
                    sim[u][v] += val;
                    sim[v][u] += val;
                }
            }
        }
        sim
    }
}
