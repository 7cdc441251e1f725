//! DSATUR: greedy saturation-degree coloring, used both to seed the
//! formulation's initial columns and as a periodically re-run primal bound
//! during the search.

use std::cmp::Ordering;

use bit_set::BitSet;
use priority_queue::PriorityQueue;

use crate::graph::Graph;

#[derive(PartialEq, Eq)]
struct DSatInfo {
    dsat: usize,
    degree: usize,
}

impl Ord for DSatInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dsat.cmp(&other.dsat).then_with(|| self.degree.cmp(&other.degree))
    }
}

impl PartialOrd for DSatInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// a coloring of the active subgraph: color classes plus the color count.
#[derive(Debug, Clone)]
pub struct DsaturSolution {
    /// classes[i]: vertices assigned color i.
    pub classes: Vec<Vec<usize>>,
}

impl DsaturSolution {
    /// number of colors used.
    pub fn num_colors(&self) -> usize {
        self.classes.len()
    }
}

/// runs DSATUR on the active subgraph of `graph`: repeatedly colors the
/// uncolored vertex of maximum saturation degree (ties broken by raw
/// degree) with the smallest color unused among its already-colored
/// neighbors.
pub fn dsatur(graph: &Graph) -> DsaturSolution {
    let n = graph.n_total();
    let mut queue: PriorityQueue<usize, DSatInfo> = PriorityQueue::new();
    for v in graph.active_vertices() {
        queue.push(v, DSatInfo { dsat: 0, degree: graph.degree(v) });
    }

    let mut colors: Vec<Option<usize>> = vec![None; n];
    let mut adj_colors: Vec<BitSet> = vec![BitSet::default(); n];
    let mut last_color: Option<usize> = None;

    while let Some((current, _)) = queue.pop() {
        let mut color = 0usize;
        while adj_colors[current].contains(color) {
            color += 1;
        }
        colors[current] = Some(color);
        last_color = Some(last_color.map_or(color, |m| m.max(color)));

        for neighbor in graph.neighbors(current) {
            if colors[neighbor].is_some() {
                continue;
            }
            if !adj_colors[neighbor].contains(color) {
                adj_colors[neighbor].insert(color);
                queue.change_priority_by(&neighbor, |p| p.dsat += 1);
            }
        }
    }

    let num_colors = last_color.map_or(0, |c| c + 1);
    let mut classes = vec![Vec::new(); num_colors];
    for v in graph.active_vertices() {
        classes[colors[v].expect("every active vertex is colored")].push(v);
    }
    DsaturSolution { classes }
}
