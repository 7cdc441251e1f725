//! DIMACS clq/col instance reading.
//!
//! Kept deliberately thin: this module's only job is to turn a `.col`/`.clq`
//! file (or an in-memory string, for tests) into a plain vertex count plus
//! edge list. The rest of the solver core depends on nothing more specific
//! than that — see [`crate::graph::Graph::new`].

use std::fs;

use bit_set::BitSet;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{digit1, space1};
use nom::sequence::tuple;
use nom::IResult;

use crate::error::{Result, SolverError};

/// a parsed DIMACS instance: vertex count and deduplicated undirected edges.
#[derive(Debug, Clone)]
pub struct Instance {
    n: usize,
    edges: Vec<(usize, usize)>,
    adj_list: Vec<Vec<usize>>,
    adj_matrix: Vec<BitSet>,
}

impl Instance {
    /// number of vertices.
    pub fn n(&self) -> usize {
        self.n
    }

    /// number of (deduplicated) edges.
    pub fn m(&self) -> usize {
        self.edges.len()
    }

    /// the deduplicated undirected edge list.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// vertices adjacent to `v`.
    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.adj_list[v]
    }

    /// degree of `v`.
    pub fn degree(&self, v: usize) -> usize {
        self.adj_list[v].len()
    }

    /// whether `a` and `b` are adjacent (O(1)).
    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        a != b && self.adj_matrix[a].contains(b)
    }

    /// reads an instance from a DIMACS `.col`/`.clq` file.
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SolverError::Instance(format!("unable to read {path}: {e}")))?;
        Self::from_dimacs_str(&content)
    }

    /// parses a DIMACS instance from an in-memory string.
    pub fn from_dimacs_str(content: &str) -> Result<Self> {
        let content = content.replace('\r', "");
        let mut declared: Option<(usize, usize)> = None;
        let mut raw_edges: Vec<(usize, usize)> = Vec::new();

        for line in content.lines() {
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('c') {
                continue;
            }
            if let Ok((_, (n, m))) = parse_header(line) {
                declared = Some((n, m));
                continue;
            }
            if let Ok((_, (u, v))) = parse_edge(line) {
                raw_edges.push((u, v));
                continue;
            }
            // unrecognized line kinds (e.g. DIMACS "n" node-weight lines) are
            // ignored rather than treated as a parse error.
        }

        let (n, _m) = declared
            .ok_or_else(|| SolverError::Instance("missing 'p edge'/'p col' header".into()))?;

        // infer 0- vs 1-based indexing: if any edge references vertex 0, the
        // file is already 0-based; otherwise every index is shifted down by one.
        let zero_based = raw_edges.iter().any(|&(u, v)| u == 0 || v == 0);
        let mut edge_set: Vec<BitSet> = vec![BitSet::with_capacity(n); n];
        for (u, v) in raw_edges {
            let (u, v) = if zero_based { (u, v) } else { (u.wrapping_sub(1), v.wrapping_sub(1)) };
            if u >= n || v >= n {
                return Err(SolverError::Instance(format!(
                    "edge ({u}, {v}) out of range for n={n}"
                )));
            }
            if u == v {
                continue; // self-loops are dropped: a vertex is never its own neighbor
            }
            edge_set[u].insert(v);
            edge_set[v].insert(u); // parallel edges collapse to a single membership
        }

        let mut adj_list: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut edges = Vec::new();
        for u in 0..n {
            for v in edge_set[u].iter() {
                adj_list[u].push(v);
            }
            adj_list[u].sort_unstable();
            for &v in &adj_list[u] {
                if u < v {
                    edges.push((u, v));
                }
            }
        }

        Ok(Self { n, edges, adj_list, adj_matrix: edge_set })
    }

    /// summary statistics, printed the way the teacher's instance types do.
    pub fn display_statistics(&self) {
        println!("\t{} \t vertices", self.n());
        println!("\t{} \t edges", self.m());
        let degrees: Vec<usize> = (0..self.n()).map(|v| self.degree(v)).collect();
        println!("\t{} \t min degree", degrees.iter().min().unwrap_or(&0));
        println!("\t{} \t max degree", degrees.iter().max().unwrap_or(&0));
    }
}

fn parse_uint(s: &str) -> IResult<&str, usize> {
    let (rest, digits) = digit1(s)?;
    Ok((rest, digits.parse::<usize>().expect("digit1 guarantees a valid number")))
}

fn parse_header(s: &str) -> IResult<&str, (usize, usize)> {
    let (rest, _) = alt((tag("p edge"), tag("p col")))(s)?;
    let (rest, (_, n, _, m)) = tuple((space1, parse_uint, space1, parse_uint))(rest)?;
    Ok((rest, (n, m)))
}

fn parse_edge(s: &str) -> IResult<&str, (usize, usize)> {
    let (rest, _) = tag("e")(s)?;
    let (rest, (_, u, _, v)) = tuple((space1, parse_uint, space1, parse_uint))(rest)?;
    Ok((rest, (u, v)))
}
