//! branch-cut-and-price solver for the vertex coloring problem.

// #![warn(clippy::all, clippy::pedantic)]
// useful additional warnings if docs are missing, or crates imported but unused, etc.
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unsafe_code)]
#![warn(unused_extern_crates)]
#![warn(variant_size_differences)]

// not sure if already by default in clippy
#![warn(clippy::similar_names)]
#![warn(clippy::shadow_unrelated)]
#![warn(clippy::shadow_same)]
#![warn(clippy::shadow_reuse)]

/// numerical tolerance used throughout column generation and branching:
/// floating point LP values within this distance of an integer or of each
/// other are treated as equal.
pub const EPS: f64 = 1e-9;

/// typed solver errors.
pub mod error;

/// DIMACS clq/col instance reading.
pub mod instance;

/// mutable graph with reversible conflict/contract modifications.
pub mod graph;

/// columns (independent sets) and cuts generated against the graph.
pub mod formulation;

/// DSATUR greedy coloring heuristic.
pub mod heuristic;

/// maximum weighted independent set pricing.
pub mod pricing;

/// restricted master LP, backed by `highs`.
pub mod lp;

/// column-generation loop tying the LP master to pricing.
pub mod master;

/// Zykov conflict/contract branch-and-bound.
pub mod branching;

/// the outer branch-cut-and-price search loop.
pub mod driver;

/// result export and solution checking.
pub mod util;
