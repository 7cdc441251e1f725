//! error taxonomy for the solver.
//!
//! mirrors the three failure classes called out by the design: malformed
//! input, internal contract violations (undo/redo mismatches, duplicate or
//! non-independent columns, ...) and LP solver failures.

/// errors that can terminate a solver run.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// malformed DIMACS input, out-of-range vertex id, inconsistent edge count, ...
    #[error("instance error: {0}")]
    Instance(String),

    /// an internal invariant was violated (undo/redo mismatch, duplicate
    /// column, non-independent column marked active, ...). Indicates an
    /// implementation bug rather than a bad instance.
    #[error("fatal: {0}")]
    Contract(String),

    /// the LP solver reported infeasible, unbounded, or failed to converge.
    #[error("LP solver error: {0}")]
    Lp(String),
}

/// convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SolverError>;
