//! result export and solution checking, in the style of the teacher's
//! `util.rs`/`color.rs` (`export_results`, `checker`/`CheckerResult`) but
//! against this crate's own [`Instance`] and [`SolveOutcome`] types rather
//! than a trait object instance.

use std::fs;

use serde_json::json;

use crate::driver::SolveOutcome;
use crate::error::{Result, SolverError};
use crate::instance::Instance;

/// the result of independently re-checking a reported coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckerResult {
    /// a valid coloring using this many colors.
    Ok(usize),
    /// two adjacent vertices were assigned the same color class.
    Conflict(usize, usize),
    /// a vertex appeared in more than one color class.
    Duplicated(usize),
    /// a vertex was never assigned a color class.
    Uncovered(usize),
}

/// re-verifies a coloring against the instance from scratch, independent of
/// whatever invariants the solver itself maintained.
pub fn checker(instance: &Instance, coloring: &[Vec<usize>]) -> CheckerResult {
    let mut seen = vec![false; instance.n()];
    for class in coloring {
        for &u in class {
            if seen[u] {
                return CheckerResult::Duplicated(u);
            }
            seen[u] = true;
        }
        for (i, &u) in class.iter().enumerate() {
            for &v in &class[i + 1..] {
                if instance.are_adjacent(u, v) {
                    return CheckerResult::Conflict(u, v);
                }
            }
        }
    }
    match seen.iter().position(|&s| !s) {
        Some(v) => CheckerResult::Uncovered(v),
        None => CheckerResult::Ok(coloring.len()),
    }
}

/// writes the solve outcome to the requested stats/solution files (either
/// may be omitted). the solution file lists one `vertex color` pair per
/// line, vertices numbered as in the input.
pub fn write_outputs(
    outcome: &SolveOutcome,
    stats_file: Option<&str>,
    sol_file: Option<&str>,
) -> Result<()> {
    if let Some(path) = stats_file {
        let stats = json!({
            "chromatic_number": outcome.chromatic_number,
            "nodes_explored": outcome.nodes_explored,
            "time_limit_reached": outcome.time_limit_reached,
        });
        fs::write(path, stats.to_string())
            .map_err(|e| SolverError::Instance(format!("couldn't write {path}: {e}")))?;
    }
    if let Some(path) = sol_file {
        let mut lines = Vec::new();
        for (color, class) in outcome.coloring.iter().enumerate() {
            for &v in class {
                lines.push(format!("{v} {color}"));
            }
        }
        fs::write(path, lines.join("\n"))
            .map_err(|e| SolverError::Instance(format!("couldn't write {path}: {e}")))?;
    }
    Ok(())
}
