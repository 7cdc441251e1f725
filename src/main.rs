//! command-line entry point: reads an instance, runs the branch-cut-and-price
//! search within a time limit, and reports (optionally writes) the result.

use std::process::ExitCode;
use std::time::Duration;

use bcp_color::driver;
use bcp_color::instance::Instance;
use bcp_color::util;
use clap::Parser;

/// release builds get the full hour; debug builds get a short leash so a
/// `cargo test`/local run doesn't wait on a pathological instance.
#[cfg(debug_assertions)]
const DEFAULT_TIME_LIMIT_SECS: f64 = 120.0;
#[cfg(not(debug_assertions))]
const DEFAULT_TIME_LIMIT_SECS: f64 = 3600.0;

/// solves a DIMACS vertex coloring instance by branch-cut-and-price.
#[derive(Parser, Debug)]
#[command(name = "bcp-color", version, about)]
struct Cli {
    /// path to a DIMACS .col/.clq instance.
    instance: String,

    /// time limit in seconds.
    #[arg(long, default_value_t = DEFAULT_TIME_LIMIT_SECS)]
    time_limit: f64,

    /// optional path to write the coloring to (one "vertex color" pair per line).
    #[arg(long)]
    solution: Option<String>,

    /// optional path to write search statistics to (JSON).
    #[arg(long)]
    stats: Option<String>,

    /// increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let instance = match Instance::from_file(&cli.instance) {
        Ok(inst) => inst,
        Err(e) => {
            log::error!("fatal: {e}");
            return ExitCode::FAILURE;
        }
    };
    instance.display_statistics();

    let outcome = match driver::solve(&instance, Duration::from_secs_f64(cli.time_limit)) {
        Ok(o) => o,
        Err(e) => {
            log::error!("fatal: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let bad @ util::CheckerResult::Conflict(..)
    | bad @ util::CheckerResult::Duplicated(..)
    | bad @ util::CheckerResult::Uncovered(..) = util::checker(&instance, &outcome.coloring)
    {
        log::error!("fatal: reported coloring failed re-check: {bad:?}");
        return ExitCode::FAILURE;
    }

    let classes: Vec<String> = outcome
        .coloring
        .iter()
        .map(|class| {
            let members: Vec<String> = class.iter().map(|v| v.to_string()).collect();
            format!("{{{}}}", members.join(","))
        })
        .collect();
    println!("SOL: {} = {}", outcome.chromatic_number, classes.join(" "));
    println!("nodes explored: {}", outcome.nodes_explored);
    if outcome.time_limit_reached {
        log::warn!("time limit reached before the search tree was exhausted");
    }

    if let Err(e) =
        util::write_outputs(&outcome, cli.stats.as_deref(), cli.solution.as_deref())
    {
        eprintln!("error writing outputs: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
