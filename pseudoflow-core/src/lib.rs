//! A parametric s-t minimum-cut solver built on Hochbaum's Pseudoflow (HPF)
//! algorithm: a normalized-tree preflow engine with highest-label processing
//! and the gap heuristic, driven by a divide-and-conquer parametric sweep
//! over an affine capacity parameter lambda.

pub mod breakpoints;
pub mod engine;
pub mod error;
pub mod graph;
pub mod parametric;
pub mod problem;
pub mod stats;

use std::time::Instant;

pub use breakpoints::Breakpoint;
pub use error::{PseudoflowError, PseudoflowResult};
pub use graph::Graph;
pub use problem::CutProblem;
pub use stats::{Stats, Timings};

/// Tolerance used uniformly for capacity-negativity, flow/excess-vs-zero
/// comparisons, and lambda* endpoint coincidence. See DESIGN.md for why this
/// diverges from the literal original, which compares flow/excess to exact
/// zero in one place despite documenting a tolerance everywhere else.
pub const TOLERANCE: f64 = 1e-8;

/// The full result of a parametric solve: an increasing list of breakpoints
/// and, for each, the source-side indicator valid at and to the right of it
/// up to the next breakpoint, plus counters and timings for the run.
#[derive(Debug, Clone)]
pub struct Solution {
    pub breakpoints: Vec<f64>,
    pub indicators: Vec<Vec<u8>>,
    pub stats: Stats,
    pub timings: Timings,
}

/// Runs the parametric minimum-cut sweep over `graph`.
pub fn solve(graph: &Graph) -> PseudoflowResult<Solution> {
    let init_start = Instant::now();
    // `graph` is already fully built by the time it reaches us; the "init"
    // phase here covers nothing but this zero-cost accounting boundary —
    // the real per-solve allocation happens inside `parametric::parametric_cut`.
    let init = init_start.elapsed();

    let solve_start = Instant::now();
    let (breakpoints, stats) = parametric::parametric_cut(graph)?;
    let solve = solve_start.elapsed();

    let mut lambdas = Vec::with_capacity(breakpoints.len());
    let mut indicators = Vec::with_capacity(breakpoints.len());
    for bp in breakpoints {
        lambdas.push(bp.lambda);
        indicators.push(bp.indicator);
    }

    Ok(Solution {
        breakpoints: lambdas,
        indicators,
        stats,
        timings: Timings { init, solve },
    })
}
