//! The parametric driver (C4): a divide-and-conquer sweep over lambda that
//! contracts decided nodes between recursive calls, in the style of
//! Gallo-Grigoriadis-Tarjan's parametric flow algorithm.

use crate::breakpoints::{Breakpoint, BreakpointList};
use crate::engine::solve_problem;
use crate::error::PseudoflowResult;
use crate::graph::Graph;
use crate::problem::CutProblem;
use crate::stats::Stats;
use crate::TOLERANCE;

/// Runs the full parametric sweep over `graph`'s `[lambda_low, lambda_high]`
/// range, returning an increasing, deduplicated breakpoint list plus the
/// accumulated work counters (spec.md section 4.4).
pub fn parametric_cut(graph: &Graph) -> PseudoflowResult<(Vec<Breakpoint>, Stats)> {
    let mut stats = Stats::default();

    if (graph.lambda_high - graph.lambda_low).abs() <= TOLERANCE {
        log::debug!("degenerate lambda range, skipping parametric recursion");
        let mut problem = CutProblem::seed(graph, graph.lambda_low)?;
        stats.merge(&solve_problem(&mut problem, false, TOLERANCE));
        let mut breakpoints = BreakpointList::new();
        breakpoints.push(graph.lambda_low, problem.indicator().to_vec());
        return Ok((breakpoints.into_vec(), stats));
    }

    let mut low = CutProblem::seed(graph, graph.lambda_low)?;
    let mut high = CutProblem::seed(graph, graph.lambda_high)?;

    let mut breakpoints = BreakpointList::new();
    recurse(
        graph.round_negative_capacity,
        &mut low,
        &mut high,
        &mut breakpoints,
        &mut stats,
    )?;

    breakpoints.dedup();
    Ok((breakpoints.into_vec(), stats))
}

/// `low` and `high` are solved for the minimal and maximal source set
/// respectively on entry if not already solved; recursion always passes
/// already-solved problems down, so only the outermost call does real work
/// on both ends of a subinterval.
fn recurse(
    round_negative_capacity: bool,
    low: &mut CutProblem,
    high: &mut CutProblem,
    breakpoints: &mut BreakpointList,
    stats: &mut Stats,
) -> PseudoflowResult<()> {
    let base_level = !low.is_solved() && !high.is_solved();

    if !low.is_solved() {
        log::trace!("solving low end at lambda={}", low.lambda());
        stats.merge(&solve_problem(low, false, TOLERANCE));
    }
    if !high.is_solved() {
        log::trace!("solving high end at lambda={}", high.lambda());
        stats.merge(&solve_problem(high, true, TOLERANCE));
    }

    let multiplier_gap = high.cut_multiplier() - low.cut_multiplier();
    if multiplier_gap.abs() > TOLERANCE {
        let lambda_star = (low.cut_constant() - high.cut_constant()) / multiplier_gap;

        if low.lambda() + TOLERANCE < lambda_star && lambda_star < high.lambda() - TOLERANCE {
            log::trace!("splitting [{}, {}] at lambda*={lambda_star}", low.lambda(), high.lambda());
            // Both contracted instances are built from `low`'s arc/node
            // structure, per the original driver: the decisions encoded by
            // `low_ind`/`high_ind` are enough to derive either half from a
            // single parent.
            let mut upper_half =
                CutProblem::contract(low, low.indicator(), high.indicator(), lambda_star, round_negative_capacity)?;
            let mut lower_half =
                CutProblem::contract(low, low.indicator(), high.indicator(), lambda_star, round_negative_capacity)?;

            recurse(round_negative_capacity, low, &mut upper_half, breakpoints, stats)?;
            recurse(round_negative_capacity, &mut lower_half, high, breakpoints, stats)?;
        } else if (lambda_star - high.lambda()).abs() <= TOLERANCE {
            log::debug!("breakpoint at lambda={}", high.lambda());
            breakpoints.push(high.lambda(), low.indicator().to_vec());
        } else if (lambda_star - low.lambda()).abs() <= TOLERANCE {
            log::debug!("breakpoint at lambda={}", low.lambda());
            breakpoints.push(low.lambda(), low.indicator().to_vec());
        }
        // otherwise: parallel pieces intersect outside the subinterval, no
        // interior breakpoint here.
    }

    if base_level {
        log::debug!("terminal breakpoint at lambda={}", high.lambda());
        breakpoints.push(high.lambda(), high.indicator().to_vec());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    #[test]
    fn degenerate_range_yields_single_breakpoint() {
        let mut g = Graph::new(2, 0, 1, 5.0, 5.0, false).unwrap();
        g.add_arc(0, 1, 3.0, 0.0).unwrap();
        let (breakpoints, _) = parametric_cut(&g).unwrap();
        assert_eq!(breakpoints.len(), 1);
        assert_eq!(breakpoints[0].lambda, 5.0);
    }

    #[test]
    fn parallel_capacities_yield_a_single_breakpoint_at_lambda_high() {
        // No arc depends on lambda, so the cut value is constant: one piece,
        // one breakpoint at lambda_high.
        let mut g = Graph::new(4, 0, 3, 0.0, 10.0, false).unwrap();
        g.add_arc(0, 1, 10.0, 0.0).unwrap();
        g.add_arc(0, 2, 10.0, 0.0).unwrap();
        g.add_arc(1, 3, 5.0, 0.0).unwrap();
        g.add_arc(2, 3, 5.0, 0.0).unwrap();
        let (breakpoints, _) = parametric_cut(&g).unwrap();
        assert_eq!(breakpoints.len(), 1);
        assert_eq!(breakpoints[0].lambda, 10.0);
        assert_eq!(breakpoints[0].indicator, vec![1, 1, 1, 0]);
    }

    #[test]
    fn monotone_source_arc_produces_an_interior_breakpoint() {
        // Source arc capacity grows with lambda while the bottleneck arc
        // stays fixed: the min cut should switch from the source arc to the
        // bottleneck arc at some interior lambda.
        let mut g = Graph::new(3, 0, 2, 0.0, 10.0, false).unwrap();
        g.add_arc(0, 1, 1.0, 1.0).unwrap();
        g.add_arc(1, 2, 5.0, 0.0).unwrap();
        let (breakpoints, _) = parametric_cut(&g).unwrap();
        assert!(breakpoints.len() >= 2);
        let lambdas: Vec<f64> = breakpoints.iter().map(|b| b.lambda).collect();
        for w in lambdas.windows(2) {
            assert!(w[0] < w[1]);
        }
        assert_eq!(breakpoints.last().unwrap().lambda, 10.0);
    }
}
