//! The pseudoflow engine (C3): normalized-tree preflow with highest-label
//! processing and the gap heuristic, operating on a single [`CutProblem`].

use crate::problem::{CutProblem, NodeKind};
use crate::stats::Stats;

#[derive(Debug, Clone, Default)]
struct EngineNode {
    label: usize,
    excess: f64,
    parent: Option<usize>,
    children: Vec<usize>,
    scan_pos: usize,
    out_of_tree: Vec<usize>,
    next_arc: usize,
    arc_to_parent: Option<usize>,
    /// Next node in the same strong-roots bucket; unrelated to `children`.
    next: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct EngineArc {
    from: usize,
    to: usize,
    capacity: f64,
    flow: f64,
    /// 1 while the arc, as a tree edge, runs child -> parent in its
    /// original orientation; 0 once a saturating push has reversed it.
    direction: u8,
}

/// Per-solve state for the normalized-tree pseudoflow algorithm. Built fresh
/// for every call to [`solve_problem`] and dropped at the end of it — no
/// state survives across solves, so repeated calls in one process are safe.
struct SolveContext {
    tolerance: f64,
    source: usize,
    sink: usize,
    nodes: Vec<EngineNode>,
    arcs: Vec<EngineArc>,
    strong_roots: Vec<Option<usize>>,
    strong_root_tail: Vec<Option<usize>>,
    label_count: Vec<usize>,
    highest_strong_label: usize,
    stats: Stats,
}

impl SolveContext {
    fn new(problem: &CutProblem, reversed: bool, tolerance: f64) -> Self {
        let num_nodes = problem.num_internal_nodes();
        let (source, sink) = if reversed {
            (crate::problem::ARTIFICIAL_SINK, crate::problem::ARTIFICIAL_SOURCE)
        } else {
            (crate::problem::ARTIFICIAL_SOURCE, crate::problem::ARTIFICIAL_SINK)
        };

        let mut nodes: Vec<EngineNode> = (0..num_nodes).map(|_| EngineNode::default()).collect();
        let mut arcs: Vec<EngineArc> = Vec::with_capacity(problem.arcs().len());
        for pa in problem.arcs() {
            let (from, to) = if reversed { (pa.to, pa.from) } else { (pa.from, pa.to) };
            arcs.push(EngineArc {
                from,
                to,
                capacity: pa.capacity,
                flow: 0.0,
                direction: 1,
            });
        }

        for idx in 0..arcs.len() {
            let (from, to) = (arcs[idx].from, arcs[idx].to);
            debug_assert_ne!(from, to, "self-loops cannot survive into a cut problem");
            debug_assert!(
                to != source && from != sink,
                "arcs into source or out of sink cannot survive into a cut problem"
            );
            if from == source && to == sink {
                arcs[idx].flow = arcs[idx].capacity;
            } else if to == sink {
                nodes[to].out_of_tree.push(idx);
            } else {
                nodes[from].out_of_tree.push(idx);
            }
        }

        let strong_roots = vec![None; num_nodes];
        let strong_root_tail = vec![None; num_nodes];
        let label_count = vec![0usize; num_nodes];

        let mut ctx = SolveContext {
            tolerance,
            source,
            sink,
            nodes,
            arcs,
            strong_roots,
            strong_root_tail,
            label_count,
            highest_strong_label: 1,
            stats: Stats::default(),
        };
        ctx.simple_initialization();
        ctx
    }

    fn n(&self) -> usize {
        self.nodes.len()
    }

    fn is_excess(&self, value: f64) -> bool {
        value.abs() > self.tolerance
    }

    fn simple_initialization(&mut self) {
        let source = self.source;
        let sink = self.sink;

        let size = self.nodes[source].out_of_tree.len();
        for i in 0..size {
            let arc_idx = self.nodes[source].out_of_tree[i];
            self.arcs[arc_idx].flow = self.arcs[arc_idx].capacity;
            let to = self.arcs[arc_idx].to;
            self.nodes[to].excess += self.arcs[arc_idx].capacity;
        }

        let size = self.nodes[sink].out_of_tree.len();
        for i in 0..size {
            let arc_idx = self.nodes[sink].out_of_tree[i];
            let capacity = self.arcs[arc_idx].capacity;
            self.arcs[arc_idx].flow = capacity;
            let from = self.arcs[arc_idx].from;
            self.nodes[from].excess -= capacity;
        }

        self.nodes[source].excess = 0.0;
        self.nodes[sink].excess = 0.0;

        for i in 0..self.n() {
            if self.nodes[i].excess > self.tolerance {
                self.nodes[i].label = 1;
                self.label_count[1] += 1;
                self.add_to_strong_bucket(i);
            }
        }

        let n = self.n();
        self.nodes[source].label = n;
        self.nodes[sink].label = 0;
        self.label_count[0] = (n - 2) - self.label_count[1];
        self.highest_strong_label = 1;
    }

    fn add_to_strong_bucket(&mut self, node: usize) {
        let label = self.nodes[node].label;
        self.nodes[node].next = None;
        match self.strong_root_tail[label] {
            Some(tail) => {
                self.nodes[tail].next = Some(node);
                self.strong_root_tail[label] = Some(node);
            }
            None => {
                self.strong_roots[label] = Some(node);
                self.strong_root_tail[label] = Some(node);
            }
        }
    }

    fn pop_strong_bucket(&mut self, label: usize) -> Option<usize> {
        let head = self.strong_roots[label]?;
        self.strong_roots[label] = self.nodes[head].next;
        if self.strong_roots[label].is_none() {
            self.strong_root_tail[label] = None;
        }
        self.nodes[head].next = None;
        Some(head)
    }

    fn get_highest_strong_root(&mut self) -> Option<usize> {
        let mut i = self.highest_strong_label;
        while i > 0 {
            if self.strong_roots[i].is_some() {
                self.highest_strong_label = i;
                if self.label_count[i - 1] > 0 {
                    return self.pop_strong_bucket(i);
                }
                while let Some(root) = self.strong_roots[i] {
                    self.stats.gaps += 1;
                    self.strong_roots[i] = self.nodes[root].next;
                    self.nodes[root].next = None;
                    self.lift_all(root);
                }
                self.strong_root_tail[i] = None;
            }
            i -= 1;
        }

        self.strong_roots[0]?;

        while let Some(root) = self.strong_roots[0] {
            self.strong_roots[0] = self.nodes[root].next;
            self.nodes[root].next = None;
            self.nodes[root].label = 1;
            self.label_count[0] -= 1;
            self.label_count[1] += 1;
            self.stats.relabels += 1;
            self.add_to_strong_bucket(root);
        }
        self.strong_root_tail[0] = None;
        self.highest_strong_label = 1;

        self.pop_strong_bucket(1)
    }

    fn lift_all(&mut self, root: usize) {
        let n = self.n();
        self.label_count[self.nodes[root].label] -= 1;
        self.nodes[root].label = n;
        self.nodes[root].scan_pos = 0;

        let mut current = root;
        loop {
            while self.nodes[current].scan_pos < self.nodes[current].children.len() {
                let pos = self.nodes[current].scan_pos;
                let child = self.nodes[current].children[pos];
                self.nodes[current].scan_pos += 1;
                current = child;
                self.nodes[current].scan_pos = 0;
                self.label_count[self.nodes[current].label] -= 1;
                self.nodes[current].label = n;
            }
            match self.nodes[current].parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
    }

    fn add_relationship(&mut self, parent: usize, child: usize) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    fn break_relationship(&mut self, old_parent: usize, child: usize) {
        self.nodes[child].parent = None;
        let pos = self.nodes[old_parent]
            .children
            .iter()
            .position(|&c| c == child)
            .expect("child must be listed under its own parent");
        self.nodes[old_parent].children.remove(pos);
        if pos < self.nodes[old_parent].scan_pos {
            self.nodes[old_parent].scan_pos -= 1;
        }
    }

    fn merge(&mut self, weak: usize, strong: usize, new_arc: usize) {
        self.stats.mergers += 1;

        let mut current = strong;
        let mut new_parent = weak;
        let mut new_arc = new_arc;

        while let Some(old_parent) = self.nodes[current].parent {
            let old_arc = self.nodes[current].arc_to_parent;
            self.nodes[current].arc_to_parent = Some(new_arc);
            self.break_relationship(old_parent, current);
            self.add_relationship(new_parent, current);
            new_parent = current;
            current = old_parent;
            new_arc = old_arc.expect("a non-root node always has an arc to its parent");
            self.arcs[new_arc].direction = 1 - self.arcs[new_arc].direction;
        }

        self.nodes[current].arc_to_parent = Some(new_arc);
        self.add_relationship(new_parent, current);
    }

    fn push_upward(&mut self, arc_idx: usize, child: usize, parent: usize, res_cap: f64) {
        self.stats.pushes += 1;
        let child_excess = self.nodes[child].excess;
        if res_cap - child_excess >= -self.tolerance {
            self.nodes[parent].excess += child_excess;
            self.arcs[arc_idx].flow += child_excess;
            self.nodes[child].excess = 0.0;
            return;
        }
        self.arcs[arc_idx].direction = 0;
        self.nodes[parent].excess += res_cap;
        self.nodes[child].excess -= res_cap;
        self.arcs[arc_idx].flow = self.arcs[arc_idx].capacity;
        self.nodes[parent].out_of_tree.push(arc_idx);
        self.break_relationship(parent, child);
        self.add_to_strong_bucket(child);
    }

    fn push_downward(&mut self, arc_idx: usize, child: usize, parent: usize, flow: f64) {
        self.stats.pushes += 1;
        let child_excess = self.nodes[child].excess;
        if flow - child_excess >= -self.tolerance {
            self.nodes[parent].excess += child_excess;
            self.arcs[arc_idx].flow -= child_excess;
            self.nodes[child].excess = 0.0;
            return;
        }
        self.arcs[arc_idx].direction = 1;
        self.nodes[child].excess -= flow;
        self.nodes[parent].excess += flow;
        self.arcs[arc_idx].flow = 0.0;
        self.nodes[parent].out_of_tree.push(arc_idx);
        self.break_relationship(parent, child);
        self.add_to_strong_bucket(child);
    }

    fn push_excess(&mut self, strong_root: usize) {
        let mut current = strong_root;
        let mut prev_excess = 1.0_f64;

        while self.is_excess(self.nodes[current].excess) && self.nodes[current].parent.is_some() {
            let parent = self.nodes[current].parent.unwrap();
            prev_excess = self.nodes[parent].excess;
            let arc_idx = self.nodes[current]
                .arc_to_parent
                .expect("non-root node always has an arc to its parent");

            if self.arcs[arc_idx].direction == 1 {
                let res_cap = self.arcs[arc_idx].capacity - self.arcs[arc_idx].flow;
                self.push_upward(arc_idx, current, parent, res_cap);
            } else {
                let flow = self.arcs[arc_idx].flow;
                self.push_downward(arc_idx, current, parent, flow);
            }
            current = parent;
        }

        if self.nodes[current].excess > self.tolerance && prev_excess <= self.tolerance {
            self.add_to_strong_bucket(current);
        }
    }

    fn find_weak_node(&mut self, strong: usize) -> Option<(usize, usize)> {
        let size = self.nodes[strong].out_of_tree.len();
        let mut i = self.nodes[strong].next_arc;
        while i < size {
            self.stats.arc_scans += 1;
            let arc_idx = self.nodes[strong].out_of_tree[i];
            let to = self.arcs[arc_idx].to;
            let from = self.arcs[arc_idx].from;
            let weak = if self.nodes[to].label + 1 == self.highest_strong_label {
                Some(to)
            } else if self.nodes[from].label + 1 == self.highest_strong_label {
                Some(from)
            } else {
                None
            };
            if let Some(weak_node) = weak {
                self.nodes[strong].next_arc = i;
                self.nodes[strong].out_of_tree.swap_remove(i);
                return Some((weak_node, arc_idx));
            }
            i += 1;
        }
        self.nodes[strong].next_arc = size;
        None
    }

    fn check_children(&mut self, v: usize) {
        while self.nodes[v].scan_pos < self.nodes[v].children.len() {
            let child = self.nodes[v].children[self.nodes[v].scan_pos];
            if self.nodes[child].label == self.nodes[v].label {
                return;
            }
            self.nodes[v].scan_pos += 1;
        }

        self.label_count[self.nodes[v].label] -= 1;
        self.nodes[v].label += 1;
        self.label_count[self.nodes[v].label] += 1;
        self.stats.relabels += 1;
        self.nodes[v].next_arc = 0;
    }

    fn process_root(&mut self, strong_root: usize) {
        self.nodes[strong_root].scan_pos = 0;

        if let Some((weak, arc)) = self.find_weak_node(strong_root) {
            self.merge(weak, strong_root, arc);
            self.push_excess(strong_root);
            return;
        }
        self.check_children(strong_root);

        let mut strong_node = strong_root;
        loop {
            while self.nodes[strong_node].scan_pos < self.nodes[strong_node].children.len() {
                let pos = self.nodes[strong_node].scan_pos;
                let child = self.nodes[strong_node].children[pos];
                self.nodes[strong_node].scan_pos += 1;
                strong_node = child;
                self.nodes[strong_node].scan_pos = 0;

                if let Some((weak, arc)) = self.find_weak_node(strong_node) {
                    self.merge(weak, strong_node, arc);
                    self.push_excess(strong_root);
                    return;
                }
                self.check_children(strong_node);
            }

            match self.nodes[strong_node].parent {
                Some(parent) => {
                    strong_node = parent;
                    self.check_children(strong_node);
                }
                None => break,
            }
        }

        self.add_to_strong_bucket(strong_root);
        self.highest_strong_label += 1;
    }

    fn run_phase1(&mut self) {
        while let Some(root) = self.get_highest_strong_root() {
            self.process_root(root);
        }
    }

    fn source_side_label(&self, internal: usize, reversed: bool) -> bool {
        let raw = self.nodes[internal].label >= self.n();
        if reversed {
            !raw
        } else {
            raw
        }
    }
}

fn evaluate_cut(problem: &CutProblem, indicator: &[u8]) -> (f64, f64) {
    let mut cut_constant = 0.0;
    let mut cut_multiplier = 0.0;
    for arc in problem.arcs() {
        let side = |kind: NodeKind| -> bool {
            match kind {
                NodeKind::ArtificialSource => true,
                NodeKind::ArtificialSink => false,
                NodeKind::Undecided(j) => indicator[j] == 1,
            }
        };
        if side(problem.nodes()[arc.from]) && !side(problem.nodes()[arc.to]) {
            cut_constant += arc.constant;
            cut_multiplier += arc.multiplier;
        }
    }
    (cut_constant, cut_multiplier)
}

/// Solves `problem` for the minimal (`want_maximal_source = false`) or
/// maximal (`true`) source-side minimum cut, recording the result on
/// `problem` itself, and returns the work counters for this solve. See
/// spec.md section 4.3.
pub fn solve_problem(problem: &mut CutProblem, want_maximal_source: bool, tolerance: f64) -> Stats {
    let n = problem.num_original_nodes();

    if problem.num_internal_nodes() == 2 {
        let mut indicator = vec![0u8; n];
        for (j, flag) in indicator.iter_mut().enumerate() {
            if problem.source_set()[j] {
                *flag = 1;
            }
        }
        let (cut_constant, cut_multiplier) = evaluate_cut(problem, &indicator);
        problem.record_solution(indicator, cut_constant, cut_multiplier);
        return Stats::default();
    }

    let mut ctx = SolveContext::new(problem, want_maximal_source, tolerance);
    ctx.run_phase1();

    let mut indicator = vec![0u8; n];
    for (j, flag) in indicator.iter_mut().enumerate() {
        if problem.source_set()[j] {
            *flag = 1;
        } else if problem.sink_set()[j] {
            *flag = 0;
        }
    }
    for (internal, kind) in problem.nodes().iter().enumerate() {
        if let NodeKind::Undecided(j) = *kind {
            indicator[j] = ctx.source_side_label(internal, want_maximal_source) as u8;
        }
    }

    let (cut_constant, cut_multiplier) = evaluate_cut(problem, &indicator);
    problem.record_solution(indicator, cut_constant, cut_multiplier);
    ctx.stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use rstest::rstest;

    const TOL: f64 = 1e-8;

    #[test]
    fn two_node_trivial() {
        let mut g = Graph::new(2, 0, 1, 0.0, 0.0, false).unwrap();
        g.add_arc(0, 1, 5.0, 0.0).unwrap();
        let mut problem = CutProblem::seed(&g, 0.0).unwrap();
        solve_problem(&mut problem, false, TOL);
        assert_eq!(problem.indicator(), &[1, 0]);
        assert_eq!(problem.cut_value(), 5.0);
    }

    #[test]
    fn parameter_free_single_cut() {
        let mut g = Graph::new(4, 0, 3, 0.0, 0.0, false).unwrap();
        g.add_arc(0, 1, 10.0, 0.0).unwrap();
        g.add_arc(0, 2, 10.0, 0.0).unwrap();
        g.add_arc(1, 3, 5.0, 0.0).unwrap();
        g.add_arc(2, 3, 5.0, 0.0).unwrap();
        let mut problem = CutProblem::seed(&g, 0.0).unwrap();
        solve_problem(&mut problem, false, TOL);
        assert_eq!(problem.indicator(), &[1, 1, 1, 0]);
        assert_eq!(problem.cut_value(), 10.0);
    }

    #[rstest]
    #[case(false, vec![1, 1, 1, 0])]
    #[case(true, vec![1, 1, 1, 0])]
    fn minimal_and_maximal_source_set_agree_on_unique_cut(
        #[case] want_maximal: bool,
        #[case] expected: Vec<u8>,
    ) {
        let mut g = Graph::new(4, 0, 3, 0.0, 0.0, false).unwrap();
        g.add_arc(0, 1, 10.0, 0.0).unwrap();
        g.add_arc(0, 2, 10.0, 0.0).unwrap();
        g.add_arc(1, 3, 5.0, 0.0).unwrap();
        g.add_arc(2, 3, 5.0, 0.0).unwrap();
        let mut problem = CutProblem::seed(&g, 0.0).unwrap();
        solve_problem(&mut problem, want_maximal, TOL);
        assert_eq!(problem.indicator(), expected.as_slice());
    }

    #[test]
    fn flow_stays_capacity_feasible() {
        let mut g = Graph::new(4, 0, 3, 0.0, 0.0, false).unwrap();
        g.add_arc(0, 1, 10.0, 0.0).unwrap();
        g.add_arc(0, 2, 4.0, 0.0).unwrap();
        g.add_arc(1, 2, 2.0, 0.0).unwrap();
        g.add_arc(1, 3, 8.0, 0.0).unwrap();
        g.add_arc(2, 3, 6.0, 0.0).unwrap();
        let mut problem = CutProblem::seed(&g, 0.0).unwrap();
        solve_problem(&mut problem, false, TOL);
        // capacity-feasibility is an invariant on the final flow; since the
        // engine only reports the cut we check it indirectly through the
        // reported cut value matching the sum over the crossing arcs.
        let indicator = problem.indicator();
        let mut expected_value = 0.0;
        for arc in problem.arcs() {
            let side = |kind: NodeKind| match kind {
                NodeKind::ArtificialSource => true,
                NodeKind::ArtificialSink => false,
                NodeKind::Undecided(j) => indicator[j] == 1,
            };
            if side(problem.nodes()[arc.from]) && !side(problem.nodes()[arc.to]) {
                expected_value += arc.capacity;
            }
        }
        assert!((problem.cut_value() - expected_value).abs() < TOL);
    }

    #[test]
    fn two_internal_node_special_case() {
        let mut g = Graph::new(2, 0, 1, 0.0, 10.0, false).unwrap();
        g.add_arc(0, 1, 3.0, 1.0).unwrap();
        let mut parent = CutProblem::seed(&g, 0.0).unwrap();
        solve_problem(&mut parent, false, TOL);
        // already 2 internal nodes at the seed level for a 2-node graph
        assert_eq!(parent.indicator(), &[1, 0]);
        assert_eq!(parent.cut_value(), 3.0);
    }
}
