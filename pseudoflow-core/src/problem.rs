use std::collections::HashMap;

use crate::error::PseudoflowResult;
use crate::graph::{evaluate_capacity, Graph};

/// Internal index 0 is always the artificial source, index 1 is always the
/// artificial sink (the C2 sentinel convention from spec.md section 4.2).
pub const ARTIFICIAL_SOURCE: usize = 0;
pub const ARTIFICIAL_SINK: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    ArtificialSource,
    ArtificialSink,
    /// Carries the node's original index in the seed graph.
    Undecided(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProblemArc {
    pub from: usize,
    pub to: usize,
    pub constant: f64,
    pub multiplier: f64,
    pub capacity: f64,
}

/// A contracted subproblem (C2): the node/arc lists the engine solves
/// against, the frozen source/sink partitions inherited from an ancestor
/// call, and — once solved — the optimal indicator and affine cut value.
#[derive(Debug, Clone)]
pub struct CutProblem {
    lambda: f64,
    num_original_nodes: usize,
    nodes: Vec<NodeKind>,
    arcs: Vec<ProblemArc>,
    source_set: Vec<bool>,
    sink_set: Vec<bool>,
    solved: bool,
    optimal_source_set_indicator: Vec<u8>,
    cut_constant: f64,
    cut_multiplier: f64,
}

impl CutProblem {
    /// Seeds a fresh instance directly from the input graph: one undecided
    /// node per non-source/non-sink node, every arc copied unchanged with
    /// its endpoints remapped to internal indices.
    pub fn seed(graph: &Graph, lambda: f64) -> PseudoflowResult<Self> {
        let n = graph.num_nodes;
        let mut nodes = vec![NodeKind::ArtificialSource, NodeKind::ArtificialSink];
        let mut orig_to_internal = vec![None; n];
        orig_to_internal[graph.source] = Some(ARTIFICIAL_SOURCE);
        orig_to_internal[graph.sink] = Some(ARTIFICIAL_SINK);
        for j in 0..n {
            if j == graph.source || j == graph.sink {
                continue;
            }
            orig_to_internal[j] = Some(nodes.len());
            nodes.push(NodeKind::Undecided(j));
        }

        let mut arcs = Vec::with_capacity(graph.num_arcs());
        for arc in graph.arcs() {
            let capacity = evaluate_capacity(
                arc.constant,
                arc.multiplier,
                lambda,
                graph.round_negative_capacity,
            )?;
            arcs.push(ProblemArc {
                from: orig_to_internal[arc.from].unwrap(),
                to: orig_to_internal[arc.to].unwrap(),
                constant: arc.constant,
                multiplier: arc.multiplier,
                capacity,
            });
        }

        let mut source_set = vec![false; n];
        let mut sink_set = vec![false; n];
        source_set[graph.source] = true;
        sink_set[graph.sink] = true;

        Ok(CutProblem {
            lambda,
            num_original_nodes: n,
            nodes,
            arcs,
            source_set,
            sink_set,
            solved: false,
            optimal_source_set_indicator: Vec::new(),
            cut_constant: 0.0,
            cut_multiplier: 0.0,
        })
    }

    /// Contracts `parent` at `lambda` using the optimal indicators of its
    /// low-lambda (minimal source set) and high-lambda (maximal source set)
    /// solves, per spec.md section 4.2.
    pub fn contract(
        parent: &CutProblem,
        low_ind: &[u8],
        high_ind: &[u8],
        lambda: f64,
        round_negative_capacity: bool,
    ) -> PseudoflowResult<Self> {
        let n = parent.num_original_nodes;
        let mut source_set = parent.source_set.clone();
        let mut sink_set = parent.sink_set.clone();
        let mut undecided = Vec::new();

        for node in &parent.nodes {
            if let NodeKind::Undecided(j) = *node {
                if low_ind[j] == 1 {
                    source_set[j] = true;
                } else if high_ind[j] == 0 {
                    sink_set[j] = true;
                } else {
                    undecided.push(j);
                }
            }
        }

        let mut nodes = vec![NodeKind::ArtificialSource, NodeKind::ArtificialSink];
        let mut orig_to_internal = vec![None; n];
        for j in 0..n {
            if source_set[j] {
                orig_to_internal[j] = Some(ARTIFICIAL_SOURCE);
            } else if sink_set[j] {
                orig_to_internal[j] = Some(ARTIFICIAL_SINK);
            }
        }
        for &j in &undecided {
            orig_to_internal[j] = Some(nodes.len());
            nodes.push(NodeKind::Undecided(j));
        }

        // Maps a parent-problem node to its internal index in the contracted
        // instance: artificial source/sink and every now-decided node all
        // collapse onto 0 or 1; undecided nodes keep a private index.
        let new_internal_index = |kind: NodeKind| -> usize {
            match kind {
                NodeKind::ArtificialSource => ARTIFICIAL_SOURCE,
                NodeKind::ArtificialSink => ARTIFICIAL_SINK,
                NodeKind::Undecided(j) => orig_to_internal[j].unwrap(),
            }
        };

        // Arcs whose tail collapses onto the artificial source (including a
        // direct source-to-sink arc, keyed here by ARTIFICIAL_SINK) merge by
        // target; arcs whose head collapses onto the artificial sink merge
        // by tail; everything else between two undecided nodes is interior.
        let mut source_merge: HashMap<usize, (f64, f64)> = HashMap::new();
        let mut sink_merge: HashMap<usize, (f64, f64)> = HashMap::new();
        let mut interior: Vec<(usize, usize, f64, f64)> = Vec::new();

        for arc in &parent.arcs {
            let nf = new_internal_index(parent.nodes[arc.from]);
            let nt = new_internal_index(parent.nodes[arc.to]);
            if nf == nt || nt == ARTIFICIAL_SOURCE || nf == ARTIFICIAL_SINK {
                continue;
            }
            if nf == ARTIFICIAL_SOURCE {
                let entry = source_merge.entry(nt).or_insert((0.0, 0.0));
                entry.0 += arc.constant;
                entry.1 += arc.multiplier;
            } else if nt == ARTIFICIAL_SINK {
                let entry = sink_merge.entry(nf).or_insert((0.0, 0.0));
                entry.0 += arc.constant;
                entry.1 += arc.multiplier;
            } else {
                interior.push((nf, nt, arc.constant, arc.multiplier));
            }
        }

        let mut arcs = Vec::with_capacity(source_merge.len() + sink_merge.len() + interior.len());
        for (to, (constant, multiplier)) in source_merge {
            let capacity = evaluate_capacity(constant, multiplier, lambda, round_negative_capacity)?;
            arcs.push(ProblemArc {
                from: ARTIFICIAL_SOURCE,
                to,
                constant,
                multiplier,
                capacity,
            });
        }
        for (from, (constant, multiplier)) in sink_merge {
            let capacity = evaluate_capacity(constant, multiplier, lambda, round_negative_capacity)?;
            arcs.push(ProblemArc {
                from,
                to: ARTIFICIAL_SINK,
                constant,
                multiplier,
                capacity,
            });
        }
        for (from, to, constant, multiplier) in interior {
            let capacity = evaluate_capacity(constant, multiplier, lambda, round_negative_capacity)?;
            arcs.push(ProblemArc {
                from,
                to,
                constant,
                multiplier,
                capacity,
            });
        }

        Ok(CutProblem {
            lambda,
            num_original_nodes: n,
            nodes,
            arcs,
            source_set,
            sink_set,
            solved: false,
            optimal_source_set_indicator: Vec::new(),
            cut_constant: 0.0,
            cut_multiplier: 0.0,
        })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn num_original_nodes(&self) -> usize {
        self.num_original_nodes
    }

    pub fn num_internal_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[NodeKind] {
        &self.nodes
    }

    pub fn arcs(&self) -> &[ProblemArc] {
        &self.arcs
    }

    pub fn source_set(&self) -> &[bool] {
        &self.source_set
    }

    pub fn sink_set(&self) -> &[bool] {
        &self.sink_set
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn indicator(&self) -> &[u8] {
        debug_assert!(self.solved, "indicator read before problem was solved");
        &self.optimal_source_set_indicator
    }

    pub fn cut_constant(&self) -> f64 {
        self.cut_constant
    }

    pub fn cut_multiplier(&self) -> f64 {
        self.cut_multiplier
    }

    pub fn cut_value(&self) -> f64 {
        self.cut_constant + self.cut_multiplier * self.lambda
    }

    /// Records the engine's solution: the indicator over original indices
    /// and the affine cut value's constant/multiplier parts.
    pub fn record_solution(
        &mut self,
        indicator: Vec<u8>,
        cut_constant: f64,
        cut_multiplier: f64,
    ) {
        debug_assert_eq!(indicator.len(), self.num_original_nodes);
        self.optimal_source_set_indicator = indicator;
        self.cut_constant = cut_constant;
        self.cut_multiplier = cut_multiplier;
        self.solved = true;
    }
}
