use crate::error::{PseudoflowError, PseudoflowResult};
use crate::TOLERANCE;

/// An arc whose capacity is an affine function of the parameter lambda:
/// `capacity(lambda) = constant + multiplier * lambda`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineArc {
    pub from: usize,
    pub to: usize,
    pub constant: f64,
    pub multiplier: f64,
}

impl AffineArc {
    #[inline]
    pub fn capacity_at(&self, lambda: f64) -> f64 {
        self.constant + self.multiplier * lambda
    }
}

/// Evaluates an affine capacity at `lambda`, applying the rounding/tolerance
/// policy from spec.md section 3: a negative result is clamped to 0 if
/// `round_negative_capacity` is set or the value lies within `TOLERANCE` of
/// zero, and is a fatal error otherwise.
pub fn evaluate_capacity(
    constant: f64,
    multiplier: f64,
    lambda: f64,
    round_negative_capacity: bool,
) -> PseudoflowResult<f64> {
    let capacity = constant + multiplier * lambda;
    if capacity < 0.0 {
        if round_negative_capacity || capacity > -TOLERANCE {
            return Ok(0.0);
        }
        return Err(PseudoflowError::NegativeCapacity {
            lambda,
            constant,
            multiplier,
        });
    }
    Ok(capacity)
}

/// The immutable input graph (C1): nodes, affine arcs, source/sink, the
/// lambda range to sweep, and the rounding policy for negative capacities.
///
/// Arcs into the source and out of the sink never contribute to any s-t cut
/// and are dropped silently at construction time, per spec.md section 3.
#[derive(Debug, Clone)]
pub struct Graph {
    pub num_nodes: usize,
    pub source: usize,
    pub sink: usize,
    pub lambda_low: f64,
    pub lambda_high: f64,
    pub round_negative_capacity: bool,
    arcs: Vec<AffineArc>,
}

impl Graph {
    pub fn new(
        num_nodes: usize,
        source: usize,
        sink: usize,
        lambda_low: f64,
        lambda_high: f64,
        round_negative_capacity: bool,
    ) -> PseudoflowResult<Self> {
        if source >= num_nodes {
            return Err(PseudoflowError::InvalidNodeIndex {
                index: source,
                num_nodes,
            });
        }
        if sink >= num_nodes {
            return Err(PseudoflowError::InvalidNodeIndex {
                index: sink,
                num_nodes,
            });
        }
        if source == sink {
            return Err(PseudoflowError::SourceEqualsSink { node: source });
        }

        Ok(Graph {
            num_nodes,
            source,
            sink,
            lambda_low,
            lambda_high,
            round_negative_capacity,
            arcs: Vec::new(),
        })
    }

    /// Adds an arc, validating node range, self-loops, and the sign rule on
    /// the lambda multiplier. Arcs into `source` or out of `sink` are
    /// accepted but silently dropped (they never cross any s-t cut).
    pub fn add_arc(
        &mut self,
        from: usize,
        to: usize,
        constant: f64,
        multiplier: f64,
    ) -> PseudoflowResult<()> {
        if from >= self.num_nodes {
            return Err(PseudoflowError::InvalidNodeIndex {
                index: from,
                num_nodes: self.num_nodes,
            });
        }
        if to >= self.num_nodes {
            return Err(PseudoflowError::InvalidNodeIndex {
                index: to,
                num_nodes: self.num_nodes,
            });
        }
        if from == to {
            return Err(PseudoflowError::SelfLoop { node: from });
        }
        if multiplier > 0.0 && from != self.source {
            return Err(PseudoflowError::SignViolation {
                from,
                to,
                multiplier,
            });
        }
        if multiplier < 0.0 && to != self.sink {
            return Err(PseudoflowError::SignViolation {
                from,
                to,
                multiplier,
            });
        }
        // An arc that is simultaneously source-adjacent and sink-adjacent
        // cannot be both non-decreasing and non-increasing in lambda unless
        // it is constant. See DESIGN.md for this resolved ambiguity.
        if from == self.source && to == self.sink && multiplier != 0.0 {
            return Err(PseudoflowError::SignViolation {
                from,
                to,
                multiplier,
            });
        }

        if to == self.source || from == self.sink {
            log::debug!("dropping arc ({from} -> {to}): incident into source or out of sink");
            return Ok(());
        }

        self.arcs.push(AffineArc {
            from,
            to,
            constant,
            multiplier,
        });
        Ok(())
    }

    pub fn arcs(&self) -> &[AffineArc] {
        &self.arcs
    }

    pub fn num_arcs(&self) -> usize {
        self.arcs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_source() {
        let err = Graph::new(3, 5, 1, 0.0, 0.0, false).unwrap_err();
        assert_eq!(
            err,
            PseudoflowError::InvalidNodeIndex {
                index: 5,
                num_nodes: 3
            }
        );
    }

    #[test]
    fn rejects_source_equals_sink() {
        let err = Graph::new(3, 1, 1, 0.0, 0.0, false).unwrap_err();
        assert_eq!(err, PseudoflowError::SourceEqualsSink { node: 1 });
    }

    #[test]
    fn rejects_self_loop() {
        let mut g = Graph::new(3, 0, 2, 0.0, 0.0, false).unwrap();
        let err = g.add_arc(1, 1, 5.0, 0.0).unwrap_err();
        assert_eq!(err, PseudoflowError::SelfLoop { node: 1 });
    }

    #[test]
    fn rejects_positive_multiplier_off_source() {
        let mut g = Graph::new(3, 0, 2, 0.0, 10.0, false).unwrap();
        let err = g.add_arc(1, 2, 1.0, 1.0).unwrap_err();
        assert!(matches!(err, PseudoflowError::SignViolation { .. }));
    }

    #[test]
    fn rejects_negative_multiplier_off_sink() {
        let mut g = Graph::new(3, 0, 2, 0.0, 10.0, false).unwrap();
        let err = g.add_arc(0, 1, 1.0, -1.0).unwrap_err();
        assert!(matches!(err, PseudoflowError::SignViolation { .. }));
    }

    #[test]
    fn rejects_ambiguous_source_sink_arc() {
        // scenario 6 from spec.md section 8: from = s, to = t, multiplier = -1
        let mut g = Graph::new(2, 0, 1, 0.0, 10.0, false).unwrap();
        let err = g.add_arc(0, 1, 5.0, -1.0).unwrap_err();
        assert!(matches!(err, PseudoflowError::SignViolation { .. }));
    }

    #[test]
    fn allows_constant_source_sink_arc() {
        let mut g = Graph::new(2, 0, 1, 0.0, 10.0, false).unwrap();
        g.add_arc(0, 1, 5.0, 0.0).unwrap();
        assert_eq!(g.num_arcs(), 1);
    }

    #[test]
    fn drops_arcs_into_source_or_out_of_sink() {
        let mut g = Graph::new(3, 0, 2, 0.0, 10.0, false).unwrap();
        g.add_arc(1, 0, 3.0, 0.0).unwrap(); // into source
        g.add_arc(2, 1, 3.0, 0.0).unwrap(); // out of sink
        assert_eq!(g.num_arcs(), 0);
    }

    #[test]
    fn rounds_negative_capacity_when_flagged() {
        assert_eq!(evaluate_capacity(0.0, -1.0, 2.0, true).unwrap(), 0.0);
    }

    #[test]
    fn rounds_negative_capacity_within_tolerance() {
        assert_eq!(evaluate_capacity(0.0, -1e-10, 1.0, false).unwrap(), 0.0);
    }

    #[test]
    fn rejects_negative_capacity_without_rounding() {
        let err = evaluate_capacity(0.0, -1.0, 2.0, false).unwrap_err();
        assert!(matches!(err, PseudoflowError::NegativeCapacity { .. }));
    }
}
