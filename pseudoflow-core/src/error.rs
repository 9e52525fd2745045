use thiserror::Error;

/// Failure modes of the parametric pseudoflow solver.
///
/// Every variant is either an input-validation error (raised while building
/// a [`crate::graph::Graph`]) or a numeric error (raised while evaluating an
/// affine capacity). Nothing here is recoverable by the engine itself; a
/// caller decides whether to abort or report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PseudoflowError {
    #[error("node index {index} out of range (num_nodes = {num_nodes})")]
    InvalidNodeIndex { index: usize, num_nodes: usize },

    #[error("self-loop at node {node} is not allowed")]
    SelfLoop { node: usize },

    #[error("source and sink must be distinct (both are {node})")]
    SourceEqualsSink { node: usize },

    #[error("source node is not assigned")]
    MissingSource,

    #[error("sink node is not assigned")]
    MissingSink,

    #[error("source is already defined")]
    DuplicateSource,

    #[error("sink is already defined")]
    DuplicateSink,

    #[error("arc ({from} -> {to}) has multiplier {multiplier} violating the sign rule for its endpoints")]
    SignViolation {
        from: usize,
        to: usize,
        multiplier: f64,
    },

    #[error("incorrect number of arcs specified: declared {declared}, found {actual}")]
    ArcCountMismatch { declared: usize, actual: usize },

    #[error(
        "negative capacity ({constant} + {multiplier} * {lambda}) at lambda = {lambda}; set round_negative_capacity to round it to 0"
    )]
    NegativeCapacity {
        lambda: f64,
        constant: f64,
        multiplier: f64,
    },
}

pub type PseudoflowResult<T> = Result<T, PseudoflowError>;
