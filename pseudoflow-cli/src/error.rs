use thiserror::Error;

/// Failure modes specific to the DIMACS-style text boundary (C6). Wraps
/// [`pseudoflow_core::PseudoflowError`] for anything that is really a graph
/// construction or solving failure, and adds the format-level diagnostics
/// the original `readData`/`writeOutput` print before calling `exit(0)`.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input has no 'p' problem line")]
    MissingProblemLine,

    #[error("malformed 'p' problem line: {0:?}")]
    MalformedProblemLine(String),

    #[error("malformed 'n' node line: {0:?}")]
    MalformedNodeLine(String),

    #[error("malformed 'a' arc line: {0:?}")]
    MalformedArcLine(String),

    #[error("node type {0:?} is unknown (expected 's' or 't')")]
    UnknownNodeType(char),

    #[error("source is already defined")]
    DuplicateSource,

    #[error("sink is already defined")]
    DuplicateSink,

    #[error("source and sink need to be defined before arcs are defined")]
    ArcsBeforeTerminals,

    #[error("source node is not assigned")]
    MissingSource,

    #[error("sink node is not assigned")]
    MissingSink,

    #[error("incorrect number of arcs specified: declared {declared}, found {actual}")]
    ArcCountMismatch { declared: usize, actual: usize },

    #[error(transparent)]
    Solve(#[from] pseudoflow_core::PseudoflowError),
}

pub type CliResult<T> = Result<T, CliError>;
