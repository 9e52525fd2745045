use std::path::PathBuf;

use clap::Parser;

/// Parametric s-t minimum cut via Hochbaum's Pseudoflow (HPF).
///
/// Reads a DIMACS-style input file, sweeps lambda over the declared range,
/// and writes the breakpoint/indicator sequence to the output file.
#[derive(Debug, Parser)]
#[command(name = "hpf", version, about)]
pub struct Cli {
    /// Path to the DIMACS-style input file.
    pub input: PathBuf,

    /// Path to write the output file to.
    pub output: PathBuf,

    /// Force negative evaluated capacities to round to 0, overriding the
    /// input file's own rounding flag.
    #[arg(long = "round-negative")]
    pub round_negative: bool,

    /// Raise logging verbosity; repeat for more (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
