//! The thin CLI wrapper (C6): DIMACS-style text parsing, output writing,
//! argument handling, and timing, wired around the `pseudoflow-core` engine.
//! No algorithmic content lives here — see spec.md section 1's scope note.

mod cli;
mod dimacs;
mod error;

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use log::LevelFilter;

use cli::Cli;
use error::CliError;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let read_start = Instant::now();
    let graph = dimacs::parse_input(&cli.input, cli.round_negative)?;
    let read_secs = read_start.elapsed().as_secs_f64();
    log::info!(
        "read {} in {:.3}s: {} nodes, {} arcs, lambda=[{}, {}]",
        cli.input.display(),
        read_secs,
        graph.num_nodes,
        graph.num_arcs(),
        graph.lambda_low,
        graph.lambda_high
    );

    let solution = pseudoflow_core::solve(&graph)?;
    log::info!(
        "solved: {} breakpoints, {} arc scans, {} mergers, {} pushes, {} relabels, {} gaps",
        solution.breakpoints.len(),
        solution.stats.arc_scans,
        solution.stats.mergers,
        solution.stats.pushes,
        solution.stats.relabels,
        solution.stats.gaps
    );

    dimacs::write_output(&cli.output, graph.num_nodes, &solution, read_secs)?;
    log::info!("wrote {}", cli.output.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
