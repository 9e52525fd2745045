//! The DIMACS-style text boundary (C6): line-oriented input parsing and
//! output writing, exactly as spec.md section 6 describes. Neither format
//! is known to `pseudoflow-core`; everything here lives at the process edge.

use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use pseudoflow_core::{Graph, Solution};

use crate::error::{CliError, CliResult};

struct Header {
    num_nodes: usize,
    num_arcs: usize,
    lambda_low: f64,
    lambda_high: f64,
    round_negative_capacity: bool,
}

/// Parses a DIMACS-style input file into a [`Graph`], applying `round_override`
/// (the CLI's `--round-negative` flag) on top of the header's own rounding
/// flag.
///
/// Grammar (spec.md section 6):
/// - `c ...`            comment, ignored
/// - `p N M lo hi r`    problem line: node/arc counts, lambda range, rounding flag
/// - `n i s` / `n i t`  designates node `i` as source/sink, exactly once each
/// - `a u v c m`        an arc `u -> v` with capacity `c + m*lambda`
///
/// `n` lines must appear before any `a` line (mirroring the reference
/// `readData`'s "source and sink need to be defined before arcs" check), and
/// the number of `a` lines read must equal the declared `M`.
pub fn parse_input(path: &Path, round_override: bool) -> CliResult<Graph> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut header: Option<Header> = None;
    let mut source: Option<usize> = None;
    let mut sink: Option<usize> = None;
    let mut graph: Option<Graph> = None;
    let mut arcs_read = 0usize;

    for line in reader.lines() {
        let line = line?;
        let tag = match line.trim_start().chars().next() {
            Some(c) => c,
            None => continue,
        };

        match tag {
            'c' => continue,
            'p' => {
                let fields: Vec<&str> = line.split_whitespace().collect();
                if fields.len() != 6 {
                    return Err(CliError::MalformedProblemLine(line));
                }
                let parse_err = || CliError::MalformedProblemLine(line.clone());
                let num_nodes: usize = fields[1].parse().map_err(|_| parse_err())?;
                let num_arcs: usize = fields[2].parse().map_err(|_| parse_err())?;
                let lambda_low: f64 = fields[3].parse().map_err(|_| parse_err())?;
                let lambda_high: f64 = fields[4].parse().map_err(|_| parse_err())?;
                let header_round: i32 = fields[5].parse().map_err(|_| parse_err())?;

                log::debug!(
                    "problem line: N={num_nodes} M={num_arcs} lambda=[{lambda_low}, {lambda_high}] round={header_round}"
                );
                header = Some(Header {
                    num_nodes,
                    num_arcs,
                    lambda_low,
                    lambda_high,
                    round_negative_capacity: round_override || header_round != 0,
                });
            }
            'n' => {
                let h = header.as_ref().ok_or(CliError::MissingProblemLine)?;
                let fields: Vec<&str> = line.split_whitespace().collect();
                if fields.len() != 3 || fields[2].len() != 1 {
                    return Err(CliError::MalformedNodeLine(line));
                }
                let node: usize = fields[1]
                    .parse()
                    .map_err(|_| CliError::MalformedNodeLine(line.clone()))?;
                match fields[2].chars().next().unwrap() {
                    's' => {
                        if source.is_some() {
                            return Err(CliError::DuplicateSource);
                        }
                        source = Some(node);
                    }
                    't' => {
                        if sink.is_some() {
                            return Err(CliError::DuplicateSink);
                        }
                        sink = Some(node);
                    }
                    other => return Err(CliError::UnknownNodeType(other)),
                }
                if let (Some(s), Some(t)) = (source, sink) {
                    graph = Some(Graph::new(
                        h.num_nodes,
                        s,
                        t,
                        h.lambda_low,
                        h.lambda_high,
                        h.round_negative_capacity,
                    )?);
                }
            }
            'a' => {
                let fields: Vec<&str> = line.split_whitespace().collect();
                if fields.len() != 5 {
                    return Err(CliError::MalformedArcLine(line));
                }
                let parse_err = || CliError::MalformedArcLine(line.clone());
                let from: usize = fields[1].parse().map_err(|_| parse_err())?;
                let to: usize = fields[2].parse().map_err(|_| parse_err())?;
                let constant: f64 = fields[3].parse().map_err(|_| parse_err())?;
                let multiplier: f64 = fields[4].parse().map_err(|_| parse_err())?;

                graph
                    .as_mut()
                    .ok_or(CliError::ArcsBeforeTerminals)?
                    .add_arc(from, to, constant, multiplier)?;
                arcs_read += 1;
            }
            _ => continue,
        }
    }

    let declared_arcs = header.ok_or(CliError::MissingProblemLine)?.num_arcs;
    if source.is_none() {
        return Err(CliError::MissingSource);
    }
    if sink.is_none() {
        return Err(CliError::MissingSink);
    }
    if arcs_read != declared_arcs {
        return Err(CliError::ArcCountMismatch {
            declared: declared_arcs,
            actual: arcs_read,
        });
    }

    Ok(graph.expect("source and sink assigned implies graph was built"))
}

/// Writes the solution in the DIMACS-style output format from spec.md
/// section 6, given the three wall-clock timings the CLI measured around
/// its own read/solve calls.
pub fn write_output(
    path: &Path,
    num_nodes: usize,
    solution: &Solution,
    read_secs: f64,
) -> CliResult<()> {
    let file = std::fs::File::create(path)?;
    let mut w = std::io::BufWriter::new(file);

    writeln!(
        w,
        "t {:.3} {:.3} {:.3}",
        read_secs,
        solution.timings.init.as_secs_f64(),
        solution.timings.solve.as_secs_f64()
    )?;
    writeln!(
        w,
        "s {} {} {} {} {}",
        solution.stats.arc_scans,
        solution.stats.mergers,
        solution.stats.pushes,
        solution.stats.relabels,
        solution.stats.gaps
    )?;

    let k = solution.breakpoints.len();
    writeln!(w, "p {k}")?;

    write!(w, "l")?;
    for lambda in &solution.breakpoints {
        write!(w, " {lambda:.12}")?;
    }
    writeln!(w)?;

    for i in 0..num_nodes {
        write!(w, "n {i}")?;
        for row in &solution.indicators {
            write!(w, " {}", row[i])?;
        }
        writeln!(w)?;
    }

    Ok(())
}
