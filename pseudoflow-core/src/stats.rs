use std::time::Duration;

/// Algorithmic work counters accumulated across every [`crate::problem::CutProblem`]
/// solved while producing a [`crate::Solution`] (spec.md section 4.6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub arc_scans: u64,
    pub mergers: u64,
    pub pushes: u64,
    pub relabels: u64,
    pub gaps: u64,
}

impl Stats {
    pub fn merge(&mut self, other: &Stats) {
        self.arc_scans += other.arc_scans;
        self.mergers += other.mergers;
        self.pushes += other.pushes;
        self.relabels += other.relabels;
        self.gaps += other.gaps;
    }
}

/// Wall-clock breakdown of a [`crate::solve`] call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timings {
    pub init: Duration,
    pub solve: Duration,
}
