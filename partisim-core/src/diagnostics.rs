//! Step reports and anomaly bookkeeping
//!
//! Numerical problems inside a step are repaired where they happen and
//! only surface here, as counters a caller can inspect or log.

use std::fmt;
use std::ops::AddAssign;

/// What a single physics step did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub contacts: usize,
    pub wall_hits: usize,
    /// Particles restored to their pre-step state after going non-finite
    pub repaired: usize,
    /// Pairs separated along the fallback axis because their centers coincided
    pub coincident: usize,
}

impl StepReport {
    pub fn has_anomalies(&self) -> bool {
        self.repaired > 0 || self.coincident > 0
    }
}

/// Running totals across the lifetime of a simulation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnomalyCounters {
    pub steps: u64,
    pub contacts: u64,
    pub repaired: u64,
    pub coincident: u64,
}

impl AnomalyCounters {
    pub fn total_anomalies(&self) -> u64 {
        self.repaired + self.coincident
    }
}

impl AddAssign<StepReport> for AnomalyCounters {
    fn add_assign(&mut self, report: StepReport) {
        self.steps += 1;
        self.contacts += report.contacts as u64;
        self.repaired += report.repaired as u64;
        self.coincident += report.coincident as u64;
    }
}

impl fmt::Display for AnomalyCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} steps, {} contacts, {} repaired particles, {} coincident pairs",
            self.steps, self.contacts, self.repaired, self.coincident
        )
    }
}
