use std::num::NonZeroU64;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Fault;

/// Below this many photons the classification runs on the calling thread.
const PAR_THRESHOLD: usize = 1 << 16;

const USALEX_PERIOD: NonZeroU64 = match NonZeroU64::new(4000) {
    Some(p) => p,
    None => panic!("usALEX period is non-zero"),
};

/// A window inside one alternation period, given by two edges in clock ticks.
///
/// If `start < stop` the window is the open interval `(start, stop)`.
/// Otherwise it wraps around the end of the period and contains everything
/// `> start` or `< stop`. The edges themselves never belong to the window:
/// photons landing exactly on an edge are alternation transients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcitationWindow {
    pub start: u64,
    pub stop: u64,
}

impl ExcitationWindow {
    pub fn new(start: u64, stop: u64) -> Self {
        ExcitationWindow { start, stop }
    }

    pub fn wraps(&self) -> bool {
        self.start >= self.stop
    }

    /// Membership test for a value already reduced modulo the period.
    #[inline]
    pub fn contains(&self, r: u64) -> bool {
        if self.wraps() {
            r > self.start || r < self.stop
        } else {
            r > self.start && r < self.stop
        }
    }
}

impl From<(u64, u64)> for ExcitationWindow {
    fn from(edges: (u64, u64)) -> Self {
        ExcitationWindow::new(edges.0, edges.1)
    }
}

/// Alternation period length plus the donor and acceptor excitation windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternationPeriod {
    pub length: NonZeroU64,
    pub donor: ExcitationWindow,
    pub acceptor: ExcitationWindow,
}

impl AlternationPeriod {
    pub fn new(length: u64, donor: ExcitationWindow, acceptor: ExcitationWindow) -> Result<Self, Fault> {
        let length = NonZeroU64::new(length).ok_or(Fault::ZeroPeriod)?;
        Ok(AlternationPeriod { length, donor, acceptor })
    }

    pub fn donor_mask(&self, times: &[u64]) -> Vec<bool> {
        classify(times, self.length, self.donor)
    }

    pub fn acceptor_mask(&self, times: &[u64]) -> Vec<bool> {
        classify(times, self.length, self.acceptor)
    }
}

impl Default for AlternationPeriod {
    fn default() -> Self {
        AlternationPeriod {
            length: USALEX_PERIOD,
            donor: ExcitationWindow::new(2850, 580),
            acceptor: ExcitationWindow::new(930, 2580),
        }
    }
}

/// Mark the photons whose arrival time, reduced modulo `period`, falls in `window`.
pub fn classify(times: &[u64], period: NonZeroU64, window: ExcitationWindow) -> Vec<bool> {
    let period = period.get();
    if times.len() < PAR_THRESHOLD {
        times.iter().map(|&t| window.contains(t % period)).collect()
    } else {
        times.par_iter().map(|&t| window.contains(t % period)).collect()
    }
}

/// Histogram of `t mod period` over `bins` equal-width bins spanning `[0, period)`.
///
/// This is what one looks at before choosing the window edges.
pub fn alternation_histogram(times: &[u64], period: NonZeroU64, bins: usize) -> Vec<u64> {
    if bins == 0 {
        return Vec::new();
    }
    let period = period.get();
    let mut hist = vec![0u64; bins];
    for &t in times {
        let r = t % period;
        let bin = ((r as u128 * bins as u128) / period as u128) as usize;
        hist[bin] += 1;
    }
    hist
}
