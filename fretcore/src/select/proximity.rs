//! Selections on the time separation between consecutive bursts.

use serde::{Deserialize, Serialize};

use crate::data::dataset::Dataset;
use crate::error::Fault;
use crate::select::{ms_to_ticks, BurstMask, BurstPredicate};

/// `close[i]` flags the pair (i, i + 1); mark the first burst of each flagged pair.
fn first_of_pair(close: &[bool], n_bursts: usize) -> BurstMask {
    let mut mask = vec![false; n_bursts];
    for (i, c) in close.iter().enumerate() {
        mask[i] = *c;
    }
    mask
}

/// Mark the second burst of each flagged pair.
fn second_of_pair(close: &[bool], n_bursts: usize) -> BurstMask {
    let mut mask = vec![false; n_bursts];
    for (i, c) in close.iter().enumerate() {
        mask[i + 1] = *c;
    }
    mask
}

fn gaps_within(d: &Dataset, ich: usize, max_gap: f64) -> Result<(Vec<bool>, usize), Fault> {
    let bursts = d.bursts(ich)?;
    let close = bursts.separation().iter().map(|g| *g as f64 <= max_gap).collect();
    Ok((close, bursts.len()))
}

/// Bursts separated by at least `th` ms from both the previous and the next burst.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Single {
    pub th: f64,
}

impl Default for Single {
    fn default() -> Self {
        Single { th: 1.0 }
    }
}

impl BurstPredicate for Single {
    type Output = BurstMask;

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let bursts = d.bursts(ich)?;
        let th = ms_to_ticks(self.th, d.clk_p());
        let far: Vec<bool> = bursts.separation().iter().map(|g| *g as f64 >= th).collect();
        let after = first_of_pair(&far, bursts.len());
        let before = second_of_pair(&far, bursts.len());
        Ok(after.iter().zip(before.iter()).map(|(a, b)| *a && *b).collect())
    }
}

/// First burst of each overlapping or touching pair.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attached;

/// Second burst of each overlapping or touching pair.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attached2;

impl BurstPredicate for Attached {
    type Output = BurstMask;

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let (close, n) = gaps_within(d, ich, 0.0)?;
        Ok(first_of_pair(&close, n))
    }
}

impl BurstPredicate for Attached2 {
    type Output = BurstMask;

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let (close, n) = gaps_within(d, ich, 0.0)?;
        Ok(second_of_pair(&close, n))
    }
}

/// First burst of each pair closer than `ms` milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nearby {
    pub ms: f64,
}

impl Default for Nearby {
    fn default() -> Self {
        Nearby { ms: 0.2 }
    }
}

/// Second burst of each pair closer than `ms` milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nearby2 {
    pub ms: f64,
}

impl Default for Nearby2 {
    fn default() -> Self {
        Nearby2 { ms: 0.2 }
    }
}

impl BurstPredicate for Nearby {
    type Output = BurstMask;

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let (close, n) = gaps_within(d, ich, ms_to_ticks(self.ms, d.clk_p()))?;
        Ok(first_of_pair(&close, n))
    }
}

impl BurstPredicate for Nearby2 {
    type Output = BurstMask;

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let (close, n) = gaps_within(d, ich, ms_to_ticks(self.ms, d.clk_p()))?;
        Ok(second_of_pair(&close, n))
    }
}
