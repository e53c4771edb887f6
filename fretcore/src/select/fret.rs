use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::algorithm::background::binomial_ppf;
use crate::data::dataset::Dataset;
use crate::error::Fault;
use crate::select::{BurstMask, BurstPredicate};

/// Bursts whose acceptor counts are compatible with a FRET efficiency of at least `f`.
///
/// With `n = round(nd + na)` photons, a burst at efficiency `f` has
/// `na ~ Binomial(n, f)`. A burst is kept when `na` exceeds the `p_th`
/// quantile of that distribution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FretValue {
    pub f: f64,
    pub p_th: f64,
}

impl Default for FretValue {
    fn default() -> Self {
        FretValue { f: 0.5, p_th: 0.01 }
    }
}

impl BurstPredicate for FretValue {
    type Output = BurstMask;

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let bursts = d.bursts(ich)?;
        let sizes: Vec<u64> = bursts
            .nd
            .iter()
            .zip(bursts.na.iter())
            .map(|(nd, na)| (nd + na).round().max(0.0) as u64)
            .collect();

        // one quantile per distinct burst size
        let min_accept: HashMap<u64, f64> = sizes
            .iter()
            .copied()
            .unique()
            .map(|n| (n, binomial_ppf(n, self.f, self.p_th)))
            .collect();

        Ok(sizes
            .iter()
            .zip(bursts.na.iter())
            .map(|(n, na)| min_accept.get(n).is_some_and(|k| *na > *k))
            .collect())
    }
}

/// Bursts usable for a second bleed-through fit: `na <= 2 * bt * nd`.
///
/// `bt` holds one bleed-through coefficient per channel and has no default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForBtFit {
    pub bt: Option<Vec<f64>>,
}

impl BurstPredicate for ForBtFit {
    type Output = (BurstMask, String);

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let bt = self.bt.as_ref().ok_or(Fault::MissingParameter("bt"))?;
        if bt.len() != d.nch() {
            return Err(Fault::ThresholdChannelMismatch { name: "bt", nch: d.nch(), found: bt.len() });
        }
        let bursts = d.bursts(ich)?;
        let bt = bt[ich];
        let mask = bursts
            .na
            .iter()
            .zip(bursts.nd.iter())
            .map(|(na, nd)| *na <= 2.0 * bt * nd)
            .collect();
        Ok((mask, String::new()))
    }
}
