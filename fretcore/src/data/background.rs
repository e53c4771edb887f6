use serde::{Deserialize, Serialize};

use crate::error::Fault;

/// Background rates of one channel, one value per period bin (counts/s).
///
/// `bg*` are the rates used for the deterministic `F x background`
/// selections, `rate_*` the ones fed to the Poisson model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub bg: Vec<f64>,
    pub bg_dd: Vec<f64>,
    pub bg_ad: Vec<f64>,
    pub rate_m: Vec<f64>,
    pub rate_dd: Vec<f64>,
    pub rate_ad: Vec<f64>,
}

impl Background {
    /// Same rate in every bin, for every stream.
    pub fn uniform(rate: f64, bins: usize) -> Self {
        let v = vec![rate; bins];
        Background {
            bg: v.clone(),
            bg_dd: v.clone(),
            bg_ad: v.clone(),
            rate_m: v.clone(),
            rate_dd: v.clone(),
            rate_ad: v,
        }
    }

    pub fn bins(&self) -> usize {
        self.bg.len()
    }

    pub fn validate(&self) -> Result<(), Fault> {
        let n = self.bins();
        Fault::check_len("bg_dd", n, self.bg_dd.len())?;
        Fault::check_len("bg_ad", n, self.bg_ad.len())?;
        Fault::check_len("rate_m", n, self.rate_m.len())?;
        Fault::check_len("rate_dd", n, self.rate_dd.len())?;
        Fault::check_len("rate_ad", n, self.rate_ad.len())
    }
}

/// Acceptor-excitation background, alternating excitation only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AlexBackground {
    pub bg_aa: Vec<f64>,
    pub rate_aa: Vec<f64>,
}

impl AlexBackground {
    pub fn uniform(rate: f64, bins: usize) -> Self {
        AlexBackground {
            bg_aa: vec![rate; bins],
            rate_aa: vec![rate; bins],
        }
    }

    pub fn validate(&self, bins: usize) -> Result<(), Fault> {
        Fault::check_len("bg_aa", bins, self.bg_aa.len())?;
        Fault::check_len("rate_aa", bins, self.rate_aa.len())
    }
}

/// Check that every burst's period bin exists in the background arrays.
pub fn check_bins(bp: &[usize], bins: usize) -> Result<(), Fault> {
    match bp.iter().enumerate().find(|(_, b)| **b >= bins) {
        Some((burst, b)) => Err(Fault::PeriodBinOutOfRange {
            what: "bg",
            burst,
            bp: *b,
            bins,
        }),
        None => Ok(()),
    }
}
