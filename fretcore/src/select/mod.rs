//! Burst selection predicates.
//!
//! Each predicate is a parameter struct implementing [`BurstPredicate`]. It
//! reads the burst arrays of one channel and returns a boolean mask aligned
//! with that channel's bursts. Predicates come in two shapes: labeled ones
//! return `(mask, label)` and the label ends up in the name of the selected
//! dataset, the others return the bare mask.

pub mod range;
pub mod size;
pub mod proximity;
pub mod background;
pub mod fret;
pub mod apply;

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::data::dataset::Dataset;
use crate::error::Fault;

pub use apply::{evaluate_masks, select_bursts, SelectionSummary};

/// One entry per burst of a channel, `true` for the bursts to keep.
pub type BurstMask = Vec<bool>;

#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub mask: BurstMask,
    pub label: Option<String>,
}

impl Selection {
    pub fn kept(&self) -> usize {
        self.mask.iter().filter(|x| **x).count()
    }
}

pub trait IntoSelection {
    fn into_selection(self) -> Selection;
}

impl IntoSelection for BurstMask {
    fn into_selection(self) -> Selection {
        Selection { mask: self, label: None }
    }
}

impl IntoSelection for (BurstMask, String) {
    fn into_selection(self) -> Selection {
        Selection { mask: self.0, label: Some(self.1) }
    }
}

pub trait BurstPredicate {
    /// `BurstMask` or `(BurstMask, String)`.
    type Output: IntoSelection;

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault>;
}

/// A parameter given either once for all channels or once per channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Scalar(f64),
    PerChannel(Vec<f64>),
}

impl Threshold {
    /// Value for channel `ich`; a per-channel list must have exactly `nch` entries.
    pub fn resolve(&self, name: &'static str, nch: usize, ich: usize) -> Result<f64, Fault> {
        match self {
            Threshold::Scalar(v) => Ok(*v),
            Threshold::PerChannel(values) => {
                if values.len() != nch {
                    return Err(Fault::ThresholdChannelMismatch { name, nch, found: values.len() });
                }
                values.get(ich).copied().ok_or(Fault::ChannelOutOfRange { ich, nch })
            }
        }
    }
}

impl From<f64> for Threshold {
    fn from(v: f64) -> Self {
        Threshold::Scalar(v)
    }
}

impl From<Vec<f64>> for Threshold {
    fn from(v: Vec<f64>) -> Self {
        Threshold::PerChannel(v)
    }
}

/// Detection-efficiency correction used to compute the burst size.
///
/// `Gamma(g)` gives `nd + na / g`, so a threshold is the minimum size of
/// donor-only bursts. `Gamma1(g)` gives `nd * g + na`, so a threshold is the
/// minimum size of high-FRET bursts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GammaCorrection {
    Gamma(f64),
    Gamma1(f64),
}

impl Default for GammaCorrection {
    fn default() -> Self {
        GammaCorrection::Gamma(1.0)
    }
}

impl GammaCorrection {
    pub fn burst_size(&self, nd: &[f64], na: &[f64]) -> Vec<f64> {
        match *self {
            GammaCorrection::Gamma(g) => nd.iter().zip(na.iter()).map(|(d, a)| d + a / g).collect(),
            GammaCorrection::Gamma1(g) => nd.iter().zip(na.iter()).map(|(d, a)| d * g + a).collect(),
        }
    }
}

impl Display for GammaCorrection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GammaCorrection::Gamma(g) => write!(f, "G{:.1}", g),
            GammaCorrection::Gamma1(g) => write!(f, "G1_{:.1}", g),
        }
    }
}

/// Inclusive range test.
pub(crate) fn in_range(values: &[f64], low: f64, high: f64) -> BurstMask {
    values.iter().map(|v| *v >= low && *v <= high).collect()
}

/// Milliseconds to clock ticks.
pub(crate) fn ms_to_ticks(ms: f64, clk_p: f64) -> f64 {
    ms * 1e-3 / clk_p
}
