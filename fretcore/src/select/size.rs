//! Burst-size selections.

use serde::{Deserialize, Serialize};

use crate::algorithm::utility::{argsort, percentile};
use crate::data::dataset::Dataset;
use crate::error::Fault;
use crate::select::{in_range, BurstMask, BurstPredicate, GammaCorrection, Threshold};

/// Gamma-corrected size of every burst of channel `ich`.
pub fn burst_size(d: &Dataset, ich: usize, gamma: GammaCorrection, add_naa: bool) -> Result<Vec<f64>, Fault> {
    let bursts = d.bursts(ich)?;
    let mut size = gamma.burst_size(&bursts.nd, &bursts.na);
    // naa only exists with alternation, without it the flag has nothing to add
    if add_naa && d.is_alex() {
        let naa = &d.alex_bursts(ich, "naa")?.naa;
        size.iter_mut().zip(naa.iter()).for_each(|(s, n)| *s += n);
    }
    Ok(size)
}

/// Bursts with size in `[th1, th2]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nda {
    pub th1: Threshold,
    pub th2: Threshold,
    pub gamma: GammaCorrection,
    pub add_naa: bool,
}

impl Default for Nda {
    fn default() -> Self {
        Nda {
            th1: Threshold::Scalar(20.0),
            th2: Threshold::Scalar(1000.0),
            gamma: GammaCorrection::default(),
            add_naa: false,
        }
    }
}

impl BurstPredicate for Nda {
    type Output = (BurstMask, String);

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let th1 = self.th1.resolve("th1", d.nch(), ich)?;
        let th2 = self.th2.resolve("th2", d.nch(), ich)?;
        let size = burst_size(d, ich, self.gamma, self.add_naa)?;

        let mut label = format!("nda_th{}", th1 as i64);
        if th2 < 1000.0 {
            label.push_str(&format!("_th2_{}", th2 as i64));
        }
        label.push_str(&self.gamma.to_string());
        Ok((in_range(&size, th1, th2), label))
    }
}

/// Bursts with size above the q-th percentile of the channel (below it if `low`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NdaPercentile {
    pub q: f64,
    pub low: bool,
    pub gamma: GammaCorrection,
}

impl Default for NdaPercentile {
    fn default() -> Self {
        NdaPercentile { q: 50.0, low: false, gamma: GammaCorrection::default() }
    }
}

impl BurstPredicate for NdaPercentile {
    type Output = (BurstMask, String);

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let size = burst_size(d, ich, self.gamma, false)?;
        let label = format!("perc{}", self.q as i64);
        let Some(q_percentile) = percentile(&size, self.q) else {
            return Ok((Vec::new(), label));
        };
        let mask = if self.low {
            size.iter().map(|s| *s <= q_percentile).collect()
        } else {
            size.iter().map(|s| *s >= q_percentile).collect()
        };
        Ok((mask, label))
    }
}

/// The `n` largest bursts of the channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopNNda {
    pub n: usize,
    pub gamma: GammaCorrection,
}

impl Default for TopNNda {
    fn default() -> Self {
        TopNNda { n: 500, gamma: GammaCorrection::default() }
    }
}

impl BurstPredicate for TopNNda {
    type Output = (BurstMask, String);

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let size = burst_size(d, ich, self.gamma, false)?;
        let index_sorted = argsort(&size);
        let mut mask = vec![false; size.len()];
        let first = size.len().saturating_sub(self.n);
        for &i in &index_sorted[first..] {
            mask[i] = true;
        }
        Ok((mask, format!("topN{}{}", self.n, self.gamma)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::tests::{alex_dataset, single_dataset};
    use crate::data::dataset::{Channel, SingleExcitationData, DEFAULT_CLK_P};
    use crate::data::{Background, Bursts};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_dataset(n: usize, seed: u64) -> Dataset {
        let mut rng = StdRng::seed_from_u64(seed);
        let nd: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..200.0)).collect();
        let na: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..200.0)).collect();
        let bursts = Bursts {
            start: (0..n as u64).map(|i| i * 1000).collect(),
            end: (0..n as u64).map(|i| i * 1000 + 500).collect(),
            nt: nd.iter().zip(na.iter()).map(|(d, a)| d + a).collect(),
            nd,
            na,
            bp: vec![0; n],
            efficiency: vec![0.5; n],
            max_rate: None,
        };
        let ch = Channel { bursts, background: Background::uniform(1000.0, 1), ..Channel::default() };
        SingleExcitationData::new(DEFAULT_CLK_P, vec![ch]).unwrap().into()
    }

    #[test]
    fn test_nda_and_label() {
        let d = alex_dataset();
        // sizes nd + na: 40, 60, 90, 10
        let (mask, label) = Nda::default().evaluate(&d, 0).unwrap();
        assert_eq!(mask, vec![true, true, true, false]);
        assert_eq!(label, "nda_th20G1.0");

        let sel = Nda { th1: 50.0.into(), th2: 80.0.into(), ..Nda::default() };
        let (mask, label) = sel.evaluate(&d, 0).unwrap();
        assert_eq!(mask, vec![false, true, false, false]);
        assert_eq!(label, "nda_th50_th2_80G1.0");
    }

    #[test]
    fn test_nda_gamma_modes() {
        let d = alex_dataset();
        // nd + na / 2: 25, 50, 85, 7.5
        let sel = Nda { th1: 30.0.into(), gamma: GammaCorrection::Gamma(2.0), ..Nda::default() };
        assert_eq!(sel.evaluate(&d, 0).unwrap().0, vec![false, true, true, false]);
        // nd * 0.5 + na: 35, 40, 50, 7.5
        let sel = Nda { th1: 36.0.into(), gamma: GammaCorrection::Gamma1(0.5), ..Nda::default() };
        let (mask, label) = sel.evaluate(&d, 0).unwrap();
        assert_eq!(mask, vec![false, true, true, false]);
        assert_eq!(label, "nda_th36G1_0.5");
    }

    #[test]
    fn test_nda_add_naa_only_with_alternation() {
        let sel = Nda { th1: 40.0.into(), add_naa: true, ..Nda::default() };
        // sizes + naa: 60, 85, 120, 12
        assert_eq!(sel.evaluate(&alex_dataset(), 0).unwrap().0, vec![true, true, true, false]);
        // flag has no effect without alternation: 40, 60, 90, 10
        let sel = Nda { th1: 41.0.into(), add_naa: true, ..Nda::default() };
        assert_eq!(sel.evaluate(&single_dataset(), 0).unwrap().0, vec![false, true, true, false]);
    }

    #[test]
    fn test_nda_per_channel_threshold() {
        let d = alex_dataset();
        let sel = Nda { th1: vec![50.0, 0.0].into(), ..Nda::default() };
        assert_eq!(sel.evaluate(&d, 0).unwrap().0, vec![false, true, true, false]);
        let sel = Nda { th1: vec![50.0, 0.0, 1.0].into(), ..Nda::default() };
        assert_eq!(
            sel.evaluate(&d, 0),
            Err(Fault::ThresholdChannelMismatch { name: "th1", nch: 2, found: 3 })
        );
    }

    #[test]
    fn test_nda_monotone_in_thresholds() {
        let d = random_dataset(500, 3);
        let count = |th1: f64, th2: f64| {
            let sel = Nda { th1: th1.into(), th2: th2.into(), ..Nda::default() };
            sel.evaluate(&d, 0).unwrap().0.iter().filter(|x| **x).count()
        };
        let mut last = usize::MAX;
        for th1 in (0..400).step_by(10) {
            let kept = count(th1 as f64, 1000.0);
            assert!(kept <= last);
            last = kept;
        }
        let mut last = 0;
        for th2 in (0..400).step_by(10) {
            let kept = count(0.0, th2 as f64);
            assert!(kept >= last);
            last = kept;
        }
    }

    #[test]
    fn test_percentile_keeps_half() {
        let d = random_dataset(101, 5);
        let (mask, label) = NdaPercentile::default().evaluate(&d, 0).unwrap();
        assert_eq!(label, "perc50");
        assert_eq!(mask.iter().filter(|x| **x).count(), 51);
        let low = NdaPercentile { low: true, ..NdaPercentile::default() };
        assert_eq!(low.evaluate(&d, 0).unwrap().0.iter().filter(|x| **x).count(), 51);

        let d = random_dataset(100, 6);
        let (mask, _) = NdaPercentile::default().evaluate(&d, 0).unwrap();
        assert_eq!(mask.iter().filter(|x| **x).count(), 50);
    }

    #[test]
    fn test_percentile_single_burst() {
        let d = random_dataset(1, 9);
        let sel = NdaPercentile { q: 90.0, ..NdaPercentile::default() };
        assert_eq!(sel.evaluate(&d, 0).unwrap().0, vec![true]);
    }

    #[test]
    fn test_top_n() {
        let d = alex_dataset();
        // sizes 40, 60, 90, 10
        let (mask, label) = TopNNda { n: 2, ..TopNNda::default() }.evaluate(&d, 0).unwrap();
        assert_eq!(mask, vec![false, true, true, false]);
        assert_eq!(label, "topN2G1.0");
        let (mask, _) = TopNNda { n: 0, ..TopNNda::default() }.evaluate(&d, 0).unwrap();
        assert_eq!(mask, vec![false; 4]);
    }

    #[test]
    fn test_top_n_larger_than_population() {
        let d = alex_dataset();
        let (mask, _) = TopNNda::default().evaluate(&d, 0).unwrap();
        assert_eq!(mask, vec![true; 4]);
    }

    #[test]
    fn test_empty_channel() {
        let d = alex_dataset();
        assert!(Nda::default().evaluate(&d, 1).unwrap().0.is_empty());
        assert!(NdaPercentile::default().evaluate(&d, 1).unwrap().0.is_empty());
        assert!(TopNNda::default().evaluate(&d, 1).unwrap().0.is_empty());
    }
}
