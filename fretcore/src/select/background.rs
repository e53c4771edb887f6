//! Selections of bursts standing out of the background.
//!
//! The expected background of a burst is its period-bin rate times its
//! duration. The deterministic selections compare the burst counts with
//! `F` times that value; the probabilistic ones treat it as the mean of a
//! Poisson variable and require the counts to be improbable under it.

use serde::{Deserialize, Serialize};

use crate::algorithm::background::{expected_counts, poisson_thresholds};
use crate::data::dataset::Dataset;
use crate::error::Fault;
use crate::select::{BurstMask, BurstPredicate, Threshold};

/// Which burst counts and which background stream a selection looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stream {
    /// `nd` against the donor-emission background.
    Donor,
    /// `na` against the acceptor-emission (donor excitation) background.
    Acceptor,
    /// `naa` against the acceptor-excitation background, ALEX only.
    AcceptorAcceptor,
    /// `nt` against the total background.
    Total,
}

impl Stream {
    fn counts<'a>(&self, d: &'a Dataset, ich: usize) -> Result<&'a [f64], Fault> {
        Ok(match self {
            Stream::Donor => d.bursts(ich)?.nd.as_slice(),
            Stream::Acceptor => d.bursts(ich)?.na.as_slice(),
            Stream::AcceptorAcceptor => d.alex_bursts(ich, "naa")?.naa.as_slice(),
            Stream::Total => d.bursts(ich)?.nt.as_slice(),
        })
    }

    /// Per-bin rates used for the `F x background` test.
    fn bg<'a>(&self, d: &'a Dataset, ich: usize) -> Result<(&'a [f64], &'static str), Fault> {
        Ok(match self {
            Stream::Donor => (d.background(ich)?.bg_dd.as_slice(), "bg_dd"),
            Stream::Acceptor => (d.background(ich)?.bg_ad.as_slice(), "bg_ad"),
            Stream::AcceptorAcceptor => (d.alex_background(ich, "bg_aa")?.bg_aa.as_slice(), "bg_aa"),
            Stream::Total => (d.background(ich)?.bg.as_slice(), "bg"),
        })
    }

    /// Per-bin rates used for the Poisson test.
    fn rate<'a>(&self, d: &'a Dataset, ich: usize) -> Result<(&'a [f64], &'static str), Fault> {
        Ok(match self {
            Stream::Donor => (d.background(ich)?.rate_dd.as_slice(), "rate_dd"),
            Stream::Acceptor => (d.background(ich)?.rate_ad.as_slice(), "rate_ad"),
            Stream::AcceptorAcceptor => (d.alex_background(ich, "rate_aa")?.rate_aa.as_slice(), "rate_aa"),
            Stream::Total => (d.background(ich)?.rate_m.as_slice(), "rate_m"),
        })
    }
}

fn expected_background(d: &Dataset, ich: usize, rate: &[f64], what: &'static str, factor: f64) -> Result<Vec<f64>, Fault> {
    let bursts = d.bursts(ich)?;
    expected_counts(rate, what, &bursts.bp, &bursts.width_s(d.clk_p()), factor)
}

fn above_background(d: &Dataset, ich: usize, stream: Stream, f: f64, strict: bool) -> Result<BurstMask, Fault> {
    let counts = stream.counts(d, ich)?;
    let (bg, what) = stream.bg(d, ich)?;
    let expected = expected_background(d, ich, bg, what, f)?;
    Ok(counts
        .iter()
        .zip(expected.iter())
        .map(|(n, e)| if strict { n > e } else { n >= e })
        .collect())
}

fn significant(d: &Dataset, ich: usize, stream: Stream, p: f64, f: f64) -> Result<BurstMask, Fault> {
    let counts = stream.counts(d, ich)?;
    let (rate, what) = stream.rate(d, ich)?;
    let expected = expected_background(d, ich, rate, what, f)?;
    let min_counts = poisson_thresholds(&expected, p);
    Ok(counts
        .iter()
        .zip(min_counts.iter())
        .map(|(n, k)| n >= k)
        .collect())
}

macro_rules! bg_selection {
    ($(#[$doc:meta])* $name:ident, $stream:expr, $strict:expr) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $name {
            pub f: f64,
        }

        impl Default for $name {
            fn default() -> Self {
                $name { f: 5.0 }
            }
        }

        impl BurstPredicate for $name {
            type Output = BurstMask;

            fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
                above_background(d, ich, $stream, self.f, $strict)
            }
        }
    };
}

macro_rules! bg_p_selection {
    ($(#[$doc:meta])* $name:ident, $stream:expr) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $name {
            pub p: f64,
            pub f: f64,
        }

        impl Default for $name {
            fn default() -> Self {
                $name { p: 0.05, f: 1.0 }
            }
        }

        impl BurstPredicate for $name {
            type Output = BurstMask;

            fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
                significant(d, ich, $stream, self.p, self.f)
            }
        }
    };
}

bg_selection!(
    /// Bursts with `nd >= F * bg_dd * width`.
    NdBg, Stream::Donor, false
);
bg_selection!(
    /// Bursts with `na >= F * bg_ad * width`.
    NaBg, Stream::Acceptor, false
);
bg_selection!(
    /// Bursts with `naa >= F * bg_aa * width`.
    NaaBg, Stream::AcceptorAcceptor, false
);
bg_selection!(
    /// Bursts with `nt > F * bg * width`.
    NtBg, Stream::Total, true
);

bg_p_selection!(
    /// Bursts whose `nd` is reached by `Poisson(F * rate_dd * width)` with probability below `p`.
    NdBgP, Stream::Donor
);
bg_p_selection!(
    /// Bursts whose `na` is reached by `Poisson(F * rate_ad * width)` with probability below `p`.
    NaBgP, Stream::Acceptor
);
bg_p_selection!(
    /// Bursts whose `naa` is reached by `Poisson(F * rate_aa * width)` with probability below `p`.
    NaaBgP, Stream::AcceptorAcceptor
);
bg_p_selection!(
    /// Bursts whose `nt` is reached by `Poisson(F * rate_m * width)` with probability below `p`.
    NtBgP, Stream::Total
);

fn noise_masks(d: &Dataset, ich: usize, th: &Threshold) -> Result<(BurstMask, BurstMask), Fault> {
    let th = th.resolve("th", d.nch(), ich)?;
    let bursts = d.bursts(ich)?;
    let background = d.background(ich)?;
    let noise_d = expected_background(d, ich, &background.rate_dd, "rate_dd", th)?;
    let noise_a = expected_background(d, ich, &background.rate_ad, "rate_ad", th)?;
    let donor = bursts.nd.iter().zip(noise_d.iter()).map(|(n, e)| n >= e).collect();
    let acceptor = bursts.na.iter().zip(noise_a.iter()).map(|(n, e)| n >= e).collect();
    Ok((donor, acceptor))
}

/// Bursts `th` times above the background on both donor and acceptor channels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeNoise {
    pub th: Threshold,
}

impl Default for SizeNoise {
    fn default() -> Self {
        SizeNoise { th: Threshold::Scalar(2.0) }
    }
}

impl BurstPredicate for SizeNoise {
    type Output = BurstMask;

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let (donor, acceptor) = noise_masks(d, ich, &self.th)?;
        Ok(donor.iter().zip(acceptor.iter()).map(|(a, b)| *a && *b).collect())
    }
}

/// Bursts `th` times above the background on the donor or the acceptor channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeNoiseOr {
    pub th: Threshold,
}

impl Default for SizeNoiseOr {
    fn default() -> Self {
        SizeNoiseOr { th: Threshold::Scalar(2.0) }
    }
}

impl BurstPredicate for SizeNoiseOr {
    type Output = BurstMask;

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let (donor, acceptor) = noise_masks(d, ich, &self.th)?;
        Ok(donor.iter().zip(acceptor.iter()).map(|(a, b)| *a || *b).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::background::poisson_isf;
    use crate::data::dataset::tests::{alex_dataset, single_dataset};
    use crate::data::{Background, Bursts, Channel, SingleExcitationData};

    /// Every burst 1 ms wide on a 1 kHz background: one expected background photon per stream.
    fn counts_dataset(counts: Vec<f64>, rate: f64) -> Dataset {
        let n = counts.len() as u64;
        let bursts = Bursts {
            start: (0..n).map(|i| i * 10_000).collect(),
            end: (0..n).map(|i| i * 10_000 + 1000).collect(),
            nd: counts.clone(),
            na: counts.clone(),
            nt: counts,
            bp: vec![0; n as usize],
            efficiency: vec![0.5; n as usize],
            max_rate: None,
        };
        let ch = Channel { bursts, background: Background::uniform(rate, 1), ..Channel::default() };
        SingleExcitationData::new(1e-6, vec![ch]).unwrap().into()
    }

    #[test]
    fn test_deterministic_background() {
        // expected background = 5 * 1000 Hz * 1 ms = 5 photons
        let d = counts_dataset(vec![4.0, 5.0, 6.0], 1000.0);
        assert_eq!(NdBg::default().evaluate(&d, 0).unwrap(), vec![false, true, true]);
        assert_eq!(NaBg::default().evaluate(&d, 0).unwrap(), vec![false, true, true]);
        // total uses a strict comparison
        assert_eq!(NtBg::default().evaluate(&d, 0).unwrap(), vec![false, false, true]);
    }

    #[test]
    fn test_na_bg_p_boundary_matches_poisson_isf() {
        // F * rate * width = 10 expected background photons for every burst
        let counts: Vec<f64> = (0..30).map(|c| c as f64).collect();
        let d = counts_dataset(counts.clone(), 10_000.0);
        let p = 0.05;
        let mask = NaBgP { p, f: 1.0 }.evaluate(&d, 0).unwrap();
        let threshold = poisson_isf(10.0, p);
        assert_eq!(threshold, 15.0);
        for (count, keep) in counts.iter().zip(mask.iter()) {
            assert_eq!(*keep, *count >= threshold);
        }
        assert_eq!(mask.iter().position(|x| *x), Some(15));
    }

    #[test]
    fn test_bg_p_factor_scales_background() {
        let d = counts_dataset(vec![15.0], 5_000.0);
        // mean 5: 15 photons are far above background
        assert_eq!(NdBgP::default().evaluate(&d, 0).unwrap(), vec![true]);
        // mean 20: 15 photons are compatible with background
        assert_eq!(NdBgP { p: 0.05, f: 4.0 }.evaluate(&d, 0).unwrap(), vec![false]);
        assert_eq!(NtBgP { p: 0.05, f: 4.0 }.evaluate(&d, 0).unwrap(), vec![false]);
    }

    #[test]
    fn test_huge_factor_rejects_without_overflow() {
        let d = counts_dataset(vec![1.0e6], 5_000.0);
        assert_eq!(NdBgP { p: 0.05, f: 1.0e20 }.evaluate(&d, 0).unwrap(), vec![false]);
    }

    #[test]
    fn test_zero_background_keeps_everything() {
        let d = counts_dataset(vec![0.0, 1.0], 0.0);
        assert_eq!(NdBgP::default().evaluate(&d, 0).unwrap(), vec![true, true]);
        assert_eq!(NdBg::default().evaluate(&d, 0).unwrap(), vec![true, true]);
    }

    #[test]
    fn test_acceptor_acceptor_needs_alternation() {
        let d = single_dataset();
        assert_eq!(NaaBg::default().evaluate(&d, 0), Err(Fault::RequiresAlternation("naa")));
        assert_eq!(NaaBgP::default().evaluate(&d, 0), Err(Fault::RequiresAlternation("naa")));

        // 1 ms bursts, 500 Hz: 5 * 0.5 = 2.5 expected; naa 20, 25, 30, 2
        let d = alex_dataset();
        assert_eq!(NaaBg::default().evaluate(&d, 0).unwrap(), vec![true, true, true, false]);
        assert_eq!(NaaBgP::default().evaluate(&d, 0).unwrap(), vec![true, true, true, true]);
    }

    #[test]
    fn test_size_noise() {
        // 1 kHz, 1 ms bursts: noise 1 photon, threshold 2
        let mut d = counts_dataset(vec![1.0, 3.0, 3.0], 1000.0);
        if let Dataset::SingleExcitation(data) = &mut d {
            data.channels[0].bursts.na = vec![3.0, 1.0, 3.0];
        }
        assert_eq!(SizeNoise::default().evaluate(&d, 0).unwrap(), vec![false, false, true]);
        assert_eq!(SizeNoiseOr::default().evaluate(&d, 0).unwrap(), vec![true, true, true]);

        let per_ch = SizeNoise { th: Threshold::PerChannel(vec![2.0, 2.0]) };
        assert!(matches!(per_ch.evaluate(&d, 0), Err(Fault::ThresholdChannelMismatch { .. })));
    }

    #[test]
    fn test_empty_channel() {
        let d = alex_dataset();
        assert!(NdBg::default().evaluate(&d, 1).unwrap().is_empty());
        assert!(NaaBgP::default().evaluate(&d, 1).unwrap().is_empty());
        assert!(SizeNoiseOr::default().evaluate(&d, 1).unwrap().is_empty());
    }
}
