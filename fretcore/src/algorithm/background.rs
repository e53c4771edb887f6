//! Poisson/binomial thresholds shared by the probabilistic burst selections.

use statrs::distribution::{Binomial, DiscreteCDF, Poisson};

use crate::error::Fault;

/// Smallest count `k >= 0` with `P(X > k) <= p` for `X ~ Poisson(mean)`.
///
/// A burst carrying at least this many photons is unlikely (probability
/// below `p`) to be made of background photons alone. A non-positive mean
/// gives `0`; `p <= 0` can never be met and gives `+inf`, as does a mean
/// at or above `u64::MAX`.
pub fn poisson_isf(mean: f64, p: f64) -> f64 {
    if !(mean > 0.0) || p >= 1.0 {
        return 0.0;
    }
    // no u64 count can reach a threshold this far out
    if p <= 0.0 || !mean.is_finite() || mean >= u64::MAX as f64 {
        return f64::INFINITY;
    }
    let Ok(dist) = Poisson::new(mean) else {
        return 0.0;
    };
    if dist.sf(0) <= p {
        return 0.0;
    }

    // bracket: sf(lo) > p >= sf(hi)
    let mut lo = 0u64;
    let mut hi = (mean.ceil() as u64).saturating_add(1);
    while dist.sf(hi) > p {
        lo = hi;
        hi = hi.saturating_mul(2);
    }
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if dist.sf(mid) <= p {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    hi as f64
}

/// Smallest `k` in `[0, n]` with `P(X <= k) >= q` for `X ~ Binomial(n, f)`.
///
/// `q <= 0` gives `-1` so that every non-negative count lies above it.
pub fn binomial_ppf(n: u64, f: f64, q: f64) -> f64 {
    if q <= 0.0 {
        return -1.0;
    }
    if n == 0 {
        return 0.0;
    }
    if q >= 1.0 {
        return n as f64;
    }
    let Ok(dist) = Binomial::new(f.clamp(0.0, 1.0), n) else {
        return 0.0;
    };
    if dist.cdf(0) >= q {
        return 0.0;
    }

    // cdf(lo) < q <= cdf(hi)
    let mut lo = 0u64;
    let mut hi = n;
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if dist.cdf(mid) >= q {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    hi as f64
}

/// Look up a per-period-bin array at every burst's bin.
pub fn rate_per_burst(rate: &[f64], what: &'static str, bp: &[usize]) -> Result<Vec<f64>, Fault> {
    bp.iter()
        .enumerate()
        .map(|(burst, &bin)| {
            rate.get(bin).copied().ok_or(Fault::PeriodBinOutOfRange {
                what,
                burst,
                bp: bin,
                bins: rate.len(),
            })
        })
        .collect()
}

/// Expected background photons per burst: `factor * rate[bp] * width`.
pub fn expected_counts(
    rate: &[f64],
    what: &'static str,
    bp: &[usize],
    width_s: &[f64],
    factor: f64,
) -> Result<Vec<f64>, Fault> {
    Fault::check_len("burst width", bp.len(), width_s.len())?;
    let rates = rate_per_burst(rate, what, bp)?;
    Ok(rates
        .iter()
        .zip(width_s.iter())
        .map(|(r, w)| factor * r * w)
        .collect())
}

/// Per-burst minimum photon count that background alone reaches with probability below `p`.
pub fn poisson_thresholds(expected: &[f64], p: f64) -> Vec<f64> {
    expected.iter().map(|&mean| poisson_isf(mean, p)).collect()
}
