use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::alex::period::{AlternationPeriod, ExcitationWindow};
use crate::algorithm::utility::select_by_mask;
use crate::error::Fault;

/// Everything needed to demultiplex a raw alternating-excitation photon stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlternationConfig {
    pub period: AlternationPeriod,
    pub donor_detector: u8,
    pub acceptor_detector: u8,
}

impl Default for AlternationConfig {
    fn default() -> Self {
        AlternationConfig {
            period: AlternationPeriod::default(),
            donor_detector: 0,
            acceptor_detector: 1,
        }
    }
}

impl AlternationConfig {
    pub fn new(
        period_length: u64,
        donor_window: impl Into<ExcitationWindow>,
        acceptor_window: impl Into<ExcitationWindow>,
        donor_detector: u8,
        acceptor_detector: u8,
    ) -> Result<Self, Fault> {
        let period = AlternationPeriod::new(period_length, donor_window.into(), acceptor_window.into())?;
        Ok(AlternationConfig { period, donor_detector, acceptor_detector })
    }
}

/// Photon stream of one channel after the alternation has been applied.
///
/// All five arrays have the same length. Every photon is exactly one of
/// donor/acceptor emission and exactly one of donor/acceptor excitation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AlexPhotons {
    pub times: Vec<u64>,
    pub donor_em: Vec<bool>,
    pub acceptor_em: Vec<bool>,
    pub donor_ex: Vec<bool>,
    pub acceptor_ex: Vec<bool>,
}

impl AlexPhotons {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Photons emitted by the acceptor under acceptor excitation.
    pub fn acceptor_em_acceptor_ex(&self) -> usize {
        self.acceptor_em
            .iter()
            .zip(self.acceptor_ex.iter())
            .filter(|(em, ex)| **em && **ex)
            .count()
    }

    /// Check the emission partition, excitation exclusivity and the shared length.
    pub fn validate(&self) -> Result<(), Fault> {
        let n = self.times.len();
        Fault::check_len("donor_em", n, self.donor_em.len())?;
        Fault::check_len("acceptor_em", n, self.acceptor_em.len())?;
        Fault::check_len("donor_ex", n, self.donor_ex.len())?;
        Fault::check_len("acceptor_ex", n, self.acceptor_ex.len())?;

        let not_partitioned = self
            .donor_em
            .iter()
            .zip(self.acceptor_em.iter())
            .filter(|(d, a)| *d == *a)
            .count();
        if not_partitioned > 0 {
            return Err(Fault::EmissionPartition {
                detail: format!("{} photon(s) are not exactly one of donor/acceptor emission", not_partitioned),
            });
        }

        let overlapping = self
            .donor_ex
            .iter()
            .zip(self.acceptor_ex.iter())
            .filter(|(d, a)| **d && **a)
            .count();
        if overlapping > 0 {
            return Err(Fault::OverlappingWindows { photons: overlapping });
        }
        Ok(())
    }
}

/// Split a raw photon stream into emission and excitation categories.
///
/// `times` and `detectors` are consumed: on long acquisitions they are the
/// largest arrays around and are released before the filtered copies grow.
/// Photons from detectors other than the donor/acceptor ones are dropped,
/// as are photons that fall in neither excitation window.
pub fn apply_alternation(
    times: Vec<u64>,
    detectors: Vec<u8>,
    config: &AlternationConfig,
) -> Result<AlexPhotons, Fault> {
    Fault::check_len("detectors", times.len(), detectors.len())?;
    if config.donor_detector == config.acceptor_detector {
        return Err(Fault::EmissionPartition {
            detail: format!(
                "donor and acceptor detector share the id {}",
                config.donor_detector
            ),
        });
    }

    let raw_count = times.len();
    let mut times_val = Vec::with_capacity(raw_count);
    let mut donor_em_val = Vec::with_capacity(raw_count);
    let mut acceptor_em_val = Vec::with_capacity(raw_count);
    for (t, det) in times.into_iter().zip(detectors) {
        let is_donor = det == config.donor_detector;
        let is_acceptor = det == config.acceptor_detector;
        if is_donor || is_acceptor {
            times_val.push(t);
            donor_em_val.push(is_donor);
            acceptor_em_val.push(is_acceptor);
        }
    }

    if donor_em_val.iter().zip(acceptor_em_val.iter()).any(|(d, a)| d == a) {
        return Err(Fault::EmissionPartition {
            detail: "a photon is both (or neither) donor and acceptor emission".to_string(),
        });
    }
    debug!(
        "#donor: {}  #acceptor: {}  (dropped {} photon(s) from other detectors)",
        donor_em_val.iter().filter(|x| **x).count(),
        acceptor_em_val.iter().filter(|x| **x).count(),
        raw_count - times_val.len()
    );

    let donor_ex_val = config.period.donor_mask(&times_val);
    let acceptor_ex_val = config.period.acceptor_mask(&times_val);
    let overlapping = donor_ex_val
        .iter()
        .zip(acceptor_ex_val.iter())
        .filter(|(d, a)| **d && **a)
        .count();
    if overlapping > 0 {
        return Err(Fault::OverlappingWindows { photons: overlapping });
    }

    // photons in neither window are alternation transients
    let valid: Vec<bool> = donor_ex_val
        .iter()
        .zip(acceptor_ex_val.iter())
        .map(|(d, a)| *d || *a)
        .collect();

    let photons = AlexPhotons {
        times: select_by_mask(&times_val, &valid),
        donor_em: select_by_mask(&donor_em_val, &valid),
        acceptor_em: select_by_mask(&acceptor_em_val, &valid),
        donor_ex: select_by_mask(&donor_ex_val, &valid),
        acceptor_ex: select_by_mask(&acceptor_ex_val, &valid),
    };

    let n_donor = photons.donor_em.iter().filter(|x| **x).count();
    let n_acceptor = photons.acceptor_em.iter().filter(|x| **x).count();
    if n_donor + n_acceptor != photons.len() {
        return Err(Fault::EmissionPartition {
            detail: format!(
                "{} donor + {} acceptor photons for {} timestamps",
                n_donor,
                n_acceptor,
                photons.len()
            ),
        });
    }
    photons.validate()?;

    debug!(
        "alternation applied: kept {} of {} photon(s) ({} transient)",
        photons.len(),
        raw_count,
        times_val.len() - photons.len()
    );
    if photons.is_empty() && raw_count > 0 {
        warn!("no photon fell inside an excitation window, check the window edges");
    }
    Ok(photons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_reference_photons() {
        let config = AlternationConfig::default();
        let times = vec![3000, 1000, 700, 5000, 7000];
        let detectors = vec![0, 1, 0, 1, 0];
        let photons = apply_alternation(times, detectors, &config).unwrap();

        // 700 is a transient, 5000 -> r = 1000 acceptor, 7000 -> r = 3000 donor
        assert_eq!(photons.times, vec![3000, 1000, 5000, 7000]);
        assert_eq!(photons.donor_em, vec![true, false, false, true]);
        assert_eq!(photons.acceptor_em, vec![false, true, true, false]);
        assert_eq!(photons.donor_ex, vec![true, false, false, true]);
        assert_eq!(photons.acceptor_ex, vec![false, true, true, false]);
        assert_eq!(photons.acceptor_em_acceptor_ex(), 2);
    }

    #[test]
    fn test_other_detectors_are_dropped() {
        let config = AlternationConfig::default();
        let photons = apply_alternation(vec![3000, 3001, 3002], vec![0, 5, 1], &config).unwrap();
        assert_eq!(photons.times, vec![3000, 3002]);
        assert_eq!(photons.acceptor_em, vec![false, true]);
    }

    #[test]
    fn test_overlapping_windows_fault() {
        let config = AlternationConfig::new(4000, (2000, 500), (100, 3000), 0, 1).unwrap();
        let result = apply_alternation(vec![200, 2500], vec![0, 1], &config);
        assert_eq!(result, Err(Fault::OverlappingWindows { photons: 2 }));
    }

    #[test]
    fn test_same_detector_ids_fault() {
        let config = AlternationConfig::new(4000, (2850, 580), (930, 2580), 1, 1).unwrap();
        let result = apply_alternation(vec![3000], vec![1], &config);
        assert!(matches!(result, Err(Fault::EmissionPartition { .. })));
    }

    #[test]
    fn test_length_mismatch_fault() {
        let config = AlternationConfig::default();
        let result = apply_alternation(vec![1, 2, 3], vec![0, 1], &config);
        assert_eq!(
            result,
            Err(Fault::LengthMismatch { what: "detectors", expected: 3, found: 2 })
        );
    }

    #[test]
    fn test_empty_stream() {
        let photons = apply_alternation(Vec::new(), Vec::new(), &AlternationConfig::default()).unwrap();
        assert!(photons.is_empty());
        assert!(photons.validate().is_ok());
    }

    #[test]
    fn test_random_stream_partition() {
        let config = AlternationConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        let mut times: Vec<u64> = (0..50_000).map(|_| rng.gen_range(0..10_000_000)).collect();
        times.sort_unstable();
        let detectors: Vec<u8> = (0..times.len()).map(|_| rng.gen_range(0..3)).collect();
        let photons = apply_alternation(times, detectors, &config).unwrap();

        let n = photons.len();
        assert!(n > 0);
        assert_eq!(photons.donor_em.len(), n);
        assert_eq!(photons.acceptor_em.len(), n);
        assert_eq!(photons.donor_ex.len(), n);
        assert_eq!(photons.acceptor_ex.len(), n);
        let n_d = photons.donor_em.iter().filter(|x| **x).count();
        let n_a = photons.acceptor_em.iter().filter(|x| **x).count();
        assert_eq!(n_d + n_a, n);
        assert!(photons.times.windows(2).all(|w| w[0] <= w[1]));
    }
}
